//! Upload boundary
//!
//! Turns raw upload requests into `PendingUpload`s with a normalized target path, and
//! runs each one through hash -> content store -> catalog.

pub mod service;

use crate::error::{HashError, UploadError};
use crate::hasher::{self, HashedContent};
use crate::types::{FileId, VersionId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use unicode_normalization::UnicodeNormalization;

pub use service::UploadService;

/// How to settle an upload whose target path is already taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolveMode {
    /// Append a new version to the existing file.
    Replace,
    /// Keep the existing file and store the upload under a free `name (n).ext` path.
    Copy,
}

/// Transport-agnostic upload request.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub bytes: Option<Vec<u8>>,
    pub target_path: String,
    pub mode: Option<ResolveMode>,
}

/// Where an upload's bytes come from.
#[derive(Clone)]
pub enum UploadSource {
    Bytes(Vec<u8>),
    File(PathBuf),
}

impl UploadSource {
    /// Digest and size of the payload. Local files are streamed.
    pub fn hash(&self) -> Result<HashedContent, HashError> {
        match self {
            UploadSource::Bytes(bytes) => Ok(HashedContent {
                digest: hasher::digest(bytes),
                size: bytes.len() as u64,
            }),
            UploadSource::File(path) => hasher::digest_file(path),
        }
    }
}

impl fmt::Debug for UploadSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadSource::Bytes(bytes) => write!(f, "Bytes({} bytes)", bytes.len()),
            UploadSource::File(path) => write!(f, "File({})", path.display()),
        }
    }
}

/// One queued upload with a canonical target path.
#[derive(Debug, Clone)]
pub struct PendingUpload {
    pub source: UploadSource,
    pub target_path: String,
}

impl PendingUpload {
    pub fn from_bytes(bytes: Vec<u8>, target_path: &str) -> Result<Self, UploadError> {
        Ok(Self {
            source: UploadSource::Bytes(bytes),
            target_path: normalize_target_path(target_path)?,
        })
    }

    pub fn from_file(local: PathBuf, target_path: &str) -> Result<Self, UploadError> {
        Ok(Self {
            source: UploadSource::File(local),
            target_path: normalize_target_path(target_path)?,
        })
    }
}

/// Result of storing one upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum UploadOutcome {
    /// The path was free; a new file was created.
    Created { file_id: FileId, path: String },
    /// A new version was appended to the file at `path`.
    Replaced {
        file_id: FileId,
        version_id: VersionId,
        path: String,
    },
    /// The upload was stored as a new file at the allocated `path`.
    Copied { file_id: FileId, path: String },
    /// The path is taken and no mode was given. Nothing was changed.
    Conflict { target_path: String },
}

impl UploadOutcome {
    pub fn is_conflict(&self) -> bool {
        matches!(self, UploadOutcome::Conflict { .. })
    }

    /// Path the upload ended up at, if it was stored.
    pub fn stored_path(&self) -> Option<&str> {
        match self {
            UploadOutcome::Created { path, .. }
            | UploadOutcome::Replaced { path, .. }
            | UploadOutcome::Copied { path, .. } => Some(path),
            UploadOutcome::Conflict { .. } => None,
        }
    }
}

/// Canonical form of a client-supplied path: NFC, with every leading `./` and `/`
/// removed. Empty, `.` and `..` segments are rejected, as is a trailing `/`.
pub fn normalize_target_path(raw: &str) -> Result<String, UploadError> {
    let composed: String = raw.nfc().collect();
    let mut trimmed = composed.as_str();
    loop {
        if let Some(rest) = trimmed.strip_prefix("./") {
            trimmed = rest;
        } else if let Some(rest) = trimmed.strip_prefix('/') {
            trimmed = rest;
        } else {
            break;
        }
    }
    let malformed = trimmed.is_empty()
        || trimmed
            .split('/')
            .any(|segment| segment.is_empty() || segment == "." || segment == "..");
    if malformed {
        return Err(UploadError::InvalidPath(raw.to_string()));
    }
    Ok(trimmed.to_string())
}
