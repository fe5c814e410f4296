//! Upload service: one upload through hash -> content store -> catalog.

use super::{PendingUpload, ResolveMode, UploadOutcome, UploadRequest};
use crate::allocator::{allocate_copy_path, MAX_COPY_ATTEMPTS};
use crate::error::{StorageError, UploadError};
use crate::hasher::to_hex;
use crate::store::{ContentStore, FileCatalog, FileEntity, SledStore};
use crate::types::ContentId;
use std::sync::Arc;
use tracing::{debug, info, warn};

enum Placement {
    Created(FileEntity),
    Occupied(FileEntity),
}

/// Stores uploads, reporting a conflict instead of touching an occupied path unless
/// a resolve mode is given.
#[derive(Clone)]
pub struct UploadService {
    content: Arc<dyn ContentStore>,
    catalog: Arc<dyn FileCatalog>,
}

impl UploadService {
    pub fn new(content: Arc<dyn ContentStore>, catalog: Arc<dyn FileCatalog>) -> Self {
        Self { content, catalog }
    }

    /// Service over a single store acting as both content store and catalog.
    pub fn from_store(store: Arc<SledStore>) -> Self {
        Self {
            content: store.clone(),
            catalog: store,
        }
    }

    pub fn catalog(&self) -> &dyn FileCatalog {
        self.catalog.as_ref()
    }

    /// Handle a raw request at the submission boundary.
    pub fn handle(&self, request: UploadRequest) -> Result<UploadOutcome, UploadError> {
        let bytes = request.bytes.ok_or(UploadError::NoBytesProvided)?;
        let upload = PendingUpload::from_bytes(bytes, &request.target_path)?;
        self.submit(&upload, request.mode)
    }

    /// Store one upload. An occupied path without `mode` yields `Conflict` and leaves
    /// the catalog unchanged.
    pub fn submit(
        &self,
        upload: &PendingUpload,
        mode: Option<ResolveMode>,
    ) -> Result<UploadOutcome, UploadError> {
        let hashed = upload.source.hash()?;
        let content_id = self.content.get_or_create(&hashed.digest)?;
        let path = upload.target_path.as_str();
        debug!(path, digest = %to_hex(&hashed.digest), content_id, size = hashed.size, "hashed upload");

        let existing = match self.place(path, content_id, hashed.size)? {
            Placement::Created(file) => {
                return Ok(UploadOutcome::Created {
                    file_id: file.id,
                    path: file.path,
                })
            }
            Placement::Occupied(file) => file,
        };

        match mode {
            None => {
                debug!(path, file_id = existing.id, "path conflict");
                Ok(UploadOutcome::Conflict {
                    target_path: path.to_string(),
                })
            }
            Some(ResolveMode::Replace) => {
                let version = self
                    .catalog
                    .append_version(existing.id, content_id, hashed.size)?;
                Ok(UploadOutcome::Replaced {
                    file_id: existing.id,
                    version_id: version.id,
                    path: existing.path,
                })
            }
            Some(ResolveMode::Copy) => self.store_copy(path, content_id, hashed.size),
        }
    }

    /// Create the file if `path` is free, otherwise return the file holding it.
    /// A lost creation race is reported as the winner's file.
    fn place(
        &self,
        path: &str,
        content_id: ContentId,
        size: u64,
    ) -> Result<Placement, UploadError> {
        if let Some(existing) = self.catalog.find_by_path(path)? {
            return Ok(Placement::Occupied(existing));
        }
        match self.catalog.create_with_version(path, content_id, size) {
            Ok(file) => Ok(Placement::Created(file)),
            Err(StorageError::PathOccupied(_)) => {
                warn!(path, "path taken by a concurrent upload");
                let winner = self
                    .catalog
                    .find_by_path(path)?
                    .ok_or_else(|| StorageError::PathOccupied(path.to_string()))?;
                Ok(Placement::Occupied(winner))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn store_copy(
        &self,
        original: &str,
        content_id: ContentId,
        size: u64,
    ) -> Result<UploadOutcome, UploadError> {
        for _ in 0..MAX_COPY_ATTEMPTS {
            let candidate = allocate_copy_path(self.catalog.as_ref(), original)?;
            match self.catalog.create_with_version(&candidate, content_id, size) {
                Ok(file) => {
                    info!(original, path = %file.path, "stored upload as copy");
                    return Ok(UploadOutcome::Copied {
                        file_id: file.id,
                        path: file.path,
                    });
                }
                Err(StorageError::PathOccupied(_)) => {
                    warn!(path = %candidate, "copy path taken before creation, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(UploadError::PathAllocationExhausted {
            path: original.to_string(),
            attempts: MAX_COPY_ATTEMPTS,
        })
    }
}
