//! Error types for storage, uploads, the batch workflow, and the CLI surface.

use crate::types::FileId;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the backing store.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage backend error: {0}")]
    Backend(#[from] sled::Error),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("failed to encode or decode record: {0}")]
    Codec(#[from] bincode::Error),

    /// Another writer already holds this path. Expected under concurrent uploads.
    #[error("path already occupied: {0}")]
    PathOccupied(String),

    #[error("file not found: {0}")]
    FileNotFound(FileId),

    #[error("content record for digest {0} disappeared during get-or-create")]
    ContentVanished(String),
}

impl From<sled::transaction::TransactionError<StorageError>> for StorageError {
    fn from(err: sled::transaction::TransactionError<StorageError>) -> Self {
        match err {
            sled::transaction::TransactionError::Abort(inner) => inner,
            sled::transaction::TransactionError::Storage(inner) => StorageError::Backend(inner),
        }
    }
}

/// Failure to read an upload's bytes while computing its digest.
#[derive(Debug, Error)]
#[error("cannot read {}: {source}", path.display())]
pub struct HashError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

/// Errors for a single upload item.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("no bytes provided for upload")]
    NoBytesProvided,

    #[error("invalid target path: {0:?}")]
    InvalidPath(String),

    #[error("no free copy path for {path} after {attempts} attempts")]
    PathAllocationExhausted { path: String, attempts: u32 },

    #[error("storage failure: {0}")]
    StorageFailure(#[from] StorageError),

    #[error("hash computation failed: {0}")]
    HashComputationFailure(#[from] HashError),
}

/// API-level errors surfaced by the CLI.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("configuration error: {0}")]
    ConfigError(String),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error("no file at {0}")]
    NotFound(String),

    /// A batch stopped on a failed item; carries the rendered batch report.
    #[error("upload batch failed\n{0}")]
    BatchFailed(String),

    #[error(transparent)]
    Workflow(#[from] crate::workflow::WorkflowError),

    #[error("cannot read upload source: {0}")]
    Io(#[from] std::io::Error),

    #[error("prompt failed: {0}")]
    Prompt(#[from] dialoguer::Error),

    #[error("failed to render JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}
