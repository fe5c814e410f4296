//! Vault Store
//!
//! Persistent records for deduplicated content, logical files, and their version
//! history. Content and catalog access are split into two traits so callers depend
//! only on the half they use; `SledStore` implements both over one database.

pub mod catalog;
pub mod content;
pub mod heads;
pub mod persistence;
pub mod snapshot;

use crate::types::{ContentId, Digest, FileId, OwnerId, VersionId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use catalog::FileCatalog;
pub use content::ContentStore;
pub use persistence::SledStore;
pub use snapshot::{FileSnapshot, VersionSnapshot};

/// Canonical record of one distinct byte sequence. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentEntity {
    pub id: ContentId,
    pub digest: Digest,
}

/// A logical path in the vault namespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntity {
    pub id: FileId,
    pub path: String,
    pub owner_id: OwnerId,
}

/// One upload appended to a file's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionEntity {
    pub id: VersionId,
    pub file_id: FileId,
    pub content_id: ContentId,
    pub size: u64,
    pub uploaded_at: DateTime<Utc>,
}
