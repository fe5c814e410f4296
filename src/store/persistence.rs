//! Sled-backed persistence for contents, files, versions, and heads.

use crate::error::StorageError;
use crate::types::{FileId, OwnerId, VersionId};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use tracing::debug;

const CONTENTS_TREE: &str = "contents";
const FILES_TREE: &str = "files";
const PATHS_TREE: &str = "paths";
const VERSIONS_TREE: &str = "versions";
const HEADS_TREE: &str = "heads";

/// Vault store over one sled database.
///
/// Trees:
/// - `contents`: digest -> ContentEntity
/// - `files`: file id -> FileEntity
/// - `paths`: path -> file id (unique-path index)
/// - `versions`: file id ++ version id -> VersionEntity
/// - `heads`: file id -> current VersionEntity
///
/// Clones share the same database, so handles can be passed to concurrent writers.
#[derive(Clone)]
pub struct SledStore {
    pub(crate) db: sled::Db,
    pub(crate) contents: sled::Tree,
    pub(crate) files: sled::Tree,
    pub(crate) paths: sled::Tree,
    pub(crate) versions: sled::Tree,
    pub(crate) heads: sled::Tree,
    pub(crate) owner_id: OwnerId,
}

impl SledStore {
    /// Open (or create) a store at the given directory.
    pub fn open(path: &Path, owner_id: OwnerId) -> Result<Self, StorageError> {
        std::fs::create_dir_all(path)?;
        let db = sled::open(path)?;
        debug!(path = %path.display(), "opened vault store");
        Self::from_db(db, owner_id)
    }

    /// Open a throwaway store that lives only as long as the handle.
    pub fn temporary(owner_id: OwnerId) -> Result<Self, StorageError> {
        let db = sled::Config::new().temporary(true).open()?;
        Self::from_db(db, owner_id)
    }

    /// Wrap an already opened database.
    pub fn from_db(db: sled::Db, owner_id: OwnerId) -> Result<Self, StorageError> {
        Ok(Self {
            contents: db.open_tree(CONTENTS_TREE)?,
            files: db.open_tree(FILES_TREE)?,
            paths: db.open_tree(PATHS_TREE)?,
            versions: db.open_tree(VERSIONS_TREE)?,
            heads: db.open_tree(HEADS_TREE)?,
            db,
            owner_id,
        })
    }

    pub fn owner_id(&self) -> OwnerId {
        self.owner_id
    }

    /// Number of distinct content records.
    pub fn content_count(&self) -> usize {
        self.contents.len()
    }

    /// Force buffered writes to disk.
    pub fn flush(&self) -> Result<(), StorageError> {
        self.db.flush()?;
        Ok(())
    }

    pub(crate) fn next_id(&self) -> Result<u64, StorageError> {
        Ok(self.db.generate_id()?)
    }
}

pub(crate) fn id_key(id: u64) -> [u8; 8] {
    id.to_be_bytes()
}

/// Version keys sort by file first, then by allocation order within the file.
pub(crate) fn version_key(file_id: FileId, version_id: VersionId) -> Vec<u8> {
    let mut key = Vec::with_capacity(16);
    key.extend_from_slice(&file_id.to_be_bytes());
    key.extend_from_slice(&version_id.to_be_bytes());
    key
}

pub(crate) fn decode_id(bytes: &[u8]) -> Result<u64, StorageError> {
    let raw: [u8; 8] = bytes.try_into().map_err(|_| {
        StorageError::Codec(Box::new(bincode::ErrorKind::Custom(format!(
            "expected 8-byte id, found {} bytes",
            bytes.len()
        ))))
    })?;
    Ok(u64::from_be_bytes(raw))
}

pub(crate) fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, StorageError> {
    Ok(bincode::serialize(value)?)
}

pub(crate) fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, StorageError> {
    Ok(bincode::deserialize(bytes)?)
}
