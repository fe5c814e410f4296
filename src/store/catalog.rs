//! File Catalog: logical paths and their version histories.

use super::heads::next_uploaded_at;
use super::persistence::{decode, decode_id, encode, id_key, version_key, SledStore};
use super::snapshot::{self, FileSnapshot};
use super::{FileEntity, VersionEntity};
use crate::error::StorageError;
use crate::types::{ContentId, FileId};
use chrono::Utc;
use sled::transaction::{abort, ConflictableTransactionResult};
use sled::Transactional;
use tracing::{debug, info};

/// Catalog of files keyed by path.
///
/// Every mutation commits on return. A file is only ever visible together with its
/// first version.
pub trait FileCatalog: Send + Sync {
    /// Exact-match lookup.
    fn find_by_path(&self, path: &str) -> Result<Option<FileEntity>, StorageError>;

    /// Create a file and its first version in one step.
    ///
    /// Fails with `StorageError::PathOccupied` if another file holds `path`, leaving
    /// the catalog untouched.
    fn create_with_version(
        &self,
        path: &str,
        content_id: ContentId,
        size: u64,
    ) -> Result<FileEntity, StorageError>;

    /// Append a version to an existing file; it becomes the current version.
    fn append_version(
        &self,
        file_id: FileId,
        content_id: ContentId,
        size: u64,
    ) -> Result<VersionEntity, StorageError>;

    /// Every file with its history and duplicate paths, in creation order.
    fn list_all_with_versions(&self) -> Result<Vec<FileSnapshot>, StorageError>;

    /// Delete all files, versions, and content records together.
    fn reset_all(&self) -> Result<(), StorageError>;
}

impl FileCatalog for SledStore {
    fn find_by_path(&self, path: &str) -> Result<Option<FileEntity>, StorageError> {
        let Some(id_bytes) = self.paths.get(path.as_bytes())? else {
            return Ok(None);
        };
        let file_id = decode_id(&id_bytes)?;
        match self.files.get(id_key(file_id))? {
            Some(bytes) => Ok(Some(decode(&bytes)?)),
            None => Ok(None),
        }
    }

    fn create_with_version(
        &self,
        path: &str,
        content_id: ContentId,
        size: u64,
    ) -> Result<FileEntity, StorageError> {
        let file = FileEntity {
            id: self.next_id()?,
            path: path.to_string(),
            owner_id: self.owner_id,
        };
        let version = VersionEntity {
            id: self.next_id()?,
            file_id: file.id,
            content_id,
            size,
            uploaded_at: Utc::now(),
        };
        let file_key = id_key(file.id);
        let file_bytes = encode(&file)?;
        let version_bytes = encode(&version)?;
        let history_key = version_key(file.id, version.id);

        (&self.files, &self.paths, &self.versions, &self.heads).transaction(
            |(files, paths, versions, heads)| -> ConflictableTransactionResult<(), StorageError> {
                if paths.get(path.as_bytes())?.is_some() {
                    return abort(StorageError::PathOccupied(path.to_string()));
                }
                paths.insert(path.as_bytes(), &file_key[..])?;
                files.insert(&file_key[..], file_bytes.as_slice())?;
                versions.insert(history_key.as_slice(), version_bytes.as_slice())?;
                heads.insert(&file_key[..], version_bytes.as_slice())?;
                Ok(())
            },
        )?;

        info!(file_id = file.id, path = %file.path, content_id, size, "created file");
        Ok(file)
    }

    fn append_version(
        &self,
        file_id: FileId,
        content_id: ContentId,
        size: u64,
    ) -> Result<VersionEntity, StorageError> {
        let file_key = id_key(file_id);
        let version_id = self.next_id()?;
        let now = Utc::now();

        let version = (&self.files, &self.versions, &self.heads).transaction(
            |(files, versions, heads)| -> ConflictableTransactionResult<VersionEntity, StorageError> {
                if files.get(&file_key[..])?.is_none() {
                    return abort(StorageError::FileNotFound(file_id));
                }
                let previous = match heads.get(&file_key[..])? {
                    Some(bytes) => match decode::<VersionEntity>(&bytes) {
                        Ok(head) => Some(head.uploaded_at),
                        Err(e) => return abort(e),
                    },
                    None => None,
                };
                let version = VersionEntity {
                    id: version_id,
                    file_id,
                    content_id,
                    size,
                    uploaded_at: next_uploaded_at(previous, now),
                };
                let bytes = match encode(&version) {
                    Ok(bytes) => bytes,
                    Err(e) => return abort(e),
                };
                versions.insert(version_key(file_id, version_id), bytes.as_slice())?;
                heads.insert(&file_key[..], bytes)?;
                Ok(version)
            },
        )?;

        info!(file_id, version_id, content_id, size, "appended version");
        Ok(version)
    }

    fn list_all_with_versions(&self) -> Result<Vec<FileSnapshot>, StorageError> {
        let mut entries = Vec::new();
        for item in self.files.iter() {
            let (key, value) = item?;
            let file: FileEntity = decode(&value)?;
            let mut versions = Vec::new();
            for entry in self.versions.scan_prefix(&key) {
                let (_, bytes) = entry?;
                versions.push(decode::<VersionEntity>(&bytes)?);
            }
            entries.push((file, versions));
        }
        debug!(files = entries.len(), "listed catalog");
        Ok(snapshot::assemble(entries))
    }

    fn reset_all(&self) -> Result<(), StorageError> {
        let trees = [
            &self.contents,
            &self.files,
            &self.paths,
            &self.versions,
            &self.heads,
        ];
        let mut keys: Vec<Vec<sled::IVec>> = Vec::with_capacity(trees.len());
        for tree in trees {
            keys.push(tree.iter().keys().collect::<Result<Vec<_>, _>>()?);
        }

        (&self.contents, &self.files, &self.paths, &self.versions, &self.heads).transaction(
            |(contents, files, paths, versions, heads)| -> ConflictableTransactionResult<(), StorageError> {
                for (tree, tree_keys) in [contents, files, paths, versions, heads].iter().zip(&keys) {
                    for key in tree_keys {
                        tree.remove(key.clone())?;
                    }
                }
                Ok(())
            },
        )?;

        info!(
            contents = keys[0].len(),
            files = keys[1].len(),
            versions = keys[3].len(),
            "reset vault"
        );
        Ok(())
    }
}
