//! Content Store: digest -> canonical content identity.

use super::persistence::{decode, encode, SledStore};
use super::ContentEntity;
use crate::error::StorageError;
use crate::hasher::to_hex;
use crate::types::{ContentId, Digest};
use tracing::debug;

/// Dedup index over uploaded bytes.
pub trait ContentStore: Send + Sync {
    /// Return the content id for `digest`, creating the record if absent.
    ///
    /// Concurrent callers with the same digest all receive the id of the single
    /// stored record.
    fn get_or_create(&self, digest: &Digest) -> Result<ContentId, StorageError>;
}

impl ContentStore for SledStore {
    fn get_or_create(&self, digest: &Digest) -> Result<ContentId, StorageError> {
        // Insert-if-absent, then re-read: whoever wins the swap defines the id.
        let candidate = ContentEntity {
            id: self.next_id()?,
            digest: *digest,
        };
        let encoded = encode(&candidate)?;
        let swapped = self
            .contents
            .compare_and_swap(digest, None as Option<&[u8]>, Some(encoded))?;

        let stored = self
            .contents
            .get(digest)?
            .ok_or_else(|| StorageError::ContentVanished(to_hex(digest)))?;
        let entity: ContentEntity = decode(&stored)?;

        if swapped.is_ok() {
            debug!(digest = %to_hex(digest), content_id = entity.id, "created content record");
        } else {
            debug!(digest = %to_hex(digest), content_id = entity.id, "reused content record");
        }
        Ok(entity.id)
    }
}
