//! Core types for the file vault.

/// Digest: BLAKE3 hash of uploaded bytes, the canonical content identity
pub type Digest = [u8; 32];

/// ContentId: identity of one distinct byte sequence
pub type ContentId = u64;

/// FileId: identity of a logical path entry in the catalog
pub type FileId = u64;

/// VersionId: identity of one upload appended to a file's history
pub type VersionId = u64;

/// OwnerId: the single owner every file is stamped with
pub type OwnerId = u64;
