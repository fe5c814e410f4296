//! Content hashing
//!
//! Computes the BLAKE3 digest that identifies uploaded bytes. The same bytes always
//! produce the same digest, including the empty sequence.

use crate::error::HashError;
use crate::types::Digest;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Digest and byte count of one upload payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashedContent {
    pub digest: Digest,
    pub size: u64,
}

/// Compute the digest of an in-memory byte buffer.
pub fn digest(bytes: &[u8]) -> Digest {
    *blake3::hash(bytes).as_bytes()
}

/// Stream a reader through the hasher, counting bytes as they pass.
pub fn digest_reader<R: Read>(mut reader: R) -> io::Result<HashedContent> {
    let mut hasher = blake3::Hasher::new();
    let size = io::copy(&mut reader, &mut hasher)?;
    Ok(HashedContent {
        digest: *hasher.finalize().as_bytes(),
        size,
    })
}

/// Hash a local file without loading it into memory.
pub fn digest_file(path: &Path) -> Result<HashedContent, HashError> {
    let file = File::open(path).map_err(|source| HashError {
        path: path.to_path_buf(),
        source,
    })?;
    digest_reader(file).map_err(|source| HashError {
        path: path.to_path_buf(),
        source,
    })
}

/// Lowercase hex form of a digest, for logs and display.
pub fn to_hex(digest: &Digest) -> String {
    hex::encode(digest)
}
