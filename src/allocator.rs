//! Copy-path allocation
//!
//! Finds a free sibling path for "save a copy": `dir/stem (n).ext` for the first `n`
//! in `1..=MAX_COPY_ATTEMPTS` not held by a file. Occupancy is read from the live
//! catalog on every candidate.

use crate::error::UploadError;
use crate::store::FileCatalog;
use tracing::debug;

/// Upper bound on the copy counter.
pub const MAX_COPY_ATTEMPTS: u32 = 99;

/// Split `path` into its directory (possibly empty) and file name.
pub fn split_directory(path: &str) -> (&str, &str) {
    match path.rfind('/') {
        Some(index) => (&path[..index], &path[index + 1..]),
        None => ("", path),
    }
}

/// Split a file name into stem and extension (extension keeps its dot).
///
/// A leading dot does not start an extension, so `.env` has none.
pub fn split_extension(file_name: &str) -> (&str, &str) {
    match file_name.rfind('.') {
        Some(index) if index > 0 => (&file_name[..index], &file_name[index..]),
        _ => (file_name, ""),
    }
}

/// The `counter`-th copy candidate for `original_path`.
pub fn copy_candidate(original_path: &str, counter: u32) -> String {
    let (directory, file_name) = split_directory(original_path);
    let (stem, extension) = split_extension(file_name);
    let copy_name = format!("{} ({}){}", stem, counter, extension);
    if directory.is_empty() {
        copy_name
    } else {
        format!("{}/{}", directory, copy_name)
    }
}

/// Return the first free copy path for `original_path`.
pub fn allocate_copy_path(
    catalog: &dyn FileCatalog,
    original_path: &str,
) -> Result<String, UploadError> {
    for counter in 1..=MAX_COPY_ATTEMPTS {
        let candidate = copy_candidate(original_path, counter);
        if catalog.find_by_path(&candidate)?.is_none() {
            debug!(original = original_path, allocated = %candidate, "allocated copy path");
            return Ok(candidate);
        }
    }
    Err(UploadError::PathAllocationExhausted {
        path: original_path.to_string(),
        attempts: MAX_COPY_ATTEMPTS,
    })
}
