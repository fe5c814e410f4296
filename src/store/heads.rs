//! Version heads
//!
//! Each file keeps a head record holding its current version. Appends read the head
//! inside their transaction so a new version always sorts after the one it replaces.

use super::VersionEntity;
use chrono::{DateTime, Duration, Utc};
use std::cmp::Ordering;

/// Timestamp for a version appended after `previous`.
///
/// Uses `now` unless the clock has not moved past the head, in which case the new
/// version is stamped one microsecond after it.
pub fn next_uploaded_at(previous: Option<DateTime<Utc>>, now: DateTime<Utc>) -> DateTime<Utc> {
    match previous {
        Some(head) if now <= head => head + Duration::microseconds(1),
        _ => now,
    }
}

/// Order versions current-first: latest `uploaded_at`, then latest id.
pub fn newest_first(a: &VersionEntity, b: &VersionEntity) -> Ordering {
    b.uploaded_at
        .cmp(&a.uploaded_at)
        .then_with(|| b.id.cmp(&a.id))
}
