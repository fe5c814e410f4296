//! Catalog listing snapshots
//!
//! Flattens files and their histories into listing rows and derives the duplicate
//! relation: two files are duplicates when their current versions share content.

use super::heads::newest_first;
use super::{FileEntity, VersionEntity};
use crate::types::{ContentId, FileId, VersionId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One entry of a file's history as seen by a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionSnapshot {
    pub id: VersionId,
    pub size: u64,
    pub uploaded_at: DateTime<Utc>,
    pub is_current: bool,
    #[serde(skip)]
    pub content_id: ContentId,
}

/// One file with its current version facts, duplicates, and history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileSnapshot {
    pub id: FileId,
    pub path: String,
    pub size: u64,
    pub uploaded_at: DateTime<Utc>,
    pub duplicate_of: Vec<String>,
    /// Ordered current-first.
    pub versions: Vec<VersionSnapshot>,
}

impl FileSnapshot {
    pub fn is_duplicate(&self) -> bool {
        !self.duplicate_of.is_empty()
    }

    pub fn is_versioned(&self) -> bool {
        self.versions.len() > 1
    }

    pub fn current(&self) -> Option<&VersionSnapshot> {
        self.versions.first()
    }
}

/// Build listing rows from files (in listing order) and their versions.
///
/// Files without versions are left out.
pub fn assemble(entries: Vec<(FileEntity, Vec<VersionEntity>)>) -> Vec<FileSnapshot> {
    let mut rows: Vec<(FileEntity, Vec<VersionEntity>)> = entries
        .into_iter()
        .filter(|(_, versions)| !versions.is_empty())
        .collect();
    for (_, versions) in rows.iter_mut() {
        versions.sort_by(newest_first);
    }

    let mut paths_by_content: HashMap<ContentId, Vec<(FileId, &str)>> = HashMap::new();
    for (file, versions) in &rows {
        paths_by_content
            .entry(versions[0].content_id)
            .or_default()
            .push((file.id, file.path.as_str()));
    }

    rows.iter()
        .map(|(file, versions)| {
            let current = &versions[0];
            let duplicate_of: Vec<String> = paths_by_content
                .get(&current.content_id)
                .map(|holders| {
                    holders
                        .iter()
                        .filter(|(id, _)| *id != file.id)
                        .map(|(_, path)| path.to_string())
                        .collect()
                })
                .unwrap_or_default();

            FileSnapshot {
                id: file.id,
                path: file.path.clone(),
                size: current.size,
                uploaded_at: current.uploaded_at,
                duplicate_of,
                versions: versions
                    .iter()
                    .enumerate()
                    .map(|(index, v)| VersionSnapshot {
                        id: v.id,
                        size: v.size,
                        uploaded_at: v.uploaded_at,
                        is_current: index == 0,
                        content_id: v.content_id,
                    })
                    .collect(),
            }
        })
        .collect()
}
