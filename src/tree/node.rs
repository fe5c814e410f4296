//! Tree node types

use crate::store::FileSnapshot;
use serde::Serialize;
use std::ops::AddAssign;

/// Subtree counts: files with at least one duplicate, and files with history.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderStats {
    pub duplicate_count: u64,
    pub versioned_count: u64,
}

impl AddAssign for FolderStats {
    fn add_assign(&mut self, other: Self) {
        self.duplicate_count += other.duplicate_count;
        self.versioned_count += other.versioned_count;
    }
}

/// Leaf carrying the listing row for one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileNode {
    pub name: String,
    pub path: String,
    pub file: FileSnapshot,
}

impl FileNode {
    /// A leaf counts 1 for each flag it carries.
    pub fn stats(&self) -> FolderStats {
        FolderStats {
            duplicate_count: u64::from(self.file.is_duplicate()),
            versioned_count: u64::from(self.file.is_versioned()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FolderNode {
    pub name: String,
    /// `/`-joined path of this folder.
    pub path: String,
    pub children: Vec<TreeNode>,
    /// Sum of the children's stats.
    pub stats: FolderStats,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TreeNode {
    File(FileNode),
    Folder(FolderNode),
}

impl TreeNode {
    pub fn name(&self) -> &str {
        match self {
            TreeNode::File(file) => &file.name,
            TreeNode::Folder(folder) => &folder.name,
        }
    }

    pub fn path(&self) -> &str {
        match self {
            TreeNode::File(file) => &file.path,
            TreeNode::Folder(folder) => &folder.path,
        }
    }

    pub fn stats(&self) -> FolderStats {
        match self {
            TreeNode::File(file) => file.stats(),
            TreeNode::Folder(folder) => folder.stats,
        }
    }

    pub fn is_folder(&self) -> bool {
        matches!(self, TreeNode::Folder(_))
    }

    pub fn children(&self) -> &[TreeNode] {
        match self {
            TreeNode::File(_) => &[],
            TreeNode::Folder(folder) => folder.children.as_slice(),
        }
    }

    /// Number of files anywhere below (a file counts itself).
    pub fn file_count(&self) -> usize {
        match self {
            TreeNode::File(_) => 1,
            TreeNode::Folder(folder) => folder.children.iter().map(TreeNode::file_count).sum(),
        }
    }
}
