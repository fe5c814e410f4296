//! Tree builder
//!
//! Inserts each file path segment by segment into folders that keep children in
//! first-seen order, then converts the result bottom-up, summing stats on the way.

use super::node::{FileNode, FolderNode, FolderStats, TreeNode};
use crate::store::FileSnapshot;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    File,
    Folder,
}

/// Folder under construction. Files and folders live in separate name-indexed lists;
/// `order` records the kind of each child as it was first seen.
#[derive(Default)]
struct PendingFolder {
    name: String,
    path: String,
    order: Vec<Kind>,
    files: Vec<FileNode>,
    folders: Vec<PendingFolder>,
    file_index: HashMap<String, usize>,
    folder_index: HashMap<String, usize>,
}

impl PendingFolder {
    fn new(name: &str, path: String) -> Self {
        Self {
            name: name.to_string(),
            path,
            ..Default::default()
        }
    }

    fn folder_mut(&mut self, name: &str) -> &mut PendingFolder {
        let position = match self.folder_index.get(name).copied() {
            Some(position) => position,
            None => {
                let path = join(&self.path, name);
                self.folders.push(PendingFolder::new(name, path));
                self.order.push(Kind::Folder);
                self.folder_index
                    .insert(name.to_string(), self.folders.len() - 1);
                self.folders.len() - 1
            }
        };
        &mut self.folders[position]
    }

    /// First file inserted under a name wins.
    fn insert_file(&mut self, name: &str, file: &FileSnapshot) {
        if self.file_index.contains_key(name) {
            return;
        }
        self.files.push(FileNode {
            name: name.to_string(),
            path: file.path.clone(),
            file: file.clone(),
        });
        self.order.push(Kind::File);
        self.file_index.insert(name.to_string(), self.files.len() - 1);
    }

    /// Children in first-seen order. Each list is consumed in the order it was filled.
    fn finish_children(self) -> Vec<TreeNode> {
        let mut files = self.files.into_iter();
        let mut folders = self.folders.into_iter();
        self.order
            .into_iter()
            .filter_map(|kind| match kind {
                Kind::File => files.next().map(TreeNode::File),
                Kind::Folder => folders.next().map(PendingFolder::finish),
            })
            .collect()
    }

    fn finish(self) -> TreeNode {
        let name = self.name.clone();
        let path = self.path.clone();
        let children = self.finish_children();
        let mut stats = FolderStats::default();
        for child in &children {
            stats += child.stats();
        }
        TreeNode::Folder(FolderNode {
            name,
            path,
            children,
            stats,
        })
    }
}

fn join(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", parent, name)
    }
}

/// Build the display tree for a catalog listing. Empty input gives an empty tree.
pub fn build_tree(files: &[FileSnapshot]) -> Vec<TreeNode> {
    let mut root = PendingFolder::default();
    for file in files {
        let mut segments: Vec<&str> = file.path.split('/').collect();
        let Some(leaf) = segments.pop() else {
            continue;
        };
        let mut folder = &mut root;
        for segment in segments {
            folder = folder.folder_mut(segment);
        }
        folder.insert_file(leaf, file);
    }
    root.finish_children()
}
