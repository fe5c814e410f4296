//! Folder tree over the flat catalog listing, with duplicate and version counts
//! rolled up from files to every enclosing folder.

pub mod builder;
pub mod node;

pub use builder::build_tree;
pub use node::{FileNode, FolderNode, FolderStats, TreeNode};
