//! Filevault: content-addressed file vault
//!
//! Stores uploaded files by path with full version history. Identical bytes are kept
//! once no matter how many paths or versions reference them, and batch uploads pause
//! on path conflicts until the caller replaces, copies, skips, or cancels.

pub mod allocator;
pub mod config;
pub mod error;
pub mod hasher;
pub mod logging;
pub mod store;
pub mod tooling;
pub mod tree;
pub mod types;
pub mod upload;
pub mod workflow;
