//! Tooling
//!
//! Command-line front end and its text/JSON renderers.

pub mod cli;
pub mod format;

pub use cli::{Cli, CliContext, Commands, ConflictPolicy};
