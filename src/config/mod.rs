//! Configuration
//!
//! Layered settings for the vault: built-in defaults, the global config file, an
//! explicit file, then `FILEVAULT__*` environment variables.

mod facade;
pub mod sources;
pub mod xdg;

pub use facade::ConfigLoader;
pub use crate::logging::LoggingConfig;

use crate::types::OwnerId;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileVaultConfig {
    /// Owner stamped on every file record.
    #[serde(default = "default_owner_id")]
    pub owner_id: OwnerId,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_owner_id() -> OwnerId {
    1
}

impl Default for FileVaultConfig {
    fn default() -> Self {
        Self {
            owner_id: default_owner_id(),
            storage: StorageConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Where the store lives.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Store directory; `None` means `$XDG_DATA_HOME/filevault/store`.
    #[serde(default)]
    pub store_path: Option<PathBuf>,
}

impl FileVaultConfig {
    /// Store directory with precedence: explicit override, config, XDG default.
    pub fn resolve_store_path(
        &self,
        override_path: Option<PathBuf>,
    ) -> Result<PathBuf, crate::error::ApiError> {
        if let Some(path) = override_path.filter(|p| !p.as_os_str().is_empty()) {
            return Ok(path);
        }
        if let Some(path) = self
            .storage
            .store_path
            .clone()
            .filter(|p| !p.as_os_str().is_empty())
        {
            return Ok(path);
        }
        xdg::default_store_path()
    }
}
