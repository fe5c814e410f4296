//! ConfigLoader facade over the layered sources.

use super::sources;
use super::FileVaultConfig;
use config::ConfigError;
use std::path::Path;

/// Configuration loader facade.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from the standard sources.
    /// Precedence: defaults -> global file -> environment.
    pub fn load() -> Result<FileVaultConfig, ConfigError> {
        Self::load_with(None)
    }

    /// Load configuration, layering `explicit` between the global file and the environment.
    pub fn load_with(explicit: Option<&Path>) -> Result<FileVaultConfig, ConfigError> {
        let builder = sources::builder_with_defaults()?;
        let builder = sources::add_global_file(builder);
        let builder = match explicit {
            Some(path) => sources::add_explicit_file(builder, path)?,
            None => builder,
        };
        let builder = sources::add_environment(builder);

        let config = builder.build()?;
        let loaded: FileVaultConfig = config.try_deserialize()?;
        tracing::debug!(owner_id = loaded.owner_id, "Configuration loaded");
        Ok(loaded)
    }

    /// Load configuration from one file only, without the global file or environment.
    pub fn load_from_file(path: &Path) -> Result<FileVaultConfig, ConfigError> {
        let builder = sources::builder_with_defaults()?;
        let builder = sources::add_explicit_file(builder, path)?;
        builder.build()?.try_deserialize()
    }
}
