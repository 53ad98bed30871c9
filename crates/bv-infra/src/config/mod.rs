//! Process-wide configuration.
//!
//! Values come from an optional TOML file, overridden by environment
//! variables: `BLOBVAULT__STORAGE__DFS__DB__URL` maps to `storage.dfs.db.url`.
//! The source is read once at startup and handed to the backend registry.

mod db_storage_loader;

use std::path::Path;

use anyhow::Context;
use config::{Config, Environment, File, FileFormat};

pub use db_storage_loader::{
    db_storage_config, has_db_storage_config, DB_STORAGE_PREFIX, DEFAULT_DOWNLOAD_CHUNK_BYTES,
    DEFAULT_DRIVER, DEFAULT_MAX_FILE_BYTES, DEFAULT_TABLE_NAME,
};

pub const ENV_PREFIX: &str = "BLOBVAULT";

/// Build the configuration source.
///
/// A missing file is not an error when `required` is false: the process may
/// be configured through the environment alone.
pub fn load_config_source(path: Option<&Path>, required: bool) -> anyhow::Result<Config> {
    let mut builder = Config::builder();

    if let Some(path) = path {
        builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(required));
    }

    builder
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .with_context(|| match path {
            Some(path) => format!("Failed to load configuration from {}", path.display()),
            None => "Failed to load configuration from environment".to_string(),
        })
}
