//! Locating and loading the process configuration.

use std::path::{Path, PathBuf};

use anyhow::Context;
use bv_infra::config::load_config_source;
use config::{Config, ConfigError};

const APP_DIR: &str = "blobvault";
const CONFIG_FILE: &str = "config.toml";

/// Settings consumed by the binary itself, outside any storage backend.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Directory of the log file. Logs go to stderr only when unset.
    pub dir: Option<PathBuf>,
}

/// `<config dir>/blobvault/config.toml`, when the platform has a config dir.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
}

/// Load the configuration source.
///
/// An explicitly given file must exist; the default file is optional so the
/// process can be configured through the environment alone.
pub fn load_config(explicit: Option<&Path>) -> anyhow::Result<Config> {
    match explicit {
        Some(path) => load_config_source(Some(path), true),
        None => load_config_source(default_config_path().as_deref(), false),
    }
}

pub fn logging_config(source: &Config) -> anyhow::Result<LoggingConfig> {
    let dir = match source.get_string("logging.dir") {
        Ok(dir) if !dir.trim().is_empty() => Some(PathBuf::from(dir.trim())),
        Ok(_) | Err(ConfigError::NotFound(_)) => None,
        Err(e) => return Err(e).context("Invalid logging.dir"),
    };
    Ok(LoggingConfig { dir })
}
