use bv_core::{DbStorageConfig, StorageError, StorageResult};
use config::{Config, ConfigError};

use crate::db::dialect::{dialect_for, validate_table_name};

/// Key prefix of the relational backend settings.
pub const DB_STORAGE_PREFIX: &str = "storage.dfs.db";

pub const DEFAULT_DRIVER: &str = "sqlite";
pub const DEFAULT_TABLE_NAME: &str = "blobvault_files";
pub const DEFAULT_MAX_FILE_BYTES: u64 = 64 * 1024 * 1024;
pub const DEFAULT_DOWNLOAD_CHUNK_BYTES: usize = 1024 * 1024;
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_CONNECTION_TIMEOUT_MS: u64 = 30_000;

fn key(name: &str) -> String {
    format!("{DB_STORAGE_PREFIX}.{name}")
}

/// The distinguishing setting: the backend is wanted iff a `url` key is
/// present and not blank. A `url` of the wrong type still counts, so that
/// building the backend reports it instead of silently skipping it.
pub fn has_db_storage_config(source: &Config) -> bool {
    match source.get_string(&key("url")) {
        Ok(url) => !url.trim().is_empty(),
        Err(ConfigError::NotFound(_)) => false,
        Err(_) => true,
    }
}

/// Resolve the relational backend settings.
///
/// Returns `Ok(None)` when no URL is configured. Present but invalid values
/// are configuration errors.
pub fn db_storage_config(source: &Config) -> StorageResult<Option<DbStorageConfig>> {
    let url = match opt_string(source, "url")? {
        Some(url) if !url.trim().is_empty() => url.trim().to_string(),
        _ => return Ok(None),
    };

    let driver = opt_string(source, "driver")?
        .filter(|d| !d.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_DRIVER.to_string());
    dialect_for(&driver)?;

    let table_name = opt_string(source, "table_name")?
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| DEFAULT_TABLE_NAME.to_string());
    validate_table_name(&table_name)?;

    let download_chunk_bytes = opt_u64(source, "download_chunk_bytes")?
        .map(|v| usize::try_from(v).unwrap_or(usize::MAX))
        .unwrap_or(DEFAULT_DOWNLOAD_CHUNK_BYTES);
    if download_chunk_bytes == 0 {
        return Err(StorageError::config(format!(
            "{} must be at least 1",
            key("download_chunk_bytes")
        )));
    }

    Ok(Some(DbStorageConfig {
        driver,
        url,
        username: opt_string(source, "username")?.unwrap_or_default(),
        password: opt_string(source, "password")?.unwrap_or_default(),
        auto_create_table: opt_bool(source, "auto_create_table")?.unwrap_or(false),
        table_name,
        max_file_bytes: opt_u64(source, "max_file_bytes")?.unwrap_or(DEFAULT_MAX_FILE_BYTES),
        download_chunk_bytes,
        atomic_overwrite: opt_bool(source, "atomic_overwrite")?.unwrap_or(false),
        busy_timeout_ms: opt_u64(source, "busy_timeout_ms")?.unwrap_or(DEFAULT_BUSY_TIMEOUT_MS),
        connection_timeout_ms: opt_u64(source, "connection_timeout_ms")?
            .unwrap_or(DEFAULT_CONNECTION_TIMEOUT_MS),
    }))
}

fn optional<T>(name: &str, result: Result<T, ConfigError>) -> StorageResult<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(ConfigError::NotFound(_)) => Ok(None),
        Err(e) => Err(StorageError::config(format!("{}: {e}", key(name)))),
    }
}

fn opt_string(source: &Config, name: &str) -> StorageResult<Option<String>> {
    optional(name, source.get_string(&key(name)))
}

fn opt_bool(source: &Config, name: &str) -> StorageResult<Option<bool>> {
    optional(name, source.get_bool(&key(name)))
}

fn opt_u64(source: &Config, name: &str) -> StorageResult<Option<u64>> {
    match optional(name, source.get_int(&key(name)))? {
        None => Ok(None),
        Some(v) => u64::try_from(v).map(Some).map_err(|_| {
            StorageError::config(format!("{} must not be negative, got {v}", key(name)))
        }),
    }
}
