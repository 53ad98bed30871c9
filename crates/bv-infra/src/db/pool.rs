use std::time::Duration;

use bv_core::{DbStorageConfig, StorageError, StorageResult};
use diesel::connection::SimpleConnection;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool};
use diesel::sqlite::SqliteConnection;
use tracing::{debug, info};

/// Type alias for the SQLite connection pool
pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;

/// Idle connections kept open by the pool.
pub const MIN_IDLE_CONNECTIONS: u32 = 2;

/// Upper bound on concurrently checked-out connections.
pub const MAX_POOL_SIZE: u32 = 32;

/// Pragmas applied to every connection the pool opens.
#[derive(Debug, Clone, Copy)]
struct SqliteConnectionCustomizer {
    busy_timeout_ms: u64,
}

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for SqliteConnectionCustomizer {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), diesel::r2d2::Error> {
        conn.batch_execute(&format!(
            "PRAGMA busy_timeout = {}; PRAGMA journal_mode = WAL;",
            self.busy_timeout_ms
        ))
        .map_err(diesel::r2d2::Error::QueryError)
    }
}

/// Create the database connection pool.
///
/// This function should be called **once at backend initialization**. The
/// pool is built eagerly: if the minimum number of idle connections cannot be
/// opened within the connection timeout, initialization fails.
///
/// Connections run in auto-commit mode; statements are only grouped when a
/// caller opens an explicit transaction.
pub fn init_db_pool(config: &DbStorageConfig) -> StorageResult<DbPool> {
    let database_url = normalize_sqlite_url(&config.url)?;

    info!(
        driver = %config.driver,
        url = %database_url,
        min_idle = MIN_IDLE_CONNECTIONS,
        max_size = MAX_POOL_SIZE,
        "init datasource"
    );
    if !config.username.is_empty() || !config.password.is_empty() {
        debug!("sqlite has no authentication, ignoring configured credentials");
    }

    let manager = ConnectionManager::<SqliteConnection>::new(database_url);

    Pool::builder()
        .min_idle(Some(MIN_IDLE_CONNECTIONS))
        .max_size(MAX_POOL_SIZE)
        .connection_timeout(Duration::from_millis(config.connection_timeout_ms))
        .connection_customizer(Box::new(SqliteConnectionCustomizer {
            busy_timeout_ms: config.busy_timeout_ms,
        }))
        .build(manager)
        .map_err(StorageError::connectivity)
}

/// Turns a configured URL into something `SqliteConnection::establish`
/// accepts. `sqlite://` prefixes are stripped; `file:` URIs pass through.
pub fn normalize_sqlite_url(url: &str) -> StorageResult<String> {
    let trimmed = url.trim();
    let path = trimmed
        .strip_prefix("sqlite://")
        .or_else(|| trimmed.strip_prefix("sqlite:"))
        .unwrap_or(trimmed);

    if path.is_empty() {
        return Err(StorageError::config("database url is empty"));
    }
    if path == ":memory:" || path.contains("mode=memory") {
        return Err(StorageError::config(
            "in-memory databases are not shared between pooled connections",
        ));
    }

    Ok(path.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_sqlite_scheme() {
        assert_eq!(
            normalize_sqlite_url("sqlite:///var/lib/bv/files.db").unwrap(),
            "/var/lib/bv/files.db"
        );
        assert_eq!(
            normalize_sqlite_url("sqlite:files.db").unwrap(),
            "files.db"
        );
    }

    #[test]
    fn keeps_plain_paths_and_file_uris() {
        assert_eq!(normalize_sqlite_url(" data/files.db ").unwrap(), "data/files.db");
        assert_eq!(
            normalize_sqlite_url("file:files.db?cache=shared").unwrap(),
            "file:files.db?cache=shared"
        );
    }

    #[test]
    fn rejects_empty_and_in_memory_urls() {
        assert!(matches!(
            normalize_sqlite_url("sqlite://"),
            Err(StorageError::Config(_))
        ));
        assert!(matches!(
            normalize_sqlite_url(":memory:"),
            Err(StorageError::Config(_))
        ));
        assert!(matches!(
            normalize_sqlite_url("file:db?mode=memory&cache=shared"),
            Err(StorageError::Config(_))
        ));
    }
}
