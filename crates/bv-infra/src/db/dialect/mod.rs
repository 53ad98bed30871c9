//! SQL statement templates per backend dialect.
//!
//! Every template takes the table name at call time. Values are always bound
//! as parameters; the only interpolated text is the table name, which must
//! pass [`validate_table_name`] first.
//!
//! Bind order of the parameterized templates:
//!
//! | template | binds |
//! |----------|-------|
//! | `table_exists` | table name |
//! | `insert` | bucket, name, version, meta, length, status, data, extra, gmt_create, gmt_modified |
//! | `delete_by_location` | bucket, name |
//! | `delete_expired` | bucket, cutoff (epoch ms) |
//! | `select_blob_head` | bucket, name |
//! | `select_blob_chunk` | offset (1-based), chunk length, id |
//! | `select_meta` | bucket, name |

mod sqlite;

use bv_core::{StorageError, StorageResult};

pub use sqlite::SqliteDialect;

pub const DRIVER_SQLITE: &str = "sqlite";

pub trait SqlDialect: Send + Sync {
    fn name(&self) -> &'static str;

    /// Query returning a single `cnt` column: number of tables whose name
    /// matches the bound name, ignoring case.
    fn table_exists(&self) -> String;

    /// Conditional DDL creating the table, its id generator and indexes.
    /// Safe to run when the table already exists.
    fn create_table_script(&self, table: &str) -> String;

    fn insert(&self, table: &str) -> String;

    fn delete_by_location(&self, table: &str) -> String;

    fn delete_expired(&self, table: &str) -> String;

    /// `id` and `length` of the newest record at a location.
    fn select_blob_head(&self, table: &str) -> String;

    /// One `chunk` column holding a slice of the payload of record `id`.
    fn select_blob_chunk(&self, table: &str) -> String;

    /// Every column except the payload, newest record first.
    fn select_meta(&self, table: &str) -> String;
}

/// Resolve the dialect for a configured driver identifier.
pub fn dialect_for(driver: &str) -> StorageResult<Box<dyn SqlDialect>> {
    match driver.trim().to_ascii_lowercase().as_str() {
        DRIVER_SQLITE | "sqlite3" => Ok(Box::new(SqliteDialect)),
        other => Err(StorageError::config(format!(
            "unsupported database driver `{other}`"
        ))),
    }
}

/// Table names are interpolated into SQL, so only plain identifiers pass.
pub fn validate_table_name(table: &str) -> StorageResult<()> {
    let mut chars = table.chars();
    let valid_start = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    let valid_rest = chars.all(|c| c.is_ascii_alphanumeric() || c == '_');

    if valid_start && valid_rest && table.len() <= 64 {
        Ok(())
    } else {
        Err(StorageError::config(format!(
            "invalid table name `{table}`: expected [A-Za-z_][A-Za-z0-9_]*"
        )))
    }
}
