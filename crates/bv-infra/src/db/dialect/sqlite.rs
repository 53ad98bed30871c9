use super::{SqlDialect, DRIVER_SQLITE};

/// SQLite templates.
///
/// `INTEGER PRIMARY KEY AUTOINCREMENT` gives the monotonic, never reused id;
/// `IF NOT EXISTS` makes the creation script idempotent. Timestamps are
/// stored as epoch milliseconds.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteDialect;

impl SqlDialect for SqliteDialect {
    fn name(&self) -> &'static str {
        DRIVER_SQLITE
    }

    fn table_exists(&self) -> String {
        "SELECT COUNT(1) AS cnt FROM sqlite_master WHERE type = 'table' AND lower(name) = lower(?)"
            .to_string()
    }

    fn create_table_script(&self, table: &str) -> String {
        format!(
            "CREATE TABLE IF NOT EXISTS {table} (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                bucket VARCHAR(255) NOT NULL,
                name VARCHAR(255) NOT NULL,
                version VARCHAR(255) NOT NULL,
                meta TEXT,
                length BIGINT NOT NULL,
                status INTEGER NOT NULL,
                data BLOB NOT NULL,
                extra VARCHAR(255),
                gmt_create BIGINT NOT NULL,
                gmt_modified BIGINT
            );
            CREATE INDEX IF NOT EXISTS idx_{table}_location ON {table} (bucket, name);
            CREATE INDEX IF NOT EXISTS idx_{table}_gmt_modified ON {table} (gmt_modified);"
        )
    }

    fn insert(&self, table: &str) -> String {
        format!(
            "INSERT INTO {table} (bucket, name, version, meta, length, status, data, extra, gmt_create, gmt_modified) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
        )
    }

    fn delete_by_location(&self, table: &str) -> String {
        format!("DELETE FROM {table} WHERE bucket = ? AND name = ?")
    }

    fn delete_expired(&self, table: &str) -> String {
        format!("DELETE FROM {table} WHERE bucket = ? AND gmt_modified < ?")
    }

    fn select_blob_head(&self, table: &str) -> String {
        format!(
            "SELECT id, length FROM {table} WHERE bucket = ? AND name = ? ORDER BY id DESC LIMIT 1"
        )
    }

    fn select_blob_chunk(&self, table: &str) -> String {
        format!("SELECT substr(data, ?, ?) AS chunk FROM {table} WHERE id = ?")
    }

    fn select_meta(&self, table: &str) -> String {
        format!(
            "SELECT bucket, name, version, meta, length, status, extra, gmt_create, gmt_modified \
             FROM {table} WHERE bucket = ? AND name = ? ORDER BY id DESC LIMIT 1"
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = "files_t";

    fn bind_count(sql: &str) -> usize {
        sql.matches('?').count()
    }

    #[test]
    fn templates_are_bound_to_the_table_name() {
        let d = SqliteDialect;
        for sql in [
            d.insert(TABLE),
            d.delete_by_location(TABLE),
            d.delete_expired(TABLE),
            d.select_blob_head(TABLE),
            d.select_blob_chunk(TABLE),
            d.select_meta(TABLE),
        ] {
            assert!(sql.contains(TABLE), "{sql}");
        }
    }

    #[test]
    fn bind_counts_match_documented_order() {
        let d = SqliteDialect;
        assert_eq!(bind_count(&d.table_exists()), 1);
        assert_eq!(bind_count(&d.insert(TABLE)), 10);
        assert_eq!(bind_count(&d.delete_by_location(TABLE)), 2);
        assert_eq!(bind_count(&d.delete_expired(TABLE)), 2);
        assert_eq!(bind_count(&d.select_blob_head(TABLE)), 2);
        assert_eq!(bind_count(&d.select_blob_chunk(TABLE)), 3);
        assert_eq!(bind_count(&d.select_meta(TABLE)), 2);
    }

    #[test]
    fn meta_query_never_selects_the_payload() {
        let sql = SqliteDialect.select_meta(TABLE);
        let columns = sql
            .split_once("FROM")
            .map(|(select, _)| select)
            .unwrap_or_default();
        assert!(!columns.split([',', ' ']).any(|c| c.trim() == "data"));
        assert!(!columns.contains('*'));
    }

    #[test]
    fn create_script_is_conditional() {
        let script = SqliteDialect.create_table_script(TABLE);
        assert!(script.contains("CREATE TABLE IF NOT EXISTS files_t"));
        assert!(script.contains("AUTOINCREMENT"));
        assert!(!script.to_uppercase().contains("UNIQUE"));
    }
}
