use std::fmt;

/// Settings of the relational file storage backend.
#[derive(Clone, PartialEq, Eq)]
pub struct DbStorageConfig {
    /// Backend driver identifier, selects the SQL dialect.
    pub driver: String,
    /// Connection URL. Its presence is what activates the backend.
    pub url: String,
    pub username: String,
    pub password: String,
    /// Provision the backing table at startup when it is missing.
    pub auto_create_table: bool,
    pub table_name: String,
    /// Files above this size are refused by `store`.
    pub max_file_bytes: u64,
    /// Slice size used when writing a stored payload to disk.
    pub download_chunk_bytes: usize,
    /// Run the delete and the insert of an overwrite in one transaction.
    pub atomic_overwrite: bool,
    pub busy_timeout_ms: u64,
    pub connection_timeout_ms: u64,
}

impl fmt::Debug for DbStorageConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbStorageConfig")
            .field("driver", &self.driver)
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("auto_create_table", &self.auto_create_table)
            .field("table_name", &self.table_name)
            .field("max_file_bytes", &self.max_file_bytes)
            .field("download_chunk_bytes", &self.download_chunk_bytes)
            .field("atomic_overwrite", &self.atomic_overwrite)
            .field("busy_timeout_ms", &self.busy_timeout_ms)
            .field("connection_timeout_ms", &self.connection_timeout_ms)
            .finish()
    }
}
