//! Relational database file storage backend.
//!
//! Files live as rows of a single table, payload in a BLOB column. An
//! overwrite is a delete followed by an insert, never an in-place update.
//!
//! Relational databases are a poor fit for large-scale file storage; this
//! backend targets small deployments. Prefer the backend's own retention
//! jobs over [`FileStoragePort::clean_expired`] when they are available.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use bv_core::{
    ClockPort, DbStorageConfig, DownloadRequest, FileLocation, FileMeta, FileStoragePort, MetaInfo,
    StorageError, StorageResult, StoreRequest,
};
use diesel::sql_types::{BigInt, Binary, Integer, Nullable, Text};
use diesel::{Connection, OptionalExtension, RunQueryDsl, SqliteConnection};
use tracing::{debug, error, info, warn};

use crate::db::dialect::{dialect_for, validate_table_name, SqlDialect};
use crate::db::mappers::FileMetaRowMapper;
use crate::db::models::{
    BlobChunkRow, BlobHeadRow, FileMetaRow, NewStoredFileRow, FILE_VERSION, STATUS_ENABLED,
};
use crate::db::pool::init_db_pool;
use crate::db::ports::{DbExecutor, RowMapper};
use crate::db::provisioner::{ProvisionOutcome, SchemaProvisioner};
use crate::db::DieselSqliteExecutor;
use crate::host::origin_host;

const MS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Driver knobs taken from [`DbStorageConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverOptions {
    pub max_file_bytes: u64,
    pub download_chunk_bytes: usize,
    pub atomic_overwrite: bool,
}

impl From<&DbStorageConfig> for DriverOptions {
    fn from(config: &DbStorageConfig) -> Self {
        Self {
            max_file_bytes: config.max_file_bytes,
            download_chunk_bytes: config.download_chunk_bytes.max(1),
            atomic_overwrite: config.atomic_overwrite,
        }
    }
}

pub struct DieselFileStorage<E, C> {
    executor: E,
    clock: C,
    dialect: Box<dyn SqlDialect>,
    table: String,
    options: DriverOptions,
    origin_host: String,
    meta_mapper: FileMetaRowMapper,
}

impl<C: ClockPort> DieselFileStorage<DieselSqliteExecutor, C> {
    /// Build the pool, provision the schema when `auto_create_table` is set,
    /// and return a ready driver. Any failure here is fatal to the backend.
    pub fn connect(config: &DbStorageConfig, clock: C) -> StorageResult<Self> {
        let dialect = dialect_for(&config.driver)?;
        validate_table_name(&config.table_name)?;

        let executor = DieselSqliteExecutor::new(init_db_pool(config)?);
        let storage = Self::new(
            executor,
            clock,
            dialect,
            config.table_name.clone(),
            DriverOptions::from(config),
        )?;

        if config.auto_create_table {
            storage.ensure_schema()?;
        }

        info!(
            table = %storage.table,
            dialect = storage.dialect.name(),
            "db file storage initialized, this will be the storage layer"
        );
        Ok(storage)
    }
}

impl<E: DbExecutor, C: ClockPort> DieselFileStorage<E, C> {
    pub fn new(
        executor: E,
        clock: C,
        dialect: Box<dyn SqlDialect>,
        table: impl Into<String>,
        options: DriverOptions,
    ) -> StorageResult<Self> {
        let table = table.into();
        validate_table_name(&table)?;

        Ok(Self {
            executor,
            clock,
            dialect,
            table,
            options,
            origin_host: origin_host(),
            meta_mapper: FileMetaRowMapper,
        })
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Create the backing table if it is missing, regardless of the
    /// auto-create setting.
    pub fn ensure_schema(&self) -> StorageResult<ProvisionOutcome> {
        SchemaProvisioner::new(self.dialect.as_ref()).ensure_table(&self.executor, &self.table)
    }

    /// Removes every record at `location`.
    ///
    /// Failures are logged and swallowed: a failed pre-delete must not block
    /// the insert that follows it. When the insert then succeeds, a stale
    /// duplicate stays behind until the next overwrite.
    fn delete_by_location(&self, location: &FileLocation) {
        let result = self
            .executor
            .run(|conn| self.execute_delete_by_location(conn, location).map_err(StorageError::database));

        match result {
            Ok(deleted) => debug!(%location, deleted, "deleted previous records"),
            Err(e) => error!(%location, error = %e, "delete by location failed"),
        }
    }

    fn execute_delete_by_location(
        &self,
        conn: &mut SqliteConnection,
        location: &FileLocation,
    ) -> Result<usize, diesel::result::Error> {
        diesel::sql_query(self.dialect.delete_by_location(&self.table))
            .bind::<Text, _>(location.bucket.as_str())
            .bind::<Text, _>(location.name.as_str())
            .execute(conn)
    }

    fn execute_insert(
        &self,
        conn: &mut SqliteConnection,
        row: &NewStoredFileRow,
    ) -> Result<usize, diesel::result::Error> {
        diesel::sql_query(self.dialect.insert(&self.table))
            .bind::<Text, _>(row.bucket.as_str())
            .bind::<Text, _>(row.name.as_str())
            .bind::<Text, _>(row.version.as_str())
            .bind::<Text, _>(row.meta.as_str())
            .bind::<BigInt, _>(row.length)
            .bind::<Integer, _>(row.status)
            .bind::<Binary, _>(row.data.as_slice())
            .bind::<Nullable<Text>, _>(row.extra.as_deref())
            .bind::<BigInt, _>(row.gmt_create)
            .bind::<BigInt, _>(row.gmt_modified)
            .execute(conn)
    }

    fn build_row(&self, request: &StoreRequest) -> StorageResult<NewStoredFileRow> {
        let data = read_payload(&request.local_file, self.options.max_file_bytes)?;

        let origin_path = fs::canonicalize(&request.local_file)
            .unwrap_or_else(|_| request.local_file.clone());
        let meta = MetaInfo::origin(
            self.origin_host.clone(),
            origin_path.to_string_lossy().into_owned(),
        );

        let now = self.clock.now_ms();
        Ok(NewStoredFileRow {
            bucket: request.location.bucket.clone(),
            name: request.location.name.clone(),
            version: FILE_VERSION.to_string(),
            meta: meta.encode()?,
            length: data.len() as i64,
            status: STATUS_ENABLED,
            data,
            extra: None,
            gmt_create: now,
            gmt_modified: now,
        })
    }

    fn store_row(&self, location: &FileLocation, row: &NewStoredFileRow) -> StorageResult<()> {
        if self.options.atomic_overwrite {
            return self.executor.run(|conn| {
                conn.immediate_transaction::<_, TxError, _>(|conn| {
                    self.execute_delete_by_location(conn, location)?;
                    self.execute_insert(conn, row)?;
                    Ok(())
                })
                .map_err(StorageError::from)
            });
        }

        self.delete_by_location(location);
        self.executor.run(|conn| {
            self.execute_insert(conn, row)
                .map(|_| ())
                .map_err(StorageError::database)
        })
    }

    /// Newest record at the location, streamed to `target` slice by slice
    /// inside one read transaction. Returns `false` when nothing is stored.
    fn fetch_to(&self, location: &FileLocation, target: &Path) -> StorageResult<bool> {
        self.executor.run(|conn| {
            conn.transaction::<_, TxError, _>(|conn| {
                let head = diesel::sql_query(self.dialect.select_blob_head(&self.table))
                    .bind::<Text, _>(location.bucket.as_str())
                    .bind::<Text, _>(location.name.as_str())
                    .get_result::<BlobHeadRow>(conn)
                    .optional()?;

                match head {
                    Some(head) => {
                        self.write_blob(conn, &head, target)?;
                        Ok(true)
                    }
                    None => Ok(false),
                }
            })
            .map_err(StorageError::from)
        })
    }

    fn write_blob(
        &self,
        conn: &mut SqliteConnection,
        head: &BlobHeadRow,
        target: &Path,
    ) -> Result<(), TxError> {
        let file = File::create(target).map_err(|e| StorageError::io(target, e))?;
        let mut writer = BufWriter::new(file);
        let chunk_len = i64::try_from(self.options.download_chunk_bytes.max(1)).unwrap_or(i64::MAX);
        let sql = self.dialect.select_blob_chunk(&self.table);

        let mut written: i64 = 0;
        while written < head.length {
            let row = diesel::sql_query(&sql)
                .bind::<BigInt, _>(written + 1)
                .bind::<BigInt, _>(chunk_len)
                .bind::<BigInt, _>(head.id)
                .get_result::<BlobChunkRow>(conn)?;

            if row.chunk.is_empty() {
                return Err(StorageError::database(format!(
                    "blob {} ended after {written} of {} bytes",
                    head.id, head.length
                ))
                .into());
            }

            writer
                .write_all(&row.chunk)
                .map_err(|e| StorageError::io(target, e))?;
            written += row.chunk.len() as i64;
        }

        writer.flush().map_err(|e| StorageError::io(target, e))?;
        Ok(())
    }
}

impl<E: DbExecutor, C: ClockPort> FileStoragePort for DieselFileStorage<E, C> {
    fn store(&self, request: &StoreRequest) -> StorageResult<()> {
        let started = Instant::now();
        let location = &request.location;

        // The source is read before the old record goes away, so an
        // unreadable or oversized file leaves the previous content intact.
        let result = self
            .build_row(request)
            .and_then(|row| self.store_row(location, &row).map(|()| row.length));

        match &result {
            Ok(length) => info!(
                %location,
                length,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "store file successfully"
            ),
            Err(e) => error!(
                %location,
                local_file = %request.local_file.display(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                error = %e,
                "store file failed"
            ),
        }
        result.map(|_| ())
    }

    fn download(&self, request: &DownloadRequest) -> StorageResult<()> {
        let started = Instant::now();
        let location = &request.location;

        let result = ensure_parent_dir(&request.target)
            .and_then(|()| self.fetch_to(location, &request.target));

        match result {
            Ok(true) => {
                info!(
                    %location,
                    target = %request.target.display(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "download file successfully"
                );
                Ok(())
            }
            Ok(false) => {
                warn!(%location, "download skipped, file does not exist");
                Ok(())
            }
            Err(e) => {
                error!(
                    %location,
                    target = %request.target.display(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    error = %e,
                    "download file failed"
                );
                Err(e)
            }
        }
    }

    fn fetch_meta(&self, location: &FileLocation) -> StorageResult<Option<FileMeta>> {
        let result = self
            .executor
            .run(|conn| {
                diesel::sql_query(self.dialect.select_meta(&self.table))
                    .bind::<Text, _>(location.bucket.as_str())
                    .bind::<Text, _>(location.name.as_str())
                    .get_result::<FileMetaRow>(conn)
                    .optional()
                    .map_err(StorageError::database)
            })
            .and_then(|row| row.map(|row| self.meta_mapper.to_domain(&row)).transpose());

        if let Err(e) = &result {
            error!(%location, error = %e, "fetch file meta failed");
        }
        result
    }

    fn clean_expired(&self, bucket: &str, retention_days: u32) {
        let started = Instant::now();
        let cutoff = self.clock.now_ms() - i64::from(retention_days) * MS_PER_DAY;
        info!(
            bucket,
            retention_days,
            cutoff = %format_ms(cutoff),
            "start to clean expired files"
        );

        let result = self.executor.run(|conn| {
            diesel::sql_query(self.dialect.delete_expired(&self.table))
                .bind::<Text, _>(bucket)
                .bind::<BigInt, _>(cutoff)
                .execute(conn)
                .map_err(StorageError::database)
        });

        match result {
            Ok(deleted) => info!(
                bucket,
                deleted,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "clean expired files finished"
            ),
            Err(e) => error!(bucket, error = %e, "clean expired files failed"),
        }
    }
}

/// Error type of the driver's explicit transactions.
#[derive(Debug)]
enum TxError {
    Db(diesel::result::Error),
    Storage(StorageError),
}

impl From<diesel::result::Error> for TxError {
    fn from(e: diesel::result::Error) -> Self {
        Self::Db(e)
    }
}

impl From<StorageError> for TxError {
    fn from(e: StorageError) -> Self {
        Self::Storage(e)
    }
}

impl From<TxError> for StorageError {
    fn from(e: TxError) -> Self {
        match e {
            TxError::Db(e) => StorageError::database(e),
            TxError::Storage(e) => e,
        }
    }
}

/// Reads the whole source file through a buffered reader.
///
/// The size is checked before anything is buffered, and the read is capped
/// so a file growing underneath cannot exceed the limit either.
fn read_payload(path: &Path, limit: u64) -> StorageResult<Vec<u8>> {
    let size = fs::metadata(path)
        .map_err(|e| StorageError::io(path, e))?
        .len();
    if size > limit {
        return Err(StorageError::FileTooLarge {
            path: path.to_path_buf(),
            size,
            limit,
        });
    }

    let file = File::open(path).map_err(|e| StorageError::io(path, e))?;
    let mut data = Vec::with_capacity(size as usize);
    BufReader::new(file)
        .take(limit + 1)
        .read_to_end(&mut data)
        .map_err(|e| StorageError::io(path, e))?;

    if data.len() as u64 > limit {
        return Err(StorageError::FileTooLarge {
            path: path.to_path_buf(),
            size: data.len() as u64,
            limit,
        });
    }
    Ok(data)
}

fn ensure_parent_dir(target: &Path) -> StorageResult<()> {
    match target.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => {
            fs::create_dir_all(dir).map_err(|e| StorageError::io(PathBuf::from(dir), e))
        }
        _ => Ok(()),
    }
}

fn format_ms(ms: i64) -> String {
    chrono::DateTime::from_timestamp_millis(ms)
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| ms.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;
    use tempfile::NamedTempFile;

    #[test]
    fn read_payload_refuses_files_over_limit() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(&[7u8; 32]).unwrap();

        let err = read_payload(file.path(), 16).unwrap_err();
        assert!(matches!(
            err,
            StorageError::FileTooLarge { size: 32, limit: 16, .. }
        ));
    }

    #[test]
    fn read_payload_returns_exact_bytes() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"a,b,c\n1,2,3").unwrap();

        assert_eq!(read_payload(file.path(), 1024).unwrap(), b"a,b,c\n1,2,3");
    }

    #[test]
    fn read_payload_reports_missing_source() {
        let err = read_payload(Path::new("/definitely/not/here.bin"), 1024).unwrap_err();
        assert!(matches!(err, StorageError::Io { .. }));
    }

    #[test]
    fn ensure_parent_dir_creates_nested_directories() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("a/b/c/out.bin");

        ensure_parent_dir(&target).unwrap();
        assert!(dir.path().join("a/b/c").is_dir());
        assert!(ensure_parent_dir(Path::new("relative.bin")).is_ok());
    }

    #[test]
    fn chunk_size_is_at_least_one_byte() {
        let config = DbStorageConfig {
            driver: "sqlite".into(),
            url: "files.db".into(),
            username: String::new(),
            password: String::new(),
            auto_create_table: false,
            table_name: "blobvault_files".into(),
            max_file_bytes: 10,
            download_chunk_bytes: 0,
            atomic_overwrite: true,
            busy_timeout_ms: 1,
            connection_timeout_ms: 1,
        };
        let options = DriverOptions::from(&config);
        assert_eq!(options.download_chunk_bytes, 1);
        assert!(options.atomic_overwrite);
    }
}
