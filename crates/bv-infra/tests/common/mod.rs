//! Shared fixtures for the database backend tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use bv_core::{ClockPort, DbStorageConfig, StorageResult};
use bv_infra::db::dialect::SqliteDialect;
use bv_infra::db::models::CountRow;
use bv_infra::db::pool::init_db_pool;
use bv_infra::db::ports::DbExecutor;
use bv_infra::db::DieselSqliteExecutor;
use bv_infra::storage::DriverOptions;
use bv_infra::DieselFileStorage;
use diesel::connection::{Instrumentation, InstrumentationEvent, SimpleConnection};
use diesel::sql_types::Text;
use diesel::{Connection, RunQueryDsl, SqliteConnection};
use tempfile::TempDir;

/// 2025-10-09 08:53:20 UTC
pub const NOW_MS: i64 = 1_760_000_000_000;
pub const DAY_MS: i64 = 24 * 60 * 60 * 1000;
pub const TABLE: &str = "blobvault_files";

/// Clock the test moves by hand.
#[derive(Debug)]
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    pub fn at(now_ms: i64) -> Arc<Self> {
        Arc::new(Self {
            now: AtomicI64::new(now_ms),
        })
    }

    pub fn set(&self, now_ms: i64) {
        self.now.store(now_ms, Ordering::SeqCst);
    }
}

impl ClockPort for ManualClock {
    fn now_ms(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// A database file inside a fresh temporary directory.
pub struct TestDb {
    pub dir: TempDir,
}

impl TestDb {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("Failed to create temp dir"),
        }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub fn config(&self) -> DbStorageConfig {
        DbStorageConfig {
            driver: "sqlite".into(),
            url: self.path("files.db").to_string_lossy().into_owned(),
            username: String::new(),
            password: String::new(),
            auto_create_table: true,
            table_name: TABLE.into(),
            max_file_bytes: 1024 * 1024,
            download_chunk_bytes: 4096,
            atomic_overwrite: false,
            busy_timeout_ms: 5_000,
            connection_timeout_ms: 5_000,
        }
    }

    pub fn executor(&self) -> DieselSqliteExecutor {
        DieselSqliteExecutor::new(init_db_pool(&self.config()).expect("Failed to create test DB pool"))
    }

    pub fn write_file(&self, name: &str, content: &[u8]) -> PathBuf {
        let path = self.path(name);
        std::fs::write(&path, content).expect("Failed to write source file");
        path
    }
}

/// Storage over a provisioned table with the given driver options.
pub fn storage_with<E: DbExecutor>(
    executor: E,
    clock: Arc<ManualClock>,
    options: DriverOptions,
) -> DieselFileStorage<E, Arc<ManualClock>> {
    let storage = DieselFileStorage::new(executor, clock, Box::new(SqliteDialect), TABLE, options)
        .expect("Failed to create storage");
    storage.ensure_schema().expect("Failed to provision table");
    storage
}

pub fn default_options() -> DriverOptions {
    DriverOptions {
        max_file_bytes: 1024 * 1024,
        download_chunk_bytes: 4096,
        atomic_overwrite: false,
    }
}

/// Number of rows stored at a location, regardless of status.
pub fn count_rows<E: DbExecutor>(executor: &E, bucket: &str, name: &str) -> i64 {
    executor
        .run(|conn| {
            let row = diesel::sql_query(format!(
                "SELECT COUNT(1) AS cnt FROM {TABLE} WHERE bucket = ? AND name = ?"
            ))
            .bind::<Text, _>(bucket)
            .bind::<Text, _>(name)
            .get_result::<CountRow>(conn)
            .map_err(bv_core::StorageError::database)?;
            Ok(row.cnt)
        })
        .expect("Failed to count rows")
}

/// Run raw SQL (DDL, triggers) against the test database.
pub fn exec_sql<E: DbExecutor>(executor: &E, sql: &str) {
    executor
        .run(|conn| {
            conn.batch_execute(sql)
                .map_err(bv_core::StorageError::database)
        })
        .expect("Failed to execute SQL");
}

/// Makes every DELETE on the files table fail.
pub fn block_deletes<E: DbExecutor>(executor: &E) {
    exec_sql(
        executor,
        &format!(
            "CREATE TRIGGER block_deletes BEFORE DELETE ON {TABLE} \
             BEGIN SELECT RAISE(ABORT, 'deletes are blocked'); END;"
        ),
    );
}

pub fn table_is_present(conn: &mut SqliteConnection, table: &str) -> bool {
    diesel::sql_query("SELECT COUNT(1) AS cnt FROM sqlite_master WHERE type = 'table' AND name = ?")
        .bind::<Text, _>(table)
        .get_result::<CountRow>(conn)
        .map(|row| row.cnt > 0)
        .unwrap_or(false)
}

/// Executor that records every statement sent through it.
#[derive(Clone)]
pub struct RecordingExecutor {
    inner: DieselSqliteExecutor,
    statements: Arc<Mutex<Vec<String>>>,
}

impl RecordingExecutor {
    pub fn new(inner: DieselSqliteExecutor) -> Self {
        Self {
            inner,
            statements: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.statements.lock().unwrap())
    }
}

impl DbExecutor for RecordingExecutor {
    fn run<T>(
        &self,
        f: impl FnOnce(&mut SqliteConnection) -> StorageResult<T>,
    ) -> StorageResult<T> {
        let statements = Arc::clone(&self.statements);
        self.inner.run(|conn| {
            conn.set_instrumentation(StatementRecorder(statements));
            f(conn)
        })
    }
}

struct StatementRecorder(Arc<Mutex<Vec<String>>>);

impl Instrumentation for StatementRecorder {
    fn on_connection_event(&mut self, event: InstrumentationEvent<'_>) {
        if let InstrumentationEvent::StartQuery { query, .. } = event {
            self.0.lock().unwrap().push(query.to_string());
        }
    }
}

pub fn read(path: &Path) -> Vec<u8> {
    std::fs::read(path).expect("Failed to read file")
}
