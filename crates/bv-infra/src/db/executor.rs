use std::sync::Arc;

use bv_core::{StorageError, StorageResult};
use diesel::SqliteConnection;

use crate::db::pool::DbPool;
use crate::db::ports::DbExecutor;

#[derive(Clone)]
pub struct DieselSqliteExecutor {
    pool: Arc<DbPool>,
}

impl DieselSqliteExecutor {
    pub fn new(pool: DbPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }
}

impl DbExecutor for DieselSqliteExecutor {
    fn run<T>(
        &self,
        f: impl FnOnce(&mut SqliteConnection) -> StorageResult<T>,
    ) -> StorageResult<T> {
        let mut conn = self.pool.get().map_err(StorageError::connectivity)?;
        f(&mut conn)
    }
}
