use bv_core::StorageResult;
use diesel::SqliteConnection;

/// Runs one unit of database work on a pooled connection.
///
/// The connection is acquired before `f` runs and returned to the pool when
/// `run` returns, on success and on error alike. Implementations must not
/// hand the same connection to two callers at once.
pub trait DbExecutor: Send + Sync {
    fn run<T>(
        &self,
        f: impl FnOnce(&mut SqliteConnection) -> StorageResult<T>,
    ) -> StorageResult<T>;
}
