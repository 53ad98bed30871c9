//! Assembly of the storage backend from configuration.
//!
//! The only place that knows about concrete backends. Everything after this
//! talks to [`bv_core::FileStoragePort`].

use anyhow::Context;
use bv_core::StorageError;
use bv_infra::config::db_storage_config;
use bv_infra::db::DieselSqliteExecutor;
use bv_infra::{ActiveBackend, BackendRegistry, DieselFileStorage, SystemClock};
use config::Config;

pub type DbStorage = DieselFileStorage<DieselSqliteExecutor, SystemClock>;

/// Select and build the single active backend.
pub fn build_backend(source: &Config) -> anyhow::Result<ActiveBackend> {
    BackendRegistry::with_defaults()
        .resolve(source)
        .context("Failed to initialize storage backend")
}

/// Connect the database backend directly, without provisioning, for
/// administrative commands that manage its schema.
pub fn connect_db_storage(source: &Config) -> anyhow::Result<DbStorage> {
    let mut config = db_storage_config(source)?
        .ok_or_else(|| StorageError::config("storage.dfs.db.url is not set"))?;
    config.auto_create_table = false;

    DieselFileStorage::connect(&config, SystemClock).context("Failed to connect database backend")
}
