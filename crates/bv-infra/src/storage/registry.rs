//! Backend selection.
//!
//! Every backend registers a provider. At startup the registry asks each
//! provider whether its distinguishing configuration is present, orders the
//! configured ones by priority (lower wins) and builds exactly one.

use std::sync::Arc;

use bv_core::{FileStoragePort, StorageError, StorageResult};
use config::Config;
use tracing::info;

use crate::config::{db_storage_config, has_db_storage_config};
use crate::storage::DieselFileStorage;
use crate::time::SystemClock;

/// Priority of the relational backend: a last resort behind any other
/// configured backend.
pub const DB_BACKEND_PRIORITY: i32 = i32::MAX - 4;

pub trait BackendProvider: Send + Sync {
    fn name(&self) -> &'static str;

    /// Lower values win when several backends are configured.
    fn priority(&self) -> i32;

    fn is_configured(&self, source: &Config) -> bool;

    fn build(&self, source: &Config) -> StorageResult<Arc<dyn FileStoragePort>>;
}

/// The single storage backend selected for this process.
///
/// Dropping it tears the backend down (for the relational backend: closes
/// the connection pool).
pub struct ActiveBackend {
    name: &'static str,
    storage: Arc<dyn FileStoragePort>,
}

impl ActiveBackend {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn storage(&self) -> Arc<dyn FileStoragePort> {
        Arc::clone(&self.storage)
    }

    pub fn shutdown(self) {
        info!(backend = self.name, "shutting down storage backend");
    }
}

#[derive(Default)]
pub struct BackendRegistry {
    providers: Vec<Box<dyn BackendProvider>>,
}

impl BackendRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every backend shipped in this crate.
    pub fn with_defaults() -> Self {
        Self::new().register(DbBackendProvider)
    }

    pub fn register(mut self, provider: impl BackendProvider + 'static) -> Self {
        self.providers.push(Box::new(provider));
        self
    }

    pub fn resolve(&self, source: &Config) -> StorageResult<ActiveBackend> {
        let mut candidates: Vec<&dyn BackendProvider> = self
            .providers
            .iter()
            .map(|p| &**p)
            .filter(|p| p.is_configured(source))
            .collect();
        candidates.sort_by_key(|p| p.priority());

        let Some((selected, shadowed)) = candidates.split_first() else {
            return Err(StorageError::config(
                "no storage backend is configured",
            ));
        };

        for other in shadowed {
            info!(
                backend = other.name(),
                active = selected.name(),
                "backend configured but shadowed by a higher priority backend"
            );
        }

        let storage = selected.build(source)?;
        info!(
            backend = selected.name(),
            priority = selected.priority(),
            "storage backend activated"
        );

        Ok(ActiveBackend {
            name: selected.name(),
            storage,
        })
    }
}

/// Provider of [`DieselFileStorage`], active when `storage.dfs.db.url` is set.
pub struct DbBackendProvider;

impl BackendProvider for DbBackendProvider {
    fn name(&self) -> &'static str {
        "database"
    }

    fn priority(&self) -> i32 {
        DB_BACKEND_PRIORITY
    }

    fn is_configured(&self, source: &Config) -> bool {
        has_db_storage_config(source)
    }

    fn build(&self, source: &Config) -> StorageResult<Arc<dyn FileStoragePort>> {
        let config = db_storage_config(source)?
            .ok_or_else(|| StorageError::config("storage.dfs.db.url is not set"))?;
        let storage = DieselFileStorage::connect(&config, SystemClock)?;
        Ok(Arc::new(storage))
    }
}
