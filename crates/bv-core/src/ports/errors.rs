use std::path::PathBuf;
use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub type StorageResult<T> = Result<T, StorageError>;

#[derive(Debug, Error)]
pub enum StorageError {
    /// Missing or invalid backend settings. Fatal at initialization.
    #[error("invalid storage configuration: {0}")]
    Config(String),

    /// Pool exhausted or backend unreachable.
    #[error("storage backend unavailable")]
    Connectivity(#[source] BoxError),

    #[error("schema provisioning failed for table `{table}`")]
    Schema {
        table: String,
        #[source]
        source: BoxError,
    },

    #[error("database operation failed")]
    Database(#[source] BoxError),

    #[error("local file I/O failed: {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} is {size} bytes, above the {limit} byte storage limit", path.display())]
    FileTooLarge { path: PathBuf, size: u64, limit: u64 },

    #[error("stored metadata is not a valid JSON map")]
    Metadata(#[from] serde_json::Error),
}

impl StorageError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn connectivity(err: impl Into<BoxError>) -> Self {
        Self::Connectivity(err.into())
    }

    pub fn schema(table: impl Into<String>, err: impl Into<BoxError>) -> Self {
        Self::Schema {
            table: table.into(),
            source: err.into(),
        }
    }

    pub fn database(err: impl Into<BoxError>) -> Self {
        Self::Database(err.into())
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
