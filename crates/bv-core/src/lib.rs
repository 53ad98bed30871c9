//! # bv-core
//!
//! Core domain models and storage ports for BlobVault.
//!
//! This crate contains the storage contract and its value types without any
//! infrastructure dependencies. Backend drivers live in `bv-infra`.

pub mod config;
pub mod file;
pub mod ports;

// Re-export commonly used types at the crate root
pub use config::DbStorageConfig;
pub use file::{DownloadRequest, FileLocation, FileMeta, MetaInfo, StoreRequest};
pub use ports::{ClockPort, FileStoragePort, StorageError, StorageResult};
