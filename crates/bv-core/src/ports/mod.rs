//! Port interfaces for storage backends
//!
//! Ports define the contract between callers (upload/download services, the
//! CLI, schedulers) and the backend drivers that implement it. Exactly one
//! driver is active in a process; callers only ever see the port.

mod clock;
pub mod errors;
mod file_storage;

pub use clock::ClockPort;
pub use errors::{BoxError, StorageError, StorageResult};
pub use file_storage::FileStoragePort;
