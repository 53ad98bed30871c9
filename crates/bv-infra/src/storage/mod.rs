mod db_file_storage;
pub mod registry;

pub use db_file_storage::{DieselFileStorage, DriverOptions};
pub use registry::{ActiveBackend, BackendProvider, BackendRegistry, DbBackendProvider};
