pub mod config;
pub mod db;
pub mod host;
pub mod storage;
pub mod time;

pub use storage::{ActiveBackend, BackendProvider, BackendRegistry, DieselFileStorage};
pub use time::SystemClock;
