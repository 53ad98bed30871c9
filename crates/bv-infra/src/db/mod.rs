pub mod dialect;
pub mod mappers;
pub mod models;
pub mod pool;
pub mod ports;
pub mod provisioner;
mod executor;

pub use executor::DieselSqliteExecutor;
