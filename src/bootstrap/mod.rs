pub mod config;
pub mod run;
pub mod tracing;
pub mod wiring;

pub use self::config::{load_config, logging_config};
pub use run::run_command;
pub use self::tracing::init_tracing_subscriber;
