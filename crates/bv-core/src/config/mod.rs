//! # Pure Data Module - Configuration DTOs
//!
//! Resolving these values from files and environment, applying defaults and
//! validating them is the job of `bv-infra::config`. Nothing here carries
//! policy.

mod db_storage;

pub use db_storage::DbStorageConfig;
