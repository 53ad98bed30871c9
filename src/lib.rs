//! BlobVault: file storage behind a pluggable backend.
//!
//! The storage port and domain types live in `bv-core`; the relational
//! backend and the backend registry live in `bv-infra`. This crate wires
//! them into the `blobvault` command line tool.

pub mod bootstrap;
pub mod cli;
