use std::io::{self, Write};

use anyhow::Context;
use bv_core::{DownloadRequest, FileStoragePort, StoreRequest};
use bv_infra::db::provisioner::ProvisionOutcome;
use config::Config;
use tracing::info;

use super::wiring::{build_backend, connect_db_storage};
use crate::cli::Command;

/// Execute one command against the configured backend.
pub fn run_command(command: Command, source: &Config) -> anyhow::Result<()> {
    if let Command::InitSchema = command {
        return init_schema(source);
    }

    let backend = build_backend(source)?;
    info!(backend = backend.name(), "using storage backend");
    let result = dispatch(command, backend.storage().as_ref());
    backend.shutdown();
    result
}

fn init_schema(source: &Config) -> anyhow::Result<()> {
    let storage = connect_db_storage(source)?;
    let status = match storage.ensure_schema()? {
        ProvisionOutcome::Created => "created",
        ProvisionOutcome::Existing => "already exists",
    };
    println!("table {}: {status}", storage.table());
    Ok(())
}

fn dispatch(command: Command, storage: &dyn FileStoragePort) -> anyhow::Result<()> {
    match command {
        Command::Store { location, file } => {
            storage.store(&StoreRequest::new(location.location(), file))?;
        }
        Command::Download { location, target } => {
            storage.download(&DownloadRequest::new(location.location(), target))?;
        }
        Command::Meta { location } => {
            let location = location.location();
            match storage.fetch_meta(&location)? {
                Some(meta) => {
                    let json = serde_json::to_string_pretty(&meta)
                        .context("Failed to render file metadata")?;
                    let mut stdout = io::stdout().lock();
                    writeln!(stdout, "{json}")?;
                }
                None => anyhow::bail!("no file stored at {location}"),
            }
        }
        Command::Clean { bucket, days } => {
            storage.clean_expired(&bucket, days);
        }
        Command::InitSchema => anyhow::bail!("init-schema manages the database backend directly"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::LocationArgs;
    use bv_core::{FileLocation, FileMeta, StorageError, StorageResult};
    use mockall::mock;

    mock! {
        Storage {}

        impl FileStoragePort for Storage {
            fn store(&self, request: &StoreRequest) -> StorageResult<()>;
            fn download(&self, request: &DownloadRequest) -> StorageResult<()>;
            fn fetch_meta(&self, location: &FileLocation) -> StorageResult<Option<FileMeta>>;
            fn clean_expired(&self, bucket: &str, retention_days: u32);
        }
    }

    fn location() -> LocationArgs {
        LocationArgs {
            bucket: "reports".into(),
            name: "daily.csv".into(),
        }
    }

    #[test]
    fn store_forwards_location_and_file() {
        let mut storage = MockStorage::new();
        storage
            .expect_store()
            .withf(|req| {
                req.location == FileLocation::new("reports", "daily.csv")
                    && req.local_file.ends_with("in.csv")
            })
            .times(1)
            .returning(|_| Ok(()));

        dispatch(
            Command::Store {
                location: location(),
                file: "in.csv".into(),
            },
            &storage,
        )
        .unwrap();
    }

    #[test]
    fn clean_passes_retention_days() {
        let mut storage = MockStorage::new();
        storage
            .expect_clean_expired()
            .withf(|bucket, days| bucket.to_string() == "logs" && *days == 7)
            .times(1)
            .return_const(());

        dispatch(
            Command::Clean {
                bucket: "logs".into(),
                days: 7,
            },
            &storage,
        )
        .unwrap();
    }

    #[test]
    fn meta_of_missing_file_is_an_error() {
        let mut storage = MockStorage::new();
        storage.expect_fetch_meta().returning(|_| Ok(None));

        let err = dispatch(Command::Meta { location: location() }, &storage).unwrap_err();
        assert!(err.to_string().contains("reports/daily.csv"));
    }

    #[test]
    fn backend_errors_are_propagated() {
        let mut storage = MockStorage::new();
        storage
            .expect_download()
            .returning(|_| Err(StorageError::database("disk I/O error")));

        let result = dispatch(
            Command::Download {
                location: location(),
                target: "out.csv".into(),
            },
            &storage,
        );
        assert!(result.is_err());
    }
}
