use std::sync::Arc;

use super::StorageResult;
use crate::file::{DownloadRequest, FileLocation, FileMeta, StoreRequest};

/// Uniform contract implemented by every file storage backend.
///
/// All operations block the calling thread until the backend answers.
/// Overwrites are last-writer-wins and NOT linearizable: two concurrent
/// `store` calls for the same location may interleave.
pub trait FileStoragePort: Send + Sync {
    /// Replace whatever is stored at the request's location with the content
    /// of its local file.
    ///
    /// On error the previous content may or may not still be available.
    fn store(&self, request: &StoreRequest) -> StorageResult<()>;

    /// Write the stored content to the request's target path.
    ///
    /// A missing file is not an error: the call returns `Ok(())` and leaves
    /// the target untouched. Callers check the target to tell the cases apart.
    fn download(&self, request: &DownloadRequest) -> StorageResult<()>;

    /// Metadata of the live record, without transferring its payload.
    fn fetch_meta(&self, location: &FileLocation) -> StorageResult<Option<FileMeta>>;

    /// Delete every file in `bucket` not modified within `retention_days`.
    ///
    /// Advisory maintenance: failures are logged, never returned.
    fn clean_expired(&self, bucket: &str, retention_days: u32);
}

impl<T: FileStoragePort + ?Sized> FileStoragePort for Arc<T> {
    fn store(&self, request: &StoreRequest) -> StorageResult<()> {
        (**self).store(request)
    }

    fn download(&self, request: &DownloadRequest) -> StorageResult<()> {
        (**self).download(request)
    }

    fn fetch_meta(&self, location: &FileLocation) -> StorageResult<Option<FileMeta>> {
        (**self).fetch_meta(location)
    }

    fn clean_expired(&self, bucket: &str, retention_days: u32) {
        (**self).clean_expired(bucket, retention_days)
    }
}
