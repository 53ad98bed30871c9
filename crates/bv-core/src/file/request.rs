use std::path::PathBuf;

use super::FileLocation;

/// Store the content of `local_file` at `location`, replacing any previous
/// content.
#[derive(Debug, Clone)]
pub struct StoreRequest {
    pub location: FileLocation,
    pub local_file: PathBuf,
}

impl StoreRequest {
    pub fn new(location: FileLocation, local_file: impl Into<PathBuf>) -> Self {
        Self {
            location,
            local_file: local_file.into(),
        }
    }
}

/// Write the content stored at `location` to `target`.
#[derive(Debug, Clone)]
pub struct DownloadRequest {
    pub location: FileLocation,
    pub target: PathBuf,
}

impl DownloadRequest {
    pub fn new(location: FileLocation, target: impl Into<PathBuf>) -> Self {
        Self {
            location,
            target: target.into(),
        }
    }
}
