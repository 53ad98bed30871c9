use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of a stored file: a bucket namespace plus a name unique within it.
///
/// A `FileLocation` is never persisted on its own. It is the logical key the
/// storage backend uses to find the live record of a file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileLocation {
    pub bucket: String,
    pub name: String,
}

impl FileLocation {
    pub fn new(bucket: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for FileLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.bucket, self.name)
    }
}
