//! File identity, metadata and request value objects.

mod location;
mod meta;
mod request;

pub use location::FileLocation;
pub use meta::{FileMeta, MetaInfo, META_KEY_LOCAL_FILE_PATH, META_KEY_SERVER};
pub use request::{DownloadRequest, StoreRequest};
