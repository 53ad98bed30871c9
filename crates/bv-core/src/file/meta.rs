use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Key under which the origin host is stored in the encoded metadata map.
pub const META_KEY_SERVER: &str = "_server_";

/// Key under which the originating local path is stored.
pub const META_KEY_LOCAL_FILE_PATH: &str = "_local_file_path_";

/// Provenance metadata attached to every stored file.
///
/// At the storage boundary this is a flat JSON object. The known keys are
/// lifted into typed fields; every other key is kept in `extra` so records
/// written by newer versions survive a read/write cycle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetaInfo {
    #[serde(
        rename = "_server_",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub origin_host: Option<String>,

    #[serde(
        rename = "_local_file_path_",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub origin_path: Option<String>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl MetaInfo {
    /// Metadata describing where a stored file came from.
    pub fn origin(host: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            origin_host: Some(host.into()),
            origin_path: Some(path.into()),
            extra: BTreeMap::new(),
        }
    }

    pub fn encode(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Decodes the stored representation. A missing or blank column is an
    /// empty map, not an error.
    pub fn decode(raw: Option<&str>) -> serde_json::Result<Self> {
        match raw.map(str::trim) {
            None | Some("") => Ok(Self::default()),
            Some(json) => serde_json::from_str(json),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.origin_host.is_none() && self.origin_path.is_none() && self.extra.is_empty()
    }
}

/// Metadata of a stored file, fetched without its payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileMeta {
    /// Payload size in bytes.
    pub length: u64,
    pub last_modified: DateTime<Utc>,
    pub meta_info: MetaInfo,
}
