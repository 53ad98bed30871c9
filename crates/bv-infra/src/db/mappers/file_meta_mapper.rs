use bv_core::{FileMeta, MetaInfo, StorageError, StorageResult};
use chrono::DateTime;

use crate::db::models::FileMetaRow;
use crate::db::ports::RowMapper;

pub struct FileMetaRowMapper;

impl RowMapper<FileMetaRow, FileMeta> for FileMetaRowMapper {
    fn to_domain(&self, row: &FileMetaRow) -> StorageResult<FileMeta> {
        let length = u64::try_from(row.length).map_err(|_| {
            StorageError::database(format!(
                "negative length {} for {}/{}",
                row.length, row.bucket, row.name
            ))
        })?;

        // gmt_modified is nullable in the schema; records are never updated,
        // so the creation time is the modification time.
        let modified_ms = row.gmt_modified.unwrap_or(row.gmt_create);
        let last_modified = DateTime::from_timestamp_millis(modified_ms).ok_or_else(|| {
            StorageError::database(format!("timestamp {modified_ms} out of range"))
        })?;

        Ok(FileMeta {
            length,
            last_modified,
            meta_info: MetaInfo::decode(row.meta.as_deref())?,
        })
    }
}
