use diesel::prelude::*;
use diesel::sql_types::{BigInt, Binary, Integer, Nullable, Text};

/// Fixed version marker; one version per location for now.
pub const FILE_VERSION: &str = "mu";

pub const STATUS_ENABLED: i32 = 1;

/// Values of one insert into the files table. Bound in the order of the
/// dialect's `insert` template.
#[derive(Debug)]
pub struct NewStoredFileRow {
    pub bucket: String,
    pub name: String,
    pub version: String,
    pub meta: String,
    pub length: i64,
    pub status: i32,
    pub data: Vec<u8>,
    pub extra: Option<String>,
    pub gmt_create: i64,
    pub gmt_modified: i64,
}

/// All columns except `id` and `data`.
#[derive(Debug, QueryableByName)]
pub struct FileMetaRow {
    #[diesel(sql_type = Text)]
    pub bucket: String,
    #[diesel(sql_type = Text)]
    pub name: String,
    #[diesel(sql_type = Text)]
    pub version: String,
    #[diesel(sql_type = Nullable<Text>)]
    pub meta: Option<String>,
    #[diesel(sql_type = BigInt)]
    pub length: i64,
    #[diesel(sql_type = Integer)]
    pub status: i32,
    #[diesel(sql_type = Nullable<Text>)]
    pub extra: Option<String>,
    #[diesel(sql_type = BigInt)]
    pub gmt_create: i64,
    #[diesel(sql_type = Nullable<BigInt>)]
    pub gmt_modified: Option<i64>,
}

#[derive(Debug, QueryableByName)]
pub struct BlobHeadRow {
    #[diesel(sql_type = BigInt)]
    pub id: i64,
    #[diesel(sql_type = BigInt)]
    pub length: i64,
}

#[derive(QueryableByName)]
pub struct BlobChunkRow {
    #[diesel(sql_type = Binary)]
    pub chunk: Vec<u8>,
}

#[derive(Debug, QueryableByName)]
pub struct CountRow {
    #[diesel(sql_type = BigInt)]
    pub cnt: i64,
}
