pub mod file_meta_mapper;

pub use file_meta_mapper::FileMetaRowMapper;
