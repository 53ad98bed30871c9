use bv_core::StorageResult;

pub trait RowMapper<R, D>: Sync + Send {
    fn to_domain(&self, row: &R) -> StorageResult<D>;
}
