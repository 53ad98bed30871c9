use bv_core::{StorageError, StorageResult};
use diesel::connection::SimpleConnection;
use diesel::result::Error as DieselError;
use diesel::sql_types::Text;
use diesel::{RunQueryDsl, SqliteConnection};
use tracing::{info, warn};

use crate::db::dialect::{validate_table_name, SqlDialect};
use crate::db::models::CountRow;
use crate::db::ports::DbExecutor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisionOutcome {
    /// The table was already there; nothing ran.
    Existing,
    Created,
}

/// Ensures the backing table exists before the driver serves requests.
pub struct SchemaProvisioner<'a> {
    dialect: &'a dyn SqlDialect,
}

impl<'a> SchemaProvisioner<'a> {
    pub fn new(dialect: &'a dyn SqlDialect) -> Self {
        Self { dialect }
    }

    /// Idempotent: safe on every process start, and safe when two processes
    /// start at once against the same database.
    pub fn ensure_table<E: DbExecutor>(
        &self,
        executor: &E,
        table: &str,
    ) -> StorageResult<ProvisionOutcome> {
        validate_table_name(table)?;

        executor.run(|conn| {
            if self.table_exists(conn, table)? {
                info!(table, "table already exists, skip creation");
                return Ok(ProvisionOutcome::Existing);
            }

            let script = self.dialect.create_table_script(table);
            info!(table, dialect = self.dialect.name(), "creating table");

            match conn.immediate_transaction(|conn| conn.batch_execute(&script)) {
                Ok(()) => {
                    info!(table, "auto create table successfully");
                    Ok(ProvisionOutcome::Created)
                }
                Err(e) if is_already_exists(&e) => {
                    warn!(table, error = %e, "table created concurrently by another process");
                    Ok(ProvisionOutcome::Existing)
                }
                Err(e) => Err(StorageError::schema(table, e)),
            }
        })
    }

    pub fn table_exists(&self, conn: &mut SqliteConnection, table: &str) -> StorageResult<bool> {
        let row = diesel::sql_query(self.dialect.table_exists())
            .bind::<Text, _>(table)
            .get_result::<CountRow>(conn)
            .map_err(|e| StorageError::schema(table, e))?;
        Ok(row.cnt > 0)
    }
}

fn is_already_exists(err: &DieselError) -> bool {
    match err {
        DieselError::DatabaseError(_, info) => {
            info.message().contains("already exists")
        }
        _ => false,
    }
}
