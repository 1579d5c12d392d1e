//! Primary-key catalog reader.

use crate::client::PostgresDatabase;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reconcile_core::{group_catalog_rows, CatalogProvider, CatalogRow, TableSchema};
use tracing::debug;

/// One row per key column of every PRIMARY KEY constraint, in
/// schema / table / ordinal order.
///
/// `information_schema` exposes its columns as domain types, so they are
/// cast to plain `text` / `int` for the driver.
pub const PRIMARY_KEY_CATALOG_QUERY: &str = "
    SELECT kcu.table_schema::text AS table_schema,
           kcu.table_name::text AS table_name,
           tco.constraint_name::text AS constraint_name,
           kcu.ordinal_position::int AS position,
           kcu.column_name::text AS key_column
    FROM information_schema.table_constraints tco
    JOIN information_schema.key_column_usage kcu
      ON kcu.constraint_name = tco.constraint_name
     AND kcu.constraint_schema = tco.constraint_schema
    WHERE tco.constraint_type = 'PRIMARY KEY'
    ORDER BY kcu.table_schema,
             kcu.table_name,
             position";

#[async_trait]
impl CatalogProvider for PostgresDatabase {
    async fn list_primary_key_schemas(&self) -> Result<Vec<TableSchema>> {
        let rows = self
            .client
            .query(PRIMARY_KEY_CATALOG_QUERY, &[])
            .await
            .with_context(|| format!("Failed to read primary keys from {}", self.label))?;

        debug!(
            database = %self.label,
            key_columns = rows.len(),
            "Read primary-key catalog"
        );

        let catalog_rows = rows
            .iter()
            .map(|row| -> Result<CatalogRow, tokio_postgres::Error> {
                Ok(CatalogRow {
                    table_schema: row.try_get("table_schema")?,
                    table_name: row.try_get("table_name")?,
                    constraint_name: row.try_get("constraint_name")?,
                    position: row.try_get("position")?,
                    key_column: row.try_get("key_column")?,
                })
            })
            .collect::<Result<Vec<_>, tokio_postgres::Error>>()
            .context("Unexpected primary-key catalog row shape")?;

        Ok(group_catalog_rows(catalog_rows))
    }
}
