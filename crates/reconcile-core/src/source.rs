//! Seams implemented by a database backend.

use crate::row::Row;
use crate::schema::TableSchema;
use anyhow::Result;
use async_trait::async_trait;

/// Lists every table that has a primary key.
#[async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Tables in catalog order (schema, table), key columns in ordinal order.
    async fn list_primary_key_schemas(&self) -> Result<Vec<TableSchema>>;
}

/// Reads full table contents.
#[async_trait]
pub trait RowSource: Send + Sync {
    /// Every row of `table_name`, ordered by `order_columns`.
    async fn fetch_all_ordered(
        &self,
        table_name: &str,
        order_columns: &[String],
    ) -> Result<Vec<Row>>;
}
