//! Primary-key catalog types.

use serde::Serialize;

/// One row of the primary-key catalog query: a single key column of a
/// single primary-key constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogRow {
    pub table_schema: String,
    pub table_name: String,
    pub constraint_name: String,
    /// 1-based ordinal position of the column inside the key
    pub position: i32,
    pub key_column: String,
}

/// A table together with its primary-key columns in ordinal order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableSchema {
    schema_name: String,
    table_name: String,
    constraint_name: String,
    key_columns: Vec<String>,
}

impl TableSchema {
    /// Build a table schema, dropping repeated key columns.
    ///
    /// Returns `None` when no key column is given: a table without a primary
    /// key cannot be reconciled.
    pub fn new(
        schema_name: impl Into<String>,
        table_name: impl Into<String>,
        constraint_name: impl Into<String>,
        key_columns: impl IntoIterator<Item = impl Into<String>>,
    ) -> Option<Self> {
        let mut deduped: Vec<String> = Vec::new();
        for column in key_columns {
            let column = column.into();
            if !deduped.contains(&column) {
                deduped.push(column);
            }
        }

        if deduped.is_empty() {
            return None;
        }

        Some(Self {
            schema_name: schema_name.into(),
            table_name: table_name.into(),
            constraint_name: constraint_name.into(),
            key_columns: deduped,
        })
    }

    pub fn schema_name(&self) -> &str {
        &self.schema_name
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn constraint_name(&self) -> &str {
        &self.constraint_name
    }

    /// Never empty.
    pub fn key_columns(&self) -> &[String] {
        &self.key_columns
    }
}

/// Group flat catalog rows into one [`TableSchema`] per `(table_name, constraint_name)`.
///
/// Tables keep the order in which they first appear and key columns keep
/// the order in which they are received, so the input must already be
/// sorted by schema, table and key position.
pub fn group_catalog_rows(rows: impl IntoIterator<Item = CatalogRow>) -> Vec<TableSchema> {
    let mut tables: Vec<TableSchema> = Vec::new();

    for row in rows {
        let existing = tables.iter_mut().find(|t| {
            t.table_name == row.table_name && t.constraint_name == row.constraint_name
        });

        match existing {
            Some(table) => {
                if !table.key_columns.contains(&row.key_column) {
                    table.key_columns.push(row.key_column);
                }
            }
            None => tables.push(TableSchema {
                schema_name: row.table_schema,
                table_name: row.table_name,
                constraint_name: row.constraint_name,
                key_columns: vec![row.key_column],
            }),
        }
    }

    tables
}
