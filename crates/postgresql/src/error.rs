//! Error types for the PostgreSQL backend.

use thiserror::Error;

/// Errors that can occur while reading from PostgreSQL.
#[derive(Error, Debug)]
pub enum PostgresError {
    /// PostgreSQL connection or query error.
    #[error("PostgreSQL error: {0}")]
    Query(#[from] tokio_postgres::Error),

    /// A column whose type has no [`Value`](reconcile_core::Value) mapping.
    #[error("Unsupported PostgreSQL type {type_name} in column '{column}'")]
    UnsupportedType { column: String, type_name: String },
}
