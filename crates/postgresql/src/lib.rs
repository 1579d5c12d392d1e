//! PostgreSQL backend for pg-reconcile
//!
//! Implements the [`CatalogProvider`](reconcile_core::CatalogProvider) and
//! [`RowSource`](reconcile_core::RowSource) seams on top of `tokio-postgres`,
//! converting column values into [`reconcile_core::Value`].

mod catalog;
mod client;
mod error;
mod rows;
mod value;

pub use catalog::PRIMARY_KEY_CATALOG_QUERY;
pub use client::{connect, PostgresDatabase};
pub use error::PostgresError;
pub use rows::{select_all_query, select_with_text_columns};
pub use value::{convert_row, convert_value};
