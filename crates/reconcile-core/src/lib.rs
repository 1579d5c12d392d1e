//! Core types for pg-reconcile.
//!
//! This crate holds everything that does not need a live database:
//!
//! - [`Value`] and [`Row`] - typed, column-ordered row snapshots
//! - [`TableSchema`] - a table and its primary-key columns
//! - [`reconcile`] - classifies candidate rows into inserts and updates
//! - [`render`] - turns classified rows into SQL statement text
//! - [`ScriptWriter`] - appends statements and table banners to a sink
//! - [`CatalogProvider`] / [`RowSource`] - the seams a database backend implements
//!
//! # Example
//!
//! ```rust
//! use reconcile_core::{reconcile, render, Row, Value};
//!
//! let keys = vec!["id".to_string()];
//! let source = vec![Row::from_pairs([("id", Value::Int(1)), ("name", Value::text("a"))])];
//! let candidate = vec![
//!     Row::from_pairs([("id", Value::Int(1)), ("name", Value::text("b"))]),
//!     Row::from_pairs([("id", Value::Int(2)), ("name", Value::text("c"))]),
//! ];
//!
//! let outcome = reconcile(&source, &candidate, &keys);
//! assert_eq!(outcome.to_insert.len(), 1);
//! assert_eq!(outcome.to_update.len(), 1);
//!
//! let sql = render::render_update("t", outcome.to_update[0], &keys).unwrap();
//! assert_eq!(sql, "UPDATE t SET name='b';");
//! ```

pub mod error;
pub mod reconcile;
pub mod render;
pub mod row;
pub mod schema;
pub mod script;
pub mod source;
pub mod value;

pub use error::{ReconcileError, Result};
pub use reconcile::{reconcile, Reconciliation};
pub use row::{Projection, Row};
pub use schema::{group_catalog_rows, CatalogRow, TableSchema};
pub use script::{ScriptSink, ScriptWriter};
pub use source::{CatalogProvider, RowSource};
pub use value::Value;
