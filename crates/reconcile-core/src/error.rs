//! Error types for reconcile-core.

use thiserror::Error;

/// Errors raised by the renderer and the script writer.
#[derive(Error, Debug)]
pub enum ReconcileError {
    /// The caller asked for something that has no well-formed SQL rendering,
    /// such as an UPDATE without any key columns to exclude.
    #[error("Invalid reconciliation input: {0}")]
    InvalidInput(String),

    /// Writing to the script sink failed.
    #[error("Script write error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for reconcile-core operations.
pub type Result<T> = std::result::Result<T, ReconcileError>;
