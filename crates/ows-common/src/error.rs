//! Error types for the shared OGC types.

use thiserror::Error;

/// Result type alias using OwsError.
pub type OwsResult<T> = Result<T, OwsError>;

/// Errors raised while building the shared geometry and grid types.
#[derive(Debug, Error, PartialEq)]
pub enum OwsError {
    #[error("Invalid WKT: {0}")]
    InvalidWkt(String),

    #[error("Invalid coordinate value: {0}")]
    InvalidCoordinate(String),

    #[error("Invalid grid: {0}")]
    InvalidGrid(String),
}
