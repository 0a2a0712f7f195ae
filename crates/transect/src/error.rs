//! Error types for transect sampling.

use ows_common::{OwsError, ServiceException};
use thiserror::Error;

use crate::raster::RasterError;

/// Errors that end a transect request before a result is produced.
///
/// An unreadable downloaded raster is not an error here; it yields
/// [`crate::TransectResult::Empty`].
#[derive(Debug, Error)]
pub enum TransectError {
    #[error("Invalid transect request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Geometry(#[from] OwsError),

    #[error("Coverage not described by service: {0}")]
    CoverageNotFound(String),

    #[error("Malformed coverage description: {0}")]
    Metadata(String),

    #[error("WCS service exception: {0}")]
    Service(ServiceException),

    #[error("WCS returned HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("WCS request timed out")]
    Timeout,

    #[error("HTTP error: {0}")]
    Http(reqwest::Error),

    #[error("Failed to stage coverage download: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Raster(#[from] RasterError),

    #[error("Failed to serialize result: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl From<reqwest::Error> for TransectError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransectError::Timeout
        } else {
            TransectError::Http(err)
        }
    }
}
