//! Error types for the WMS prober.

use thiserror::Error;

/// Errors that stop probing an endpoint altogether.
///
/// Per-layer failures are never errors; they are [`crate::ProbeOutcome`]s.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("Failed to connect to WMS {url}: {reason}")]
    Connect { url: String, reason: String },

    #[error("Invalid capabilities document: {0}")]
    Capabilities(String),

    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

pub type ProbeResult<T> = Result<T, ProbeError>;
