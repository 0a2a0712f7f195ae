//! Error types for mosaic publishing.

use thiserror::Error;

/// Failures that prevent publishing from starting, or a single path from
/// being attempted. Failed REST calls are not errors; they are recorded in
/// the [`crate::PublishReport`].
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ConfigParse(#[from] serde_yaml::Error),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Cannot derive a store name from '{0}'")]
    InvalidName(String),

    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

pub type PublishResult<T> = Result<T, PublishError>;
