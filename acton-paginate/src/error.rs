//! Error types for the crate's own operations
//!
//! Failures raised by a collaborator during [`paginate`](crate::paginate) are
//! not represented here: they are returned as the collaborator's own error
//! type. This enum covers configuration loading and option parsing.

use thiserror::Error;

/// Result type for crate operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while loading configuration or building options
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(Box<figment::Error>),

    /// Options rejected before reaching the collaborator
    #[error("Invalid options: {0}")]
    InvalidOptions(String),

    /// JSON input could not be parsed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Error::Config(Box::new(err))
    }
}
