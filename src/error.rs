//! Error types for subfeed.

use thiserror::Error;

/// Common error type for subfeed.
#[derive(Error, Debug)]
pub enum SubfeedError {
    /// Database error.
    ///
    /// Errors from sqlx are converted into this variant.
    #[error("database error: {0}")]
    Database(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Resource not found.
    #[error("{0} not found")]
    NotFound(String),

    /// Resource already exists.
    #[error("{0} already exists")]
    Conflict(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Transport-level failure talking to a remote host.
    #[error("network error: {0}")]
    Network(String),

    /// The remote host answered with a non-success status.
    #[error("HTTP error: {0}")]
    HttpStatus(u16),

    /// Feed document could not be read.
    #[error("feed error: {0}")]
    Feed(String),
}

impl From<sqlx::Error> for SubfeedError {
    fn from(e: sqlx::Error) -> Self {
        SubfeedError::Database(e.to_string())
    }
}

/// Result type alias for subfeed operations.
pub type Result<T> = std::result::Result<T, SubfeedError>;
