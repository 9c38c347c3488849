//! Common error types for the coastal risk services

use thiserror::Error;

/// Common result type for coastal risk operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the coastal risk crates
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed or out-of-range input (coordinates, widths, sea state, confidence)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Referenced observer or observation does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Underlying persistence fault (wraps sqlx::Error)
    #[error("Storage error: {0}")]
    Storage(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (corrupt stored value, broken invariant)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// True for caller-side input problems
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation(_))
    }

    /// True when a referenced record is missing
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }
}
