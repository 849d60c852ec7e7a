//! Error types for record ingestion.

use thiserror::Error;

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading records.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid input document
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
