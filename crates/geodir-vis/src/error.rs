//! Error types for the map server.

use thiserror::Error;

/// Result type for server operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while configuring or running the server.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid configuration value
    #[error("Configuration error: {0}")]
    Config(String),

    /// Record loading error
    #[error("Record error: {0}")]
    Search(#[from] geodir_search::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
