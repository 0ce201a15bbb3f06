//! Error types for reactivities-core

use thiserror::Error;

/// Result type alias using reactivities-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur outside the API collaborator calls
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid client configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Token persistence failed
    #[error("Secure storage error: {0}")]
    Storage(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
