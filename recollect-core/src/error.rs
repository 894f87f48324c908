//! Error types for recollect-core

use thiserror::Error;

/// Main error type for the recollect-core library
#[derive(Error, Debug)]
pub enum Error {
    /// Database error
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Home directory could not be resolved
    #[error("could not determine home directory")]
    NoHomeDir,
}

/// Result type alias for recollect-core
pub type Result<T> = std::result::Result<T, Error>;
