//! Error types for the metadata diff core.

use meta_diff_path_keys::PathKeyError;
use thiserror::Error;

/// Main error type for diff, subset and change-request operations.
#[derive(Error, Debug)]
pub enum DiffError {
    /// A dotted path in a change request could not be collapsed
    #[error("Path key error: {0}")]
    PathKey(#[from] PathKeyError),

    /// A document did not have the shape an operation requires
    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    /// Configuration values that parse but make no sense
    #[error("Configuration error: {0}")]
    Config(String),

    /// TOML parsing errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for meta-diff operations
pub type Result<T> = std::result::Result<T, DiffError>;
