//! Error types for the streak_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for streak_core operations
///
/// Data-quality problems (bad timestamps, corrupt lines, missing fields) never
/// surface here; they are dropped with a warning. Only I/O failures and caller
/// defects do.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// A trend window of zero days was requested
    #[error("Invalid trend window: {0} days (must be at least 1)")]
    InvalidWindow(u32),

    /// Caller supplied an argument that cannot be interpreted
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
