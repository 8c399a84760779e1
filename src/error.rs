//! Error types for the HamnetDB accessor layer

use thiserror::Error;

/// Result type alias for HamnetDB operations
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for the crate
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Errors raised by an upstream accessor.
///
/// The cache never retries these; a failed refresh propagates to the
/// caller and leaves previously cached data untouched.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("HamnetDB returned HTTP {0}")]
    Status(u16),

    #[error("Invalid HamnetDB response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for UpstreamError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            UpstreamError::Network("Request timed out".to_string())
        } else if err.is_connect() {
            UpstreamError::Network("Failed to connect to HamnetDB".to_string())
        } else {
            UpstreamError::Network(err.to_string())
        }
    }
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Settings file not found: {0}")]
    NotFound(String),

    #[error("Failed to read settings: {0}")]
    Io(String),

    #[error("Failed to parse settings: {0}")]
    ParseError(String),

    #[error("Invalid settings: {0}")]
    Invalid(String),
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}
