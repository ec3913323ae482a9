//! Error types for kc-core
//!
//! Provides a unified error type that can be converted to appropriate exit codes.

use thiserror::Error;

/// Result type alias for kc operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for kc operations
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration file error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid path format
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// Alias not found
    #[error("Alias not found: {0}")]
    AliasNotFound(String),

    /// Alias already exists
    #[error("Alias already exists: {0}")]
    AliasExists(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// TOML serialization error
    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing error
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Argument outside the range the service accepts; raised before any request is sent
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Too many items for a single request; raised before any request is sent
    #[error("Limit exceeded: {actual} items given, at most {limit} allowed")]
    LimitExceeded { limit: usize, actual: usize },

    /// Bucket region could not be resolved
    #[error("Cannot resolve region for bucket '{bucket}': {reason}")]
    Resolution { bucket: String, reason: String },

    /// Non-2xx response from the service
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// Transport failure (connection, TLS, timeout)
    #[error("Network error: {0}")]
    Network(String),

    /// Malformed response body
    #[error("Decode error: {0}")]
    Decode(String),

    /// General error
    #[error("{0}")]
    General(String),
}

impl Error {
    /// Whether the error was raised locally before contacting the service
    pub const fn is_precondition(&self) -> bool {
        matches!(self, Error::InvalidArgument(_) | Error::LimitExceeded { .. })
    }

    /// HTTP status carried by the error, if it came from a service response
    pub const fn status(&self) -> Option<u16> {
        match self {
            Error::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Get the appropriate exit code for this error
    pub const fn exit_code(&self) -> i32 {
        match self {
            Error::InvalidPath(_) | Error::Config(_) => 2, // UsageError
            Error::InvalidArgument(_) | Error::LimitExceeded { .. } => 2,
            Error::Network(_) | Error::Resolution { .. } => 3, // NetworkError
            Error::AliasNotFound(_) => 5,                      // NotFound
            Error::AliasExists(_) => 6,                        // Conflict
            Error::Http { status, .. } => match *status {
                401 | 403 => 4,
                404 | 612 | 631 => 5,
                614 => 6,
                _ => 1,
            },
            _ => 1, // GeneralError
        }
    }
}
