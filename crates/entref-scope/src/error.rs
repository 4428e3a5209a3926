//! Error types for scope configuration.

use thiserror::Error;

/// Errors that can occur while loading a scope configuration.
///
/// Building and querying a scope never fails.
#[derive(Debug, Error)]
pub enum ScopeError {
    /// The configuration could not be parsed.
    #[error("invalid scope configuration: {0}")]
    Config(String),

    /// I/O error while reading a configuration file.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for scope operations.
pub type Result<T> = std::result::Result<T, ScopeError>;
