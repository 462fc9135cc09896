//! Storage error types.

use thiserror::Error;

/// Storage operation errors.
#[derive(Debug, Clone, Error)]
pub enum StorageError {
    /// Storage provider configuration error.
    #[error("storage configuration error: {0}")]
    Configuration(String),

    /// Backend rejected or failed the operation.
    #[error("storage operation failed: {0}")]
    Operation(String),

    /// Backend did not answer in time.
    #[error("storage operation timed out: {0}")]
    Timeout(String),

    /// Credentials were refused.
    #[error("storage access denied: {0}")]
    PermissionDenied(String),
}

impl StorageError {
    /// Create a configuration error.
    #[must_use]
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Create an operation error.
    #[must_use]
    pub fn operation(msg: impl Into<String>) -> Self {
        Self::Operation(msg.into())
    }
}

impl From<opendal::Error> for StorageError {
    fn from(err: opendal::Error) -> Self {
        match err.kind() {
            opendal::ErrorKind::PermissionDenied => Self::PermissionDenied(err.to_string()),
            opendal::ErrorKind::ConfigInvalid => Self::Configuration(err.to_string()),
            _ if err.to_string().contains("timeout") => Self::Timeout(err.to_string()),
            _ => Self::Operation(err.to_string()),
        }
    }
}
