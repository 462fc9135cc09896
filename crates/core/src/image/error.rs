//! Image validation error types.

use thiserror::Error;

/// Image validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImageError {
    /// Payload has no bytes.
    #[error("Image payload is empty")]
    Empty,

    /// No supported signature matched.
    #[error("{0}")]
    UnsupportedFormat(String),

    /// Payload exceeds the configured ceiling.
    #[error("payload size {size} bytes exceeds maximum allowed {max} bytes")]
    TooLarge {
        /// Actual size.
        size: u64,
        /// Maximum allowed size.
        max: u64,
    },
}

impl ImageError {
    /// Create an unsupported format error.
    #[must_use]
    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::UnsupportedFormat(msg.into())
    }

    /// Create a too large error.
    #[must_use]
    pub fn too_large(size: u64, max: u64) -> Self {
        Self::TooLarge { size, max }
    }
}
