//! Application-wide error types.

use thiserror::Error;

/// Stable numeric business codes returned in the response envelope.
pub mod codes {
    /// Request succeeded.
    pub const SUCCESS: i32 = 0;
    /// Malformed request body or out-of-range field.
    pub const INVALID_REQUEST: i32 = 40000;
    /// Unsupported or undetectable image format. Also used for batch size violations.
    pub const INVALID_FILE_FORMAT: i32 = 40001;
    /// Payload exceeds the configured size limit.
    pub const FILE_SIZE_EXCEEDED: i32 = 40002;
    /// Base64 payload could not be decoded.
    pub const BASE64_DECODE_FAILED: i32 = 40003;
    /// `X-API-Key` header absent.
    pub const MISSING_API_KEY: i32 = 40101;
    /// `X-API-Key` header present but wrong.
    pub const INVALID_API_KEY: i32 = 40102;
    /// Object storage rejected or failed the operation.
    pub const TOS_UPLOAD_FAILED: i32 = 50001;
    /// Anything else.
    pub const INTERNAL_ERROR: i32 = 50002;
}

/// Application error types.
#[derive(Debug, Error)]
pub enum AppError {
    /// Malformed request.
    #[error("Invalid request: {0}")]
    Validation(String),

    /// Image format not supported or not detectable.
    #[error("{0}")]
    InvalidFormat(String),

    /// Payload larger than allowed.
    #[error("File size exceeds maximum limit of {max_mb}MB")]
    PayloadTooLarge {
        /// Configured limit in megabytes.
        max_mb: u64,
    },

    /// Base64 decoding failed.
    #[error("Failed to decode Base64 data: {0}")]
    Base64Decode(String),

    /// Batch has more items than allowed.
    #[error("Maximum {max} images per batch upload")]
    BatchTooLarge {
        /// Configured batch limit.
        max: usize,
    },

    /// Batch has no items.
    #[error("Batch upload requires at least one image")]
    EmptyBatch,

    /// API key header absent.
    #[error("Missing API key. Please provide X-API-Key header.")]
    MissingApiKey,

    /// API key header wrong.
    #[error("Invalid API key.")]
    InvalidApiKey,

    /// Object storage error.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Request did not complete within the server timeout.
    #[error("Request timed out after {secs}s")]
    Timeout {
        /// Configured request timeout.
        secs: u64,
    },

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_)
            | Self::InvalidFormat(_)
            | Self::PayloadTooLarge { .. }
            | Self::Base64Decode(_)
            | Self::BatchTooLarge { .. }
            | Self::EmptyBatch => 400,
            Self::MissingApiKey | Self::InvalidApiKey => 401,
            Self::Storage(_) | Self::Internal(_) => 500,
            Self::Timeout { .. } => 504,
        }
    }

    /// Returns the numeric business code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> i32 {
        match self {
            Self::Validation(_) => codes::INVALID_REQUEST,
            Self::InvalidFormat(_) | Self::BatchTooLarge { .. } | Self::EmptyBatch => {
                codes::INVALID_FILE_FORMAT
            }
            Self::PayloadTooLarge { .. } => codes::FILE_SIZE_EXCEEDED,
            Self::Base64Decode(_) => codes::BASE64_DECODE_FAILED,
            Self::MissingApiKey => codes::MISSING_API_KEY,
            Self::InvalidApiKey => codes::INVALID_API_KEY,
            Self::Storage(_) => codes::TOS_UPLOAD_FAILED,
            Self::Timeout { .. } | Self::Internal(_) => codes::INTERNAL_ERROR,
        }
    }

    /// Message safe to show to API clients.
    ///
    /// Internal errors are masked; everything else uses its display form.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}
