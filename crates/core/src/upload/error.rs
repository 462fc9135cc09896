//! Upload error types.

use thiserror::Error;
use tos_upload_shared::AppError;

use crate::image::ImageError;
use crate::storage::StorageError;

const MIB: u64 = 1024 * 1024;

/// Upload pipeline errors.
#[derive(Debug, Clone, Error)]
pub enum UploadError {
    /// Payload failed image validation.
    #[error(transparent)]
    Image(#[from] ImageError),

    /// Base64 text could not be decoded.
    #[error("failed to decode Base64 data: {0}")]
    Base64Decode(String),

    /// Quality hint outside 1..=100.
    #[error("quality must be between 1 and 100, got {0}")]
    InvalidQuality(i64),

    /// Batch has more items than allowed.
    #[error("batch of {size} images exceeds maximum {max}")]
    BatchTooLarge {
        /// Items received.
        size: usize,
        /// Configured limit.
        max: usize,
    },

    /// Batch has no items.
    #[error("batch upload requires at least one image")]
    EmptyBatch,

    /// Storage backend failed.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl From<UploadError> for AppError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::Image(ImageError::TooLarge { max, .. }) => Self::PayloadTooLarge {
                max_mb: max.div_ceil(MIB),
            },
            UploadError::Image(ImageError::Empty) => {
                Self::InvalidFormat("Image payload is empty".to_string())
            }
            UploadError::Image(ImageError::UnsupportedFormat(msg)) => Self::InvalidFormat(msg),
            UploadError::Base64Decode(msg) => Self::Base64Decode(msg),
            UploadError::InvalidQuality(q) => {
                Self::Validation(format!("quality must be between 1 and 100, got {q}"))
            }
            UploadError::BatchTooLarge { max, .. } => Self::BatchTooLarge { max },
            UploadError::EmptyBatch => Self::EmptyBatch,
            UploadError::Storage(e) => Self::Storage(e.to_string()),
        }
    }
}
