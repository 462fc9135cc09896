//! Upload domain types.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tos_upload_shared::UploadConfig;

use crate::image::ImageFormat;
use crate::storage::DEFAULT_PREFIX;

/// Accepted range of the quality hint.
pub const QUALITY_RANGE: std::ops::RangeInclusive<u8> = 1..=100;

/// Raw image bytes to upload.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    /// Image content.
    pub data: Bytes,
    /// Format claimed by the caller. A hint only.
    pub declared_format: Option<ImageFormat>,
    /// Destination prefix. Falls back to the policy default.
    pub prefix: Option<String>,
    /// Compression quality hint, reserved for re-encoding.
    pub quality: Option<u8>,
}

impl ImageUpload {
    /// Upload of `data` with all options left to defaults.
    #[must_use]
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self {
            data: data.into(),
            declared_format: None,
            prefix: None,
            quality: None,
        }
    }
}

/// Base64-encoded image to upload.
///
/// Hints stay unparsed until the upload runs, so a bad hint fails only its
/// own batch item.
#[derive(Debug, Clone, Default)]
pub struct Base64Upload {
    /// Base64 text, optionally with a `data:image/...;base64,` prefix.
    pub image_base64: String,
    /// Format claimed by the caller (`jpeg`, `jpg`, `png`, `webp`). A hint only.
    pub format: Option<String>,
    /// Destination prefix. Falls back to the policy default.
    pub prefix: Option<String>,
    /// Compression quality hint, reserved for re-encoding.
    pub quality: Option<i64>,
}

/// A stored image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadResult {
    /// Public access URL.
    pub public_url: String,
    /// Object key in the bucket.
    pub object_key: String,
    /// Entity tag reported by storage.
    pub etag: String,
    /// Stored size in bytes.
    pub size_bytes: u64,
    /// MIME type of the detected format.
    pub content_type: String,
    /// When the upload completed.
    pub upload_time: DateTime<Utc>,
}

/// Limits applied to every upload.
#[derive(Debug, Clone)]
pub struct UploadPolicy {
    /// Maximum decoded image size in bytes.
    pub max_file_size: u64,
    /// Maximum number of images in a batch.
    pub max_batch_size: usize,
    /// Prefix used when the caller does not send one.
    pub default_prefix: String,
}

impl UploadPolicy {
    /// Default max file size: 10MB.
    pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;
    /// Default batch limit.
    pub const DEFAULT_MAX_BATCH_SIZE: usize = 10;

    /// Set maximum file size.
    #[must_use]
    pub fn with_max_file_size(mut self, size: u64) -> Self {
        self.max_file_size = size;
        self
    }

}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            max_file_size: Self::DEFAULT_MAX_FILE_SIZE,
            max_batch_size: Self::DEFAULT_MAX_BATCH_SIZE,
            default_prefix: DEFAULT_PREFIX.to_string(),
        }
    }
}

impl From<&UploadConfig> for UploadPolicy {
    fn from(config: &UploadConfig) -> Self {
        Self {
            max_file_size: config.max_file_size_bytes(),
            max_batch_size: config.max_batch_size,
            default_prefix: config.default_prefix.clone(),
        }
    }
}
