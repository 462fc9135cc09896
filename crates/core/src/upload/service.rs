//! Upload service implementation.

use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use bytes::Bytes;
use chrono::Utc;
use futures::future::join_all;
use tracing::{debug, error, info};

use super::error::UploadError;
use super::types::{Base64Upload, ImageUpload, QUALITY_RANGE, UploadPolicy, UploadResult};
use crate::image::{ImageError, ImageFormat, check_size, detect_format, max_base64_len};
use crate::storage::{ObjectStore, generate_object_key};

/// Outcome of one batch item, in input order.
pub type BatchItemResult = Result<UploadResult, UploadError>;

/// Validates images and stores them through an [`ObjectStore`].
///
/// Every check that can fail without the network runs before the storage call.
pub struct UploadService<S: ObjectStore> {
    store: Arc<S>,
    policy: UploadPolicy,
}

impl<S: ObjectStore> UploadService<S> {
    /// Create a new upload service.
    #[must_use]
    pub fn new(store: Arc<S>, policy: UploadPolicy) -> Self {
        Self { store, policy }
    }

    /// Validates and stores raw image bytes.
    ///
    /// Order: quality hint, size guard, signature detection, key generation, put.
    ///
    /// # Errors
    ///
    /// Returns a validation error before any storage call, or
    /// [`UploadError::Storage`] if the put fails.
    pub async fn upload_image(&self, input: ImageUpload) -> Result<UploadResult, UploadError> {
        validate_quality(input.quality.map(i64::from))?;
        check_size(input.data.len() as u64, self.policy.max_file_size)?;
        let format = detect_format(&input.data, input.declared_format)?;

        let prefix = input
            .prefix
            .as_deref()
            .unwrap_or(&self.policy.default_prefix);
        let object_key = generate_object_key(prefix, &input.data, format);
        let content_type = format.mime_type();

        let outcome = self
            .store
            .put(&object_key, input.data, content_type)
            .await
            .inspect_err(|e| error!(error = %e, object_key = %object_key, "Upload to storage failed"))?;

        info!(
            object_key = %object_key,
            size_bytes = outcome.size,
            content_type,
            "Image uploaded"
        );

        Ok(UploadResult {
            public_url: self.store.public_url(&object_key),
            object_key,
            etag: outcome.etag,
            size_bytes: outcome.size,
            content_type: content_type.to_string(),
            upload_time: Utc::now(),
        })
    }

    /// Decodes a Base64 image and stores it.
    ///
    /// # Errors
    ///
    /// Same as [`Self::upload_image`], plus [`UploadError::Base64Decode`] and
    /// an unsupported format error for an unknown format hint.
    pub async fn upload_base64(&self, input: Base64Upload) -> Result<UploadResult, UploadError> {
        let quality = validate_quality(input.quality)?;
        let declared_format = parse_format(input.format.as_deref())?;
        let data = self.decode_base64(&input.image_base64)?;

        self.upload_image(ImageUpload {
            data,
            declared_format,
            prefix: input.prefix,
            quality,
        })
        .await
    }

    /// Uploads every item concurrently and reports each outcome in input order.
    ///
    /// A failing item, including one with a bad format or quality hint, never
    /// aborts its siblings. Only an empty or oversized batch fails as a whole,
    /// before any item is touched.
    ///
    /// # Errors
    ///
    /// Returns [`UploadError::EmptyBatch`] or [`UploadError::BatchTooLarge`].
    pub async fn upload_batch(
        &self,
        items: Vec<Base64Upload>,
    ) -> Result<Vec<BatchItemResult>, UploadError> {
        if items.is_empty() {
            return Err(UploadError::EmptyBatch);
        }
        if items.len() > self.policy.max_batch_size {
            return Err(UploadError::BatchTooLarge {
                size: items.len(),
                max: self.policy.max_batch_size,
            });
        }

        let total = items.len();
        // join_all keeps results aligned with input positions
        let results = join_all(items.into_iter().map(|item| self.upload_base64(item))).await;

        let succeeded = results.iter().filter(|r| r.is_ok()).count();
        info!(total, succeeded, failed = total - succeeded, "Batch upload finished");

        Ok(results)
    }

    /// Strips a data URL header, bounds the text length, then decodes.
    fn decode_base64(&self, encoded: &str) -> Result<Bytes, UploadError> {
        let payload = encoded
            .split_once(',')
            .map_or(encoded, |(_, data)| data)
            .trim();

        let max = self.policy.max_file_size;
        if payload.len() as u64 > max_base64_len(max) {
            debug!(encoded_len = payload.len(), "Base64 payload rejected before decode");
            return Err(ImageError::too_large(payload.len() as u64 / 4 * 3, max).into());
        }

        STANDARD
            .decode(payload)
            .map(Bytes::from)
            .map_err(|e| UploadError::Base64Decode(e.to_string()))
    }
}

fn validate_quality(quality: Option<i64>) -> Result<Option<u8>, UploadError> {
    quality
        .map(|q| {
            u8::try_from(q)
                .ok()
                .filter(|q| QUALITY_RANGE.contains(q))
                .ok_or(UploadError::InvalidQuality(q))
        })
        .transpose()
}

fn parse_format(format: Option<&str>) -> Result<Option<ImageFormat>, UploadError> {
    format
        .map(str::parse::<ImageFormat>)
        .transpose()
        .map_err(UploadError::from)
}
