//! Image upload routes.
//!
//! All routes sit behind the API key middleware. Transport-level body limits
//! are sized from the configured file limit; the exact byte check happens in
//! the upload service.

use axum::{
    Json, Router,
    extract::{
        DefaultBodyLimit, Multipart, State,
        multipart::{Field, MultipartError, MultipartRejection},
        rejection::JsonRejection,
    },
    http::StatusCode,
    routing::post,
};
use bytes::Bytes;
use serde::Deserialize;
use tracing::debug;

use crate::AppState;
use crate::response::{ApiError, ApiResponse, ApiResult};
use tos_upload_core::image::{ImageFormat, max_base64_len};
use tos_upload_core::upload::{Base64Upload, ImageUpload, UploadResult};
use tos_upload_shared::{AppError, UploadConfig};

/// Room for JSON fields and multipart headers around the image itself.
const ENVELOPE_OVERHEAD: usize = 64 * 1024;

const UPLOAD_OK: &str = "Upload successful";

/// Creates the upload routes with body limits derived from `config`.
pub fn routes(config: &UploadConfig) -> Router<AppState> {
    let max = config.max_file_size_bytes();
    let raw_limit = to_usize(max).saturating_add(ENVELOPE_OVERHEAD);
    let base64_limit = to_usize(max_base64_len(max)).saturating_add(ENVELOPE_OVERHEAD);
    let batch_limit = base64_limit.saturating_mul(config.max_batch_size.max(1));

    Router::new()
        .route(
            "/upload/base64",
            post(upload_base64).layer(DefaultBodyLimit::max(base64_limit)),
        )
        .route(
            "/upload/image",
            post(upload_image).layer(DefaultBodyLimit::max(raw_limit)),
        )
        .route(
            "/upload/batch",
            post(upload_batch).layer(DefaultBodyLimit::max(batch_limit)),
        )
}

fn to_usize(bytes: u64) -> usize {
    usize::try_from(bytes).unwrap_or(usize::MAX)
}

// ============================================================================
// Request Types
// ============================================================================

/// Request body for a Base64 upload, also one item of a batch.
///
/// Hints are kept loose here and validated by the upload service, so an
/// unknown format or out-of-range quality fails only its own batch item.
#[derive(Debug, Deserialize)]
pub struct Base64UploadRequest {
    /// Base64 image data, optionally as a data URL.
    pub image_base64: String,
    /// Declared format hint: `jpeg`, `jpg`, `png` or `webp`.
    #[serde(default)]
    pub format: Option<String>,
    /// Storage path prefix.
    #[serde(default)]
    pub prefix: Option<String>,
    /// Compression quality, 1-100.
    #[serde(default)]
    pub quality: Option<i64>,
}

impl From<Base64UploadRequest> for Base64Upload {
    fn from(req: Base64UploadRequest) -> Self {
        Self {
            image_base64: req.image_base64,
            format: req.format,
            prefix: req.prefix,
            quality: req.quality,
        }
    }
}

// ============================================================================
// Rejection Mapping
// ============================================================================

fn rejection_error(status: StatusCode, body: String, max_mb: u64) -> ApiError {
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge { max_mb }.into()
    } else {
        AppError::Validation(body).into()
    }
}

fn json_error(rejection: &JsonRejection, max_mb: u64) -> ApiError {
    rejection_error(rejection.status(), rejection.body_text(), max_mb)
}

fn multipart_error(err: &MultipartError, max_mb: u64) -> ApiError {
    rejection_error(err.status(), err.body_text(), max_mb)
}

/// Maps the declared part content type to a format hint.
///
/// Absent and `application/octet-stream` mean "unknown"; any other non-image
/// type fails before the body is read.
fn declared_format(content_type: Option<&str>) -> Result<Option<ImageFormat>, AppError> {
    match content_type {
        None | Some("application/octet-stream") => Ok(None),
        Some(ct) => ImageFormat::from_mime_type(ct).map(Some).ok_or_else(|| {
            AppError::InvalidFormat(format!(
                "Invalid content type: {ct}. Supported: JPEG, PNG, WEBP"
            ))
        }),
    }
}

fn parse_quality(text: &str) -> Result<u8, AppError> {
    text.trim().parse().map_err(|_| {
        AppError::Validation(format!("quality must be an integer between 1 and 100, got {text:?}"))
    })
}

async fn field_text(field: Field<'_>, max_mb: u64) -> Result<String, ApiError> {
    field.text().await.map_err(|e| multipart_error(&e, max_mb))
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST `/upload/base64`
async fn upload_base64(
    State(state): State<AppState>,
    payload: Result<Json<Base64UploadRequest>, JsonRejection>,
) -> ApiResult<UploadResult> {
    let max_mb = state.config.upload.max_file_size_mb;
    let Json(req) = payload.map_err(|r| json_error(&r, max_mb))?;

    let result = state.uploads.upload_base64(req.into()).await?;
    Ok(ApiResponse::ok(UPLOAD_OK, result))
}

/// POST `/upload/image`
///
/// Multipart fields: `file` (required), `prefix`, `quality`.
async fn upload_image(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<UploadResult> {
    let max_mb = state.config.upload.max_file_size_mb;
    let mut multipart =
        multipart.map_err(|r| rejection_error(r.status(), r.body_text(), max_mb))?;

    let mut file: Option<(Bytes, Option<ImageFormat>)> = None;
    let mut prefix = None;
    let mut quality = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(&e, max_mb))?
    {
        let name = field.name().map(ToString::to_string);
        match name.as_deref() {
            Some("file") => {
                let declared = declared_format(field.content_type())?;
                let data = field.bytes().await.map_err(|e| multipart_error(&e, max_mb))?;
                file = Some((data, declared));
            }
            Some("prefix") => {
                let text = field_text(field, max_mb).await?;
                prefix = Some(text).filter(|p| !p.is_empty());
            }
            Some("quality") => {
                let text = field_text(field, max_mb).await?;
                quality = Some(parse_quality(&text)?);
            }
            other => debug!(field = ?other, "Ignoring unknown multipart field"),
        }
    }

    let Some((data, declared_format)) = file else {
        return Err(AppError::Validation("multipart field `file` is required".to_string()).into());
    };

    let result = state
        .uploads
        .upload_image(ImageUpload {
            data,
            declared_format,
            prefix,
            quality,
        })
        .await?;
    Ok(ApiResponse::ok(UPLOAD_OK, result))
}

/// POST `/upload/batch`
///
/// Each `data[i]` is the envelope of item `i`.
async fn upload_batch(
    State(state): State<AppState>,
    payload: Result<Json<Vec<Base64UploadRequest>>, JsonRejection>,
) -> ApiResult<Vec<ApiResponse<UploadResult>>> {
    let max_mb = state.config.upload.max_file_size_mb;
    let Json(items) = payload.map_err(|r| json_error(&r, max_mb))?;

    let results = state
        .uploads
        .upload_batch(items.into_iter().map(Into::into).collect())
        .await?;

    let total = results.len();
    let succeeded = results.iter().filter(|r| r.is_ok()).count();
    let envelopes = results
        .into_iter()
        .map(|r| ApiResponse::from_result(r, UPLOAD_OK))
        .collect();

    Ok(ApiResponse::ok(
        format!("Uploaded {succeeded} of {total} images"),
        envelopes,
    ))
}
