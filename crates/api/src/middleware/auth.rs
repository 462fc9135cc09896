//! API key middleware for upload routes.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use subtle::ConstantTimeEq;
use tracing::warn;

use crate::AppState;
use crate::response::ApiError;
use tos_upload_shared::AppError;

/// Header carrying the shared API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Rejects requests whose `X-API-Key` header is absent or wrong.
///
/// Missing header maps to 40101, any other mismatch to 40102.
pub async fn api_key_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let Some(header) = request.headers().get(API_KEY_HEADER) else {
        return ApiError(AppError::MissingApiKey).into_response();
    };

    if !key_matches(header.as_bytes(), state.config.auth.api_key.as_bytes()) {
        warn!(path = %request.uri().path(), "Rejected request with invalid API key");
        return ApiError(AppError::InvalidApiKey).into_response();
    }

    next.run(request).await
}

/// Constant-time comparison. An empty configured key matches nothing.
fn key_matches(provided: &[u8], expected: &[u8]) -> bool {
    if expected.is_empty() || provided.len() != expected.len() {
        return false;
    }
    provided.ct_eq(expected).into()
}
