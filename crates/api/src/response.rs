//! Uniform response envelope and error responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::error;

use tos_upload_core::upload::UploadError;
use tos_upload_shared::{AppError, codes};

/// Envelope wrapping every API payload: `{success, code, message, data}`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    /// Whether the operation succeeded.
    pub success: bool,
    /// Business code; 0 on success.
    pub code: i32,
    /// Human readable message.
    pub message: String,
    /// Payload, `null` on failure.
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Successful envelope.
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            code: codes::SUCCESS,
            message: message.into(),
            data: Some(data),
        }
    }

    /// Failed envelope for `err`.
    #[must_use]
    pub fn failure(err: &AppError) -> Self {
        Self {
            success: false,
            code: err.error_code(),
            message: err.public_message(),
            data: None,
        }
    }

    /// Envelope for one item of a batch.
    pub fn from_result<E: Into<AppError>>(result: Result<T, E>, message: &str) -> Self {
        match result {
            Ok(data) => Self::ok(message, data),
            Err(e) => Self::failure(&e.into()),
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Error returned by handlers, rendered as a failed envelope.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl From<UploadError> for ApiError {
    fn from(err: UploadError) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            error!(error = %self.0, code = self.0.error_code(), "Request failed");
        }

        (status, Json(ApiResponse::<()>::failure(&self.0))).into_response()
    }
}

/// Handler result type.
pub type ApiResult<T> = Result<ApiResponse<T>, ApiError>;
