//! Health check endpoints.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tos_upload_core::health::ConnectionStatus;

use crate::AppState;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: &'static str,
    /// Service name.
    pub service: String,
    /// Service version.
    pub version: String,
    /// Cached storage connectivity.
    pub tos_connection: ConnectionStatus,
    /// Response time.
    pub timestamp: DateTime<Utc>,
}

/// Liveness or readiness probe response.
#[derive(Debug, Serialize)]
pub struct ProbeResponse {
    /// Probe outcome.
    pub status: &'static str,
    /// Why the service is not ready.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<&'static str>,
}

/// Health check handler. Reports storage status from the cache.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let snapshot = state.health.status().await;

    Json(HealthResponse {
        status: "healthy",
        service: state.config.app.name.clone(),
        version: state.config.app.version.clone(),
        tos_connection: snapshot.status,
        timestamp: Utc::now(),
    })
}

/// Liveness never touches storage.
async fn liveness() -> Json<ProbeResponse> {
    Json(ProbeResponse {
        status: "alive",
        reason: None,
    })
}

async fn readiness(State(state): State<AppState>) -> Response {
    if state.health.status().await.status.is_ok() {
        return Json(ProbeResponse {
            status: "ready",
            reason: None,
        })
        .into_response();
    }

    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(ProbeResponse {
            status: "not_ready",
            reason: Some("TOS connection failed"),
        }),
    )
        .into_response()
}

/// Creates health check routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/health/live", get(liveness))
        .route("/health/ready", get(readiness))
}
