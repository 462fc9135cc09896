//! API route definitions.

use axum::{Json, Router, extract::State, middleware, routing::get};
use serde::Serialize;

use crate::{AppState, middleware::api_key_middleware};

pub mod health;
pub mod upload;

/// Service information returned by `GET /`.
#[derive(Debug, Serialize)]
pub struct ServiceInfo {
    /// Service name.
    pub service: String,
    /// Service version.
    pub version: String,
    /// Listening port.
    pub port: u16,
    /// Health endpoint path.
    pub health: &'static str,
    /// Enabled capabilities.
    pub features: [&'static str; 5],
}

async fn service_info(State(state): State<AppState>) -> Json<ServiceInfo> {
    let config = &state.config;
    Json(ServiceInfo {
        service: config.app.name.clone(),
        version: config.app.version.clone(),
        port: config.server.port,
        health: "/api/v1/health",
        features: [
            "async_operations",
            "connection_pooling",
            "batch_upload",
            "gzip_compression",
            "structured_logging",
        ],
    })
}

/// Routes mounted at the server root.
pub fn root_routes() -> Router<AppState> {
    Router::new().route("/", get(service_info))
}

/// Creates the `/api/v1` router: public health probes plus key-protected uploads.
pub fn api_routes_with_state(state: &AppState) -> Router<AppState> {
    let protected_routes = upload::routes(&state.config.upload).layer(
        middleware::from_fn_with_state(state.clone(), api_key_middleware),
    );

    Router::new()
        .merge(health::routes())
        .merge(protected_routes)
}
