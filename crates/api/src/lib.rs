//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST API routes for uploads and health probes
//! - API key middleware
//! - The uniform response envelope

pub mod middleware;
pub mod response;
pub mod routes;

use std::sync::Arc;
use std::time::Duration;

use axum::{BoxError, Router, error_handling::HandleErrorLayer};
use tower::ServiceBuilder;
use tower::timeout::error::Elapsed;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tos_upload_core::health::HealthCache;
use tos_upload_core::storage::StorageService;
use tos_upload_core::upload::UploadService;
use tos_upload_shared::{AppConfig, AppError};

use crate::response::ApiError;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Effective configuration.
    pub config: Arc<AppConfig>,
    /// Process-wide storage handle.
    pub storage: Arc<StorageService>,
    /// Upload pipeline over the shared storage handle.
    pub uploads: Arc<UploadService<StorageService>>,
    /// Cached storage connectivity.
    pub health: Arc<HealthCache<StorageService>>,
}

impl AppState {
    /// Wires the upload service and health cache around one storage handle.
    #[must_use]
    pub fn new(config: AppConfig, storage: StorageService) -> Self {
        let storage = Arc::new(storage);
        let uploads = UploadService::new(storage.clone(), (&config.upload).into());
        let health = HealthCache::with_ttl(
            storage.clone(),
            Duration::from_secs(config.health.cache_ttl_secs),
        );

        Self {
            config: Arc::new(config),
            storage,
            uploads: Arc::new(uploads),
            health: Arc::new(health),
        }
    }

    /// Drops the process-wide storage client and its connection pool.
    ///
    /// Must run after graceful shutdown completes, once the router and every
    /// in-flight request have released their clones of the state. Returns
    /// `false` when another handle still keeps the client alive.
    pub fn shutdown(self) -> bool {
        let Self {
            storage,
            uploads,
            health,
            ..
        } = self;
        drop(uploads);
        drop(health);

        match Arc::try_unwrap(storage) {
            Ok(storage) => {
                let provider = storage.provider_name();
                drop(storage);
                info!(provider, "Storage client released");
                true
            }
            Err(storage) => {
                warn!(
                    handles = Arc::strong_count(&storage),
                    "Storage client still referenced at shutdown"
                );
                false
            }
        }
    }
}

/// Renders middleware failures, a request timeout in particular, as envelopes.
fn middleware_error(err: &BoxError, timeout_secs: u64) -> ApiError {
    if err.is::<Elapsed>() {
        warn!(timeout_secs, "Request timed out");
        AppError::Timeout { secs: timeout_secs }.into()
    } else {
        AppError::Internal(err.to_string()).into()
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    let timeout_secs = state.config.server.request_timeout_secs;

    Router::new()
        .merge(routes::root_routes())
        .nest("/api/v1", routes::api_routes_with_state(&state))
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(move |err: BoxError| async move {
                    middleware_error(&err, timeout_secs)
                }))
                .timeout(Duration::from_secs(timeout_secs)),
        )
        .layer(CompressionLayer::new().gzip(true))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
