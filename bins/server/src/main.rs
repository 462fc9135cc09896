//! TOS Upload Server
//!
//! Main entry point for the image upload service.

mod logging;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{info, warn};

use tos_upload_api::{AppState, create_router};
use tos_upload_core::storage::{StorageConfig, StorageService};
use tos_upload_shared::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;
    // Flushes buffered file logs when main returns
    let _log_guard = logging::init(&config.log);

    info!(
        service = %config.app.name,
        version = %config.app.version,
        port = config.server.port,
        provider = %config.storage.provider,
        endpoint = %config.storage.endpoint,
        bucket = %config.storage.bucket,
        max_file_size_mb = config.upload.max_file_size_mb,
        max_batch_size = config.upload.max_batch_size,
        log_level = %config.log.level,
        "Starting service"
    );
    if config.auth.api_key.is_empty() {
        warn!("auth.api_key is empty; every upload request will be rejected");
    }

    // One pooled storage handle for the process lifetime
    let storage_config =
        StorageConfig::from_settings(&config.storage).context("Invalid storage configuration")?;
    let storage =
        StorageService::from_config(storage_config).context("Failed to initialize storage")?;
    info!(
        provider = storage.provider_name(),
        bucket = storage.bucket(),
        "Storage configured"
    );

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::new(config, storage);
    let app = create_router(state.clone());

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    state.shutdown();
    info!("Service stopped");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl+C signal"),
        () = terminate => info!("Received terminate signal"),
    }

    info!("Shutting down gracefully...");
}
