//! Tracing subscriber setup: stdout plus optional daily rotated log files.

use std::path::Path;

use anyhow::Context;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use tos_upload_shared::{LogConfig, LogFormat};

const FILE_PREFIX: &str = "tos_upload";

/// Installs the global subscriber. `RUST_LOG` wins over `log.level`.
///
/// The returned guard flushes the file writer on drop; keep it alive for the
/// life of the process. File logging falls back to stdout only when the log
/// directory is unusable.
pub fn init(config: &LogConfig) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "{level},tower_http={level}",
            level = config.level
        ))
    });
    let json = config.format == LogFormat::Json;

    let appender = config
        .file_enabled
        .then(|| file_appender(Path::new(&config.dir)))
        .transpose();
    let (appender, file_error) = match appender {
        Ok(appender) => (appender, None),
        Err(e) => (None, Some(e)),
    };
    let (writer, guard) = appender.map(tracing_appender::non_blocking).unzip();

    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| fmt::layer().json()))
        .with((!json).then(fmt::layer))
        .with(writer.map(|w| fmt::layer().with_ansi(false).with_writer(w)))
        .init();

    if let Some(e) = file_error {
        let error = format!("{e:#}");
        warn!(dir = %config.dir, %error, "File logging disabled, writing to stdout only");
    } else if guard.is_some() {
        info!(dir = %config.dir, "File logging enabled");
    }

    guard
}

/// Daily rotated `tos_upload.YYYY-MM-DD.log` files under `dir`.
fn file_appender(dir: &Path) -> anyhow::Result<RollingFileAppender> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("cannot create log directory {}", dir.display()))?;

    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(FILE_PREFIX)
        .filename_suffix("log")
        .build(dir)
        .context("cannot open log file")
}
