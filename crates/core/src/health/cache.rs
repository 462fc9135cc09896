//! Storage health caching using Moka.
//!
//! Probing the bucket on every health request would hammer the backend, so
//! the last probe result is kept for a fixed TTL. Moka coalesces concurrent
//! initialisations of the same key, which makes the refresh single-flight:
//! any number of callers arriving on a cold or expired cache share one probe.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use moka::future::Cache;
use serde::Serialize;
use tracing::{debug, warn};

use crate::storage::ObjectStore;

/// Default time-to-live for a probe result (30 seconds).
pub const DEFAULT_TTL_SECS: u64 = 30;

/// Result of a storage connectivity probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    /// Backend reachable.
    Ok,
    /// Backend unreachable or refusing access.
    Error,
}

impl ConnectionStatus {
    /// Wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Error => "error",
        }
    }

    /// Whether the backend is usable.
    #[must_use]
    pub const fn is_ok(self) -> bool {
        matches!(self, Self::Ok)
    }
}

/// Cached probe outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthSnapshot {
    /// Probe outcome.
    pub status: ConnectionStatus,
    /// When the probe ran.
    pub checked_at: DateTime<Utc>,
}

/// Single-flight, time-bounded cache over [`ObjectStore::probe`].
pub struct HealthCache<S: ObjectStore> {
    store: Arc<S>,
    cache: Cache<(), HealthSnapshot>,
}

impl<S: ObjectStore> HealthCache<S> {
    /// Creates a health cache with the default 30 second TTL.
    #[must_use]
    pub fn new(store: Arc<S>) -> Self {
        Self::with_ttl(store, Duration::from_secs(DEFAULT_TTL_SECS))
    }

    /// Creates a health cache with a custom TTL.
    #[must_use]
    pub fn with_ttl(store: Arc<S>, ttl: Duration) -> Self {
        let cache = Cache::builder().max_capacity(1).time_to_live(ttl).build();
        Self { store, cache }
    }

    /// Returns the cached probe result, probing the backend if it expired.
    ///
    /// Concurrent callers during a refresh wait for the same probe.
    pub async fn status(&self) -> HealthSnapshot {
        self.cache
            .get_with((), async {
                let status = match self.store.probe().await {
                    Ok(()) => ConnectionStatus::Ok,
                    Err(e) => {
                        warn!(error = %e, "Storage probe failed");
                        ConnectionStatus::Error
                    }
                };
                debug!(status = status.as_str(), "Storage probe refreshed");
                HealthSnapshot {
                    status,
                    checked_at: Utc::now(),
                }
            })
            .await
    }

    /// Drops the cached result so the next call probes again.
    pub async fn invalidate(&self) {
        self.cache.invalidate(&()).await;
    }
}
