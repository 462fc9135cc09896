//! Storage connectivity health.

mod cache;

pub use cache::{ConnectionStatus, DEFAULT_TTL_SECS, HealthCache, HealthSnapshot};
