//! Upload orchestration.
//!
//! Turns validated image payloads into stored objects:
//!
//! 1. Size guard (before any decode when the input is Base64)
//! 2. Content-based format detection
//! 3. Object key generation
//! 4. A single put against the [`ObjectStore`](crate::storage::ObjectStore)
//!
//! Batches run items concurrently and report per-item outcomes.

mod error;
mod service;
mod types;

pub use error::UploadError;
pub use service::{BatchItemResult, UploadService};
pub use types::{Base64Upload, ImageUpload, QUALITY_RANGE, UploadPolicy, UploadResult};
