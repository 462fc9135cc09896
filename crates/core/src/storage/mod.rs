//! Object storage for uploaded images using Apache OpenDAL.
//!
//! This module provides vendor-agnostic object storage with support for:
//! - S3-compatible: Volcano Engine TOS, AWS S3, Cloudflare R2
//! - Local filesystem (development only)
//! - In-process memory (tests only)
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      Apache OpenDAL                              │
//! │          (one pooled Operator, Timeout + Retry layers)           │
//! ├─────────────────────────────────────────────────────────────────┤
//! │ op.write_with("key", data)        │ op.check()                   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod error;
pub mod key;
mod service;

pub use config::{StorageConfig, StorageProvider};
pub use error::StorageError;
pub use key::{DEFAULT_PREFIX, content_digest, generate_object_key, object_key_at};
pub use service::{ObjectStore, PutOutcome, StorageService};
