//! Shared configuration and error types for the TOS upload service.
//!
//! This crate provides common types used across all other crates:
//! - Layered application configuration
//! - Application-wide error taxonomy with stable business codes

pub mod config;
pub mod error;

pub use config::{AppConfig, LogConfig, LogFormat, StorageSettings, UploadConfig};
pub use error::{AppError, codes};
