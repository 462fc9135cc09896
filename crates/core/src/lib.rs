//! Core business logic for the TOS upload service.
//!
//! This crate contains the upload pipeline with ZERO web dependencies.
//! HTTP concerns live in `tos-upload-api`.
//!
//! # Modules
//!
//! - `image` - Payload size guard and format detection
//! - `storage` - Object keys and the OpenDAL-backed object store
//! - `upload` - Single, Base64 and batch upload orchestration
//! - `health` - Cached storage connectivity probe

pub mod health;
pub mod image;
pub mod storage;
pub mod upload;

#[cfg(test)]
mod test_support;
