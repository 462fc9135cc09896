//! Object key generation.
//!
//! Keys have the form `{prefix}{hash}_{timestamp}.{ext}` where `hash` is the
//! first [`HASH_LEN`] hex characters of the SHA-256 digest of the content and
//! `timestamp` is UTC with microsecond resolution.

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

use crate::image::ImageFormat;

/// Number of hex characters of the content digest kept in the key.
pub const HASH_LEN: usize = 12;

/// Prefix used when the caller does not provide one.
pub const DEFAULT_PREFIX: &str = "generated/";

const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S_%6f";

/// Full lowercase hex SHA-256 digest of `data`.
#[must_use]
pub fn content_digest(data: &[u8]) -> String {
    format!("{:x}", Sha256::digest(data))
}

/// Generates a key for `data` stamped with the current time.
#[must_use]
pub fn generate_object_key(prefix: &str, data: &[u8], format: ImageFormat) -> String {
    object_key_at(prefix, data, format, Utc::now())
}

/// Generates a key for `data` stamped with `at`.
///
/// Identical content, prefix and instant always produce the same key.
#[must_use]
pub fn object_key_at(prefix: &str, data: &[u8], format: ImageFormat, at: DateTime<Utc>) -> String {
    let digest = content_digest(data);
    format!(
        "{}{}_{}.{}",
        normalize_prefix(prefix),
        &digest[..HASH_LEN],
        at.format(TIMESTAMP_FORMAT),
        format.extension()
    )
}

/// Object keys never start with a slash.
fn normalize_prefix(prefix: &str) -> &str {
    prefix.trim_start_matches('/')
}
