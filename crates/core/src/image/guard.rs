//! Payload size guard.
//!
//! The cheapest filter in the pipeline, so it runs before signature sniffing
//! and long before any storage call.

use super::error::ImageError;

/// Rejects payloads larger than `max` bytes.
///
/// # Errors
///
/// Returns [`ImageError::TooLarge`] when `size > max`.
pub fn check_size(size: u64, max: u64) -> Result<(), ImageError> {
    if size > max {
        return Err(ImageError::too_large(size, max));
    }
    Ok(())
}

/// Upper bound on the Base64 text length that can decode to at most `max` bytes.
///
/// Lets callers reject oversized payloads before paying for the decode.
#[must_use]
pub const fn max_base64_len(max: u64) -> u64 {
    max.div_ceil(3) * 4
}
