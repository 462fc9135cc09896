//! Image payload validation.
//!
//! - Size guard against the configured byte ceiling
//! - Content-based format detection (JPEG, PNG, WEBP)

mod error;
mod format;
mod guard;

pub use error::ImageError;
pub use format::{ImageFormat, detect_format};
pub use guard::{check_size, max_base64_len};
