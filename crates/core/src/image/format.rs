//! Image format detection by byte signature.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::ImageError;

const JPEG_MAGIC: &[u8] = &[0xFF, 0xD8, 0xFF];
const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
const RIFF_MAGIC: &[u8] = b"RIFF";
const WEBP_MAGIC: &[u8] = b"WEBP";

/// Supported image formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// JPEG / JFIF / EXIF.
    #[serde(alias = "jpg")]
    Jpeg,
    /// PNG.
    Png,
    /// WebP in a RIFF container.
    Webp,
}

impl ImageFormat {
    /// All supported formats.
    pub const ALL: [Self; 3] = [Self::Jpeg, Self::Png, Self::Webp];

    /// Canonical MIME type.
    #[must_use]
    pub const fn mime_type(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Webp => "image/webp",
        }
    }

    /// File extension used in object keys, without the dot.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Webp => "webp",
        }
    }

    /// Maps a declared MIME type to a format. Accepts the non-standard `image/jpg`.
    #[must_use]
    pub fn from_mime_type(mime: &str) -> Option<Self> {
        let essence = mime.split(';').next().unwrap_or_default().trim();
        match essence.to_ascii_lowercase().as_str() {
            "image/jpeg" | "image/jpg" => Some(Self::Jpeg),
            "image/png" => Some(Self::Png),
            "image/webp" => Some(Self::Webp),
            _ => None,
        }
    }

    /// Detects the format from the leading bytes of `data`.
    ///
    /// Returns `None` when no supported signature matches.
    #[must_use]
    pub fn sniff(data: &[u8]) -> Option<Self> {
        if data.starts_with(JPEG_MAGIC) {
            Some(Self::Jpeg)
        } else if data.starts_with(PNG_MAGIC) {
            Some(Self::Png)
        } else if data.starts_with(RIFF_MAGIC) && data.get(8..12) == Some(WEBP_MAGIC) {
            Some(Self::Webp)
        } else {
            None
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Jpeg => "jpeg",
            Self::Png => "png",
            Self::Webp => "webp",
        })
    }
}

impl FromStr for ImageFormat {
    type Err = ImageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "jpeg" | "jpg" => Ok(Self::Jpeg),
            "png" => Ok(Self::Png),
            "webp" => Ok(Self::Webp),
            other => Err(ImageError::unsupported(format!(
                "Unsupported image format '{other}'. Supported: JPEG, PNG, WEBP"
            ))),
        }
    }
}

/// Confirms that `data` is a supported image and returns its detected format.
///
/// The declared format is a hint only: a mismatch with the detected format is
/// not an error, an undetectable signature is.
///
/// # Errors
///
/// Returns [`ImageError::Empty`] for empty input and
/// [`ImageError::UnsupportedFormat`] when no signature matches.
pub fn detect_format(data: &[u8], declared: Option<ImageFormat>) -> Result<ImageFormat, ImageError> {
    if data.is_empty() {
        return Err(ImageError::Empty);
    }

    let detected = ImageFormat::sniff(data).ok_or_else(|| {
        ImageError::unsupported("Unable to detect valid image format from file content")
    })?;

    if let Some(declared) = declared
        && declared != detected
    {
        tracing::debug!(%declared, %detected, "Declared format differs from content");
    }

    Ok(detected)
}
