//! Best-effort image format detection.
//!
//! Detection never fails: magic bytes win, then the declared content-type
//! subtype, then `Unknown`, which is stored with the fallback extension.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Extension used when detection is inconclusive.
pub const FALLBACK_EXTENSION: &str = "jpg";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Jpeg,
    Png,
    Gif,
    Webp,
    Unknown,
}

impl ImageFormat {
    /// File extension (without dot) for stored files.
    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "jpeg",
            ImageFormat::Png => "png",
            ImageFormat::Gif => "gif",
            ImageFormat::Webp => "webp",
            ImageFormat::Unknown => FALLBACK_EXTENSION,
        }
    }

    /// Map a stored file's extension back to a format. `jpg` is read as JPEG.
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => ImageFormat::Jpeg,
            "png" => ImageFormat::Png,
            "gif" => ImageFormat::Gif,
            "webp" => ImageFormat::Webp,
            _ => ImageFormat::Unknown,
        }
    }

    fn from_mime_subtype(content_type: &str) -> Self {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or("")
            .trim()
            .to_ascii_lowercase();
        match essence.strip_prefix("image/") {
            Some("jpeg") | Some("jpg") | Some("pjpeg") => ImageFormat::Jpeg,
            Some("png") => ImageFormat::Png,
            Some("gif") => ImageFormat::Gif,
            Some("webp") => ImageFormat::Webp,
            _ => ImageFormat::Unknown,
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ImageFormat::Jpeg => "jpeg",
            ImageFormat::Png => "png",
            ImageFormat::Gif => "gif",
            ImageFormat::Webp => "webp",
            ImageFormat::Unknown => "unknown",
        };
        f.pad(s)
    }
}

/// Detect the format of `bytes`, using `content_type` as a hint when the bytes are inconclusive.
pub fn detect(bytes: &[u8], content_type: Option<&str>) -> ImageFormat {
    let sniffed = match image::guess_format(bytes) {
        Ok(image::ImageFormat::Jpeg) => ImageFormat::Jpeg,
        Ok(image::ImageFormat::Png) => ImageFormat::Png,
        Ok(image::ImageFormat::Gif) => ImageFormat::Gif,
        Ok(image::ImageFormat::WebP) => ImageFormat::Webp,
        Ok(other) => {
            tracing::debug!(?other, "sniffed image format outside the stored set");
            ImageFormat::Unknown
        }
        Err(_) => ImageFormat::Unknown,
    };
    if sniffed != ImageFormat::Unknown {
        return sniffed;
    }
    content_type
        .map(ImageFormat::from_mime_subtype)
        .unwrap_or(ImageFormat::Unknown)
}
