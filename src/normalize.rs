//! Normalization of fetched image bytes to canonical PNG.
//!
//! Format detection works on leading magic bytes only. The server-declared
//! content type and the URL extension are untrusted: webcams routinely serve
//! JPEG data from `.cgi` endpoints with a `text/plain` content type.

use std::io::Cursor;

use image::ImageFormat;

use crate::error::{Result, ScrapeError};

const PNG_MAGIC: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];
const JPEG_MAGIC: [u8; 3] = [0xff, 0xd8, 0xff];

/// Image format detected from magic bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Png,
    Jpeg,
    Unknown,
}

/// Detect the image format from the leading bytes of `data`.
pub fn detect(data: &[u8]) -> ImageKind {
    if data.starts_with(&PNG_MAGIC) {
        ImageKind::Png
    } else if data.starts_with(&JPEG_MAGIC) {
        ImageKind::Jpeg
    } else {
        ImageKind::Unknown
    }
}

/// Convert fetched image bytes to PNG.
///
/// PNG input passes through byte-identical. JPEG input is decoded and
/// re-encoded. Anything else is rejected and nothing reaches disk.
pub fn to_png(data: Vec<u8>) -> Result<Vec<u8>> {
    match detect(&data) {
        ImageKind::Png => Ok(data),
        ImageKind::Jpeg => {
            let img = image::load_from_memory_with_format(&data, ImageFormat::Jpeg)?;
            let mut buf = Vec::new();
            img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)?;
            Ok(buf)
        }
        ImageKind::Unknown => Err(ScrapeError::UnsupportedFormat),
    }
}
