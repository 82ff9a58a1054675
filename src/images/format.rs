//! Magic-byte detection of accepted upload formats

use serde::Serialize;

use crate::error::{SleekError, SleekResult};

const PNG_SIGNATURE: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
const JPEG_SIGNATURE: &[u8] = &[0xFF, 0xD8, 0xFF];

/// How much of a text file is inspected when looking for an `<svg` root
const SVG_SNIFF_LEN: usize = 4096;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Png,
    Jpeg,
    Webp,
    Svg,
}

impl ImageFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Webp => "image/webp",
            ImageFormat::Svg => "image/svg+xml",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpg",
            ImageFormat::Webp => "webp",
            ImageFormat::Svg => "svg",
        }
    }

    pub fn is_raster(&self) -> bool {
        !matches!(self, ImageFormat::Svg)
    }
}

impl std::fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ImageFormat::Png => "PNG",
            ImageFormat::Jpeg => "JPEG",
            ImageFormat::Webp => "WebP",
            ImageFormat::Svg => "SVG",
        };
        f.write_str(label)
    }
}

/// Identify an image by its signature
pub fn detect_format(bytes: &[u8]) -> Option<ImageFormat> {
    if bytes.starts_with(PNG_SIGNATURE) {
        return Some(ImageFormat::Png);
    }
    if bytes.starts_with(JPEG_SIGNATURE) {
        return Some(ImageFormat::Jpeg);
    }
    if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        return Some(ImageFormat::Webp);
    }
    if looks_like_svg(bytes) {
        return Some(ImageFormat::Svg);
    }
    None
}

/// Reject empty, oversized or unrecognised uploads
pub fn validate_upload(bytes: &[u8], max_bytes: usize) -> SleekResult<ImageFormat> {
    if bytes.is_empty() {
        return Err(SleekError::Image("Upload is empty".into()));
    }
    if bytes.len() > max_bytes {
        return Err(SleekError::Image(format!(
            "Upload is {} bytes, the limit is {} bytes",
            bytes.len(),
            max_bytes
        )));
    }
    detect_format(bytes).ok_or_else(|| {
        SleekError::Image("Unsupported file type: expected PNG, JPEG, WebP or SVG".into())
    })
}

fn looks_like_svg(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(SVG_SNIFF_LEN)];
    // A cut in the middle of a multi-byte character only affects the tail
    let text = String::from_utf8_lossy(head);
    let mut rest = text.trim_start_matches('\u{feff}').trim_start();

    loop {
        if starts_with_ignore_case(rest, "<svg") {
            return true;
        }
        let skipped = if rest.starts_with("<?") {
            rest.find("?>").map(|end| end + 2)
        } else if rest.starts_with("<!--") {
            rest.find("-->").map(|end| end + 3)
        } else if starts_with_ignore_case(rest, "<!doctype") {
            rest.find('>').map(|end| end + 1)
        } else {
            None
        };
        match skipped {
            Some(offset) => rest = rest[offset..].trim_start(),
            None => return false,
        }
    }
}

fn starts_with_ignore_case(text: &str, prefix: &str) -> bool {
    text.len() >= prefix.len()
        && text.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
}
