//! Downscale and re-encode raster uploads with the `image` crate

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};
use image::codecs::webp::WebPEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};
use tracing::debug;

use crate::config::ImageSettings;
use crate::error::{SleekError, SleekResult};

use super::format::{validate_upload, ImageFormat};

/// Result of [`ImageOptimizer::optimize`]
#[derive(Debug, Clone)]
pub struct OptimizedImage {
    pub bytes: Vec<u8>,
    pub format: ImageFormat,
    /// Pixel size after optimization; `None` for SVG
    pub dimensions: Option<(u32, u32)>,
    pub original_size: usize,
    pub resized: bool,
}

impl OptimizedImage {
    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    /// Bytes saved relative to the upload
    pub fn saved_bytes(&self) -> usize {
        self.original_size.saturating_sub(self.bytes.len())
    }

    fn passthrough(bytes: &[u8], format: ImageFormat, dimensions: Option<(u32, u32)>) -> Self {
        Self {
            bytes: bytes.to_vec(),
            format,
            dimensions,
            original_size: bytes.len(),
            resized: false,
        }
    }
}

/// Shrinks raster images to a maximum edge length and re-encodes them in
/// their own format
#[derive(Debug, Clone)]
pub struct ImageOptimizer {
    max_upload_bytes: usize,
    max_dimension: u32,
    jpeg_quality: u8,
}

impl ImageOptimizer {
    pub fn new(max_upload_bytes: usize, max_dimension: u32, jpeg_quality: u8) -> Self {
        Self {
            max_upload_bytes,
            max_dimension: max_dimension.max(1),
            jpeg_quality: jpeg_quality.clamp(1, 100),
        }
    }

    pub fn from_settings(settings: &ImageSettings) -> Self {
        Self::new(
            settings.max_upload_bytes,
            settings.max_dimension,
            settings.jpeg_quality,
        )
    }

    /// Validate an upload and return its optimized form
    ///
    /// SVG is returned untouched. A raster image that did not need resizing
    /// keeps its original bytes when re-encoding would not make it smaller.
    pub fn optimize(&self, bytes: &[u8]) -> SleekResult<OptimizedImage> {
        let format = validate_upload(bytes, self.max_upload_bytes)?;

        let codec = match format {
            ImageFormat::Svg => return Ok(OptimizedImage::passthrough(bytes, format, None)),
            ImageFormat::Png => image::ImageFormat::Png,
            ImageFormat::Jpeg => image::ImageFormat::Jpeg,
            ImageFormat::Webp => image::ImageFormat::WebP,
        };

        let decoded = image::load_from_memory_with_format(bytes, codec)
            .map_err(|e| SleekError::Image(format!("Failed to decode {}: {}", format, e)))?;
        let original_dimensions = decoded.dimensions();

        let resized = original_dimensions.0 > self.max_dimension
            || original_dimensions.1 > self.max_dimension;
        let image = if resized {
            decoded.resize(self.max_dimension, self.max_dimension, FilterType::Lanczos3)
        } else {
            decoded
        };
        let dimensions = image.dimensions();

        let encoded = self.encode(&image, format)?;

        debug!(
            %format,
            original = bytes.len(),
            encoded = encoded.len(),
            from = ?original_dimensions,
            to = ?dimensions,
            "image optimized"
        );

        if !resized && encoded.len() >= bytes.len() {
            return Ok(OptimizedImage::passthrough(bytes, format, Some(dimensions)));
        }

        Ok(OptimizedImage {
            bytes: encoded,
            format,
            dimensions: Some(dimensions),
            original_size: bytes.len(),
            resized,
        })
    }

    fn encode(&self, image: &DynamicImage, format: ImageFormat) -> SleekResult<Vec<u8>> {
        let mut buffer = Cursor::new(Vec::new());

        let written = match format {
            ImageFormat::Png => image.write_with_encoder(PngEncoder::new_with_quality(
                &mut buffer,
                CompressionType::Best,
                PngFilter::Adaptive,
            )),
            // JPEG has no alpha channel
            ImageFormat::Jpeg => DynamicImage::ImageRgb8(image.to_rgb8()).write_with_encoder(
                JpegEncoder::new_with_quality(&mut buffer, self.jpeg_quality),
            ),
            ImageFormat::Webp => DynamicImage::ImageRgba8(image.to_rgba8())
                .write_with_encoder(WebPEncoder::new_lossless(&mut buffer)),
            ImageFormat::Svg => {
                return Err(SleekError::Image("SVG images are not re-encoded".into()))
            }
        };

        written.map_err(|e| SleekError::Image(format!("Failed to encode {}: {}", format, e)))?;
        Ok(buffer.into_inner())
    }
}

impl Default for ImageOptimizer {
    fn default() -> Self {
        Self::from_settings(&ImageSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb, Rgba};

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = ImageBuffer::from_fn(width, height, |x, y| {
            Rgba([(x % 256) as u8, (y % 256) as u8, 128, 255])
        });
        let mut buffer = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(img)
            .write_to(&mut buffer, image::ImageFormat::Png)
            .unwrap();
        buffer.into_inner()
    }

    fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = ImageBuffer::from_fn(width, height, |x, y| {
            Rgb([(x * 3 % 256) as u8, (y * 5 % 256) as u8, 90])
        });
        let mut buffer = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(img)
            .write_with_encoder(JpegEncoder::new_with_quality(&mut buffer, 100))
            .unwrap();
        buffer.into_inner()
    }

    #[test]
    fn test_large_png_is_downscaled_keeping_aspect() {
        let optimizer = ImageOptimizer::new(10 * 1024 * 1024, 64, 80);
        let result = optimizer.optimize(&png_bytes(256, 128)).unwrap();

        assert!(result.resized);
        assert_eq!(result.format, ImageFormat::Png);
        assert_eq!(result.dimensions, Some((64, 32)));
        assert_eq!(
            crate::images::detect_format(&result.bytes),
            Some(ImageFormat::Png)
        );
    }

    #[test]
    fn test_jpeg_quality_reduces_size() {
        let original = jpeg_bytes(120, 120);
        let optimizer = ImageOptimizer::new(10 * 1024 * 1024, 2048, 40);
        let result = optimizer.optimize(&original).unwrap();

        assert!(!result.resized);
        assert_eq!(result.dimensions, Some((120, 120)));
        assert!(result.size() < original.len());
        assert_eq!(result.saved_bytes(), original.len() - result.size());
    }

    #[test]
    fn test_small_image_never_grows() {
        let original = png_bytes(4, 4);
        let result = ImageOptimizer::default().optimize(&original).unwrap();
        assert!(result.size() <= original.len());
    }

    #[test]
    fn test_svg_passthrough() {
        let svg = b"<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"10\" height=\"10\"/>";
        let result = ImageOptimizer::default().optimize(svg).unwrap();
        assert_eq!(result.bytes, svg.to_vec());
        assert_eq!(result.format, ImageFormat::Svg);
        assert_eq!(result.dimensions, None);
    }

    #[test]
    fn test_rejects_oversized_and_corrupt() {
        let optimizer = ImageOptimizer::new(16, 2048, 80);
        assert!(optimizer.optimize(&png_bytes(32, 32)).is_err());

        let mut corrupt = vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
        corrupt.extend_from_slice(&[0u8; 8]);
        let result = ImageOptimizer::new(1024, 2048, 80).optimize(&corrupt);
        assert!(matches!(result, Err(SleekError::Image(_))));
    }
}
