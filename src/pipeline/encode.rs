//! Image encoding: `DynamicImage` → bytes in the input's format.
//!
//! The output format always matches the input format so the file keeps its
//! name and MIME tag. JPEG honours the 0–1 quality factor; PNG is lossless,
//! so quality is ignored and only dimension shrinks make it smaller.

use crate::error::CompressionError;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};
use image::{DynamicImage, ImageFormat};
use tracing::debug;

/// Map a 0–1 quality factor onto the JPEG encoder's 1–100 scale.
pub fn jpeg_quality(quality: f32) -> u8 {
    (quality * 100.0).round().clamp(1.0, 100.0) as u8
}

/// Encode `img` as `format` at the given quality.
///
/// Only JPEG and PNG are produced; any other format is
/// [`CompressionError::UnsupportedFormat`].
pub fn encode_image(
    img: &DynamicImage,
    format: ImageFormat,
    quality: f32,
) -> Result<Vec<u8>, CompressionError> {
    let mut buf = Vec::new();

    match format {
        ImageFormat::Jpeg => {
            let encoder = JpegEncoder::new_with_quality(&mut buf, jpeg_quality(quality));
            match img {
                DynamicImage::ImageRgb8(_) | DynamicImage::ImageLuma8(_) => {
                    img.write_with_encoder(encoder)?
                }
                // JPEG has no alpha channel and no 16-bit mode.
                _ => DynamicImage::ImageRgb8(img.to_rgb8()).write_with_encoder(encoder)?,
            }
        }
        ImageFormat::Png => {
            let encoder =
                PngEncoder::new_with_quality(&mut buf, CompressionType::Best, PngFilter::Adaptive);
            img.write_with_encoder(encoder)?;
        }
        other => {
            return Err(CompressionError::UnsupportedFormat {
                mime_type: other.to_mime_type().to_string(),
            })
        }
    }

    debug!(
        "Encoded {}x{} {:?} at q={:.2} → {} bytes",
        img.width(),
        img.height(),
        format,
        quality,
        buf.len()
    );
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn red_square() -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(16, 16, Rgba([255, 0, 0, 255])))
    }

    #[test]
    fn quality_maps_to_percent() {
        assert_eq!(jpeg_quality(0.8), 80);
        assert_eq!(jpeg_quality(1.0), 100);
        assert_eq!(jpeg_quality(0.0), 1);
        assert_eq!(jpeg_quality(3.0), 100);
    }

    #[test]
    fn rgba_encodes_as_jpeg() {
        let bytes = encode_image(&red_square(), ImageFormat::Jpeg, 0.8).expect("encode");
        assert_eq!(image::guess_format(&bytes).unwrap(), ImageFormat::Jpeg);
    }

    #[test]
    fn png_round_trips_dimensions() {
        let bytes = encode_image(&red_square(), ImageFormat::Png, 0.8).expect("encode");
        let back = image::load_from_memory_with_format(&bytes, ImageFormat::Png).unwrap();
        assert_eq!((back.width(), back.height()), (16, 16));
    }

    #[test]
    fn gif_is_unsupported() {
        let err = encode_image(&red_square(), ImageFormat::Gif, 0.8).unwrap_err();
        assert!(matches!(err, CompressionError::UnsupportedFormat { .. }));
    }
}
