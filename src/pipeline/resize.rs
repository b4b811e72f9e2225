//! Dimension fitting: shrink a decoded image so its longest edge fits a cap.
//!
//! Resizing never upscales and always preserves the aspect ratio. The first
//! fit uses Lanczos3 because it is the resize the user actually sees; the
//! incremental shrinks applied while chasing a byte budget use the cheaper
//! Triangle filter, since each of those steps is only 5 % and quality is
//! already being traded away.

use image::imageops::FilterType;
use image::DynamicImage;
use tracing::debug;

/// Scale `(width, height)` down so neither edge exceeds `max_edge`.
///
/// Returns the input unchanged when it already fits. The shorter edge is
/// never rounded below 1 px.
pub fn target_dimensions(width: u32, height: u32, max_edge: u32) -> (u32, u32) {
    if width <= max_edge && height <= max_edge {
        return (width, height);
    }

    if width >= height {
        let scaled_height = ((height as f64) * (max_edge as f64) / (width as f64)).round() as u32;
        (max_edge, scaled_height.max(1))
    } else {
        let scaled_width = ((width as f64) * (max_edge as f64) / (height as f64)).round() as u32;
        (scaled_width.max(1), max_edge)
    }
}

/// Fit `img` within a `max_edge` × `max_edge` box.
pub fn fit_within(img: DynamicImage, max_edge: u32) -> DynamicImage {
    let (width, height) = (img.width(), img.height());
    let (target_w, target_h) = target_dimensions(width, height, max_edge);
    if (target_w, target_h) == (width, height) {
        return img;
    }

    debug!(
        "Fitting {}x{} → {}x{} (max edge {})",
        width, height, target_w, target_h, max_edge
    );
    img.resize_exact(target_w, target_h, FilterType::Lanczos3)
}

/// Scale both edges by `factor` (expected in `(0, 1)`), keeping each ≥ 1 px.
pub fn shrink(img: &DynamicImage, factor: f32) -> DynamicImage {
    let (width, height) = (img.width(), img.height());
    let target_w = ((width as f32 * factor).round() as u32).max(1);
    let target_h = ((height as f32 * factor).round() as u32).max(1);
    if (target_w, target_h) == (width, height) {
        return img.clone();
    }
    img.resize_exact(target_w, target_h, FilterType::Triangle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn fits_already_small_dimensions_unchanged() {
        assert_eq!(target_dimensions(800, 600, 1200), (800, 600));
        assert_eq!(target_dimensions(1200, 1200, 1200), (1200, 1200));
    }

    #[test]
    fn landscape_caps_width() {
        assert_eq!(target_dimensions(4000, 3000, 1200), (1200, 900));
    }

    #[test]
    fn portrait_caps_height() {
        assert_eq!(target_dimensions(1500, 3000, 1200), (600, 1200));
    }

    #[test]
    fn extreme_aspect_keeps_one_pixel() {
        assert_eq!(target_dimensions(10_000, 2, 1200), (1200, 1));
    }

    #[test]
    fn fit_within_resizes_longest_edge() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(300, 150, Rgb([10, 20, 30])));
        let out = fit_within(img, 100);
        assert_eq!((out.width(), out.height()), (100, 50));
    }

    #[test]
    fn shrink_never_reaches_zero() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(1, 1, Rgb([0, 0, 0])));
        let out = shrink(&img, 0.5);
        assert_eq!((out.width(), out.height()), (1, 1));
    }
}
