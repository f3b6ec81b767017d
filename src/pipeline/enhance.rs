//! The fixed image-enhancement step applied before detection.
//!
//! Three operations, always in this order, with no feedback loop or
//! retry-with-different-parameters:
//!
//! 1. contrast boost by a factor of 2.0,
//! 2. conversion to single-channel grayscale,
//! 3. 2x linear upscale.
//!
//! The parameters are deliberately not configurable: they were tuned once
//! for rasterised PDF pages, where anti-aliased module edges and washed-out
//! scans are the common failure modes, and they are applied uniformly
//! regardless of input quality.

use image::imageops::{self, FilterType};
use image::{DynamicImage, GrayImage, Rgba};

/// Contrast multiplier applied around the mid-gray point.
pub const CONTRAST_FACTOR: f32 = 2.0;

/// Linear upscale factor.
pub const UPSCALE: u32 = 2;

/// Apply the fixed enhancement to an image, producing the grayscale buffer
/// handed to the detector.
pub fn enhance(img: &DynamicImage) -> GrayImage {
    let rgba = img.to_rgba8();

    let contrasted = image::ImageBuffer::from_fn(rgba.width(), rgba.height(), |x, y| {
        let Rgba([r, g, b, a]) = *rgba.get_pixel(x, y);
        let adjust = |channel: u8| -> u8 {
            let val = CONTRAST_FACTOR * (channel as f32 - 128.0) + 128.0;
            val.clamp(0.0, 255.0) as u8
        };
        Rgba([adjust(r), adjust(g), adjust(b), a])
    });

    let gray = DynamicImage::ImageRgba8(contrasted).to_luma8();

    imageops::resize(
        &gray,
        gray.width() * UPSCALE,
        gray.height() * UPSCALE,
        FilterType::Triangle,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn output_dimensions_are_doubled() {
        let img = DynamicImage::new_rgb8(30, 20);
        let out = enhance(&img);
        assert_eq!(out.dimensions(), (60, 40));
    }

    #[test]
    fn contrast_pushes_values_away_from_midgray() {
        // A uniform light-gray image: 180 → 2·(180−128)+128 = 232, give or
        // take a rounding step in the grayscale conversion.
        let gray = GrayImage::from_pixel(4, 4, Luma([180]));
        let out = enhance(&DynamicImage::ImageLuma8(gray));
        let v = out.get_pixel(0, 0).0[0];
        assert!((231..=233).contains(&v), "got {v}");
    }

    #[test]
    fn extremes_are_clamped() {
        let dark = GrayImage::from_pixel(4, 4, Luma([10]));
        let out = enhance(&DynamicImage::ImageLuma8(dark));
        assert_eq!(out.get_pixel(0, 0), &Luma([0]));

        let light = GrayImage::from_pixel(4, 4, Luma([250]));
        let out = enhance(&DynamicImage::ImageLuma8(light));
        assert_eq!(out.get_pixel(0, 0), &Luma([255]));
    }

    #[test]
    fn black_and_white_survive_unchanged() {
        let bw = GrayImage::from_fn(4, 4, |x, _| if x < 2 { Luma([0]) } else { Luma([255]) });
        let out = enhance(&DynamicImage::ImageLuma8(bw));
        assert_eq!(out.get_pixel(0, 0), &Luma([0]));
        assert_eq!(out.get_pixel(7, 0), &Luma([255]));
    }
}
