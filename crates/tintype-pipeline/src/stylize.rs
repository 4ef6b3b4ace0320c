//! Composite effects built from the primitives in the other modules:
//! pencil sketch, cartoon, and emboss.

use image::{Luma, Rgb};

use crate::blur::{bilateral, gaussian_blur, median_blur};
use crate::grayscale::{expand, to_luma};
use crate::kernel::{correlate_3x3, replicate, saturate_f64};
use crate::types::{GrayImage, RgbImage};

/// Kernel side for the blurred inverse in the pencil sketch.
pub const SKETCH_BLUR_SIZE: u32 = 21;

/// Median window applied to the luminance before the cartoon threshold.
pub const CARTOON_MEDIAN_SIZE: u32 = 5;

/// Block side and offset of the cartoon's adaptive threshold.
pub const CARTOON_BLOCK_SIZE: u32 = 9;
pub const CARTOON_THRESHOLD_OFFSET: i32 = 9;

/// Bilateral settings for the cartoon's colour smoothing.
pub const CARTOON_BILATERAL_DIAMETER: u32 = 9;
pub const CARTOON_BILATERAL_SIGMA: f32 = 250.0;

/// Emboss kernel, applied without flipping.
pub const EMBOSS_KERNEL: [[i32; 3]; 3] = [[-2, -1, 0], [-1, 1, 1], [0, 1, 2]];

/// Bias added after the emboss correlation.
pub const EMBOSS_BIAS: u8 = 128;

/// Dodge-blend pencil sketch.
///
/// The luminance is divided by the inverse of its own blurred inverse,
/// scaled by 256. Where the blurred inverse is 255 the result is 0.
#[must_use = "returns the sketch"]
pub fn pencil_sketch(image: &RgbImage) -> RgbImage {
    let gray = to_luma(image);
    let mut inverse = gray.clone();
    for p in inverse.pixels_mut() {
        p.0[0] = 255 - p.0[0];
    }
    let blurred = gaussian_blur(&inverse, SKETCH_BLUR_SIZE);

    let sketch = GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        let g = gray.get_pixel(x, y).0[0];
        let denominator = 255 - blurred.get_pixel(x, y).0[0];
        Luma([dodge(g, denominator)])
    });
    expand(&sketch)
}

fn dodge(value: u8, denominator: u8) -> u8 {
    if denominator == 0 {
        return 0;
    }
    saturate_f64(f64::from(value) * 256.0 / f64::from(denominator))
}

/// Binary threshold against the local mean.
///
/// Each pixel becomes 255 when `pixel - mean > -offset`, where `mean` is
/// the rounded average over a `block_size` square (replicated borders),
/// and 0 otherwise.
#[must_use = "returns the binary mask"]
#[allow(clippy::cast_possible_wrap, clippy::cast_possible_truncation)]
pub fn adaptive_mean_threshold(image: &GrayImage, block_size: u32, offset: i32) -> GrayImage {
    let (width, height) = image.dimensions();
    let radius = i64::from(block_size / 2);
    let area = (2 * radius + 1) * (2 * radius + 1);

    GrayImage::from_fn(width, height, |x, y| {
        let mut sum = 0i64;
        for dy in -radius..=radius {
            let sy = replicate(i64::from(y) + dy, height);
            for dx in -radius..=radius {
                let sx = replicate(i64::from(x) + dx, width);
                sum += i64::from(image.get_pixel(sx, sy).0[0]);
            }
        }
        // Round half up; `sum` and `area` are both non-negative.
        let mean = ((2 * sum + area) / (2 * area)) as i32;
        let value = i32::from(image.get_pixel(x, y).0[0]);
        Luma([if value - mean > -offset { 255 } else { 0 }])
    })
}

/// Flat colour regions outlined in black.
///
/// The bilateral-smoothed colour is kept where the adaptive threshold of
/// the median-filtered luminance is set and blacked out elsewhere.
#[must_use = "returns the cartoon image"]
pub fn cartoon(image: &RgbImage) -> RgbImage {
    let gray = median_blur(&to_luma(image), CARTOON_MEDIAN_SIZE);
    let mask = adaptive_mean_threshold(&gray, CARTOON_BLOCK_SIZE, CARTOON_THRESHOLD_OFFSET);
    let color = bilateral(
        image,
        CARTOON_BILATERAL_DIAMETER,
        CARTOON_BILATERAL_SIGMA,
        CARTOON_BILATERAL_SIGMA,
    );

    RgbImage::from_fn(image.width(), image.height(), |x, y| {
        if mask.get_pixel(x, y).0[0] == 0 {
            Rgb([0, 0, 0])
        } else {
            *color.get_pixel(x, y)
        }
    })
}

/// Relief effect: [`EMBOSS_KERNEL`] correlation plus a mid-gray bias.
#[must_use = "returns the embossed image"]
pub fn emboss(image: &RgbImage) -> RgbImage {
    let mut out = correlate_3x3(image, EMBOSS_KERNEL);
    for p in out.pixels_mut() {
        *p = Rgb(p.0.map(|s| s.saturating_add(EMBOSS_BIAS)));
    }
    out
}
