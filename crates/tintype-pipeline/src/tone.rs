//! Per-pixel tone mappings: inversion, sepia, channel shifts, and
//! linear rescales.
//!
//! None of these look at neighbouring pixels. All arithmetic saturates.

use image::Rgb;

use crate::kernel::{saturate_f64, saturate_i32};
use crate::types::RgbImage;

/// Sepia weights, one row per output channel.
const SEPIA: [[f64; 3]; 3] = [
    [0.393, 0.769, 0.189],
    [0.349, 0.686, 0.168],
    [0.272, 0.534, 0.131],
];

/// Gain for the Dark Mood contrast.
pub const DARK_MOOD_CONTRAST_SCALE: f64 = 0.6;

/// Subtracted from the Dark Mood brightness.
pub const DARK_MOOD_BRIGHTNESS_OFFSET: i32 = 30;

/// Fixed gain of the Vivid filter.
pub const VIVID_GAIN: f64 = 1.5;

/// Vintage blend: `VINTAGE_WEIGHT * image + (1 - VINTAGE_WEIGHT) * VINTAGE_GRAY`.
pub const VINTAGE_WEIGHT: f64 = 0.7;
pub const VINTAGE_GRAY: u8 = 120;

/// Replace every sample with `255 - sample`.
#[must_use = "returns the inverted image"]
pub fn negative(image: &RgbImage) -> RgbImage {
    map_pixels(image, |p| p.map(|s| 255 - s))
}

/// Apply the sepia matrix, then blend with the original by `intensity`.
///
/// The matrix output is rounded and clipped first; the blend
/// `sepia * intensity + original * (1 - intensity)` is clipped and
/// truncated. Intensities outside `[0, 1]` extrapolate but still land
/// in range.
#[must_use = "returns the toned image"]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn sepia(image: &RgbImage, intensity: f32) -> RgbImage {
    let i = f64::from(intensity);
    map_pixels(image, |p| {
        let src = p.map(f64::from);
        let toned = SEPIA.map(|row| saturate_f64(row[0] * src[0] + row[1] * src[1] + row[2] * src[2]));
        let mut out = [0u8; 3];
        for ((slot, &t), &s) in out.iter_mut().zip(&toned).zip(&src) {
            *slot = f64::from(t).mul_add(i, s * (1.0 - i)).clamp(0.0, 255.0) as u8;
        }
        out
    })
}

/// Add a signed offset to each channel, clipping to `[0, 255]`.
#[must_use = "returns the shifted image"]
pub fn shift_channels(image: &RgbImage, offsets: [i32; 3]) -> RgbImage {
    map_pixels(image, |p| {
        let mut out = p;
        for (s, d) in out.iter_mut().zip(offsets) {
            *s = saturate_i32(i32::from(*s) + d);
        }
        out
    })
}

/// Channel 0 down 30, channel 2 up 40.
#[must_use = "returns the toned image"]
pub fn warm(image: &RgbImage) -> RgbImage {
    shift_channels(image, [-30, 0, 40])
}

/// Channel 0 up 40, channel 2 down 30.
#[must_use = "returns the toned image"]
pub fn cool(image: &RgbImage) -> RgbImage {
    shift_channels(image, [40, 0, -30])
}

/// `clip(round(sample * alpha + beta))` for every sample, ties to even.
#[must_use = "returns the rescaled image"]
#[allow(clippy::cast_precision_loss)]
pub fn linear(image: &RgbImage, alpha: f64, beta: f64) -> RgbImage {
    // Lookup table: 256 evaluations instead of one per sample.
    let lut: [u8; 256] = std::array::from_fn(|v| saturate_f64((v as f64).mul_add(alpha, beta)));
    map_pixels(image, |p| p.map(|s| lut[usize::from(s)]))
}

/// Bright Light: gain `contrast`, offset `brightness`.
#[must_use = "returns the rescaled image"]
pub fn bright_light(image: &RgbImage, brightness: i32, contrast: f32) -> RgbImage {
    linear(image, f64::from(contrast), f64::from(brightness))
}

/// Dark Mood: gain `contrast * 0.6`, offset `brightness - 30`.
#[must_use = "returns the rescaled image"]
pub fn dark_mood(image: &RgbImage, brightness: i32, contrast: f32) -> RgbImage {
    linear(
        image,
        f64::from(contrast) * DARK_MOOD_CONTRAST_SCALE,
        f64::from(brightness.saturating_sub(DARK_MOOD_BRIGHTNESS_OFFSET)),
    )
}

/// Vivid: fixed 1.5x gain.
#[must_use = "returns the rescaled image"]
pub fn vivid(image: &RgbImage) -> RgbImage {
    linear(image, VIVID_GAIN, 0.0)
}

/// Vintage: 70% image, 30% flat gray 120.
#[must_use = "returns the blended image"]
pub fn vintage(image: &RgbImage) -> RgbImage {
    linear(
        image,
        VINTAGE_WEIGHT,
        (1.0 - VINTAGE_WEIGHT) * f64::from(VINTAGE_GRAY),
    )
}

fn map_pixels(image: &RgbImage, f: impl Fn([u8; 3]) -> [u8; 3]) -> RgbImage {
    let mut out = image.clone();
    for pixel in out.pixels_mut() {
        *pixel = Rgb(f(pixel.0));
    }
    out
}
