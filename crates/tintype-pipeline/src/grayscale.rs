//! Image decoding and luminance conversion.
//!
//! Accepts raw image bytes (PNG, JPEG, BMP, WebP) and produces the
//! three-channel 8-bit raster every filter operates on. Also provides
//! the luminance conversion shared by the gray-based filters and the
//! helper that re-expands a single channel back to RGB.

use image::{Luma, Rgb};

use crate::types::{GrayImage, PipelineError, RgbImage};

// BT.601 weights in 14-bit fixed point: 0.299, 0.587, 0.114.
const R_WEIGHT: u32 = 4899;
const G_WEIGHT: u32 = 9617;
const B_WEIGHT: u32 = 1868;
const SHIFT: u32 = 14;

/// Decode raw image bytes into an RGB raster.
///
/// Alpha is dropped and grayscale or 16-bit sources are normalized to
/// three 8-bit channels.
///
/// # Errors
///
/// Returns [`PipelineError::EmptyInput`] if `bytes` is empty.
/// Returns [`PipelineError::ImageDecode`] if the image format is
/// unrecognized or the data is corrupt.
pub fn decode(bytes: &[u8]) -> Result<RgbImage, PipelineError> {
    if bytes.is_empty() {
        return Err(PipelineError::EmptyInput);
    }

    let img = image::load_from_memory(bytes)?;
    Ok(img.to_rgb8())
}

/// Luminance of one RGB sample: `0.299*R + 0.587*G + 0.114*B`, rounded.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub const fn luma(r: u8, g: u8, b: u8) -> u8 {
    let weighted = r as u32 * R_WEIGHT + g as u32 * G_WEIGHT + b as u32 * B_WEIGHT;
    ((weighted + (1 << (SHIFT - 1))) >> SHIFT) as u8
}

/// Convert an RGB image to single-channel luminance.
///
/// Uses fixed BT.601 weights rather than `image`'s built-in conversion,
/// which weights channels for linear sRGB.
#[must_use = "returns the luminance image"]
pub fn to_luma(image: &RgbImage) -> GrayImage {
    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        let [r, g, b] = image.get_pixel(x, y).0;
        Luma([luma(r, g, b)])
    })
}

/// Replicate a single channel into all three RGB channels.
#[must_use = "returns the expanded RGB image"]
pub fn expand(gray: &GrayImage) -> RgbImage {
    RgbImage::from_fn(gray.width(), gray.height(), |x, y| {
        let v = gray.get_pixel(x, y).0[0];
        Rgb([v, v, v])
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    /// Helper: encode an RGBA image as a PNG byte buffer.
    fn encode_rgba(img: &image::RgbaImage) -> Vec<u8> {
        let mut buf = Vec::new();
        let encoder = image::codecs::png::PngEncoder::new(&mut buf);
        image::ImageEncoder::write_image(
            encoder,
            img.as_raw(),
            img.width(),
            img.height(),
            image::ExtendedColorType::Rgba8,
        )
        .unwrap();
        buf
    }

    #[test]
    fn empty_input_returns_error() {
        let result = decode(&[]);
        assert!(matches!(result, Err(PipelineError::EmptyInput)));
    }

    #[test]
    fn corrupt_bytes_returns_image_decode_error() {
        let result = decode(&[0xFF, 0xFE, 0x00, 0x01]);
        assert!(matches!(result, Err(PipelineError::ImageDecode(_))));
    }

    #[test]
    fn rgba_png_decodes_to_rgb() {
        let img = image::RgbaImage::from_fn(17, 31, |_, _| image::Rgba([128, 64, 32, 7]));
        let rgb = decode(&encode_rgba(&img)).unwrap();
        assert_eq!(rgb.dimensions(), (17, 31));
        for pixel in rgb.pixels() {
            assert_eq!(pixel.0, [128, 64, 32]);
        }
    }

    #[test]
    fn luma_of_primaries() {
        assert_eq!(luma(255, 0, 0), 76);
        assert_eq!(luma(0, 255, 0), 150);
        assert_eq!(luma(0, 0, 255), 29);
        assert_eq!(luma(255, 255, 255), 255);
        assert_eq!(luma(0, 0, 0), 0);
    }

    #[test]
    fn luma_of_gray_is_unchanged() {
        for v in [1u8, 17, 100, 128, 254] {
            assert_eq!(luma(v, v, v), v);
        }
    }

    #[test]
    fn to_luma_preserves_dimensions() {
        let img = RgbImage::new(13, 29);
        let gray = to_luma(&img);
        assert_eq!(gray.dimensions(), (13, 29));
    }

    #[test]
    fn expand_replicates_channel() {
        let gray = GrayImage::from_fn(3, 2, |x, y| Luma([u8::try_from(x * 10 + y).unwrap()]));
        let rgb = expand(&gray);
        assert_eq!(rgb.dimensions(), (3, 2));
        assert_eq!(rgb.get_pixel(2, 1).0, [21, 21, 21]);
    }
}
