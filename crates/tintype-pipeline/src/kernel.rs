//! Sample saturation, border handling, and small fixed-kernel correlation.
//!
//! Every filter that can leave the 8-bit range funnels its results
//! through [`saturate`] (or the integer variant) so that overflow clips
//! instead of wrapping.

use image::{ImageBuffer, Pixel};

/// Round to nearest (ties to even) and clip into `[0, 255]`.
///
/// `NaN` maps to 0.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn saturate(value: f32) -> u8 {
    value.round_ties_even().clamp(0.0, 255.0) as u8
}

/// [`saturate`] for double-precision intermediates.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn saturate_f64(value: f64) -> u8 {
    value.round_ties_even().clamp(0.0, 255.0) as u8
}

/// Clip an integer sample into `[0, 255]`.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub const fn saturate_i32(value: i32) -> u8 {
    if value < 0 {
        0
    } else if value > 255 {
        255
    } else {
        value as u8
    }
}

/// Map an out-of-range index back into `0..len` by mirroring around
/// the edge samples without repeating them (`dcb|abcd|cba`).
///
/// This is the default border mode for the convolution filters.
#[must_use]
#[allow(
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss,
    clippy::cast_possible_truncation
)]
pub fn reflect_101(index: i64, len: u32) -> u32 {
    if len <= 1 {
        return 0;
    }
    let n = i64::from(len);
    let period = 2 * (n - 1);
    let mut m = index.rem_euclid(period);
    if m >= n {
        m = period - m;
    }
    m as u32
}

/// Clamp an out-of-range index to the nearest edge sample (`aaa|abcd|ddd`).
#[must_use]
#[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
pub fn replicate(index: i64, len: u32) -> u32 {
    index.clamp(0, i64::from(len.saturating_sub(1))) as u32
}

/// Correlate every channel with a 3x3 integer kernel.
///
/// The kernel is applied as written (no flip), centred on the output
/// pixel, with [`reflect_101`] borders. Each channel sum is clipped
/// with [`saturate_i32`].
#[must_use]
pub fn correlate_3x3<P>(
    image: &ImageBuffer<P, Vec<u8>>,
    kernel: [[i32; 3]; 3],
) -> ImageBuffer<P, Vec<u8>>
where
    P: Pixel<Subpixel = u8>,
{
    let (width, height) = image.dimensions();
    let mut out: ImageBuffer<P, Vec<u8>> = ImageBuffer::new(width, height);

    for (x, y, pixel) in out.enumerate_pixels_mut() {
        let mut sums = [0i32; 4];
        for (ky, row) in kernel.iter().enumerate() {
            let sy = reflect_101(i64::from(y) + ky as i64 - 1, height);
            for (kx, &weight) in row.iter().enumerate() {
                if weight == 0 {
                    continue;
                }
                let sx = reflect_101(i64::from(x) + kx as i64 - 1, width);
                let source = image.get_pixel(sx, sy);
                for (sum, &sample) in sums.iter_mut().zip(source.channels()) {
                    *sum += weight * i32::from(sample);
                }
            }
        }
        for (slot, sum) in pixel.channels_mut().iter_mut().zip(sums) {
            *slot = saturate_i32(sum);
        }
    }

    out
}
