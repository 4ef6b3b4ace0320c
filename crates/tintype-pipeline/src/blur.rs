//! Smoothing filters: Gaussian, median, and bilateral.
//!
//! The Gaussian blur is specified by kernel size rather than sigma, so
//! it builds its own separable kernel instead of using
//! [`imageproc::filter::gaussian_blur_f32`] (which sizes the kernel from
//! sigma). Sigma is derived from the kernel size with the usual
//! `0.3 * ((k - 1) * 0.5 - 1) + 0.8` rule, and sizes up to 7 use the
//! exact binomial tables.

use image::{ImageBuffer, Pixel, Rgb};

use crate::kernel::{reflect_101, saturate};
use crate::types::{GrayImage, RgbImage};

/// Kernel size used by the Gaussian Blur filter for a raw `blur` value.
///
/// Always odd and at least 1: negative values are treated as 0 before
/// the `2 * blur + 1` construction.
#[must_use]
pub const fn kernel_size(blur: i32) -> u32 {
    let radius = if blur < 0 { 0 } else { blur.unsigned_abs() };
    radius.saturating_mul(2).saturating_add(1)
}

/// Sigma implied by an odd kernel size.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn sigma_for_kernel(size: u32) -> f64 {
    0.3f64.mul_add((f64::from(size) - 1.0).mul_add(0.5, -1.0), 0.8)
}

/// Normalized 1-D Gaussian weights of the given odd length.
///
/// Even sizes are bumped to the next odd value.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
pub fn gaussian_kernel(size: u32) -> Vec<f32> {
    let size = size | 1;
    match size {
        1 => return vec![1.0],
        3 => return vec![0.25, 0.5, 0.25],
        5 => return vec![0.0625, 0.25, 0.375, 0.25, 0.0625],
        7 => {
            return vec![
                0.03125, 0.109_375, 0.218_75, 0.281_25, 0.218_75, 0.109_375, 0.03125,
            ];
        }
        _ => {}
    }

    let sigma = sigma_for_kernel(size);
    let scale = -0.5 / (sigma * sigma);
    let center = f64::from(size / 2);
    let weights: Vec<f64> = (0..size)
        .map(|i| {
            let d = f64::from(i) - center;
            (scale * d * d).exp()
        })
        .collect();
    let total: f64 = weights.iter().sum();
    weights.into_iter().map(|w| (w / total) as f32).collect()
}

/// Gaussian blur with an explicit odd kernel size, applied per channel.
///
/// A kernel size of 1 returns an identical copy. The radius is capped at
/// the larger image dimension, so oversized kernels cost no more than one
/// spanning the whole image.
#[must_use = "returns the blurred image"]
pub fn gaussian_blur<P>(image: &ImageBuffer<P, Vec<u8>>, size: u32) -> ImageBuffer<P, Vec<u8>>
where
    P: Pixel<Subpixel = u8>,
{
    let kernel = gaussian_kernel(size.min(max_kernel_size(image.width(), image.height())));
    if kernel.len() == 1 {
        return image.clone();
    }
    convolve_separable(image, &kernel)
}

/// Largest kernel worth building for an image of the given size.
#[must_use]
pub const fn max_kernel_size(width: u32, height: u32) -> u32 {
    let extent = if width > height { width } else { height };
    extent.saturating_mul(2).saturating_add(1)
}

/// Horizontal then vertical pass of the same 1-D kernel, with
/// [`reflect_101`] borders. Intermediate sums stay in `f32` and are
/// rounded once at the end.
#[allow(clippy::cast_possible_wrap)]
fn convolve_separable<P>(image: &ImageBuffer<P, Vec<u8>>, kernel: &[f32]) -> ImageBuffer<P, Vec<u8>>
where
    P: Pixel<Subpixel = u8>,
{
    let (width, height) = image.dimensions();
    let channels = usize::from(P::CHANNEL_COUNT);
    let radius = (kernel.len() / 2) as i64;
    let raw = image.as_raw();
    let stride = width as usize * channels;

    let mut rows = vec![0f32; raw.len()];
    for y in 0..height as usize {
        let row = &raw[y * stride..(y + 1) * stride];
        for x in 0..width {
            for c in 0..channels {
                let mut acc = 0.0f32;
                for (k, &weight) in kernel.iter().enumerate() {
                    let sx = reflect_101(i64::from(x) + k as i64 - radius, width) as usize;
                    acc += weight * f32::from(row[sx * channels + c]);
                }
                rows[y * stride + x as usize * channels + c] = acc;
            }
        }
    }

    let mut out: ImageBuffer<P, Vec<u8>> = ImageBuffer::new(width, height);
    for (x, y, pixel) in out.enumerate_pixels_mut() {
        for (c, slot) in pixel.channels_mut().iter_mut().enumerate() {
            let mut acc = 0.0f32;
            for (k, &weight) in kernel.iter().enumerate() {
                let sy = reflect_101(i64::from(y) + k as i64 - radius, height) as usize;
                acc += weight * rows[sy * stride + x as usize * channels + c];
            }
            *slot = saturate(acc);
        }
    }
    out
}

/// Median filter over a square window of side `size` (odd).
///
/// Thin wrapper over [`imageproc::filter::median_filter`], whose
/// out-of-bounds samples are clamped to the nearest edge.
#[must_use = "returns the filtered image"]
pub fn median_blur(image: &GrayImage, size: u32) -> GrayImage {
    let radius = size / 2;
    if radius == 0 {
        return image.clone();
    }
    imageproc::filter::median_filter(image, radius, radius)
}

/// Edge-preserving bilateral filter on an RGB image.
///
/// Each output pixel is a weighted mean over a disc of the given
/// `diameter`. The spatial weight falls off with distance (`sigma_space`)
/// and the range weight with the summed absolute channel difference
/// from the centre pixel (`sigma_color`). Borders use [`reflect_101`].
#[must_use = "returns the filtered image"]
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_possible_wrap
)]
pub fn bilateral(image: &RgbImage, diameter: u32, sigma_color: f32, sigma_space: f32) -> RgbImage {
    let radius = i64::from(diameter / 2);
    if radius == 0 {
        return image.clone();
    }
    let (width, height) = image.dimensions();

    let space_coeff = -0.5 / (sigma_space * sigma_space);
    let color_coeff = -0.5 / (sigma_color * sigma_color);

    // Disc of offsets with their spatial weight.
    let mut offsets = Vec::new();
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            let r2 = (dx * dx + dy * dy) as f32;
            if r2.sqrt() > radius as f32 {
                continue;
            }
            offsets.push((dx, dy, (r2 * space_coeff).exp()));
        }
    }

    // Range weight indexed by summed absolute difference (0..=765).
    let color_weights: Vec<f32> = (0..=3 * 255)
        .map(|d: i32| {
            let d = d as f32;
            (d * d * color_coeff).exp()
        })
        .collect();

    RgbImage::from_fn(width, height, |x, y| {
        let center = image.get_pixel(x, y).0;
        let mut sum = [0f32; 3];
        let mut total = 0f32;
        for &(dx, dy, spatial) in &offsets {
            let sx = reflect_101(i64::from(x) + dx, width);
            let sy = reflect_101(i64::from(y) + dy, height);
            let sample = image.get_pixel(sx, sy).0;
            let diff: usize = center
                .iter()
                .zip(sample)
                .map(|(&a, b)| usize::from(a.abs_diff(b)))
                .sum();
            let weight = spatial * color_weights[diff];
            for (acc, v) in sum.iter_mut().zip(sample) {
                *acc += weight * f32::from(v);
            }
            total += weight;
        }
        Rgb(sum.map(|acc| saturate(acc / total)))
    })
}
