//! Canny edge detection.
//!
//! Sobel gradients come from [`imageproc::filter::filter_clamped`], run on
//! each colour channel. At every pixel the channel with the largest L1
//! magnitude (`|gx| + |gy|`) supplies the gradient, so edges between
//! colours of equal luminance are still found. Non-maximum suppression and
//! hysteresis are done here so the thresholds follow that L1 magnitude
//! (the scale the catalog's 100 / 200 defaults are tuned for) and so the
//! hysteresis walk is bounds-checked at the image border.
//!
//! No pre-blur is applied; chain a Gaussian Blur first for noisy input.

use image::{Luma, Rgb};
use imageproc::definitions::Image;
use imageproc::filter::filter_clamped;
use imageproc::kernel;

use crate::types::{GrayImage, RgbImage};

const EDGE: u8 = 255;

/// Detect edges and return a binary map: 255 for edge pixels, 0 otherwise.
///
/// Pixels with gradient magnitude above `high_threshold` seed edges;
/// pixels above `low_threshold` join an edge when 8-connected to one.
///
/// The thresholds are not validated. If `low_threshold > high_threshold`
/// they are swapped, so inverted slider values still yield a (possibly
/// near-empty or near-full) edge map rather than an error.
#[must_use = "returns the binary edge map"]
pub fn canny(image: &RgbImage, low_threshold: f32, high_threshold: f32) -> GrayImage {
    let (low, high) = if low_threshold > high_threshold {
        (high_threshold, low_threshold)
    } else {
        (low_threshold, high_threshold)
    };

    let (gx, gy, magnitude) = strongest_channel_gradient(image);
    let thinned = non_maximum_suppression(&magnitude, &gx, &gy);
    hysteresis(&thinned, low, high)
}

/// Per-pixel Sobel gradient of whichever channel changes the most.
///
/// Ties keep the lowest channel index.
#[allow(clippy::cast_precision_loss)]
fn strongest_channel_gradient(
    image: &RgbImage,
) -> (Image<Luma<i16>>, Image<Luma<i16>>, Image<Luma<f32>>) {
    let rgb_gx: Image<Rgb<i16>> = filter_clamped(image, kernel::SOBEL_HORIZONTAL_3X3);
    let rgb_gy: Image<Rgb<i16>> = filter_clamped(image, kernel::SOBEL_VERTICAL_3X3);

    let (width, height) = image.dimensions();
    let mut gx = Image::new(width, height);
    let mut gy = Image::new(width, height);
    let mut magnitude = Image::new(width, height);
    for (x, y, h) in rgb_gx.enumerate_pixels() {
        let v = rgb_gy.get_pixel(x, y);
        let mut best = (0i16, 0i16, 0i32);
        for (&hc, &vc) in h.0.iter().zip(&v.0) {
            let m = i32::from(hc).abs() + i32::from(vc).abs();
            if m > best.2 {
                best = (hc, vc, m);
            }
        }
        gx.put_pixel(x, y, Luma([best.0]));
        gy.put_pixel(x, y, Luma([best.1]));
        magnitude.put_pixel(x, y, Luma([best.2 as f32]));
    }
    (gx, gy, magnitude)
}

/// Keep only pixels that are local maxima across the gradient direction.
///
/// On a two-pixel plateau along a horizontal or vertical gradient only the
/// left or upper pixel survives; diagonal neighbours must be strictly
/// smaller. The one-pixel border is always suppressed.
fn non_maximum_suppression(
    magnitude: &Image<Luma<f32>>,
    gx: &Image<Luma<i16>>,
    gy: &Image<Luma<i16>>,
) -> Image<Luma<f32>> {
    let (width, height) = magnitude.dimensions();
    let mut out = Image::from_pixel(width, height, Luma([0.0]));
    if width < 3 || height < 3 {
        return out;
    }

    for y in 1..height - 1 {
        for x in 1..width - 1 {
            let m = magnitude.get_pixel(x, y).0[0];
            if m == 0.0 {
                continue;
            }
            let mut angle = f32::from(gy.get_pixel(x, y).0[0])
                .atan2(f32::from(gx.get_pixel(x, y).0[0]))
                .to_degrees();
            if angle < 0.0 {
                angle += 180.0;
            }

            // Neighbours along the gradient direction, quantized to 45°.
            // `a` is the left or upper neighbour for the axis-aligned cases.
            let ((ax, ay), (bx, by), diagonal) = if !(22.5..157.5).contains(&angle) {
                ((x - 1, y), (x + 1, y), false)
            } else if angle < 67.5 {
                ((x + 1, y + 1), (x - 1, y - 1), true)
            } else if angle < 112.5 {
                ((x, y - 1), (x, y + 1), false)
            } else {
                ((x - 1, y + 1), (x + 1, y - 1), true)
            };

            let a = magnitude.get_pixel(ax, ay).0[0];
            let b = magnitude.get_pixel(bx, by).0[0];
            let keep = if diagonal { m > a && m > b } else { m > a && m >= b };
            if keep {
                out.put_pixel(x, y, Luma([m]));
            }
        }
    }
    out
}

/// Two-threshold edge tracking with an explicit stack (no recursion).
#[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
fn hysteresis(input: &Image<Luma<f32>>, low: f32, high: f32) -> GrayImage {
    let (width, height) = input.dimensions();
    let mut out = GrayImage::new(width, height);
    let mut stack = Vec::new();

    for y in 0..height {
        for x in 0..width {
            if input.get_pixel(x, y).0[0] <= high || out.get_pixel(x, y).0[0] == EDGE {
                continue;
            }
            out.put_pixel(x, y, Luma([EDGE]));
            stack.push((x, y));

            while let Some((cx, cy)) = stack.pop() {
                for dy in -1i64..=1 {
                    for dx in -1i64..=1 {
                        if dx == 0 && dy == 0 {
                            continue;
                        }
                        let nx = i64::from(cx) + dx;
                        let ny = i64::from(cy) + dy;
                        if nx < 0 || ny < 0 || nx >= i64::from(width) || ny >= i64::from(height) {
                            continue;
                        }
                        let (nx, ny) = (nx as u32, ny as u32);
                        if input.get_pixel(nx, ny).0[0] > low && out.get_pixel(nx, ny).0[0] != EDGE
                        {
                            out.put_pixel(nx, ny, Luma([EDGE]));
                            stack.push((nx, ny));
                        }
                    }
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 20x20 image with a sharp vertical boundary at x = 10.
    fn sharp_edge_image() -> RgbImage {
        RgbImage::from_fn(20, 20, |x, _y| if x < 10 { Rgb([0, 0, 0]) } else { Rgb([255, 255, 255]) })
    }

    fn gray(value: u8) -> Rgb<u8> {
        Rgb([value, value, value])
    }

    fn edge_count(edges: &GrayImage) -> u32 {
        edges.pixels().map(|p| u32::from(p.0[0] > 0)).sum()
    }

    #[test]
    fn blank_image_produces_no_edges() {
        let img = RgbImage::from_pixel(20, 20, gray(128));
        let edges = canny(&img, 100.0, 200.0);
        assert_eq!(edges.dimensions(), (20, 20));
        assert_eq!(edge_count(&edges), 0);
    }

    #[test]
    fn sharp_edge_is_one_pixel_wide() {
        let edges = canny(&sharp_edge_image(), 100.0, 200.0);
        // Gradient is 1020 at both x = 9 and x = 10; the left one wins.
        for (x, y, p) in edges.enumerate_pixels() {
            let expected = x == 9 && (1..19).contains(&y);
            assert_eq!(p.0[0] > 0, expected, "x={x} y={y}");
        }
    }

    #[test]
    fn horizontal_step_keeps_upper_row() {
        let img = RgbImage::from_fn(20, 20, |_x, y| if y < 10 { gray(0) } else { gray(255) });
        let edges = canny(&img, 100.0, 200.0);
        for (x, y, p) in edges.enumerate_pixels() {
            let expected = y == 9 && (1..19).contains(&x);
            assert_eq!(p.0[0] > 0, expected, "x={x} y={y}");
        }
    }

    #[test]
    fn isoluminant_colour_boundary_is_detected() {
        // Both sides have BT.601 luma 76.
        let img = RgbImage::from_fn(20, 20, |x, _y| {
            if x < 10 { Rgb([255, 0, 0]) } else { Rgb([0, 130, 0]) }
        });
        assert_eq!(
            crate::grayscale::luma(255, 0, 0),
            crate::grayscale::luma(0, 130, 0)
        );
        let edges = canny(&img, 100.0, 200.0);
        assert!(edge_count(&edges) > 0);
        for (x, _y, p) in edges.enumerate_pixels() {
            if p.0[0] > 0 {
                assert_eq!(x, 9);
            }
        }
    }

    #[test]
    fn single_channel_change_matches_gray_step() {
        // Only blue changes; its gradient alone drives the result.
        let blue = RgbImage::from_fn(20, 20, |x, _y| {
            if x < 10 { Rgb([40, 40, 0]) } else { Rgb([40, 40, 255]) }
        });
        assert_eq!(
            canny(&blue, 100.0, 200.0),
            canny(&sharp_edge_image(), 100.0, 200.0)
        );
    }

    #[test]
    fn output_is_binary() {
        let img = RgbImage::from_fn(16, 16, |x, y| {
            let v = u8::try_from((x * y * 7) % 256).unwrap_or(0);
            Rgb([v, v / 2, 255 - v])
        });
        let edges = canny(&img, 50.0, 150.0);
        assert!(edges.pixels().all(|p| p.0[0] == 0 || p.0[0] == 255));
    }

    #[test]
    fn output_dimensions_match_input() {
        let img = RgbImage::new(17, 31);
        let edges = canny(&img, 100.0, 200.0);
        assert_eq!(edges.dimensions(), (17, 31));
    }

    #[test]
    fn tiny_images_do_not_panic() {
        for (w, h) in [(1, 1), (2, 2), (1, 5), (3, 1)] {
            let img = RgbImage::from_fn(w, h, |x, _| gray(if x == 0 { 0 } else { 255 }));
            let edges = canny(&img, 1.0, 2.0);
            assert_eq!(edges.dimensions(), (w, h));
        }
    }

    #[test]
    fn border_edge_does_not_panic() {
        let img = RgbImage::from_fn(10, 10, |x, _| gray(if x == 1 { 255 } else { 0 }));
        let _edges = canny(&img, 1.0, 2.0);
    }

    #[test]
    fn inverted_thresholds_are_swapped() {
        let img = sharp_edge_image();
        assert_eq!(canny(&img, 200.0, 100.0), canny(&img, 100.0, 200.0));
    }

    #[test]
    fn higher_thresholds_never_add_edges() {
        let img = RgbImage::from_fn(24, 24, |x, y| {
            gray(u8::try_from(((x / 4 + y / 6) * 37) % 256).unwrap_or(0))
        });
        let loose = edge_count(&canny(&img, 20.0, 60.0));
        let strict = edge_count(&canny(&img, 300.0, 900.0));
        assert!(strict <= loose);
    }
}
