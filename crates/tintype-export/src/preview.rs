//! Side-by-side before/after composition.

use image::{GenericImage, Rgb};
use tintype_pipeline::RgbImage;

/// Gap between the two panels, in pixels.
pub const GUTTER: u32 = 8;

const GUTTER_COLOR: Rgb<u8> = Rgb([255, 255, 255]);

/// Place `original` on the left and `filtered` on the right, separated by
/// a white [`GUTTER`], on a canvas as tall as the taller of the two.
///
/// Shorter panels are top-aligned; the remaining space is white.
#[must_use = "returns the composed preview"]
pub fn side_by_side(original: &RgbImage, filtered: &RgbImage) -> RgbImage {
    let width = original.width() + GUTTER + filtered.width();
    let height = original.height().max(filtered.height());
    let mut canvas = RgbImage::from_pixel(width, height, GUTTER_COLOR);

    // Both panels fit by construction of the canvas size.
    let placements = [(original, 0), (filtered, original.width() + GUTTER)];
    for (panel, x) in placements {
        if let Err(e) = canvas.copy_from(panel, x, 0) {
            log::warn!("preview panel did not fit: {e}");
        }
    }
    canvas
}
