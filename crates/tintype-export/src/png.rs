//! PNG encoding.

use image::ImageEncoder;
use image::codecs::png::PngEncoder;
use tintype_pipeline::RgbImage;

use crate::ExportError;

/// Encode an RGB image as PNG bytes.
///
/// # Errors
///
/// Returns [`ExportError::Encode`] if the encoder rejects the image.
pub fn encode_png(image: &RgbImage) -> Result<Vec<u8>, ExportError> {
    let mut buf = Vec::new();
    PngEncoder::new(&mut buf).write_image(
        image.as_raw(),
        image.width(),
        image.height(),
        image::ExtendedColorType::Rgb8,
    )?;
    Ok(buf)
}
