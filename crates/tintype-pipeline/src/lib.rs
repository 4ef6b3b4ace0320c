//! tintype-pipeline: Pure image filter catalog and chain executor (sans-IO).
//!
//! Decodes raster images from bytes and transforms them through a fixed
//! catalog of filters:
//! grayscale, blur, edge detection, tone maps, sketch and cartoon effects.
//! Filters can be chained (each output feeds the next) or applied all at
//! once to the same source for a bulk catalog.
//!
//! This crate has **no I/O dependencies** -- it operates on in-memory
//! byte slices and images. Encoding, archiving, and file handling live in
//! `tintype-export` and the `tintype` CLI.

pub mod blur;
pub mod catalog;
pub mod chain;
pub mod diagnostics;
pub mod edge;
pub mod grayscale;
pub mod kernel;
pub mod stylize;
pub mod tone;
pub mod types;

pub use catalog::{CatalogResult, apply_catalog, apply_filter};
pub use chain::execute;
pub use grayscale::decode;
pub use types::{
    Dimensions, FilterChain, FilterKind, FilterParams, FilterSpec, GrayImage, PipelineError,
    RgbImage,
};

/// Decode `image_bytes` and run `chain` over the result.
///
/// # Errors
///
/// Returns [`PipelineError::EmptyInput`] if `image_bytes` is empty.
/// Returns [`PipelineError::ImageDecode`] if the image format is unrecognized.
pub fn process(image_bytes: &[u8], chain: &FilterChain) -> Result<RgbImage, PipelineError> {
    let base = decode(image_bytes)?;
    Ok(execute(&base, chain))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use image::Rgb;

    use super::*;

    /// Encode an RGB image as PNG bytes.
    fn png_bytes(img: &RgbImage) -> Vec<u8> {
        let mut buf = Vec::new();
        let encoder = image::codecs::png::PngEncoder::new(&mut buf);
        image::ImageEncoder::write_image(
            encoder,
            img.as_raw(),
            img.width(),
            img.height(),
            image::ExtendedColorType::Rgb8,
        )
        .unwrap();
        buf
    }

    fn scene() -> RgbImage {
        RgbImage::from_fn(40, 30, |x, y| {
            if (10..30).contains(&x) && (8..22).contains(&y) {
                Rgb([200, 60, 40])
            } else {
                Rgb([30, 90, u8::try_from(x * 6).unwrap()])
            }
        })
    }

    #[test]
    fn process_decodes_and_runs_chain() {
        let img = scene();
        let chain = FilterChain::from_names(&["Gray", "Negative"]).unwrap();
        let out = process(&png_bytes(&img), &chain).unwrap();
        assert_eq!(out, execute(&img, &chain));
    }

    #[test]
    fn process_empty_input() {
        let result = process(&[], &FilterChain::new());
        assert!(matches!(result, Err(PipelineError::EmptyInput)));
    }

    #[test]
    fn process_garbage_input() {
        let result = process(b"definitely not an image", &FilterChain::new());
        assert!(matches!(result, Err(PipelineError::ImageDecode(_))));
    }

    #[test]
    fn full_catalog_chain_keeps_shape() {
        let img = scene();
        let chain: FilterChain = FilterKind::ALL.into_iter().map(FilterSpec::new).collect();
        let out = execute(&img, &chain);
        assert_eq!(out.dimensions(), img.dimensions());
    }

    #[test]
    fn same_input_same_bytes_for_every_kind() {
        let img = scene();
        for kind in FilterKind::ALL {
            let params = FilterParams::new();
            assert_eq!(
                kind.apply(&img, &params).into_raw(),
                kind.apply(&img, &params).into_raw(),
                "{kind}"
            );
        }
    }

    #[test]
    fn chain_from_json_matches_builder() {
        let json = r#"[
            {"kind": "Gaussian Blur", "params": {"blur": 2}},
            {"kind": "canny-edge", "params": {"canny_min": 60, "canny_max": 120}},
            {"kind": "Negative"}
        ]"#;
        let parsed: FilterChain = serde_json::from_str(json).unwrap();
        let built: FilterChain = [
            FilterSpec::with_params(FilterKind::GaussianBlur, FilterParams::new().with_blur(2)),
            FilterSpec::with_params(
                FilterKind::CannyEdge,
                FilterParams::new().with_canny(60.0, 120.0),
            ),
            FilterSpec::new(FilterKind::Negative),
        ]
        .into_iter()
        .collect();
        assert_eq!(parsed, built);
        assert_eq!(execute(&scene(), &parsed), execute(&scene(), &built));
    }

    #[test]
    fn unknown_kind_in_json_is_rejected() {
        let json = r#"[{"kind": "Lomo"}]"#;
        assert!(serde_json::from_str::<FilterChain>(json).is_err());
    }
}
