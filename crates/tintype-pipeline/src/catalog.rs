//! Filter dispatch and the bulk catalog.
//!
//! [`FilterKind::apply`] is the single entry point from a kind plus its
//! parameters to the transformed image. Every arm returns a fresh
//! three-channel image with the input's dimensions.

use std::collections::BTreeMap;

use crate::types::{Dimensions, FilterKind, FilterParams, FilterSpec, RgbImage};
use crate::{blur, edge, grayscale, stylize, tone};

impl FilterKind {
    /// Apply this filter to `image`.
    ///
    /// Only the fields of `params` listed in [`FilterKind::parameters`]
    /// are read; absent fields fall back to their defaults.
    #[must_use = "returns the filtered image"]
    pub fn apply(self, image: &RgbImage, params: &FilterParams) -> RgbImage {
        log::debug!(
            "applying {self} to {}x{} image",
            image.width(),
            image.height()
        );
        match self {
            Self::Original => image.clone(),
            Self::Gray => grayscale::expand(&grayscale::to_luma(image)),
            Self::GaussianBlur => blur::gaussian_blur(image, blur::kernel_size(params.blur())),
            Self::CannyEdge => {
                grayscale::expand(&edge::canny(image, params.canny_min(), params.canny_max()))
            }
            Self::Sepia => tone::sepia(image, params.sepia()),
            Self::Negative => tone::negative(image),
            Self::PencilSketch => stylize::pencil_sketch(image),
            Self::Cartoon => stylize::cartoon(image),
            Self::Emboss => stylize::emboss(image),
            Self::WarmTone => tone::warm(image),
            Self::CoolTone => tone::cool(image),
            Self::BrightLight => tone::bright_light(image, params.brightness(), params.contrast()),
            Self::DarkMood => tone::dark_mood(image, params.brightness(), params.contrast()),
            Self::Vivid => tone::vivid(image),
            Self::Vintage => tone::vintage(image),
        }
    }
}

/// Apply a single [`FilterSpec`].
#[must_use = "returns the filtered image"]
pub fn apply_filter(image: &RgbImage, spec: &FilterSpec) -> RgbImage {
    spec.kind.apply(image, &spec.params)
}

/// Every catalog filter applied independently to one source image.
///
/// Iteration follows catalog order ([`FilterKind::ALL`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogResult {
    images: BTreeMap<FilterKind, RgbImage>,
    dimensions: Dimensions,
}

impl CatalogResult {
    /// The output for `kind`, if present.
    #[must_use]
    pub fn get(&self, kind: FilterKind) -> Option<&RgbImage> {
        self.images.get(&kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = (FilterKind, &RgbImage)> {
        self.images.iter().map(|(&kind, image)| (kind, image))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.images.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Dimensions of the source image (and of every entry).
    #[must_use]
    pub const fn dimensions(&self) -> Dimensions {
        self.dimensions
    }
}

/// Apply every catalog filter to `original` with default parameters.
///
/// Each entry sees the original image, never another entry's output.
#[must_use = "returns the catalog of filtered images"]
pub fn apply_catalog(original: &RgbImage) -> CatalogResult {
    let defaults = FilterParams::new();
    let images: BTreeMap<_, _> = FilterKind::ALL
        .iter()
        .map(|&kind| (kind, kind.apply(original, &defaults)))
        .collect();
    log::info!("catalog complete: {} variants", images.len());
    CatalogResult {
        images,
        dimensions: Dimensions::of(original),
    }
}
