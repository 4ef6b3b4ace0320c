//! Shared types for the tintype filter pipeline.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Re-export `RgbImage` so downstream crates can pass images around
/// without depending on `image` directly.
pub use image::RgbImage;

/// Re-export `GrayImage` for single-channel intermediates.
pub use image::GrayImage;

/// One entry of the filter catalog.
///
/// The catalog is closed: every filter the pipeline knows about is a
/// variant here, and dispatch is an exhaustive `match` (see
/// [`FilterKind::apply`](crate::catalog)). Names coming from user input
/// go through [`FromStr`], which rejects anything not in the catalog.
///
/// Variant order is catalog order; the derived `Ord` relies on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FilterKind {
    /// Identity.
    Original,
    /// BT.601 luminance replicated to three channels.
    Gray,
    /// Gaussian smoothing with kernel size `2 * blur + 1`.
    GaussianBlur,
    /// Binary Canny edge map replicated to three channels.
    CannyEdge,
    /// Sepia matrix blended with the original by intensity.
    Sepia,
    /// Per-sample inversion.
    Negative,
    /// Dodge-blend pencil sketch.
    PencilSketch,
    /// Bilateral-smoothed color masked by adaptive-threshold edges.
    Cartoon,
    /// 3x3 emboss kernel plus mid-gray bias.
    Emboss,
    /// Red down, blue up.
    WarmTone,
    /// Red up, blue down.
    CoolTone,
    /// Linear rescale by contrast and brightness.
    BrightLight,
    /// Linear rescale with damped contrast and a darker offset.
    DarkMood,
    /// Fixed 1.5x gain.
    Vivid,
    /// Blend toward flat mid-gray.
    Vintage,
}

impl FilterKind {
    /// Every catalog entry, in catalog order.
    pub const ALL: [Self; 15] = [
        Self::Original,
        Self::Gray,
        Self::GaussianBlur,
        Self::CannyEdge,
        Self::Sepia,
        Self::Negative,
        Self::PencilSketch,
        Self::Cartoon,
        Self::Emboss,
        Self::WarmTone,
        Self::CoolTone,
        Self::BrightLight,
        Self::DarkMood,
        Self::Vivid,
        Self::Vintage,
    ];

    /// Human-readable catalog name, e.g. `"Gaussian Blur"`.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Original => "Original",
            Self::Gray => "Gray",
            Self::GaussianBlur => "Gaussian Blur",
            Self::CannyEdge => "Canny Edge",
            Self::Sepia => "Sepia",
            Self::Negative => "Negative",
            Self::PencilSketch => "Pencil Sketch",
            Self::Cartoon => "Cartoon",
            Self::Emboss => "Emboss",
            Self::WarmTone => "Warm Tone",
            Self::CoolTone => "Cool Tone",
            Self::BrightLight => "Bright Light",
            Self::DarkMood => "Dark Mood",
            Self::Vivid => "Vivid (High Contrast)",
            Self::Vintage => "Vintage",
        }
    }

    /// Command-line friendly identifier, e.g. `"gaussian-blur"`.
    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Self::Original => "original",
            Self::Gray => "gray",
            Self::GaussianBlur => "gaussian-blur",
            Self::CannyEdge => "canny-edge",
            Self::Sepia => "sepia",
            Self::Negative => "negative",
            Self::PencilSketch => "pencil-sketch",
            Self::Cartoon => "cartoon",
            Self::Emboss => "emboss",
            Self::WarmTone => "warm-tone",
            Self::CoolTone => "cool-tone",
            Self::BrightLight => "bright-light",
            Self::DarkMood => "dark-mood",
            Self::Vivid => "vivid",
            Self::Vintage => "vintage",
        }
    }

    /// Names of the [`FilterParams`] fields this filter reads.
    ///
    /// Empty for filters without parameters.
    #[must_use]
    pub const fn parameters(self) -> &'static [&'static str] {
        match self {
            Self::GaussianBlur => &["blur"],
            Self::CannyEdge => &["canny_min", "canny_max"],
            Self::Sepia => &["sepia"],
            Self::BrightLight | Self::DarkMood => &["brightness", "contrast"],
            Self::Original
            | Self::Gray
            | Self::Negative
            | Self::PencilSketch
            | Self::Cartoon
            | Self::Emboss
            | Self::WarmTone
            | Self::CoolTone
            | Self::Vivid
            | Self::Vintage => &[],
        }
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FilterKind {
    type Err = PipelineError;

    /// Accepts either the catalog name or the slug, ignoring ASCII case
    /// and surrounding whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Self::ALL
            .into_iter()
            .find(|kind| {
                kind.name().eq_ignore_ascii_case(needle) || kind.slug().eq_ignore_ascii_case(needle)
            })
            .ok_or_else(|| PipelineError::UnknownFilter(needle.to_string()))
    }
}

// Serialized as the catalog name so stored chains stay readable.
impl Serialize for FilterKind {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for FilterKind {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}

/// Per-call parameter bundle.
///
/// Every field is optional; absent values resolve to the documented
/// defaults through the accessor methods. Filters ignore fields they do
/// not use (see [`FilterKind::parameters`]).
///
/// A fresh value is built for every invocation, so nothing leaks from
/// one call into the next.
///
/// Domains are advisory. Only `blur` is normalized (clamped to be
/// non-negative) by the filter that reads it; the CLI enforces the
/// slider ranges before values get here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterParams {
    /// Gaussian blur radius; kernel size is `2 * blur + 1`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blur: Option<i32>,

    /// Canny hysteresis low threshold.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub canny_min: Option<f32>,

    /// Canny hysteresis high threshold.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub canny_max: Option<f32>,

    /// Sepia blend intensity in `[0, 1]`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sepia: Option<f32>,

    /// Additive brightness offset for the linear tone filters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brightness: Option<i32>,

    /// Multiplicative contrast gain for the linear tone filters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contrast: Option<f32>,
}

impl FilterParams {
    pub const DEFAULT_BLUR: i32 = 3;
    pub const DEFAULT_CANNY_MIN: f32 = 100.0;
    pub const DEFAULT_CANNY_MAX: f32 = 200.0;
    pub const DEFAULT_SEPIA: f32 = 1.0;
    pub const DEFAULT_BRIGHTNESS: i32 = 40;
    pub const DEFAULT_CONTRAST: f32 = 1.2;

    /// An empty bundle: every accessor returns its default.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            blur: None,
            canny_min: None,
            canny_max: None,
            sepia: None,
            brightness: None,
            contrast: None,
        }
    }

    #[must_use]
    pub const fn with_blur(mut self, blur: i32) -> Self {
        self.blur = Some(blur);
        self
    }

    #[must_use]
    pub const fn with_canny(mut self, min: f32, max: f32) -> Self {
        self.canny_min = Some(min);
        self.canny_max = Some(max);
        self
    }

    #[must_use]
    pub const fn with_sepia(mut self, intensity: f32) -> Self {
        self.sepia = Some(intensity);
        self
    }

    #[must_use]
    pub const fn with_brightness(mut self, brightness: i32) -> Self {
        self.brightness = Some(brightness);
        self
    }

    #[must_use]
    pub const fn with_contrast(mut self, contrast: f32) -> Self {
        self.contrast = Some(contrast);
        self
    }

    /// Resolved blur radius (may still be negative; see
    /// [`blur::kernel_size`](crate::blur::kernel_size)).
    #[must_use]
    pub fn blur(&self) -> i32 {
        self.blur.unwrap_or(Self::DEFAULT_BLUR)
    }

    #[must_use]
    pub fn canny_min(&self) -> f32 {
        self.canny_min.unwrap_or(Self::DEFAULT_CANNY_MIN)
    }

    #[must_use]
    pub fn canny_max(&self) -> f32 {
        self.canny_max.unwrap_or(Self::DEFAULT_CANNY_MAX)
    }

    #[must_use]
    pub fn sepia(&self) -> f32 {
        self.sepia.unwrap_or(Self::DEFAULT_SEPIA)
    }

    #[must_use]
    pub fn brightness(&self) -> i32 {
        self.brightness.unwrap_or(Self::DEFAULT_BRIGHTNESS)
    }

    #[must_use]
    pub fn contrast(&self) -> f32 {
        self.contrast.unwrap_or(Self::DEFAULT_CONTRAST)
    }
}

/// A catalog entry together with the parameters to run it with.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FilterSpec {
    /// Which filter to run.
    pub kind: FilterKind,
    /// Parameters; missing fields use defaults.
    #[serde(default)]
    pub params: FilterParams,
}

impl FilterSpec {
    /// A spec with default parameters.
    #[must_use]
    pub const fn new(kind: FilterKind) -> Self {
        Self {
            kind,
            params: FilterParams::new(),
        }
    }

    #[must_use]
    pub const fn with_params(kind: FilterKind, params: FilterParams) -> Self {
        Self { kind, params }
    }
}

impl From<FilterKind> for FilterSpec {
    fn from(kind: FilterKind) -> Self {
        Self::new(kind)
    }
}

/// Ordered sequence of filters applied one after another.
///
/// Order is significant and repeats are allowed. An empty chain is the
/// identity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterChain(Vec<FilterSpec>);

impl FilterChain {
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Build a chain of default-parameter specs from catalog names or slugs.
    ///
    /// Every name is resolved before the chain is returned, so a chain
    /// with an unknown entry never reaches the executor.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::UnknownFilter`] for the first name that
    /// is not in the catalog.
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Result<Self, PipelineError> {
        names
            .iter()
            .map(|name| name.as_ref().parse::<FilterKind>().map(FilterSpec::new))
            .collect()
    }

    pub fn push(&mut self, spec: impl Into<FilterSpec>) {
        self.0.push(spec.into());
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn specs(&self) -> &[FilterSpec] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FilterSpec> {
        self.0.iter()
    }
}

impl FromIterator<FilterSpec> for FilterChain {
    fn from_iter<I: IntoIterator<Item = FilterSpec>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a FilterChain {
    type Item = &'a FilterSpec;
    type IntoIter = std::slice::Iter<'a, FilterSpec>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl From<Vec<FilterSpec>> for FilterChain {
    fn from(specs: Vec<FilterSpec>) -> Self {
        Self(specs)
    }
}

/// Image dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Dimensions {
    #[must_use]
    pub fn of(image: &RgbImage) -> Self {
        Self {
            width: image.width(),
            height: image.height(),
        }
    }
}

/// Errors that can occur in the pipeline.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Failed to decode the input image.
    #[error("failed to decode image: {0}")]
    ImageDecode(#[from] image::ImageError),

    /// The input image bytes were empty.
    #[error("input image data is empty")]
    EmptyInput,

    /// A filter name did not match any catalog entry.
    #[error("unknown filter: {0:?}")]
    UnknownFilter(String),
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    // --- FilterKind tests ---

    #[test]
    fn catalog_has_fifteen_distinct_entries() {
        let mut names: Vec<&str> = FilterKind::ALL.iter().map(|k| k.name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), 15);
    }

    #[test]
    fn all_is_sorted_in_catalog_order() {
        let mut sorted = FilterKind::ALL;
        sorted.sort();
        assert_eq!(sorted, FilterKind::ALL);
    }

    #[test]
    fn parses_catalog_names() {
        for kind in FilterKind::ALL {
            assert_eq!(kind.name().parse::<FilterKind>().unwrap(), kind);
        }
    }

    #[test]
    fn parses_slugs_case_insensitively() {
        assert_eq!(
            "GAUSSIAN-BLUR".parse::<FilterKind>().unwrap(),
            FilterKind::GaussianBlur
        );
        assert_eq!(
            " vivid (high contrast) ".parse::<FilterKind>().unwrap(),
            FilterKind::Vivid
        );
        assert_eq!("vivid".parse::<FilterKind>().unwrap(), FilterKind::Vivid);
    }

    #[test]
    fn unknown_name_is_rejected() {
        let err = "Lomo".parse::<FilterKind>().unwrap_err();
        assert!(matches!(err, PipelineError::UnknownFilter(ref s) if s == "Lomo"));
        assert_eq!(err.to_string(), "unknown filter: \"Lomo\"");
    }

    #[test]
    fn display_uses_catalog_name() {
        assert_eq!(FilterKind::PencilSketch.to_string(), "Pencil Sketch");
    }

    #[test]
    fn parameterized_filters_list_their_fields() {
        assert_eq!(FilterKind::GaussianBlur.parameters(), &["blur"]);
        assert_eq!(
            FilterKind::DarkMood.parameters(),
            &["brightness", "contrast"]
        );
        assert!(FilterKind::Cartoon.parameters().is_empty());
    }

    // --- FilterParams tests ---

    #[test]
    fn empty_params_resolve_to_defaults() {
        let params = FilterParams::new();
        assert_eq!(params.blur(), 3);
        assert!((params.canny_min() - 100.0).abs() < f32::EPSILON);
        assert!((params.canny_max() - 200.0).abs() < f32::EPSILON);
        assert!((params.sepia() - 1.0).abs() < f32::EPSILON);
        assert_eq!(params.brightness(), 40);
        assert!((params.contrast() - 1.2).abs() < f32::EPSILON);
        assert_eq!(params, FilterParams::default());
    }

    #[test]
    fn explicit_values_override_defaults() {
        let params = FilterParams::new()
            .with_blur(7)
            .with_brightness(-20)
            .with_contrast(0.5);
        assert_eq!(params.blur(), 7);
        assert_eq!(params.brightness(), -20);
        assert!((params.contrast() - 0.5).abs() < f32::EPSILON);
        // Untouched fields still fall back.
        assert!((params.sepia() - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn params_ignore_unrecognized_json_keys() {
        let params: FilterParams = serde_json::from_str(r#"{"blur": 5, "glow": 3}"#).unwrap();
        assert_eq!(params.blur, Some(5));
        assert_eq!(params.canny_min, None);
    }

    #[test]
    fn params_serialize_only_present_fields() {
        let json = serde_json::to_string(&FilterParams::new().with_sepia(0.5)).unwrap();
        assert_eq!(json, r#"{"sepia":0.5}"#);
    }

    // --- FilterChain tests ---

    #[test]
    fn chain_from_names_preserves_order_and_repeats() {
        let chain = FilterChain::from_names(&["Gray", "negative", "Gray"]).unwrap();
        let kinds: Vec<FilterKind> = chain.iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            [FilterKind::Gray, FilterKind::Negative, FilterKind::Gray]
        );
    }

    #[test]
    fn chain_from_names_rejects_unknown_entry() {
        let result = FilterChain::from_names(&["Gray", "Sparkle", "Negative"]);
        assert!(matches!(result, Err(PipelineError::UnknownFilter(ref s)) if s == "Sparkle"));
    }

    #[test]
    fn chain_json_uses_catalog_names() {
        let mut chain = FilterChain::new();
        chain.push(FilterKind::Gray);
        chain.push(FilterSpec::with_params(
            FilterKind::GaussianBlur,
            FilterParams::new().with_blur(2),
        ));
        let json = serde_json::to_string(&chain).unwrap();
        assert_eq!(
            json,
            r#"[{"kind":"Gray","params":{}},{"kind":"Gaussian Blur","params":{"blur":2}}]"#
        );
        let back: FilterChain = serde_json::from_str(&json).unwrap();
        assert_eq!(back, chain);
    }

    #[test]
    fn chain_json_accepts_missing_params_and_slugs() {
        let chain: FilterChain =
            serde_json::from_str(r#"[{"kind":"cool-tone"},{"kind":"Sepia","params":{"sepia":0.3}}]"#)
                .unwrap();
        assert_eq!(chain.len(), 2);
        assert_eq!(chain.specs()[0], FilterSpec::new(FilterKind::CoolTone));
        assert_eq!(chain.specs()[1].params.sepia, Some(0.3));
    }

    #[test]
    fn chain_json_rejects_unknown_kind() {
        let result: Result<FilterChain, _> = serde_json::from_str(r#"[{"kind":"Glitter"}]"#);
        let err = result.unwrap_err();
        assert!(err.to_string().contains("unknown filter"));
    }

    // --- PipelineError tests ---

    #[test]
    fn error_empty_input_display() {
        assert_eq!(
            PipelineError::EmptyInput.to_string(),
            "input image data is empty"
        );
    }
}
