//! Chain diagnostics: per-step timing for a filter chain run.
//!
//! Time is read through the [`Clock`] trait so this crate stays free of
//! platform time sources; callers supply an implementation (the CLI uses
//! `std::time::Instant`).
//!
//! Durations are serialized as fractional seconds (`f64`) for JSON
//! compatibility, since `std::time::Duration` does not implement serde
//! traits.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::catalog::apply_filter;
use crate::types::{Dimensions, FilterChain, FilterKind, FilterParams, RgbImage};

/// Source of timestamps for diagnostics.
pub trait Clock {
    /// Opaque timestamp type.
    type Instant;

    /// Current timestamp.
    fn now(&self) -> Self::Instant;

    /// Time elapsed since `since`.
    fn elapsed(&self, since: &Self::Instant) -> Duration;
}

/// Serde support for `std::time::Duration` as fractional seconds.
mod duration_serde {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs_f64().serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(|_| {
            serde::de::Error::custom(
                "duration seconds must be finite, non-negative, and representable as a Duration",
            )
        })
    }
}

/// Timing of one filter application within a chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepDiagnostics {
    pub kind: FilterKind,
    pub params: FilterParams,
    /// Wall-clock duration of this step (seconds).
    #[serde(with = "duration_serde")]
    pub duration: Duration,
}

/// Diagnostics collected from a single chain run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainDiagnostics {
    /// One entry per chain step, in execution order.
    pub steps: Vec<StepDiagnostics>,
    /// Wall-clock duration of the whole chain (seconds).
    #[serde(with = "duration_serde")]
    pub total_duration: Duration,
    /// Dimensions of the base (and final) image.
    pub dimensions: Dimensions,
}

impl ChainDiagnostics {
    /// Format diagnostics as a human-readable report.
    #[must_use]
    pub fn report(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Chain Diagnostics Report\n{}", "=".repeat(60)));
        lines.push(format!(
            "Image: {}x{} ({} pixels)",
            self.dimensions.width,
            self.dimensions.height,
            u64::from(self.dimensions.width) * u64::from(self.dimensions.height),
        ));
        lines.push(format!(
            "Total duration: {:.3}ms",
            duration_ms(self.total_duration),
        ));
        lines.push(String::new());

        if self.steps.is_empty() {
            lines.push("(empty chain)".to_owned());
            return lines.join("\n");
        }

        lines.push(format!(
            "{:<4} {:<24} {:>10} {:>10}  {}",
            "#", "Filter", "Duration", "% Total", "Parameters"
        ));
        lines.push("-".repeat(80));

        let total_ms = duration_ms(self.total_duration);
        for (index, step) in self.steps.iter().enumerate() {
            let ms = duration_ms(step.duration);
            let pct = if total_ms > 0.0 {
                ms / total_ms * 100.0
            } else {
                0.0
            };
            let name = step.kind.name();
            let details = format_params(step.kind, &step.params);
            lines.push(format!(
                "{:<4} {name:<24} {ms:>8.3}ms {pct:>9.1}%  {details}",
                index + 1
            ));
        }

        lines.join("\n")
    }
}

/// Convert a `Duration` to milliseconds as `f64`.
fn duration_ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

/// Resolved values of the parameters `kind` actually reads.
fn format_params(kind: FilterKind, params: &FilterParams) -> String {
    kind.parameters()
        .iter()
        .map(|&name| {
            let value = match name {
                "blur" => params.blur().to_string(),
                "canny_min" => format!("{:.1}", params.canny_min()),
                "canny_max" => format!("{:.1}", params.canny_max()),
                "sepia" => format!("{:.2}", params.sepia()),
                "brightness" => params.brightness().to_string(),
                "contrast" => format!("{:.2}", params.contrast()),
                _ => String::from("?"),
            };
            format!("{name}={value}")
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Run `chain` over `base` like [`execute`](crate::execute), timing each
/// step with `clock`.
#[must_use = "returns the final image and its diagnostics"]
pub fn execute_with_diagnostics<C: Clock>(
    base: &RgbImage,
    chain: &FilterChain,
    clock: &C,
) -> (RgbImage, ChainDiagnostics) {
    let chain_start = clock.now();
    let mut current = base.clone();
    let mut steps = Vec::with_capacity(chain.len());

    for spec in chain {
        let start = clock.now();
        current = apply_filter(&current, spec);
        let duration = clock.elapsed(&start);
        log::debug!("{} took {:.3}ms", spec.kind, duration_ms(duration));
        steps.push(StepDiagnostics {
            kind: spec.kind,
            params: spec.params,
            duration,
        });
    }

    let diagnostics = ChainDiagnostics {
        steps,
        total_duration: clock.elapsed(&chain_start),
        dimensions: Dimensions::of(base),
    };
    (current, diagnostics)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::cell::Cell;

    use image::Rgb;

    use super::*;
    use crate::types::FilterSpec;

    /// Clock that advances one millisecond per reading.
    struct TickClock {
        ticks: Cell<u64>,
    }

    impl TickClock {
        const fn new() -> Self {
            Self {
                ticks: Cell::new(0),
            }
        }
    }

    impl Clock for TickClock {
        type Instant = u64;

        fn now(&self) -> u64 {
            let t = self.ticks.get();
            self.ticks.set(t + 1);
            t
        }

        fn elapsed(&self, since: &u64) -> Duration {
            Duration::from_millis(self.now() - since)
        }
    }

    fn sample() -> RgbImage {
        RgbImage::from_fn(10, 6, |x, y| Rgb([u8::try_from(x * 25).unwrap(), u8::try_from(y * 40).unwrap(), 90]))
    }

    fn chain() -> FilterChain {
        [
            FilterSpec::new(FilterKind::Gray),
            FilterSpec::with_params(FilterKind::GaussianBlur, FilterParams::new().with_blur(1)),
            FilterSpec::new(FilterKind::Negative),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn image_matches_plain_execution() {
        let img = sample();
        let (out, _) = execute_with_diagnostics(&img, &chain(), &TickClock::new());
        assert_eq!(out, crate::execute(&img, &chain()));
    }

    #[test]
    fn one_step_per_spec_in_order() {
        let (_, diag) = execute_with_diagnostics(&sample(), &chain(), &TickClock::new());
        let kinds: Vec<_> = diag.steps.iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            [FilterKind::Gray, FilterKind::GaussianBlur, FilterKind::Negative]
        );
        assert_eq!(diag.steps[1].params.blur, Some(1));
        assert_eq!(diag.dimensions, Dimensions { width: 10, height: 6 });
    }

    #[test]
    fn durations_come_from_the_clock() {
        let (_, diag) = execute_with_diagnostics(&sample(), &chain(), &TickClock::new());
        // Each step reads the clock twice.
        for step in &diag.steps {
            assert_eq!(step.duration, Duration::from_millis(1));
        }
        // Chain start at 0, final reading after three steps at 7.
        assert_eq!(diag.total_duration, Duration::from_millis(7));
    }

    #[test]
    fn empty_chain_has_no_steps() {
        let img = sample();
        let (out, diag) = execute_with_diagnostics(&img, &FilterChain::new(), &TickClock::new());
        assert_eq!(out, img);
        assert!(diag.steps.is_empty());
        assert!(diag.report().contains("(empty chain)"));
    }

    #[test]
    fn report_lists_each_step() {
        let (_, diag) = execute_with_diagnostics(&sample(), &chain(), &TickClock::new());
        let report = diag.report();
        assert!(report.contains("Image: 10x6 (60 pixels)"));
        assert!(report.contains("Gaussian Blur"));
        assert!(report.contains("blur=1"));
        assert!(report.contains("Negative"));
    }

    #[test]
    fn json_durations_are_seconds() {
        let (_, diag) = execute_with_diagnostics(&sample(), &chain(), &TickClock::new());
        let json = serde_json::to_value(&diag).unwrap();
        assert_eq!(json["total_duration"], serde_json::json!(0.007));
        assert_eq!(json["steps"][1]["kind"], "Gaussian Blur");

        let back: ChainDiagnostics = serde_json::from_value(json).unwrap();
        assert_eq!(back, diag);
    }

    #[test]
    fn negative_duration_is_rejected() {
        let json = r#"{"steps":[],"total_duration":-1.0,"dimensions":{"width":1,"height":1}}"#;
        assert!(serde_json::from_str::<ChainDiagnostics>(json).is_err());
    }
}
