//! Sequential filter chain execution.

use crate::catalog::apply_filter;
use crate::types::{FilterChain, RgbImage};

/// Run every spec of `chain` in order, feeding each output into the next.
///
/// `base` is never modified. An empty chain returns a copy of `base`.
/// Repeated kinds are applied as many times as they appear.
#[must_use = "returns the final image of the chain"]
pub fn execute(base: &RgbImage, chain: &FilterChain) -> RgbImage {
    let mut current = base.clone();
    for spec in chain {
        current = apply_filter(&current, spec);
    }
    log::debug!("chain of {} filters complete", chain.len());
    current
}
