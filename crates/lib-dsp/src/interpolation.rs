//! Piecewise-linear interpolation onto an arbitrary target grid.

use crate::error::{DspError, DspResult};

/// Linearly interpolate the samples `(xp, fp)` at each point of `targets`.
///
/// `xp` must be non-decreasing. Targets left of `xp[0]` take `fp[0]`,
/// targets right of the last knot take the last value (no extrapolation).
pub fn interpolate_linear(xp: &[f64], fp: &[f64], targets: &[f64]) -> DspResult<Vec<f64>> {
    if xp.len() != fp.len() {
        return Err(DspError::LengthMismatch {
            expected: xp.len(),
            actual: fp.len(),
        });
    }
    if xp.is_empty() {
        return Err(DspError::InsufficientData { needed: 1, got: 0 });
    }

    Ok(targets
        .iter()
        .map(|&target| interpolate_single(xp, fp, target))
        .collect())
}

/// Interpolate a single point.
fn interpolate_single(xp: &[f64], fp: &[f64], target: f64) -> f64 {
    let last = xp.len() - 1;
    if target <= xp[0] {
        return fp[0];
    }
    if target >= xp[last] {
        return fp[last];
    }

    // Find bracketing indices
    let mut lower = 0;
    let mut upper = last;

    while upper - lower > 1 {
        let mid = (lower + upper) / 2;
        if xp[mid] <= target {
            lower = mid;
        } else {
            upper = mid;
        }
    }

    let x0 = xp[lower];
    let x1 = xp[upper];
    if x1 == x0 {
        return fp[upper];
    }
    let frac = (target - x0) / (x1 - x0);

    fp[lower] + frac * (fp[upper] - fp[lower])
}
