//! Canonical test signals.
//!
//! CT generators sample a closed-form expression on an explicit time grid;
//! DT generators evaluate it on an index range and return a [`Sequence`].
//! Randomness (additive noise) always comes from a caller-supplied RNG so runs
//! are reproducible from a seed.

use crate::continuous::grid_spacing;
use crate::error::{DspError, DspResult};
use lib_types::sequence::{IndexRange, Sequence};
use lib_types::units::Hertz;
use rand::Rng;
use rand_distr::{Distribution, StandardNormal};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// How the height of an impulse-like rectangular pulse is chosen.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PulseNormalization {
    /// Height `1 / width`. The sampled area only equals 1 when the pulse
    /// covers a whole number of grid steps.
    Nominal,
    /// Height chosen so the Riemann sum `Σ h[i] · dt` over the grid is 1.
    #[default]
    UnitArea,
}

/// CT unit step: `u(t) = 1` for `t >= 0`, else 0.
pub fn unit_step_ct(t: &[f64]) -> Vec<f64> {
    t.iter().map(|&v| if v >= 0.0 { 1.0 } else { 0.0 }).collect()
}

/// CT ramp: `r(t) = t · u(t)`.
pub fn ramp_ct(t: &[f64]) -> Vec<f64> {
    t.iter().map(|&v| if v >= 0.0 { v } else { 0.0 }).collect()
}

/// CT sinusoid: `A · sin(2πft + φ)`.
pub fn sine_ct(t: &[f64], frequency: Hertz, amplitude: f64, phase: f64) -> Vec<f64> {
    let omega = frequency.angular();
    t.iter()
        .map(|&v| amplitude * (omega * v + phase).sin())
        .collect()
}

/// CT exponential decay: `e^{-at} · u(t)`.
pub fn exp_decay_ct(t: &[f64], rate: f64) -> Vec<f64> {
    t.iter()
        .map(|&v| if v >= 0.0 { (-rate * v).exp() } else { 0.0 })
        .collect()
}

/// Narrow rectangular pulse approximating `δ(t)`.
///
/// Non-zero on `|t| <= width / 2`. See [`PulseNormalization`] for the
/// height. `UnitArea` needs a uniform grid and at least one grid point
/// inside the pulse.
pub fn impulse_like_ct(
    t: &[f64],
    width: f64,
    normalization: PulseNormalization,
) -> DspResult<Vec<f64>> {
    if !(width > 0.0) || !width.is_finite() {
        return Err(DspError::InvalidInput(format!(
            "pulse width must be positive and finite, got {width}"
        )));
    }

    let half = width / 2.0;
    let inside = |v: f64| v.abs() <= half;

    let height = match normalization {
        PulseNormalization::Nominal => 1.0 / width,
        PulseNormalization::UnitArea => {
            let dt = grid_spacing(t)?;
            let covered = t.iter().filter(|&&v| inside(v)).count();
            if covered == 0 {
                return Err(DspError::InvalidInput(format!(
                    "pulse width {width} covers no grid point (dt = {:.3e})",
                    dt.0
                )));
            }
            1.0 / (covered as f64 * dt.0)
        }
    };

    Ok(t.iter()
        .map(|&v| if inside(v) { height } else { 0.0 })
        .collect())
}

/// Riemann-sum area of a sampled pulse.
pub fn pulse_area(pulse: &[f64], dt: f64) -> f64 {
    pulse.iter().sum::<f64>() * dt
}

/// Add zero-mean Gaussian noise with standard deviation `std` in place.
pub fn add_gaussian_noise<R: Rng + ?Sized>(
    samples: &mut [f64],
    std: f64,
    rng: &mut R,
) -> DspResult<()> {
    if !(std >= 0.0) || !std.is_finite() {
        return Err(DspError::InvalidInput(format!(
            "noise standard deviation must be non-negative, got {std}"
        )));
    }
    for sample in samples.iter_mut() {
        let z: f64 = StandardNormal.sample(rng);
        *sample += std * z;
    }
    Ok(())
}

fn sequence_over(range: IndexRange, f: impl Fn(i64) -> f64) -> Sequence {
    Sequence::new(range.iter().map(f).collect(), range.start)
}

/// DT unit step: `u[n] = 1` for `n >= 0`.
pub fn unit_step_dt(range: IndexRange) -> Sequence {
    sequence_over(range, |n| if n >= 0 { 1.0 } else { 0.0 })
}

/// DT ramp: `r[n] = n · u[n]`.
pub fn ramp_dt(range: IndexRange) -> Sequence {
    sequence_over(range, |n| if n >= 0 { n as f64 } else { 0.0 })
}

/// DT sinusoid: `A · sin(2πfn + φ)` with `f` in cycles per sample.
pub fn sine_dt(range: IndexRange, cycles_per_sample: f64, amplitude: f64, phase: f64) -> Sequence {
    sequence_over(range, |n| {
        amplitude * (2.0 * PI * cycles_per_sample * n as f64 + phase).sin()
    })
}

/// DT exponential decay: `aⁿ · u[n]`.
pub fn exp_decay_dt(range: IndexRange, base: f64) -> Sequence {
    sequence_over(range, |n| if n >= 0 { base.powi(n as i32) } else { 0.0 })
}

/// DT unit impulse `δ[n]` over the given range.
pub fn impulse_dt(range: IndexRange) -> Sequence {
    sequence_over(range, |n| if n == 0 { 1.0 } else { 0.0 })
}
