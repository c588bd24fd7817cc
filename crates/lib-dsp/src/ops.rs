//! Elementary signal operations: scaling, shifting, reversal, and pointwise
//! combination.
//!
//! Shifts and reversals only move the time or index axis; the stored samples
//! are never resampled.

use crate::error::{DspError, DspResult};
use lib_types::sequence::Sequence;
use lib_types::units::Seconds;
use lib_types::waveform::Waveform;

/// `y = k · x`.
pub fn amplitude_scale(x: &[f64], factor: f64) -> Vec<f64> {
    x.iter().map(|v| v * factor).collect()
}

/// `y(t) = x(t - shift)`: positive shifts move the signal right.
pub fn time_shift_ct(x: &Waveform, shift: Seconds) -> Waveform {
    Waveform::new(x.samples.clone(), x.dt, x.t_start + shift)
}

/// `y(t) = x(-t)`.
///
/// Samples are stored in reverse so the time axis stays increasing.
pub fn time_reverse_ct(x: &Waveform) -> Waveform {
    let samples = x.samples.iter().rev().copied().collect();
    Waveform::new(samples, x.dt, -x.t_end())
}

/// `y[n] = x[n - shift]`.
pub fn shift_dt(x: &Sequence, shift: i64) -> Sequence {
    Sequence::new(x.samples.clone(), x.origin + shift)
}

/// `y[n] = x[-n]`.
pub fn reverse_dt(x: &Sequence) -> Sequence {
    let samples = x.samples.iter().rev().copied().collect();
    Sequence::new(samples, -x.last_index())
}

fn check_same_length(a: &[f64], b: &[f64]) -> DspResult<()> {
    if a.len() != b.len() {
        return Err(DspError::LengthMismatch {
            expected: a.len(),
            actual: b.len(),
        });
    }
    Ok(())
}

/// Elementwise sum of two equally long signals.
pub fn add_signals(a: &[f64], b: &[f64]) -> DspResult<Vec<f64>> {
    check_same_length(a, b)?;
    Ok(a.iter().zip(b).map(|(x, y)| x + y).collect())
}

/// Elementwise product of two equally long signals.
pub fn multiply_signals(a: &[f64], b: &[f64]) -> DspResult<Vec<f64>> {
    check_same_length(a, b)?;
    Ok(a.iter().zip(b).map(|(x, y)| x * y).collect())
}
