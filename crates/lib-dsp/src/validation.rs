//! Convolution correctness checks.
//!
//! Two kinds of validation are provided:
//!
//! - **Cross-validation**: the direct and FFT convolution paths must agree to
//!   floating-point precision for any input. A failure is an implementation
//!   defect.
//! - **Impulse identity**: `x * δ = x`. In DT the output is cropped to the
//!   index range of `x` and compared sample by sample. In CT the output is
//!   cropped to the time span of `x` and interpolated back onto `x`'s grid;
//!   only convergence as the pulse narrows is expected, never equality.
//!
//! A cropped DT output whose length differs from `x` is a recoverable state
//! reported through [`IdentityOutcome::LengthMismatch`], not an error.

use crate::continuous::convolve_waveforms;
use crate::convolution::{direct_convolve, fft_convolve, ConvolutionMethod};
use crate::error::{DspError, DspResult};
use crate::interpolation::interpolate_linear;
use crate::signals::{impulse_like_ct, pulse_area, PulseNormalization};
use lib_types::report::ValidationReport;
use lib_types::sequence::{IndexRange, Sequence};
use lib_types::waveform::Waveform;
use serde::{Deserialize, Serialize};

pub const PROPERTY_CROSS_CHECK: &str = "direct convolution = FFT convolution";
pub const PROPERTY_DT_IDENTITY: &str = "x[n] * δ[n] = x[n]";
pub const PROPERTY_CT_IDENTITY: &str = "x(t) * δ(t) ≈ x(t)";

/// Max absolute error and RMSE of `expected - actual`.
pub fn error_metrics(
    expected: &[f64],
    actual: &[f64],
    property: impl Into<String>,
) -> DspResult<ValidationReport> {
    if expected.len() != actual.len() {
        return Err(DspError::LengthMismatch {
            expected: expected.len(),
            actual: actual.len(),
        });
    }
    if expected.is_empty() {
        return Err(DspError::EmptyInput { operand: "expected" });
    }

    let (max_abs_error, sum_sq) = expected
        .iter()
        .zip(actual)
        .map(|(e, a)| e - a)
        .fold((0.0f64, 0.0f64), |(max, sum), err| {
            (max.max(err.abs()), sum + err * err)
        });

    Ok(ValidationReport {
        max_abs_error,
        rmse: (sum_sq / expected.len() as f64).sqrt(),
        property: property.into(),
        samples: expected.len(),
    })
}

/// Compare a manual convolution result with a reference result.
pub fn validate_against_reference(manual: &[f64], reference: &[f64]) -> DspResult<ValidationReport> {
    error_metrics(reference, manual, PROPERTY_CROSS_CHECK)
}

/// Run both convolution algorithms on the same operands and compare them.
pub fn cross_validate(x: &[f64], h: &[f64]) -> DspResult<ValidationReport> {
    let manual = direct_convolve(x, h)?;
    let reference = fft_convolve(x, h)?;
    let report = validate_against_reference(&manual, &reference)?;

    tracing::debug!("cross-validation: {}", report);
    Ok(report)
}

/// Fail with [`DspError::ToleranceExceeded`] when the report's maximum
/// absolute error is above `tolerance`.
pub fn check_tolerance(report: &ValidationReport, tolerance: f64) -> DspResult<()> {
    if report.passes(tolerance) {
        Ok(())
    } else {
        Err(DspError::ToleranceExceeded {
            property: report.property.clone(),
            max_abs_error: report.max_abs_error,
            tolerance,
        })
    }
}

/// Result of a DT impulse-identity check.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum IdentityOutcome {
    /// The cropped output lined up with `x` and was compared.
    Compared(ValidationReport),
    /// The cropped output had a different length; nothing was compared.
    LengthMismatch { cropped: usize, expected: usize },
}

impl IdentityOutcome {
    /// The metrics, when the comparison ran.
    pub fn report(&self) -> Option<&ValidationReport> {
        match self {
            IdentityOutcome::Compared(report) => Some(report),
            IdentityOutcome::LengthMismatch { .. } => None,
        }
    }
}

/// Keep only the samples of `y` whose index lies in `range`.
pub fn crop_to_range(y: &Sequence, range: IndexRange) -> Sequence {
    let kept: Vec<(i64, f64)> = y
        .indices()
        .iter()
        .zip(y.samples.iter().copied())
        .filter(|(n, _)| range.contains(*n))
        .collect();

    let origin = kept.first().map_or(range.start, |(n, _)| *n);
    Sequence::new(kept.into_iter().map(|(_, v)| v).collect(), origin)
}

/// Check `x[n] * δ[n] = x[n]` given the convolution output `y`.
pub fn validate_impulse_identity_dt(x: &Sequence, y: &Sequence) -> DspResult<IdentityOutcome> {
    if x.is_empty() {
        return Err(DspError::EmptyInput { operand: "x" });
    }

    let cropped = crop_to_range(y, x.indices());
    if cropped.len() != x.len() {
        tracing::warn!(
            "DT impulse validation skipped: length mismatch (cropped={}, expected={})",
            cropped.len(),
            x.len()
        );
        return Ok(IdentityOutcome::LengthMismatch {
            cropped: cropped.len(),
            expected: x.len(),
        });
    }

    let report = error_metrics(&x.samples, &cropped.samples, PROPERTY_DT_IDENTITY)?;
    tracing::debug!("DT impulse identity: {}", report);
    Ok(IdentityOutcome::Compared(report))
}

/// Crop `y` to the time span of `x` and interpolate it onto `x`'s grid.
pub fn align_to_grid(x: &Waveform, y: &Waveform) -> DspResult<Vec<f64>> {
    let t_first = x.t_start.0;
    let t_last = x.t_end().0;

    let (t_crop, y_crop): (Vec<f64>, Vec<f64>) = y
        .samples
        .iter()
        .enumerate()
        .map(|(i, &v)| (y.time_at(i).0, v))
        .filter(|(t, _)| *t >= t_first && *t <= t_last)
        .unzip();

    if t_crop.is_empty() {
        return Err(DspError::InsufficientData { needed: 1, got: 0 });
    }

    interpolate_linear(&t_crop, &y_crop, &x.times())
}

/// Check `x(t) * δ(t) ≈ x(t)` given the (approximate) convolution output `y`.
pub fn validate_impulse_identity_ct(x: &Waveform, y: &Waveform) -> DspResult<ValidationReport> {
    if x.is_empty() {
        return Err(DspError::EmptyInput { operand: "x" });
    }
    let aligned = align_to_grid(x, y)?;
    let report = error_metrics(&x.samples, &aligned, PROPERTY_CT_IDENTITY)?;

    tracing::debug!("CT impulse identity: {}", report);
    Ok(report)
}

/// One entry of an impulse-width sweep.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WidthReport {
    /// Nominal pulse width.
    pub width: f64,

    /// Riemann-sum area of the sampled pulse.
    pub pulse_area: f64,

    pub report: ValidationReport,
}

/// Convolve `x` with an impulse-like pulse of the given width, sampled on
/// `x`'s own grid, and check the impulse identity.
pub fn validate_pulse_width(
    x: &Waveform,
    width: f64,
    normalization: PulseNormalization,
) -> DspResult<WidthReport> {
    let times = x.times();
    let pulse = impulse_like_ct(&times, width, normalization)?;
    let area = pulse_area(&pulse, x.dt.0);

    let h = Waveform::new(pulse, x.dt, x.t_start);
    let y = convolve_waveforms(x, &h, ConvolutionMethod::Direct)?;

    let mut report = validate_impulse_identity_ct(x, &y)?;
    report.property = format!("x(t) * h_w(t) ≈ x(t), w = {width:.4}");

    tracing::debug!("pulse width {:.4}: area={:.6}, {}", width, area, report);
    Ok(WidthReport {
        width,
        pulse_area: area,
        report,
    })
}

/// Run [`validate_pulse_width`] for every width, in order.
pub fn impulse_width_sweep(
    x: &Waveform,
    widths: &[f64],
    normalization: PulseNormalization,
) -> DspResult<Vec<WidthReport>> {
    widths
        .iter()
        .map(|&width| validate_pulse_width(x, width, normalization))
        .collect()
}
