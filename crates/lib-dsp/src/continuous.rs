//! Riemann-sum approximation of continuous-time convolution.
//!
//! The integral `y(t) = ∫ x(τ) h(t - τ) dτ` is approximated on a uniform grid
//! by `y ≈ conv(x, h) · dt`. The approximation is only meaningful when both
//! signals share the same sampling interval, so that is checked explicitly
//! rather than assumed.

use crate::alignment::convolution_time_axis;
use crate::convolution::{direct_convolve, ConvolutionMethod};
use crate::error::{DspError, DspResult};
use lib_types::units::Seconds;
use lib_types::waveform::Waveform;

/// Relative tolerance on each step of a time grid.
pub const GRID_TOLERANCE: f64 = 1e-9;

/// Relative tolerance when comparing the sampling intervals of two signals.
pub const DT_TOLERANCE: f64 = 1e-9;

/// Check if two time steps are compatible (within a relative tolerance).
#[inline]
pub fn are_compatible_dt(dt1: Seconds, dt2: Seconds, relative_tolerance: f64) -> bool {
    let max_dt = dt1.0.abs().max(dt2.0.abs());
    if max_dt == 0.0 {
        return dt1.0 == dt2.0;
    }
    (dt1.0 - dt2.0).abs() / max_dt <= relative_tolerance
}

/// Sampling interval of an explicit time grid.
///
/// The grid must hold at least two points and be strictly increasing with
/// constant spacing. The reference spacing is the span-averaged step
/// `(t[N-1] - t[0]) / (N - 1)`, which is what a `linspace` grid produces;
/// every individual step must match it within [`GRID_TOLERANCE`]. The
/// returned interval is `t[1] - t[0]`.
pub fn grid_spacing(t: &[f64]) -> DspResult<Seconds> {
    if t.len() < 2 {
        return Err(DspError::InsufficientData { needed: 2, got: t.len() });
    }

    let dt = t[1] - t[0];
    let mean_dt = (t[t.len() - 1] - t[0]) / (t.len() - 1) as f64;
    if !(dt > 0.0) || !mean_dt.is_finite() {
        return Err(DspError::NonUniformGrid { index: 1, step: dt, dt: mean_dt });
    }

    for (i, pair) in t.windows(2).enumerate() {
        let step = pair[1] - pair[0];
        if !are_compatible_dt(Seconds(step), Seconds(mean_dt), GRID_TOLERANCE) {
            return Err(DspError::NonUniformGrid {
                index: i + 1,
                step,
                dt: mean_dt,
            });
        }
    }

    Ok(Seconds(dt))
}

/// Build a waveform from an explicit, uniformly spaced time grid.
pub fn waveform_from_grid(t: &[f64], values: &[f64]) -> DspResult<Waveform> {
    if values.len() != t.len() {
        return Err(DspError::LengthMismatch {
            expected: t.len(),
            actual: values.len(),
        });
    }
    let dt = grid_spacing(t)?;
    Ok(Waveform::new(values.to_vec(), dt, Seconds(t[0])))
}

/// Approximate `x * h` for two signals sampled on the same grid `t`.
///
/// Returns `(time_axis, y)` where `y` has `len(x) + len(h) - 1` samples and
/// the time axis runs from `t[0] + t[0]` to `t[-1] + t[-1]`.
pub fn convolve_continuous(t: &[f64], x: &[f64], h: &[f64]) -> DspResult<(Vec<f64>, Vec<f64>)> {
    for (operand, values) in [("x", x), ("h", h)] {
        if values.len() != t.len() {
            tracing::debug!("convolve_continuous: {} does not match the time grid", operand);
            return Err(DspError::LengthMismatch {
                expected: t.len(),
                actual: values.len(),
            });
        }
    }
    let dt = grid_spacing(t)?;

    let y: Vec<f64> = direct_convolve(x, h)?
        .into_iter()
        .map(|v| v * dt.0)
        .collect();

    let first = t[0];
    let last = t[t.len() - 1];
    let axis = convolution_time_axis(first, last, first, last, y.len());

    Ok((axis, y))
}

/// Approximate `x * h` for two waveforms sharing a sampling interval.
///
/// The waveforms may start at different times and hold different numbers of
/// samples. The output starts at `x.t_start + h.t_start` with spacing `dt`.
pub fn convolve_waveforms(
    x: &Waveform,
    h: &Waveform,
    method: ConvolutionMethod,
) -> DspResult<Waveform> {
    if !are_compatible_dt(x.dt, h.dt, DT_TOLERANCE) {
        return Err(DspError::SamplingMismatch {
            dt_x: x.dt.0,
            dt_h: h.dt.0,
        });
    }
    if !(x.dt.0 > 0.0) {
        return Err(DspError::InvalidInput(format!(
            "sampling interval must be positive, got {}",
            x.dt.0
        )));
    }

    let dt = x.dt;
    let samples: Vec<f64> = method
        .convolve(&x.samples, &h.samples)?
        .into_iter()
        .map(|v| v * dt.0)
        .collect();

    tracing::debug!(
        "convolve_waveforms ({}): {} x {} samples, dt={:.3e}s",
        method.name(),
        x.len(),
        h.len(),
        dt.0
    );

    Ok(Waveform::new(samples, dt, x.t_start + h.t_start))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alignment::linspace;

    #[test]
    fn test_grid_spacing_linspace() {
        let t = linspace(-1.0, 1.0, 2000);
        let dt = grid_spacing(&t).unwrap();
        assert!((dt.0 - 2.0 / 1999.0).abs() < 1e-15);
    }

    #[test]
    fn test_grid_spacing_rejects_non_uniform() {
        let t = vec![0.0, 0.1, 0.2, 0.35, 0.4];
        assert!(matches!(
            grid_spacing(&t),
            Err(DspError::NonUniformGrid { .. })
        ));
    }

    #[test]
    fn test_grid_spacing_rejects_decreasing_and_short() {
        assert!(matches!(
            grid_spacing(&[1.0, 0.5, 0.0]),
            Err(DspError::NonUniformGrid { .. })
        ));
        assert_eq!(
            grid_spacing(&[1.0]),
            Err(DspError::InsufficientData { needed: 2, got: 1 })
        );
    }

    #[test]
    fn test_compatible_dt() {
        assert!(are_compatible_dt(Seconds(1e-3), Seconds(1e-3 * (1.0 + 1e-12)), 1e-9));
        assert!(!are_compatible_dt(Seconds(1e-3), Seconds(1.001e-3), 1e-9));
        assert!(are_compatible_dt(Seconds(0.0), Seconds(0.0), 1e-9));
    }

    #[test]
    fn test_convolve_continuous_scales_by_dt() {
        // Two unit boxes of 4 samples with dt = 0.5
        let t = vec![0.0, 0.5, 1.0, 1.5];
        let x = vec![1.0; 4];

        let (axis, y) = convolve_continuous(&t, &x, &x).unwrap();

        assert_eq!(y.len(), 7);
        assert_eq!(axis.len(), 7);
        assert_eq!(axis[0], 0.0);
        assert_eq!(axis[6], 3.0);
        assert_eq!(y, vec![0.5, 1.0, 1.5, 2.0, 1.5, 1.0, 0.5]);
    }

    #[test]
    fn test_convolve_continuous_axis_offsets() {
        let t = linspace(-1.0, 1.0, 5);
        let x = vec![0.0, 1.0, 2.0, 1.0, 0.0];
        let h = vec![0.0, 0.0, 2.0, 0.0, 0.0];

        let (axis, y) = convolve_continuous(&t, &x, &h).unwrap();

        assert_eq!(axis[0], -2.0);
        assert_eq!(axis[8], 2.0);
        // h = 1/dt at t = 0 has unit area, so y reproduces x delayed by t = 0
        for (i, expected) in [0.0, 0.0, 0.0, 1.0, 2.0, 1.0, 0.0, 0.0, 0.0].iter().enumerate() {
            assert!((y[i] - expected).abs() < 1e-12);
        }
    }

    #[test]
    fn test_convolve_continuous_length_check() {
        let t = vec![0.0, 1.0, 2.0];
        let result = convolve_continuous(&t, &[1.0, 2.0], &[1.0, 2.0, 3.0]);
        assert_eq!(
            result,
            Err(DspError::LengthMismatch { expected: 3, actual: 2 })
        );
    }

    #[test]
    fn test_convolve_waveforms_sampling_mismatch() {
        let x = Waveform::new(vec![1.0; 8], Seconds(0.01), Seconds(0.0));
        let h = Waveform::new(vec![1.0; 8], Seconds(0.02), Seconds(0.0));

        let result = convolve_waveforms(&x, &h, ConvolutionMethod::Direct);
        assert!(matches!(result, Err(DspError::SamplingMismatch { .. })));
        assert!(result.unwrap_err().is_invalid_input());
    }

    #[test]
    fn test_convolve_waveforms_start_time() {
        let x = Waveform::new(vec![1.0, 2.0, 3.0], Seconds(0.1), Seconds(-0.3));
        let h = Waveform::new(vec![10.0], Seconds(0.1), Seconds(0.5));

        let y = convolve_waveforms(&x, &h, ConvolutionMethod::Fft).unwrap();

        assert!((y.t_start.0 - 0.2).abs() < 1e-12);
        assert_eq!(y.dt, Seconds(0.1));
        for (got, want) in y.samples.iter().zip([1.0, 2.0, 3.0]) {
            assert!((got - want).abs() < 1e-12);
        }
    }

    #[test]
    fn test_waveform_from_grid() {
        let t = linspace(0.0, 1.0, 11);
        let values: Vec<f64> = t.iter().map(|v| v * 2.0).collect();

        let wf = waveform_from_grid(&t, &values).unwrap();
        assert_eq!(wf.len(), 11);
        assert!((wf.dt.0 - 0.1).abs() < 1e-12);
        assert!((wf.t_end().0 - 1.0).abs() < 1e-12);

        assert!(matches!(
            waveform_from_grid(&t, &values[..3]),
            Err(DspError::LengthMismatch { .. })
        ));
    }
}
