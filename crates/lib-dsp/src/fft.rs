//! FFT/IFFT operations using rustfft.
//!
//! Used only as the second, independent convolution algorithm; the lab does
//! no spectral analysis of its own.

use crate::error::{DspError, DspResult};
use num_complex::Complex64;
use rustfft::FftPlanner;

/// FFT engine with a cached planner.
pub struct FftEngine {
    planner: FftPlanner<f64>,
}

impl FftEngine {
    /// Create a new FFT engine.
    pub fn new() -> Self {
        Self {
            planner: FftPlanner::new(),
        }
    }

    /// Perform forward FFT on complex data in-place.
    pub fn fft_inplace(&mut self, data: &mut [Complex64]) -> DspResult<()> {
        let len = data.len();
        if !len.is_power_of_two() {
            return Err(DspError::InvalidFftSize(len));
        }

        let fft = self.planner.plan_fft_forward(len);
        fft.process(data);
        Ok(())
    }

    /// Perform inverse FFT on complex data in-place.
    ///
    /// The result is normalized by `1/len`, so `ifft(fft(x)) == x`.
    pub fn ifft_inplace(&mut self, data: &mut [Complex64]) -> DspResult<()> {
        let len = data.len();
        if !len.is_power_of_two() {
            return Err(DspError::InvalidFftSize(len));
        }

        let fft = self.planner.plan_fft_inverse(len);
        fft.process(data);

        // Normalize
        let scale = 1.0 / len as f64;
        for x in data.iter_mut() {
            *x *= scale;
        }

        Ok(())
    }

    /// Zero-pad a real signal to `len` and lift it to the complex plane.
    pub fn complex_padded(signal: &[f64], len: usize) -> Vec<Complex64> {
        let mut buf: Vec<Complex64> = signal
            .iter()
            .map(|&v| Complex64::new(v, 0.0))
            .collect();
        buf.resize(len.max(signal.len()), Complex64::new(0.0, 0.0));
        buf
    }
}

impl Default for FftEngine {
    fn default() -> Self {
        Self::new()
    }
}
