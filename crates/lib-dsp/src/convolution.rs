//! Linear convolution of finite sequences.
//!
//! Two algorithmically distinct paths compute the same result:
//!
//! - [`direct_convolve`]: the defining double sum, O(N·M). This is the
//!   reference path.
//! - [`fft_convolve`]: zero-padded FFT, pointwise product, inverse FFT.
//!
//! Both implement *linear* (not circular) convolution: for `x` of length `N`
//! and `h` of length `M` the output has `N + M - 1` samples and
//!
//! ```text
//! y[n] = Σ_{k=0}^{N-1} x[k] · h[n-k],   terms with n-k outside [0, M) are zero
//! ```
//!
//! Index origins are not handled here; see [`convolve_sequences`] and
//! [`crate::alignment`].

use crate::alignment::convolution_index_range;
use crate::error::{DspError, DspResult};
use crate::fft::FftEngine;
use lib_types::sequence::Sequence;
use serde::{Deserialize, Serialize};

/// Which convolution algorithm to run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConvolutionMethod {
    /// Direct double summation.
    #[default]
    Direct,
    /// FFT-based convolution.
    Fft,
}

impl ConvolutionMethod {
    /// Convolve `x` with `h` using this method.
    pub fn convolve(self, x: &[f64], h: &[f64]) -> DspResult<Vec<f64>> {
        match self {
            ConvolutionMethod::Direct => direct_convolve(x, h),
            ConvolutionMethod::Fft => fft_convolve(x, h),
        }
    }

    /// Short lowercase name used in logs and CLI output.
    pub fn name(self) -> &'static str {
        match self {
            ConvolutionMethod::Direct => "direct",
            ConvolutionMethod::Fft => "fft",
        }
    }
}

fn check_operands(x: &[f64], h: &[f64]) -> DspResult<()> {
    if x.is_empty() {
        return Err(DspError::EmptyInput { operand: "x" });
    }
    if h.is_empty() {
        return Err(DspError::EmptyInput { operand: "h" });
    }
    Ok(())
}

/// Direct convolution by explicit summation.
///
/// For every output position `n` the overlap `k` runs only over indices
/// where both `x[k]` and `h[n-k]` exist.
pub fn direct_convolve(x: &[f64], h: &[f64]) -> DspResult<Vec<f64>> {
    check_operands(x, h)?;

    let n_x = x.len();
    let n_h = h.len();
    let output_len = n_x + n_h - 1;

    let output = (0..output_len)
        .map(|n| {
            // 0 <= n-k < M  <=>  n+1-M <= k <= n
            let k_min = (n + 1).saturating_sub(n_h);
            let k_max = n.min(n_x - 1);
            (k_min..=k_max).map(|k| x[k] * h[n - k]).sum::<f64>()
        })
        .collect();

    Ok(output)
}

/// FFT-based convolution (single block).
///
/// Both operands are zero-padded to the next power of two at or above
/// `N + M - 1`, so the circular product equals the linear convolution.
pub fn fft_convolve(x: &[f64], h: &[f64]) -> DspResult<Vec<f64>> {
    check_operands(x, h)?;

    let output_len = x.len() + h.len() - 1;
    let fft_size = output_len.next_power_of_two();

    tracing::trace!(
        "fft_convolve: len_x={}, len_h={}, fft_size={}",
        x.len(),
        h.len(),
        fft_size
    );

    let mut engine = FftEngine::new();

    let mut x_fft = FftEngine::complex_padded(x, fft_size);
    let mut h_fft = FftEngine::complex_padded(h, fft_size);

    engine.fft_inplace(&mut x_fft)?;
    engine.fft_inplace(&mut h_fft)?;

    for (a, b) in x_fft.iter_mut().zip(h_fft.iter()) {
        *a *= *b;
    }

    engine.ifft_inplace(&mut x_fft)?;

    // Extract real part and truncate to output length
    Ok(x_fft[..output_len].iter().map(|c| c.re).collect())
}

/// Convolve two sequences, carrying their index origins into the output.
pub fn convolve_sequences(
    x: &Sequence,
    h: &Sequence,
    method: ConvolutionMethod,
) -> DspResult<Sequence> {
    let samples = method.convolve(&x.samples, &h.samples)?;
    let range = convolution_index_range(x.origin, x.len(), h.origin, h.len());

    debug_assert_eq!(range.len(), samples.len());
    tracing::debug!(
        "convolve_sequences ({}): {} x {} samples -> indices [{}, {}]",
        method.name(),
        x.len(),
        h.len(),
        range.start,
        range.end
    );

    Ok(Sequence::new(samples, range.start))
}
