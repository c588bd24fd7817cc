//! # lib-dsp
//!
//! Convolution core of the convolution lab.
//!
//! - **Convolution**: direct summation and FFT-based linear convolution
//! - **Alignment**: output index ranges and time axes
//! - **Continuous**: Riemann-sum approximation of CT convolution on uniform grids
//! - **Validation**: cross-implementation checks and the impulse identity
//! - **Signals / Ops**: canonical test signals and elementary operations

pub mod error;
pub mod fft;
pub mod alignment;
pub mod convolution;
pub mod continuous;
pub mod interpolation;
pub mod validation;
pub mod signals;
pub mod ops;

pub use error::{DspError, DspResult};
pub use fft::FftEngine;
pub use alignment::{convolution_index_range, convolution_time_axis, linspace};
pub use convolution::{convolve_sequences, direct_convolve, fft_convolve, ConvolutionMethod};
pub use continuous::{convolve_continuous, convolve_waveforms, grid_spacing, waveform_from_grid};
pub use signals::PulseNormalization;
pub use validation::{
    check_tolerance, cross_validate, impulse_width_sweep, validate_against_reference,
    validate_impulse_identity_ct, validate_impulse_identity_dt, IdentityOutcome, WidthReport,
};
