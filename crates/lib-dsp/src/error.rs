//! Error types for convolution and validation.

use thiserror::Error;

/// Errors that can occur during DSP operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DspError {
    /// An operand that must hold at least one sample was empty.
    #[error("Empty input: {operand} has no samples")]
    EmptyInput { operand: &'static str },

    /// Input length mismatch.
    #[error("Input length mismatch: expected {expected}, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    /// Insufficient data for operation.
    #[error("Insufficient data: need at least {needed}, got {got}")]
    InsufficientData { needed: usize, got: usize },

    /// Time grid is not strictly increasing with constant spacing.
    #[error("Non-uniform time grid at index {index}: step {step:.6e} vs spacing {dt:.6e}")]
    NonUniformGrid { index: usize, step: f64, dt: f64 },

    /// Two continuous-time signals were sampled with different intervals.
    #[error("Sampling interval mismatch: {dt_x:.6e} vs {dt_h:.6e}")]
    SamplingMismatch { dt_x: f64, dt_h: f64 },

    /// Invalid parameter value.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// FFT size is not a power of 2.
    #[error("FFT size must be power of 2, got {0}")]
    InvalidFftSize(usize),

    /// A validation metric exceeded its allowed tolerance.
    #[error("{property}: max abs error {max_abs_error:.3e} exceeds tolerance {tolerance:.3e}")]
    ToleranceExceeded {
        property: String,
        max_abs_error: f64,
        tolerance: f64,
    },
}

impl DspError {
    /// Whether this error stems from a malformed call (empty operand,
    /// mismatched lengths or sampling grids, bad parameter).
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            DspError::EmptyInput { .. }
                | DspError::LengthMismatch { .. }
                | DspError::InsufficientData { .. }
                | DspError::NonUniformGrid { .. }
                | DspError::SamplingMismatch { .. }
                | DspError::InvalidInput(_)
        )
    }
}

/// Result type for DSP operations.
pub type DspResult<T> = Result<T, DspError>;
