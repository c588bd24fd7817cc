//! Validation report value object.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Error metrics from comparing two signals of equal length.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Largest elementwise absolute difference.
    pub max_abs_error: f64,

    /// Root-mean-square of the elementwise difference.
    pub rmse: f64,

    /// Human-readable statement of the property that was checked.
    pub property: String,

    /// Number of compared samples.
    pub samples: usize,
}

impl ValidationReport {
    /// Whether the maximum absolute error is within `tolerance`.
    #[inline]
    pub fn passes(&self, tolerance: f64) -> bool {
        self.max_abs_error <= tolerance
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: max |e| = {:.3e}, RMSE = {:.3e} over {} samples",
            self.property, self.max_abs_error, self.rmse, self.samples
        )
    }
}
