//! Continuous-time waveform representation.
//!
//! A CT signal is stored as samples on a uniform time grid. For a waveform
//! with `N` samples, the sample times are:
//!
//! ```text
//! t[i] = t_start + i * dt,  for i = 0, 1, ..., N-1
//! ```
//!
//! Storing `dt` and `t_start` instead of an explicit time array makes the
//! uniform-grid invariant hold by construction. Waveforms built from an
//! explicit time array go through `lib_dsp::continuous::waveform_from_grid`,
//! which checks the spacing first.

use crate::units::Seconds;
use serde::{Deserialize, Serialize};

/// A uniformly-sampled continuous-time signal.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Waveform {
    /// Sample values.
    pub samples: Vec<f64>,

    /// Time step between consecutive samples.
    pub dt: Seconds,

    /// Time of the first sample (negative for signals defined before `t = 0`).
    pub t_start: Seconds,
}

impl Waveform {
    /// Create a new waveform from samples.
    pub fn new(samples: Vec<f64>, dt: Seconds, t_start: Seconds) -> Self {
        Self { samples, dt, t_start }
    }

    /// Number of samples in the waveform.
    #[inline]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Check if the waveform is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Time of the last sample.
    ///
    /// Returns t_start if the waveform is empty.
    #[inline]
    pub fn t_end(&self) -> Seconds {
        if self.samples.is_empty() {
            return self.t_start;
        }
        Seconds(self.t_start.0 + (self.samples.len() - 1) as f64 * self.dt.0)
    }

    /// Get the time value for a given sample index.
    #[inline]
    pub fn time_at(&self, index: usize) -> Seconds {
        Seconds(self.t_start.0 + index as f64 * self.dt.0)
    }

    /// The explicit time axis, one entry per sample.
    pub fn times(&self) -> Vec<f64> {
        (0..self.samples.len()).map(|i| self.time_at(i).0).collect()
    }

    /// Maximum absolute value.
    pub fn max_abs(&self) -> f64 {
        self.samples.iter().map(|v| v.abs()).fold(0.0, f64::max)
    }

    /// Root mean square value.
    pub fn rms(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        let sum_sq: f64 = self.samples.iter().map(|v| v * v).sum();
        (sum_sq / self.samples.len() as f64).sqrt()
    }
}
