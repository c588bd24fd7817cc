//! # lib-types
//!
//! Core type definitions for the convolution lab.
//!
//! - Physical units (`Seconds`, `Hertz`)
//! - `Sequence` and `IndexRange` for discrete-time signals
//! - `Waveform` for uniformly sampled continuous-time signals
//! - `ValidationReport` for comparison metrics

pub mod units;
pub mod sequence;
pub mod waveform;
pub mod report;

pub use units::*;
pub use sequence::*;
pub use waveform::*;
pub use report::*;
