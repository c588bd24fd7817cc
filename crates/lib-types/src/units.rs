//! Physical units with type safety.
//!
//! The lab works on normalized time axes (seconds around `t = 0`), so only
//! time and frequency need newtypes. Keeping them distinct prevents a
//! sampling interval from being passed where a sine frequency is expected.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Neg};

/// Time in seconds. May be negative: signals are defined around `t = 0`.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
pub struct Seconds(pub f64);

impl Add for Seconds {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Neg for Seconds {
    type Output = Self;
    fn neg(self) -> Self {
        Self(-self.0)
    }
}

/// Frequency in Hertz.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
pub struct Hertz(pub f64);

impl Hertz {
    /// Angular frequency (omega = 2 * pi * f).
    #[inline]
    pub fn angular(&self) -> f64 {
        2.0 * std::f64::consts::PI * self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_angular_frequency() {
        let omega = Hertz(0.5).angular();
        assert!((omega - std::f64::consts::PI).abs() < 1e-12);
    }

    #[test]
    fn test_seconds_arithmetic() {
        let a = Seconds(-1.0);
        let b = Seconds(0.5);

        assert_eq!(a + b, Seconds(-0.5));
        assert_eq!(-a, Seconds(1.0));
    }
}
