//! Discrete-time sequences with an explicit index origin.
//!
//! A DT signal `x[n]` is stored as a contiguous run of samples together with
//! the integer index of the first sample, so signals defined over negative
//! indices (e.g. `n = -20..=20`) need no padding.

use serde::{Deserialize, Serialize};

/// Inclusive range of integer sample indices `[start, end]`.
///
/// The range is empty when `end < start`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IndexRange {
    pub start: i64,
    pub end: i64,
}

impl IndexRange {
    pub fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }

    /// Number of indices in the range.
    #[inline]
    pub fn len(&self) -> usize {
        if self.end < self.start {
            0
        } else {
            (self.end - self.start + 1) as usize
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.end < self.start
    }

    #[inline]
    pub fn contains(&self, n: i64) -> bool {
        n >= self.start && n <= self.end
    }

    pub fn iter(&self) -> impl Iterator<Item = i64> {
        self.start..=self.end
    }

    pub fn to_vec(&self) -> Vec<i64> {
        self.iter().collect()
    }
}

/// A finite discrete-time sequence.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sequence {
    /// Sample values; `samples[i]` is `x[origin + i]`.
    pub samples: Vec<f64>,

    /// Index of the first sample.
    pub origin: i64,
}

impl Sequence {
    pub fn new(samples: Vec<f64>, origin: i64) -> Self {
        Self { samples, origin }
    }

    /// Sequence starting at index 0.
    pub fn causal(samples: Vec<f64>) -> Self {
        Self::new(samples, 0)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Index of the last sample (`origin - 1` for an empty sequence).
    #[inline]
    pub fn last_index(&self) -> i64 {
        self.origin + self.samples.len() as i64 - 1
    }

    /// The index range covered by this sequence.
    #[inline]
    pub fn indices(&self) -> IndexRange {
        IndexRange::new(self.origin, self.last_index())
    }

    /// Explicit index axis, one entry per sample.
    pub fn index_vec(&self) -> Vec<i64> {
        self.indices().to_vec()
    }

    /// Value at index `n`; zero outside the stored support.
    pub fn value_at(&self, n: i64) -> f64 {
        let offset = n - self.origin;
        if offset < 0 {
            return 0.0;
        }
        self.samples.get(offset as usize).copied().unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_indices() {
        let seq = Sequence::new(vec![1.0, 2.0, 3.0, 4.0], -2);

        assert_eq!(seq.indices(), IndexRange::new(-2, 1));
        assert_eq!(seq.index_vec(), vec![-2, -1, 0, 1]);
        assert_eq!(seq.last_index(), 1);
    }

    #[test]
    fn test_value_at_zero_outside_support() {
        let seq = Sequence::new(vec![5.0, 6.0], 3);

        assert_eq!(seq.value_at(3), 5.0);
        assert_eq!(seq.value_at(4), 6.0);
        assert_eq!(seq.value_at(2), 0.0);
        assert_eq!(seq.value_at(5), 0.0);
    }

    #[test]
    fn test_empty_range() {
        let range = IndexRange::new(4, 3);
        assert!(range.is_empty());
        assert_eq!(range.len(), 0);
        assert_eq!(range.iter().count(), 0);

        let seq = Sequence::causal(Vec::new());
        assert!(seq.indices().is_empty());
    }
}
