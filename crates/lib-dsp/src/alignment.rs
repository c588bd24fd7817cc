//! Index and time-axis bookkeeping for convolution outputs.
//!
//! Convolution is shift-and-sum: if `x` starts at index `n_x0` and `h` at
//! `n_h0`, the first non-trivial overlap lands at `n_x0 + n_h0` and the last
//! at `(n_x0 + N - 1) + (n_h0 + M - 1)`. Position `k` of the zero-based
//! convolution output therefore belongs to index `n_x0 + n_h0 + k`.

use lib_types::sequence::IndexRange;

/// Output index range of convolving a sequence starting at `origin_x` with
/// `len_x` samples with one starting at `origin_h` with `len_h` samples.
///
/// Zero-length operands yield an empty range.
pub fn convolution_index_range(
    origin_x: i64,
    len_x: usize,
    origin_h: i64,
    len_h: usize,
) -> IndexRange {
    let start = origin_x + origin_h;
    let end = (origin_x + len_x as i64 - 1) + (origin_h + len_h as i64 - 1);
    if len_x == 0 || len_h == 0 {
        return IndexRange::new(start, start - 1);
    }
    IndexRange::new(start, end)
}

/// Time axis of a continuous convolution output.
///
/// Starts at `x_first + h_first`, ends at `x_last + h_last` and holds `len`
/// linearly spaced points. For `x` and `h` sharing spacing `dt` and
/// `len = N + M - 1`, the step equals `dt`.
pub fn convolution_time_axis(
    x_first: f64,
    x_last: f64,
    h_first: f64,
    h_last: f64,
    len: usize,
) -> Vec<f64> {
    linspace(x_first + h_first, x_last + h_last, len)
}

/// `n` evenly spaced points over `[start, end]`, both ends included.
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            let mut out: Vec<f64> = (0..n).map(|i| start + i as f64 * step).collect();
            // pin the end point exactly
            out[n - 1] = end;
            out
        }
    }
}
