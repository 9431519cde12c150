use serde::Serialize;

use crate::error::{TimerError, TimerResult};

/// The percentile ladder reported for every full window.
/// Values are elapsed seconds at full precision.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PercentileSet {
    pub p50: f64,
    pub p75: f64,
    pub p90: f64,
    pub p99: f64,
}

impl PercentileSet {
    /// Extract the ladder from an already sorted sample slice.
    /// Returns `None` for an empty slice.
    pub fn from_sorted(sorted: &[f64]) -> Option<Self> {
        if sorted.is_empty() {
            return None;
        }

        Some(Self {
            p50: interpolate(sorted, 50.0),
            p75: interpolate(sorted, 75.0),
            p90: interpolate(sorted, 90.0),
            p99: interpolate(sorted, 99.0),
        })
    }

    /// `(label, value)` pairs in ascending order, for renderers.
    pub fn entries(&self) -> [(&'static str, f64); 4] {
        [
            ("50%", self.p50),
            ("75%", self.p75),
            ("90%", self.p90),
            ("99%", self.p99),
        ]
    }
}

/// Sorted copy of `samples`. NaN-free input is assumed; `total_cmp` keeps the
/// order well-defined regardless.
pub fn sort_samples(samples: &[f64]) -> Vec<f64> {
    let mut sorted = samples.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted
}

/// Interpolated percentile (R-7) of an ascending slice.
///
/// `k = (n - 1) * p / 100`; the result blends the order statistics at
/// `floor(k)` and `floor(k) + 1`, or is the sample at `floor(k)` when `k`
/// lands on the last index.
pub fn percentile(sorted: &[f64], p: f64) -> TimerResult<f64> {
    if sorted.is_empty() {
        return Err(TimerError::EmptyWindow);
    }
    if !(0.0..=100.0).contains(&p) {
        return Err(TimerError::InvalidPercentile(p));
    }
    Ok(interpolate(sorted, p))
}

/// Unchecked core of [`percentile`]: `sorted` non-empty, `p` in range.
pub(crate) fn interpolate(sorted: &[f64], p: f64) -> f64 {
    let k = (sorted.len() - 1) as f64 * p / 100.0;
    let f = k.floor() as usize;
    let c = f + 1;

    if c >= sorted.len() {
        return sorted[f];
    }
    sorted[f] * (c as f64 - k) + sorted[c] * (k - f as f64)
}
