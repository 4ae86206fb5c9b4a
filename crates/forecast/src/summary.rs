//! Fixed-order summary statistics over final cumulative returns.
//!
//! The reduction is an ordered ten-element sequence rather than a keyed map so
//! that positional consumers keep working: index 8 is always the lower 95%
//! bound and index 9 the upper 95% bound.
//!
//! | index | statistic |
//! |-------|-----------|
//! | 0 | count |
//! | 1 | mean |
//! | 2 | std (sample, ddof 1) |
//! | 3 | min |
//! | 4 | 25th percentile |
//! | 5 | 50th percentile |
//! | 6 | 75th percentile |
//! | 7 | max |
//! | 8 | 95% CI lower (2.5th percentile) |
//! | 9 | 95% CI upper (97.5th percentile) |

use std::ops::Index;

use serde::{Deserialize, Serialize};

/// Linear-interpolated percentile of an ascending slice, `p` in `[0, 1]`.
///
/// Uses position `p * (n - 1)` and interpolates between the neighbouring
/// order statistics. Returns `NaN` for an empty slice.
#[must_use]
pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    match sorted.len() {
        0 => f64::NAN,
        1 => sorted[0],
        n => {
            let pos = p.clamp(0.0, 1.0) * (n - 1) as f64;
            let lower = pos.floor() as usize;
            let upper = pos.ceil() as usize;
            let frac = pos - lower as f64;
            if lower == upper {
                sorted[lower]
            } else {
                sorted[lower] + (sorted[upper] - sorted[lower]) * frac
            }
        }
    }
}

/// Number of entries in a [`SummaryStatistics`] sequence.
pub const SUMMARY_LEN: usize = 10;

/// Ten summary statistics of the final cumulative-return distribution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SummaryStatistics([f64; SUMMARY_LEN]);

impl SummaryStatistics {
    pub const LEN: usize = SUMMARY_LEN;

    pub const COUNT: usize = 0;
    pub const MEAN: usize = 1;
    pub const STD: usize = 2;
    pub const MIN: usize = 3;
    pub const P25: usize = 4;
    pub const MEDIAN: usize = 5;
    pub const P75: usize = 6;
    pub const MAX: usize = 7;
    pub const CI_LOWER: usize = 8;
    pub const CI_UPPER: usize = 9;

    /// Labels in positional order.
    pub const LABELS: [&'static str; Self::LEN] = [
        "count",
        "mean",
        "std",
        "min",
        "25%",
        "50%",
        "75%",
        "max",
        "95% CI Lower",
        "95% CI Upper",
    ];

    /// Reduces a set of final cumulative returns. Returns `None` when `values` is empty.
    #[must_use]
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        let n = sorted.len();
        let mean = sorted.iter().sum::<f64>() / n as f64;
        let std = if n > 1 {
            let ss: f64 = sorted.iter().map(|v| (v - mean) * (v - mean)).sum();
            (ss / (n - 1) as f64).sqrt()
        } else {
            0.0
        };

        Some(Self([
            n as f64,
            mean,
            std,
            sorted[0],
            percentile(&sorted, 0.25),
            percentile(&sorted, 0.50),
            percentile(&sorted, 0.75),
            sorted[n - 1],
            percentile(&sorted, 0.025),
            percentile(&sorted, 0.975),
        ]))
    }

    /// Statistic at a positional index, `None` past the end.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<f64> {
        self.0.get(index).copied()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// `(label, value)` pairs in positional order.
    pub fn labeled(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        Self::LABELS.iter().copied().zip(self.0.iter().copied())
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.0[Self::COUNT] as usize
    }

    #[must_use]
    pub fn mean(&self) -> f64 {
        self.0[Self::MEAN]
    }

    #[must_use]
    pub fn std(&self) -> f64 {
        self.0[Self::STD]
    }

    #[must_use]
    pub fn min(&self) -> f64 {
        self.0[Self::MIN]
    }

    #[must_use]
    pub fn p25(&self) -> f64 {
        self.0[Self::P25]
    }

    #[must_use]
    pub fn median(&self) -> f64 {
        self.0[Self::MEDIAN]
    }

    #[must_use]
    pub fn p75(&self) -> f64 {
        self.0[Self::P75]
    }

    #[must_use]
    pub fn max(&self) -> f64 {
        self.0[Self::MAX]
    }

    /// Lower bound of the 95% confidence interval (2.5th percentile).
    #[must_use]
    pub fn ci_lower(&self) -> f64 {
        self.0[Self::CI_LOWER]
    }

    /// Upper bound of the 95% confidence interval (97.5th percentile).
    #[must_use]
    pub fn ci_upper(&self) -> f64 {
        self.0[Self::CI_UPPER]
    }

    #[must_use]
    pub fn ci_width(&self) -> f64 {
        self.ci_upper() - self.ci_lower()
    }
}

impl Index<usize> for SummaryStatistics {
    type Output = f64;

    fn index(&self, index: usize) -> &f64 {
        &self.0[index]
    }
}
