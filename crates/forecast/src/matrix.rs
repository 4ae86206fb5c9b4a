//! Trial-by-day matrix of simulated cumulative returns.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimulationError};
use crate::summary::percentile;

/// S x (T+1) cumulative-return trajectories, stored row-major.
///
/// Row `s` is trial `s`; column 0 holds the base value and the last column the
/// final cumulative return multiplier (1.0 = breakeven for the default base).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawMatrix")]
pub struct CumulativeReturnMatrix {
    n_trials: usize,
    n_columns: usize,
    values: Vec<f64>,
}

/// Unchecked wire form; validated by [`CumulativeReturnMatrix::from_raw`].
#[derive(Deserialize)]
struct RawMatrix {
    n_trials: usize,
    n_columns: usize,
    values: Vec<f64>,
}

impl TryFrom<RawMatrix> for CumulativeReturnMatrix {
    type Error = SimulationError;

    fn try_from(raw: RawMatrix) -> Result<Self> {
        Self::from_raw(raw.n_trials, raw.n_columns, raw.values)
    }
}

/// Per-day percentile curve across all trials.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PercentileBand {
    /// Percentile in `[0, 1]`.
    pub percentile: f64,
    /// One value per column (day 0..=T).
    pub values: Vec<f64>,
}

/// Equal-width histogram bin of final cumulative returns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

impl CumulativeReturnMatrix {
    /// Wraps a row-major buffer of `n_trials * n_columns` values.
    ///
    /// # Errors
    /// Returns [`SimulationError::MalformedMatrix`] if there is no day-0 column
    /// or the buffer length does not match the dimensions.
    pub fn from_raw(n_trials: usize, n_columns: usize, values: Vec<f64>) -> Result<Self> {
        let expected = n_trials.checked_mul(n_columns);
        if n_columns == 0 || expected != Some(values.len()) {
            return Err(SimulationError::MalformedMatrix {
                n_trials,
                n_columns,
                len: values.len(),
            });
        }
        Ok(Self {
            n_trials,
            n_columns,
            values,
        })
    }

    /// Number of trials (rows).
    #[must_use]
    pub fn n_trials(&self) -> usize {
        self.n_trials
    }

    /// Number of columns, `T + 1`.
    #[must_use]
    pub fn n_columns(&self) -> usize {
        self.n_columns
    }

    /// Forecast horizon in trading days.
    #[must_use]
    pub fn horizon_days(&self) -> usize {
        self.n_columns - 1
    }

    /// Trajectory of one trial.
    #[must_use]
    pub fn row(&self, trial: usize) -> &[f64] {
        let start = trial * self.n_columns;
        &self.values[start..start + self.n_columns]
    }

    /// Iterator over trial trajectories in trial order.
    pub fn rows(&self) -> impl ExactSizeIterator<Item = &[f64]> + '_ {
        self.values.chunks_exact(self.n_columns)
    }

    /// Values of every trial on one day.
    #[must_use]
    pub fn column(&self, day: usize) -> Vec<f64> {
        self.rows().map(|row| row[day]).collect()
    }

    /// Final cumulative return of every trial, in trial order.
    #[must_use]
    pub fn final_returns(&self) -> Vec<f64> {
        self.column(self.n_columns - 1)
    }

    /// Whole matrix as a row-major slice.
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    /// Per-day percentile curves, one band per requested percentile.
    #[must_use]
    pub fn percentile_bands(&self, percentiles: &[f64]) -> Vec<PercentileBand> {
        let mut bands: Vec<PercentileBand> = percentiles
            .iter()
            .map(|&p| PercentileBand {
                percentile: p,
                values: Vec::with_capacity(self.n_columns),
            })
            .collect();

        for day in 0..self.n_columns {
            let mut column = self.column(day);
            column.sort_by(f64::total_cmp);
            for band in &mut bands {
                band.values.push(percentile(&column, band.percentile));
            }
        }

        bands
    }

    /// Equal-width histogram of final returns over `[min, max]`.
    ///
    /// A degenerate distribution (all values equal) yields a single bin.
    #[must_use]
    pub fn histogram(&self, bins: usize) -> Vec<HistogramBin> {
        let finals = self.final_returns();
        let bins = bins.max(1);
        let min = finals.iter().copied().fold(f64::INFINITY, f64::min);
        let max = finals.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        if !(max > min) {
            return vec![HistogramBin {
                lower: min,
                upper: max,
                count: finals.len(),
            }];
        }

        let width = (max - min) / bins as f64;
        let mut out: Vec<HistogramBin> = (0..bins)
            .map(|i| HistogramBin {
                lower: min + width * i as f64,
                upper: if i + 1 == bins {
                    max
                } else {
                    min + width * (i + 1) as f64
                },
                count: 0,
            })
            .collect();

        for value in finals {
            let idx = (((value - min) / width) as usize).min(bins - 1);
            out[idx].count += 1;
        }

        out
    }
}
