//! Daily return statistics derived from aligned historical prices.
//!
//! Statistics are computed once per engine and then shared read-only by every
//! simulation worker.

use finplan_core::AssetSeries;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SimulationError};

/// Per-asset mean daily returns and their sample covariance matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnStatistics {
    tickers: Vec<String>,
    means: Vec<f64>,
    covariance: Vec<Vec<f64>>,
    /// Historical return vectors, one row per day, one column per asset.
    returns: Vec<Vec<f64>>,
}

impl ReturnStatistics {
    /// Derives statistics for `tickers` (in that order) from historical series.
    ///
    /// Every ticker needs exactly one series, every series needs at least two
    /// prices, and all series must share the same dates.
    ///
    /// # Errors
    /// - [`SimulationError::InvalidConfiguration`] if a ticker has no series or a
    ///   series belongs to an unconfigured ticker
    /// - [`SimulationError::InsufficientData`] if a series has fewer than 2 prices
    /// - [`SimulationError::MisalignedData`] if date indices differ
    pub fn from_series(tickers: &[String], series: &[AssetSeries]) -> Result<Self> {
        if let Some(extra) = series
            .iter()
            .find(|s| !tickers.iter().any(|t| t == s.ticker()))
        {
            return Err(SimulationError::invalid(format!(
                "price history supplied for unconfigured ticker {}",
                extra.ticker()
            )));
        }

        let mut ordered = Vec::with_capacity(tickers.len());
        for ticker in tickers {
            let mut matches = series.iter().filter(|s| s.ticker() == ticker);
            let found = matches.next().ok_or_else(|| {
                SimulationError::invalid(format!("no price history for ticker {ticker}"))
            })?;
            if matches.next().is_some() {
                return Err(SimulationError::invalid(format!(
                    "multiple price histories for ticker {ticker}"
                )));
            }
            ordered.push(found);
        }

        for s in &ordered {
            if s.len() < 2 {
                return Err(SimulationError::InsufficientData {
                    ticker: s.ticker().to_string(),
                    observations: s.len(),
                });
            }
        }

        let reference = ordered[0];
        for s in ordered.iter().skip(1) {
            if !s.dates().eq(reference.dates()) {
                return Err(SimulationError::MisalignedData {
                    ticker: s.ticker().to_string(),
                });
            }
        }

        let per_asset: Vec<Vec<f64>> = ordered.iter().map(|s| s.daily_returns()).collect();
        let n_days = per_asset[0].len();
        let rows: Vec<Vec<f64>> = (0..n_days)
            .map(|day| per_asset.iter().map(|asset| asset[day]).collect())
            .collect();

        let stats = Self::from_return_rows(tickers.to_vec(), rows)?;
        tracing::debug!(
            assets = stats.n_assets(),
            observations = stats.n_observations(),
            "Derived return statistics"
        );
        Ok(stats)
    }

    /// Builds statistics directly from daily return vectors (`rows[day][asset]`).
    ///
    /// # Errors
    /// Returns [`SimulationError::InsufficientData`] when `rows` is empty and
    /// [`SimulationError::InvalidConfiguration`] when a row width differs from
    /// the number of tickers.
    pub fn from_return_rows(tickers: Vec<String>, rows: Vec<Vec<f64>>) -> Result<Self> {
        let n_assets = tickers.len();

        if rows.is_empty() {
            return Err(SimulationError::InsufficientData {
                ticker: tickers.first().cloned().unwrap_or_default(),
                observations: 1,
            });
        }
        if let Some(bad) = rows.iter().find(|r| r.len() != n_assets) {
            return Err(SimulationError::invalid(format!(
                "return row has {} values for {} tickers",
                bad.len(),
                n_assets
            )));
        }

        let n = rows.len() as f64;
        let means: Vec<f64> = (0..n_assets)
            .map(|i| rows.iter().map(|r| r[i]).sum::<f64>() / n)
            .collect();

        // Sample covariance (n - 1); a single observation carries no dispersion.
        let mut covariance = vec![vec![0.0; n_assets]; n_assets];
        if rows.len() > 1 {
            for i in 0..n_assets {
                for j in 0..=i {
                    let sum: f64 = rows
                        .iter()
                        .map(|r| (r[i] - means[i]) * (r[j] - means[j]))
                        .sum();
                    let value = sum / (n - 1.0);
                    covariance[i][j] = value;
                    covariance[j][i] = value;
                }
            }
        }

        Ok(Self {
            tickers,
            means,
            covariance,
            returns: rows,
        })
    }

    #[must_use]
    pub fn tickers(&self) -> &[String] {
        &self.tickers
    }

    #[must_use]
    pub fn n_assets(&self) -> usize {
        self.tickers.len()
    }

    /// Number of historical daily return observations.
    #[must_use]
    pub fn n_observations(&self) -> usize {
        self.returns.len()
    }

    /// Mean daily return per asset (`mu`).
    #[must_use]
    pub fn means(&self) -> &[f64] {
        &self.means
    }

    /// Sample covariance matrix of daily returns (`Sigma`).
    #[must_use]
    pub fn covariance(&self) -> &[Vec<f64>] {
        &self.covariance
    }

    /// Daily return standard deviation per asset.
    #[must_use]
    pub fn std_devs(&self) -> Vec<f64> {
        (0..self.n_assets())
            .map(|i| self.covariance[i][i].max(0.0).sqrt())
            .collect()
    }

    /// Historical return vector for one day.
    #[must_use]
    pub fn return_vector(&self, day: usize) -> &[f64] {
        &self.returns[day]
    }

    /// Weighted mean daily portfolio return.
    #[must_use]
    pub fn portfolio_mean(&self, weights: &[f64]) -> f64 {
        weights.iter().zip(&self.means).map(|(w, m)| w * m).sum()
    }
}
