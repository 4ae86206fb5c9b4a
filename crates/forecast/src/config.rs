//! Immutable portfolio simulation configuration.

use std::collections::HashSet;

use finplan_core::{ForecastConfig, SamplerKind};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SimulationError};

/// Allowed distance between the weight sum and 1.0.
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Configuration for a Monte Carlo portfolio forecast.
///
/// Values are fixed at construction; the builder methods consume and return
/// a new configuration rather than mutating a shared one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioConfig {
    tickers: Vec<String>,
    weights: Vec<f64>,
    n_trials: usize,
    horizon_days: usize,
    seed: Option<u64>,
    base_value: f64,
    sampler: SamplerKind,
}

impl PortfolioConfig {
    /// Creates a configuration with base value 1.0, no seed and the correlated normal sampler.
    #[must_use]
    pub fn new<S: Into<String>>(
        tickers: impl IntoIterator<Item = S>,
        weights: Vec<f64>,
        n_trials: usize,
        horizon_days: usize,
    ) -> Self {
        Self {
            tickers: tickers.into_iter().map(Into::into).collect(),
            weights,
            n_trials,
            horizon_days,
            seed: None,
            base_value: 1.0,
            sampler: SamplerKind::default(),
        }
    }

    /// Sets a seed for reproducible simulations.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets the starting index value of every trajectory.
    #[must_use]
    pub fn with_base_value(mut self, base_value: f64) -> Self {
        self.base_value = base_value;
        self
    }

    /// Sets the return sampling distribution.
    #[must_use]
    pub fn with_sampler(mut self, sampler: SamplerKind) -> Self {
        self.sampler = sampler;
        self
    }

    #[must_use]
    pub fn tickers(&self) -> &[String] {
        &self.tickers
    }

    #[must_use]
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Number of independent trials (`S`).
    #[must_use]
    pub fn n_trials(&self) -> usize {
        self.n_trials
    }

    /// Forecast horizon in trading days (`T`).
    #[must_use]
    pub fn horizon_days(&self) -> usize {
        self.horizon_days
    }

    #[must_use]
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    #[must_use]
    pub fn base_value(&self) -> f64 {
        self.base_value
    }

    #[must_use]
    pub fn sampler(&self) -> SamplerKind {
        self.sampler
    }

    /// Checks every configuration invariant.
    ///
    /// # Errors
    /// Returns [`SimulationError::InvalidConfiguration`] describing the first violation.
    pub fn validate(&self) -> Result<()> {
        if self.tickers.is_empty() {
            return Err(SimulationError::invalid("at least one ticker is required"));
        }

        let mut seen = HashSet::new();
        for ticker in &self.tickers {
            if !seen.insert(ticker.as_str()) {
                return Err(SimulationError::invalid(format!(
                    "ticker {ticker} is listed more than once"
                )));
            }
        }

        if self.weights.len() != self.tickers.len() {
            return Err(SimulationError::invalid(format!(
                "{} weights supplied for {} tickers",
                self.weights.len(),
                self.tickers.len()
            )));
        }

        for (ticker, weight) in self.tickers.iter().zip(&self.weights) {
            if !weight.is_finite() || !(0.0..=1.0).contains(weight) {
                return Err(SimulationError::invalid(format!(
                    "weight for {ticker} must be within [0, 1], got {weight}"
                )));
            }
        }

        let sum: f64 = self.weights.iter().sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(SimulationError::invalid(format!(
                "weights must sum to 1, got {sum}"
            )));
        }

        if self.n_trials == 0 {
            return Err(SimulationError::invalid("trial count must be positive"));
        }

        if self.horizon_days == 0 {
            return Err(SimulationError::invalid("horizon must be at least one trading day"));
        }

        if !self.base_value.is_finite() || self.base_value <= 0.0 {
            return Err(SimulationError::invalid(format!(
                "base value must be positive, got {}",
                self.base_value
            )));
        }

        Ok(())
    }
}

impl From<&ForecastConfig> for PortfolioConfig {
    fn from(config: &ForecastConfig) -> Self {
        let portfolio = Self::new(
            config.tickers.iter().cloned(),
            config.weights.clone(),
            config.num_simulations,
            config.num_trading_days,
        )
        .with_sampler(config.sampler);

        match config.seed {
            Some(seed) => portfolio.with_seed(seed),
            None => portfolio,
        }
    }
}
