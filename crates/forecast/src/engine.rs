//! Monte Carlo portfolio simulation engine.
//!
//! The engine moves through three states:
//!
//! ```text
//! Configured --prepare_statistics--> StatisticsReady --simulate--> Simulated
//! ```
//!
//! Each trial compounds the weighted daily portfolio return onto the base value:
//! `index[t] = index[t-1] * (1 + w . r[t])`, with `r[t]` drawn from the selected
//! [`ReturnSampler`]. Trials run in parallel over disjoint rows of the output
//! buffer; every trial owns a generator seeded from a per-trial sub-seed so the
//! matrix does not depend on scheduling.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use finplan_core::AssetSeries;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::cancel::CancellationToken;
use crate::config::PortfolioConfig;
use crate::error::{Result, SimulationError};
use crate::matrix::CumulativeReturnMatrix;
use crate::sampler::{build_sampler, ReturnSampler};
use crate::statistics::ReturnStatistics;
use crate::summary::SummaryStatistics;

/// Trials between debug progress events.
const PROGRESS_INTERVAL: usize = 10;

/// Lifecycle state of a [`SimulationEngine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineState {
    /// Configuration validated and data stored; nothing derived yet.
    Configured,
    /// Return statistics derived from history.
    StatisticsReady,
    /// A full cumulative-return matrix is available.
    Simulated,
}

/// Owns one portfolio configuration, its history and the latest simulation.
#[derive(Debug)]
pub struct SimulationEngine {
    config: PortfolioConfig,
    series: Vec<AssetSeries>,
    statistics: Option<Arc<ReturnStatistics>>,
    matrix: Option<CumulativeReturnMatrix>,
    state: EngineState,
}

impl SimulationEngine {
    /// Validates `config` and stores the price history.
    ///
    /// # Errors
    /// Returns [`SimulationError::InvalidConfiguration`] if the configuration
    /// breaks an invariant. No statistics are computed here.
    pub fn new(config: PortfolioConfig, series: Vec<AssetSeries>) -> Result<Self> {
        config.validate()?;

        tracing::debug!(
            tickers = ?config.tickers(),
            trials = config.n_trials(),
            horizon_days = config.horizon_days(),
            sampler = ?config.sampler(),
            "Configured simulation engine"
        );

        Ok(Self {
            config,
            series,
            statistics: None,
            matrix: None,
            state: EngineState::Configured,
        })
    }

    #[must_use]
    pub fn config(&self) -> &PortfolioConfig {
        &self.config
    }

    #[must_use]
    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Derives return statistics once; later calls keep the existing ones.
    ///
    /// # Errors
    /// Propagates [`SimulationError::InsufficientData`],
    /// [`SimulationError::MisalignedData`] or
    /// [`SimulationError::InvalidConfiguration`] from the history.
    pub fn prepare_statistics(&mut self) -> Result<&ReturnStatistics> {
        self.ensure_statistics()?;
        self.statistics()
    }

    /// Derived return statistics.
    ///
    /// # Errors
    /// Returns [`SimulationError::StatisticsNotReady`] before derivation.
    pub fn statistics(&self) -> Result<&ReturnStatistics> {
        self.statistics
            .as_deref()
            .ok_or(SimulationError::StatisticsNotReady)
    }

    /// Runs every trial, replacing any previous matrix.
    ///
    /// # Errors
    /// Returns statistics derivation errors when the engine is still `Configured`.
    pub fn simulate(&mut self) -> Result<&CumulativeReturnMatrix> {
        self.simulate_with_cancel(&CancellationToken::new())
    }

    /// Runs every trial, checking `cancel` before each one starts.
    ///
    /// # Errors
    /// Returns [`SimulationError::Cancelled`] if the token fires before all
    /// trials finish. Partial output is discarded and the engine is left in
    /// `StatisticsReady`.
    pub fn simulate_with_cancel(
        &mut self,
        cancel: &CancellationToken,
    ) -> Result<&CumulativeReturnMatrix> {
        let stats = self.ensure_statistics()?;
        let sampler = build_sampler(self.config.sampler(), &stats);
        self.run_trials(&*sampler, stats.n_assets(), cancel)
    }

    /// Latest S x (T+1) cumulative-return matrix.
    ///
    /// # Errors
    /// Returns [`SimulationError::NotSimulated`] before a completed run.
    pub fn cumulative_returns(&self) -> Result<&CumulativeReturnMatrix> {
        self.matrix.as_ref().ok_or(SimulationError::NotSimulated)
    }

    /// Ten-value summary of the final cumulative returns.
    ///
    /// # Errors
    /// Returns [`SimulationError::NotSimulated`] before a completed run.
    pub fn summarize(&self) -> Result<SummaryStatistics> {
        let matrix = self.cumulative_returns()?;
        SummaryStatistics::from_values(&matrix.final_returns()).ok_or(SimulationError::NotSimulated)
    }

    fn run_trials(
        &mut self,
        sampler: &dyn ReturnSampler,
        n_assets: usize,
        cancel: &CancellationToken,
    ) -> Result<&CumulativeReturnMatrix> {
        let n_trials = self.config.n_trials();
        let n_columns = self.config.horizon_days() + 1;
        let weights = self.config.weights();
        let base = self.config.base_value();

        tracing::info!(
            trials = n_trials,
            horizon_days = n_columns - 1,
            sampler = sampler.name(),
            "Starting Monte Carlo simulation"
        );
        let started = Instant::now();

        let seeds = trial_seeds(self.config.seed(), n_trials);
        let mut values = vec![0.0; n_trials * n_columns];
        let completed = AtomicUsize::new(0);

        let outcome = values
            .par_chunks_mut(n_columns)
            .zip(seeds.par_iter())
            .try_for_each_init(
                || vec![0.0; n_assets],
                |draws, (row, &seed)| {
                    if cancel.is_cancelled() {
                        return Err(());
                    }

                    run_trial(sampler, weights, base, seed, row, draws);

                    let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
                    if done % PROGRESS_INTERVAL == 0 {
                        tracing::debug!(completed = done, total = n_trials, "Simulation progress");
                    }
                    Ok(())
                },
            );

        let completed_trials = completed.load(Ordering::Relaxed);
        if outcome.is_err() {
            tracing::warn!(completed_trials, total = n_trials, "Simulation cancelled");
            self.matrix = None;
            self.state = EngineState::StatisticsReady;
            return Err(SimulationError::Cancelled { completed_trials });
        }

        tracing::info!(
            trials = n_trials,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Simulation complete"
        );

        self.matrix = Some(CumulativeReturnMatrix::from_raw(
            n_trials, n_columns, values,
        )?);
        self.state = EngineState::Simulated;
        self.cumulative_returns()
    }

    fn ensure_statistics(&mut self) -> Result<Arc<ReturnStatistics>> {
        if let Some(stats) = &self.statistics {
            return Ok(Arc::clone(stats));
        }

        let stats = Arc::new(ReturnStatistics::from_series(
            self.config.tickers(),
            &self.series,
        )?);
        tracing::info!(
            assets = stats.n_assets(),
            observations = stats.n_observations(),
            portfolio_mean = stats.portfolio_mean(self.config.weights()),
            "Return statistics ready"
        );

        self.statistics = Some(Arc::clone(&stats));
        self.state = EngineState::StatisticsReady;
        Ok(stats)
    }
}

/// One sub-seed per trial, drawn from a master generator in trial order.
fn trial_seeds(seed: Option<u64>, n_trials: usize) -> Vec<u64> {
    let mut master = match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => ChaCha8Rng::from_entropy(),
    };
    (0..n_trials).map(|_| master.next_u64()).collect()
}

fn run_trial(
    sampler: &dyn ReturnSampler,
    weights: &[f64],
    base: f64,
    seed: u64,
    row: &mut [f64],
    draws: &mut [f64],
) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut index = base;
    row[0] = index;

    for cell in row.iter_mut().skip(1) {
        sampler.sample(&mut rng, draws);
        let portfolio_return: f64 = weights.iter().zip(draws.iter()).map(|(w, r)| w * r).sum();
        index *= 1.0 + portfolio_return;
        *cell = index;
    }
}
