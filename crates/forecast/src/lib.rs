//! Monte Carlo portfolio forecasting.
//!
//! Given aligned daily price histories for a set of assets and fixed weights,
//! [`SimulationEngine`] derives per-asset return statistics, simulates many
//! independent future paths of the weighted portfolio and reduces the final
//! cumulative returns into a fixed-order [`SummaryStatistics`].
//!
//! ```no_run
//! use finplan_forecast::{PortfolioConfig, SimulationEngine};
//! # fn run(series: Vec<finplan_core::AssetSeries>) -> finplan_forecast::Result<()> {
//! let config = PortfolioConfig::new(["AGG", "SPY"], vec![0.4, 0.6], 500, 252 * 30).with_seed(42);
//! let mut engine = SimulationEngine::new(config, series)?;
//! engine.simulate()?;
//! let summary = engine.summarize()?;
//! println!("95% range: {:.2}x - {:.2}x", summary.ci_lower(), summary.ci_upper());
//! # Ok(())
//! # }
//! ```

pub mod cancel;
pub mod config;
pub mod engine;
pub mod error;
pub mod matrix;
pub mod sampler;
pub mod statistics;
pub mod summary;

pub use cancel::CancellationToken;
pub use config::{PortfolioConfig, WEIGHT_SUM_TOLERANCE};
pub use engine::{EngineState, SimulationEngine};
pub use error::{Result, SimulationError};
pub use finplan_core::SamplerKind;
pub use matrix::{CumulativeReturnMatrix, HistogramBin, PercentileBand};
pub use sampler::{build_sampler, cholesky_lower, Bootstrap, CorrelatedNormal, IndependentNormal, ReturnSampler};
pub use statistics::ReturnStatistics;
pub use summary::{percentile, SummaryStatistics, SUMMARY_LEN};
