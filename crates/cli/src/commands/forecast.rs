//! Monte Carlo retirement forecast CLI command.
//!
//! Loads historical closes, simulates the configured portfolio and reports the
//! distribution of cumulative returns together with 95% dollar ranges.

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use clap::Args;
use finplan_core::{ForecastConfig, SamplerKind, TRADING_DAYS_PER_YEAR};
use finplan_data::{align_series, select_tickers, PriceLoader};
use finplan_forecast::{PortfolioConfig, SimulationEngine};
use rust_decimal::Decimal;

use crate::report::{
    format_forecast_text, write_bands_csv, write_histogram_csv, ForecastReport, OutputFormat,
};

/// Percentiles exported by `--bands`.
const BAND_PERCENTILES: [f64; 5] = [0.025, 0.25, 0.5, 0.75, 0.975];

const DEFAULT_BINS: usize = 20;

/// Arguments for the forecast command.
#[derive(Args, Debug, Clone, Default)]
pub struct ForecastArgs {
    /// Historical data CSV file (overrides config)
    #[arg(short, long)]
    pub data: Option<String>,

    /// Comma-separated tickers, e.g. AGG,SPY (overrides config)
    #[arg(long, value_delimiter = ',')]
    pub tickers: Option<Vec<String>>,

    /// Comma-separated weights parallel to tickers, e.g. 0.4,0.6 (overrides config)
    #[arg(long, value_delimiter = ',')]
    pub weights: Option<Vec<f64>>,

    /// Number of simulated trials (overrides config)
    #[arg(short = 'n', long)]
    pub simulations: Option<usize>,

    /// Forecast horizon in years of 252 trading days (overrides config)
    #[arg(long, conflicts_with = "days")]
    pub years: Option<usize>,

    /// Forecast horizon in trading days (overrides config)
    #[arg(long)]
    pub days: Option<usize>,

    /// Seed for reproducible simulations (overrides config)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Return sampler: correlated_normal, independent_normal, bootstrap (overrides config)
    #[arg(long)]
    pub sampler: Option<String>,

    /// Initial investment to express as a dollar range (repeatable, overrides config)
    #[arg(long = "investment")]
    pub investments: Vec<Decimal>,

    /// Output format: text, json (default: text)
    #[arg(long, default_value = "text")]
    pub format: String,

    /// Write the JSON report to this file
    #[arg(long)]
    pub output: Option<String>,

    /// Export per-day percentile bands to this CSV file
    #[arg(long)]
    pub bands: Option<String>,

    /// Export a histogram of final cumulative returns to this CSV file
    #[arg(long)]
    pub histogram: Option<String>,

    /// Number of histogram bins
    #[arg(long, default_value_t = DEFAULT_BINS)]
    pub bins: usize,
}

/// Optional CSV exports written after a successful run.
#[derive(Debug, Clone, Copy, Default)]
pub struct Exports<'a> {
    pub bands: Option<&'a Path>,
    pub histogram: Option<&'a Path>,
    pub bins: usize,
}

/// Applies command-line overrides to the configured forecast settings.
fn resolve_config(args: &ForecastArgs, config: &ForecastConfig) -> Result<ForecastConfig> {
    let mut resolved = config.clone();

    if let Some(data) = &args.data {
        resolved.data_path = data.clone();
    }
    if let Some(tickers) = &args.tickers {
        resolved.tickers = tickers.iter().map(|t| t.trim().to_uppercase()).collect();
    }
    if let Some(weights) = &args.weights {
        resolved.weights = weights.clone();
    }
    if let Some(simulations) = args.simulations {
        resolved.num_simulations = simulations;
    }
    if let Some(years) = args.years {
        resolved.num_trading_days = years * TRADING_DAYS_PER_YEAR;
    }
    if let Some(days) = args.days {
        resolved.num_trading_days = days;
    }
    if let Some(seed) = args.seed {
        resolved.seed = Some(seed);
    }
    if let Some(name) = &args.sampler {
        resolved.sampler = SamplerKind::parse(name).ok_or_else(|| {
            anyhow!(
                "Unknown sampler: '{}'. Valid samplers: correlated_normal, independent_normal, bootstrap",
                name
            )
        })?;
    }
    if !args.investments.is_empty() {
        resolved.initial_investments = args.investments.clone();
    }

    Ok(resolved)
}

/// Loads history, runs the simulation and builds the report.
///
/// # Errors
/// Returns an error if the data cannot be loaded or the simulation fails.
pub fn build_report(config: &ForecastConfig, exports: Exports<'_>) -> Result<ForecastReport> {
    let portfolio = PortfolioConfig::from(config);
    portfolio.validate()?;

    let series = PriceLoader::from_path(&config.data_path)
        .with_context(|| format!("Failed to load price history from {}", config.data_path))?;
    let series = align_series(select_tickers(series, portfolio.tickers()));

    let mut engine = SimulationEngine::new(portfolio, series)?;
    let matrix = engine.simulate()?;

    if let Some(path) = exports.bands {
        write_bands_csv(path, &matrix.percentile_bands(&BAND_PERCENTILES))?;
        tracing::info!(path = %path.display(), "Wrote percentile bands");
    }
    if let Some(path) = exports.histogram {
        write_histogram_csv(path, &matrix.histogram(exports.bins))?;
        tracing::info!(path = %path.display(), bins = exports.bins, "Wrote final return histogram");
    }

    let summary = engine.summarize()?;
    let portfolio = engine.config();

    ForecastReport::new(
        portfolio.tickers().to_vec(),
        portfolio.weights().to_vec(),
        portfolio.sampler(),
        portfolio.n_trials(),
        portfolio.horizon_days(),
        summary,
        &config.initial_investments,
    )
}

/// Runs the forecast command.
///
/// # Errors
/// Returns an error if arguments are invalid, data cannot be loaded, or the
/// simulation fails.
pub fn run_forecast(args: ForecastArgs, config: &ForecastConfig) -> Result<()> {
    let format = OutputFormat::parse(&args.format)?;
    let resolved = resolve_config(&args, config)?;

    tracing::info!(
        "Forecasting {} over {} trading days with {} simulations",
        resolved.tickers.join("/"),
        resolved.num_trading_days,
        resolved.num_simulations
    );

    if args.histogram.is_some() && args.bins == 0 {
        return Err(anyhow!("--bins must be at least 1"));
    }
    let exports = Exports {
        bands: args.bands.as_deref().map(Path::new),
        histogram: args.histogram.as_deref().map(Path::new),
        bins: args.bins,
    };
    let report = build_report(&resolved, exports)?;

    match format {
        OutputFormat::Text => print!("{}", format_forecast_text(&report)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    if let Some(output) = &args.output {
        let json = serde_json::to_string_pretty(&report)?;
        std::fs::write(output, json)
            .with_context(|| format!("Failed to write report to {}", output))?;
        tracing::info!("Report written to {}", output);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn no_overrides_keeps_config() {
        let config = ForecastConfig::default();
        let resolved = resolve_config(&ForecastArgs::default(), &config).unwrap();

        assert_eq!(resolved.tickers, config.tickers);
        assert_eq!(resolved.num_trading_days, config.num_trading_days);
        assert_eq!(resolved.initial_investments, config.initial_investments);
    }

    #[test]
    fn overrides_replace_config_values() {
        let args = ForecastArgs {
            tickers: Some(vec!["qqq".to_string(), " tlt".to_string()]),
            weights: Some(vec![0.7, 0.3]),
            simulations: Some(100),
            years: Some(5),
            seed: Some(3),
            sampler: Some("bootstrap".to_string()),
            investments: vec![dec!(1000)],
            ..ForecastArgs::default()
        };

        let resolved = resolve_config(&args, &ForecastConfig::default()).unwrap();

        assert_eq!(resolved.tickers, vec!["QQQ", "TLT"]);
        assert_eq!(resolved.weights, vec![0.7, 0.3]);
        assert_eq!(resolved.num_simulations, 100);
        assert_eq!(resolved.num_trading_days, 1260);
        assert_eq!(resolved.seed, Some(3));
        assert_eq!(resolved.sampler, SamplerKind::Bootstrap);
        assert_eq!(resolved.initial_investments, vec![dec!(1000)]);
    }

    #[test]
    fn unknown_sampler_rejected() {
        let args = ForecastArgs {
            sampler: Some("garch".to_string()),
            ..ForecastArgs::default()
        };

        let err = resolve_config(&args, &ForecastConfig::default()).unwrap_err();

        assert!(err.to_string().contains("Unknown sampler"));
    }

    #[test]
    fn missing_data_file_has_context() {
        let config = ForecastConfig {
            data_path: "/nonexistent/finplan/history.csv".to_string(),
            ..ForecastConfig::default()
        };

        let err = build_report(&config, Exports::default()).unwrap_err();

        assert!(format!("{err:#}").contains("Failed to load price history"));
    }
}
