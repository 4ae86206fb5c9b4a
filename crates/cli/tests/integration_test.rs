use std::path::Path;
use std::process::Command;

use chrono::{Days, NaiveDate};
use finplan_core::{AssetSeries, PricePoint};
use finplan_data::{align_series, select_tickers, CsvStorage, PriceLoader};
use finplan_forecast::{PortfolioConfig, SimulationEngine, SummaryStatistics};
use tempfile::TempDir;

/// Daily closes following a deterministic wave, skipping weekends when `weekdays_only`.
fn synthetic_series(ticker: &str, days: u64, drift: f64, swing: f64, weekdays_only: bool) -> AssetSeries {
    let start = NaiveDate::from_ymd_opt(2019, 1, 1).unwrap();
    let mut price = 100.0;
    let mut points = Vec::new();

    for i in 0..days {
        let date = start + Days::new(i);
        if weekdays_only && chrono::Datelike::weekday(&date).number_from_monday() > 5 {
            continue;
        }
        price *= 1.0 + drift + swing * ((i as f64) * 0.37).sin();
        points.push(PricePoint::new(date, price));
    }

    AssetSeries::new(ticker, points).unwrap()
}

fn write_history(path: &Path) {
    let history = vec![
        synthetic_series("AGG", 730, 0.0001, 0.003, true),
        synthetic_series("SPY", 730, 0.0004, 0.011, true),
        synthetic_series("BTC", 730, 0.001, 0.03, false),
    ];
    CsvStorage::write_series(path, &history).unwrap();
}

fn write_config(path: &Path, data: &Path) {
    std::fs::write(
        path,
        format!(
            r#"
[forecast]
data_path = "{}"
tickers = ["AGG", "SPY"]
weights = [0.4, 0.6]
num_simulations = 40
num_trading_days = 252
seed = 2024
initial_investments = [20000, 30000]

[savings]
monthly_income = 12000
emergency_fund_months = 3
crypto = [{{ symbol = "BTC", quantity = 1.2, price = 30000 }}]
shares = [{{ symbol = "SPY", quantity = 50, price = 400 }}]
"#,
            data.display()
        ),
    )
    .unwrap();
}

fn run_cli(args: &[&str]) -> serde_json::Value {
    let output = Command::new(env!("CARGO_BIN_EXE_finplan"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to run finplan");

    assert!(
        output.status.success(),
        "finplan failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout is not JSON")
}

#[test]
fn test_forecast_pipeline_from_csv() {
    let dir = TempDir::new().unwrap();
    let data = dir.path().join("history.csv");
    write_history(&data);

    let tickers = vec!["AGG".to_string(), "SPY".to_string()];
    let loaded = PriceLoader::from_path(&data).unwrap();

    assert_eq!(loaded.len(), 3);
    let series = align_series(select_tickers(loaded, &tickers));
    assert_eq!(series.len(), 2);

    let config = PortfolioConfig::new(tickers, vec![0.4, 0.6], 100, 252).with_seed(11);
    let mut engine = SimulationEngine::new(config, series).unwrap();
    let matrix = engine.simulate().unwrap();

    assert_eq!(matrix.n_trials(), 100);
    assert_eq!(matrix.n_columns(), 253);

    let summary = engine.summarize().unwrap();
    assert_eq!(summary.count(), 100);
    assert!(summary.ci_lower() <= summary.median());
    assert!(summary.median() <= summary.ci_upper());
    assert!(summary[SummaryStatistics::MIN] > 0.0);
}

#[test]
fn test_forecast_command_json_is_reproducible() {
    let dir = TempDir::new().unwrap();
    let data = dir.path().join("history.csv");
    let config = dir.path().join("config.toml");
    let bands = dir.path().join("bands.csv");
    let histogram = dir.path().join("histogram.csv");
    write_history(&data);
    write_config(&config, &data);

    let config_arg = config.to_str().unwrap();
    let first = run_cli(&[
        "--config",
        config_arg,
        "forecast",
        "--format",
        "json",
        "--bands",
        bands.to_str().unwrap(),
        "--histogram",
        histogram.to_str().unwrap(),
        "--bins",
        "8",
    ]);
    let second = run_cli(&["--config", config_arg, "forecast", "--format", "json"]);

    let band_lines = std::fs::read_to_string(&bands).unwrap().lines().count();
    let histogram_csv = std::fs::read_to_string(&histogram).unwrap();

    assert_eq!(first, second);
    assert_eq!(first["n_trials"], 40);
    assert_eq!(first["horizon_days"], 252);
    assert_eq!(first["summary"][0], 40.0);
    assert_eq!(first["dollar_ranges"].as_array().unwrap().len(), 2);
    // header plus day 0..=252
    assert_eq!(band_lines, 254);

    let counts: usize = histogram_csv
        .lines()
        .skip(1)
        .map(|line| line.rsplit(',').next().unwrap().parse::<usize>().unwrap())
        .sum();
    assert_eq!(histogram_csv.lines().count(), 9);
    assert_eq!(counts, 40);
}

#[test]
fn test_forecast_command_rejects_bad_weights() {
    let dir = TempDir::new().unwrap();
    let data = dir.path().join("history.csv");
    let config = dir.path().join("config.toml");
    write_history(&data);
    write_config(&config, &data);

    let output = Command::new(env!("CARGO_BIN_EXE_finplan"))
        .args([
            "--config",
            config.to_str().unwrap(),
            "forecast",
            "--weights",
            "0.5,0.4",
        ])
        .output()
        .expect("Failed to run finplan");

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("invalid configuration"));
}

#[test]
fn test_savings_command_json() {
    let dir = TempDir::new().unwrap();
    let data = dir.path().join("history.csv");
    let config = dir.path().join("config.toml");
    write_config(&config, &data);

    let report = run_cli(&[
        "--config",
        config.to_str().unwrap(),
        "savings",
        "--format",
        "json",
        "--price",
        "BTC=25000",
    ]);

    // 1.2 * 25000 + 50 * 400 = 50000 against 3 * 12000 = 36000
    let amount = |key: &str| -> f64 { report[key].as_str().unwrap().parse().unwrap() };
    assert_eq!(amount("total_savings"), 50000.0);
    assert_eq!(amount("emergency_fund"), 36000.0);
    assert_eq!(report["status"]["status"], "exceeds");
}
