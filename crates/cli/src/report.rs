//! Report formatting for the `forecast` and `savings` commands.

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use finplan_core::{FundStatus, SamplerKind, SavingsSummary, TRADING_DAYS_PER_YEAR};
use finplan_forecast::{HistogramBin, PercentileBand, SummaryStatistics};
use rust_decimal::Decimal;
use serde::Serialize;

const RULE: &str = "===============================================================\n";
const SUBRULE: &str = "---------------------------------------------------------------\n";

/// Output format for command reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    /// Parses an output format from string.
    pub fn parse(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(anyhow!(
                "Unknown format: '{}'. Valid formats: text, json",
                s
            )),
        }
    }
}

/// 95% dollar range for one initial investment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DollarRange {
    pub initial_investment: Decimal,
    pub lower: Decimal,
    pub upper: Decimal,
}

impl DollarRange {
    /// Scales the 95% CI bounds of `summary` by `investment`, rounded to cents.
    pub fn from_summary(summary: &SummaryStatistics, investment: Decimal) -> Result<Self> {
        Ok(Self {
            initial_investment: investment,
            lower: to_dollars(summary.ci_lower(), investment)?,
            upper: to_dollars(summary.ci_upper(), investment)?,
        })
    }
}

/// `multiplier * investment`, rounded to cents.
pub fn to_dollars(multiplier: f64, investment: Decimal) -> Result<Decimal> {
    let multiplier = Decimal::try_from(multiplier)
        .map_err(|_| anyhow!("Cannot express multiplier {} as a dollar amount", multiplier))?;
    multiplier
        .checked_mul(investment)
        .map(|value| value.round_dp(2))
        .ok_or_else(|| anyhow!("Dollar value overflow for investment {}", investment))
}

/// One labeled summary value, for JSON consumers that prefer names.
#[derive(Debug, Clone, Serialize)]
pub struct LabeledValue {
    pub label: &'static str,
    pub value: f64,
}

/// Complete forecast output.
#[derive(Debug, Clone, Serialize)]
pub struct ForecastReport {
    pub tickers: Vec<String>,
    pub weights: Vec<f64>,
    pub sampler: SamplerKind,
    pub n_trials: usize,
    pub horizon_days: usize,
    /// Positional ten-value summary; index 8 and 9 are the 95% bounds.
    pub summary: SummaryStatistics,
    pub labeled_summary: Vec<LabeledValue>,
    pub dollar_ranges: Vec<DollarRange>,
}

impl ForecastReport {
    pub fn new(
        tickers: Vec<String>,
        weights: Vec<f64>,
        sampler: SamplerKind,
        n_trials: usize,
        horizon_days: usize,
        summary: SummaryStatistics,
        investments: &[Decimal],
    ) -> Result<Self> {
        let dollar_ranges = investments
            .iter()
            .map(|&investment| DollarRange::from_summary(&summary, investment))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            tickers,
            weights,
            sampler,
            n_trials,
            horizon_days,
            summary,
            labeled_summary: summary
                .labeled()
                .map(|(label, value)| LabeledValue { label, value })
                .collect(),
            dollar_ranges,
        })
    }

    /// Horizon expressed in years of 252 trading days.
    #[must_use]
    pub fn horizon_years(&self) -> f64 {
        self.horizon_days as f64 / TRADING_DAYS_PER_YEAR as f64
    }

    /// Horizon for prose: whole or fractional years, or trading days under a year.
    fn horizon_phrase(&self) -> String {
        if self.horizon_days < TRADING_DAYS_PER_YEAR {
            format!("{} trading days", self.horizon_days)
        } else if self.horizon_days == TRADING_DAYS_PER_YEAR {
            "1 year".to_string()
        } else if self.horizon_days % TRADING_DAYS_PER_YEAR == 0 {
            format!("{} years", self.horizon_days / TRADING_DAYS_PER_YEAR)
        } else {
            format!("{:.1} years", self.horizon_years())
        }
    }
}

/// Formats the forecast as a text report.
pub fn format_forecast_text(report: &ForecastReport) -> String {
    let mut output = String::new();

    output.push('\n');
    output.push_str(RULE);
    output.push_str("                 MONTE CARLO RETIREMENT FORECAST               \n");
    output.push_str(RULE);

    let allocation: Vec<String> = report
        .tickers
        .iter()
        .zip(&report.weights)
        .map(|(ticker, weight)| format!("{} {:.0}%", ticker, weight * 100.0))
        .collect();
    output.push_str(&format!("Portfolio:      {}\n", allocation.join(", ")));
    output.push_str(&format!("Simulations:    {}\n", report.n_trials));
    output.push_str(&format!(
        "Horizon:        {} trading days ({:.1} years)\n",
        report.horizon_days,
        report.horizon_years()
    ));
    output.push_str(&format!("Sampler:        {:?}\n", report.sampler));
    output.push('\n');

    output.push_str("CUMULATIVE RETURN SUMMARY\n");
    output.push_str(SUBRULE);
    for (label, value) in report.summary.labeled() {
        if label == "count" {
            output.push_str(&format!("{:<14} {:.0}\n", label, value));
        } else {
            output.push_str(&format!("{:<14} {:.6}\n", label, value));
        }
    }
    output.push('\n');

    if !report.dollar_ranges.is_empty() {
        output.push_str("95% CONFIDENCE RANGE\n");
        output.push_str(SUBRULE);
        for range in &report.dollar_ranges {
            output.push_str(&format!(
                "There is a 95% chance that an initial investment of ${} in the portfolio \
                 over the next {} will end within the range of ${} and ${}\n",
                range.initial_investment.round_dp(2),
                report.horizon_phrase(),
                range.lower,
                range.upper
            ));
        }
        output.push('\n');
    }

    output.push_str(RULE);
    output
}

/// Formats the savings check as a text report.
pub fn format_savings_text(summary: &SavingsSummary) -> String {
    let mut output = String::new();

    output.push('\n');
    output.push_str(RULE);
    output.push_str("                       SAVINGS HEALTH                          \n");
    output.push_str(RULE);
    output.push_str(&format!("Crypto Wallet:   ${:.2}\n", summary.crypto_value));
    output.push_str(&format!("Shares:          ${:.2}\n", summary.shares_value));
    output.push_str(&format!("Total Savings:   ${:.2}\n", summary.total_savings));
    output.push_str(&format!("Emergency Fund:  ${:.2}\n", summary.emergency_fund));
    output.push_str(SUBRULE);

    let verdict = match summary.status {
        FundStatus::Exceeds(_) => {
            "Congratulations, your savings exceed an ideal emergency fund!".to_string()
        }
        FundStatus::Equal => {
            "Congratulations, your savings are equal to an ideal emergency fund!".to_string()
        }
        FundStatus::ShortBy(shortfall) => format!(
            "Your savings are short of an ideal emergency fund by ${:.2}",
            shortfall
        ),
    };
    output.push_str(&verdict);
    output.push('\n');
    output.push_str(RULE);
    output
}

/// Writes per-day percentile curves as CSV: `day,p05,p50,...`.
pub fn write_bands_csv(path: &Path, bands: &[PercentileBand]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create CSV file: {}", path.display()))?;

    let mut header = vec!["day".to_string()];
    header.extend(bands.iter().map(|b| band_label(b.percentile)));
    writer.write_record(&header)?;

    let n_days = bands.first().map_or(0, |b| b.values.len());
    for day in 0..n_days {
        let mut row = vec![day.to_string()];
        row.extend(bands.iter().map(|b| b.values[day].to_string()));
        writer.write_record(&row)?;
    }

    writer.flush()?;
    Ok(())
}

/// Writes final-return histogram bins as CSV: `lower,upper,count`.
pub fn write_histogram_csv(path: &Path, bins: &[HistogramBin]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create CSV file: {}", path.display()))?;

    writer.write_record(["lower", "upper", "count"])?;
    for bin in bins {
        writer.write_record([
            bin.lower.to_string(),
            bin.upper.to_string(),
            bin.count.to_string(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

fn band_label(percentile: f64) -> String {
    let pct = percentile * 100.0;
    if (pct - pct.round()).abs() < 1e-9 {
        format!("p{:02}", pct.round() as u32)
    } else {
        format!("p{}", pct)
    }
}
