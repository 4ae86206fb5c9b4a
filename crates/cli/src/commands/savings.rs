//! Savings health CLI command.
//!
//! Values crypto and share holdings at the prices given in configuration (or
//! on the command line) and checks them against the emergency fund target.

use anyhow::{anyhow, Context, Result};
use clap::Args;
use finplan_core::{Holding, SavingsConfig, SavingsSummary};
use rust_decimal::Decimal;

use crate::report::{format_savings_text, OutputFormat};

/// Arguments for the savings command.
#[derive(Args, Debug, Clone)]
pub struct SavingsArgs {
    /// Monthly household income (overrides config)
    #[arg(long)]
    pub monthly_income: Option<Decimal>,

    /// Months of income the emergency fund should cover (overrides config)
    #[arg(long)]
    pub months: Option<u32>,

    /// Current price for a holding, e.g. BTC=61000.50 (repeatable)
    #[arg(long = "price", value_name = "SYMBOL=PRICE")]
    pub prices: Vec<String>,

    /// Output format: text, json (default: text)
    #[arg(long, default_value = "text")]
    pub format: String,
}

/// Parses a `SYMBOL=PRICE` override.
fn parse_price(s: &str) -> Result<(String, Decimal)> {
    let (symbol, price) = s
        .split_once('=')
        .ok_or_else(|| anyhow!("Invalid price '{}'. Expected SYMBOL=PRICE", s))?;
    let price: Decimal = price
        .trim()
        .parse()
        .with_context(|| format!("Invalid price for {}: '{}'", symbol, price))?;
    if price.is_sign_negative() {
        return Err(anyhow!("Price for {} must not be negative", symbol));
    }
    Ok((symbol.trim().to_uppercase(), price))
}

fn apply_prices(holdings: &mut [Holding], prices: &[(String, Decimal)]) {
    for holding in holdings {
        if let Some((_, price)) = prices
            .iter()
            .find(|(symbol, _)| symbol.eq_ignore_ascii_case(&holding.symbol))
        {
            holding.price = *price;
        }
    }
}

/// Applies command-line overrides to the configured savings inputs.
fn resolve_config(args: &SavingsArgs, config: &SavingsConfig) -> Result<SavingsConfig> {
    let mut resolved = config.clone();

    if let Some(income) = args.monthly_income {
        resolved.monthly_income = income;
    }
    if let Some(months) = args.months {
        resolved.emergency_fund_months = months;
    }

    let prices = args
        .prices
        .iter()
        .map(|p| parse_price(p))
        .collect::<Result<Vec<_>>>()?;
    apply_prices(&mut resolved.crypto, &prices);
    apply_prices(&mut resolved.shares, &prices);

    for holding in resolved.crypto.iter().chain(&resolved.shares) {
        if holding.price.is_zero() && !holding.quantity.is_zero() {
            tracing::warn!(symbol = %holding.symbol, "No price for holding, valued at $0");
        }
    }

    Ok(resolved)
}

/// Runs the savings command.
///
/// # Errors
/// Returns an error if an override cannot be parsed.
pub fn run_savings(args: SavingsArgs, config: &SavingsConfig) -> Result<()> {
    let format = OutputFormat::parse(&args.format)?;
    let resolved = resolve_config(&args, config)?;
    let summary = SavingsSummary::assess(&resolved);

    tracing::info!(
        total = %summary.total_savings,
        emergency_fund = %summary.emergency_fund,
        "Assessed savings"
    );

    match format {
        OutputFormat::Text => print!("{}", format_savings_text(&summary)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
    }

    Ok(())
}
