use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Trading days per calendar year used to convert year horizons into days.
pub const TRADING_DAYS_PER_YEAR: usize = 252;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub forecast: ForecastConfig,
    #[serde(default)]
    pub savings: SavingsConfig,
}

/// Distribution used to draw simulated daily asset returns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SamplerKind {
    /// Multivariate normal using the historical mean vector and covariance matrix.
    #[default]
    CorrelatedNormal,
    /// Per-asset normal draws that ignore cross-asset correlation.
    IndependentNormal,
    /// Resample whole historical return vectors with replacement.
    Bootstrap,
}

impl SamplerKind {
    /// Parses a sampler name as accepted on the command line.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "correlated_normal" | "normal" | "mvn" => Some(Self::CorrelatedNormal),
            "independent_normal" | "independent" => Some(Self::IndependentNormal),
            "bootstrap" | "empirical" => Some(Self::Bootstrap),
            _ => None,
        }
    }
}

/// Monte Carlo retirement forecast settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastConfig {
    /// CSV file with historical daily bars (`timestamp,symbol,open,high,low,close,volume`).
    pub data_path: String,
    pub tickers: Vec<String>,
    /// Allocation weights, parallel to `tickers`.
    pub weights: Vec<f64>,
    pub num_simulations: usize,
    pub num_trading_days: usize,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub sampler: SamplerKind,
    /// Amounts to translate into a 95% dollar range.
    #[serde(default = "default_initial_investments")]
    pub initial_investments: Vec<Decimal>,
}

fn default_initial_investments() -> Vec<Decimal> {
    vec![dec!(20000), dec!(30000)]
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            data_path: "data/portfolio.csv".to_string(),
            tickers: vec!["AGG".to_string(), "SPY".to_string()],
            weights: vec![0.40, 0.60],
            num_simulations: 500,
            num_trading_days: TRADING_DAYS_PER_YEAR * 30,
            seed: None,
            sampler: SamplerKind::default(),
            initial_investments: default_initial_investments(),
        }
    }
}

/// One holding and its already-known market price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    pub symbol: String,
    pub quantity: Decimal,
    #[serde(default)]
    pub price: Decimal,
}

impl Holding {
    #[must_use]
    pub fn new(symbol: impl Into<String>, quantity: Decimal, price: Decimal) -> Self {
        Self {
            symbol: symbol.into(),
            quantity,
            price,
        }
    }

    #[must_use]
    pub fn value(&self) -> Decimal {
        self.quantity * self.price
    }
}

/// Household savings inputs for the emergency-fund check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavingsConfig {
    pub monthly_income: Decimal,
    /// Months of income an ideal emergency fund should cover.
    pub emergency_fund_months: u32,
    pub crypto: Vec<Holding>,
    pub shares: Vec<Holding>,
}

impl Default for SavingsConfig {
    fn default() -> Self {
        Self {
            monthly_income: dec!(12000),
            emergency_fund_months: 3,
            crypto: vec![
                Holding::new("BTC", dec!(1.2), Decimal::ZERO),
                Holding::new("ETH", dec!(5.3), Decimal::ZERO),
            ],
            shares: vec![
                Holding::new("AGG", dec!(200), Decimal::ZERO),
                Holding::new("SPY", dec!(50), Decimal::ZERO),
            ],
        }
    }
}
