pub mod config;
pub mod config_loader;
pub mod savings;
pub mod series;

pub use config::{
    AppConfig, ForecastConfig, Holding, SamplerKind, SavingsConfig, TRADING_DAYS_PER_YEAR,
};
pub use config_loader::ConfigLoader;
pub use savings::{FundStatus, SavingsSummary};
pub use series::{AssetSeries, PricePoint, SeriesError};
