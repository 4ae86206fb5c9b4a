//! CLI commands for the personal finance planner.

pub mod forecast;
pub mod savings;

pub use forecast::{run_forecast, ForecastArgs};
pub use savings::{run_savings, SavingsArgs};
