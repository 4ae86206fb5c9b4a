use clap::{Parser, Subcommand};
use finplan_core::ConfigLoader;

mod commands;
mod report;

use commands::{ForecastArgs, SavingsArgs};

#[derive(Parser)]
#[command(name = "finplan")]
#[command(about = "Personal finance planner: savings health and Monte Carlo retirement forecasts", long_about = None)]
struct Cli {
    /// Config file path
    #[arg(short, long, global = true, default_value = "config/Config.toml")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate a weighted portfolio and report the range of outcomes
    Forecast(ForecastArgs),
    /// Check total savings against the emergency fund target
    Savings(SavingsArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so JSON reports on stdout stay parseable
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = ConfigLoader::load_from(&cli.config)?;

    match cli.command {
        Commands::Forecast(args) => {
            commands::run_forecast(args, &config.forecast)?;
        }
        Commands::Savings(args) => {
            commands::run_savings(args, &config.savings)?;
        }
    }

    Ok(())
}
