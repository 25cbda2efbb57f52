//! Zero Valuation - value a company from a market data snapshot.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use zero_common::config::Config;
use zero_common::logging::init_logging_with_exclusions;
use zero_valuation::{SnapshotProvider, ValuationService};

/// Value a company from a JSON market snapshot and print the report as JSON.
#[derive(Parser, Debug)]
#[command(name = "zero-valuation")]
#[command(author = "theonlyhennygod")]
#[command(version)]
#[command(about = "DCF, peer percentile and technical indicator valuation report", long_about = None)]
struct Cli {
    /// Market snapshot JSON file
    #[arg(long)]
    snapshot: PathBuf,

    /// Symbol to value (defaults to the only company in the snapshot)
    #[arg(long)]
    symbol: Option<String>,

    /// Config file (defaults to ~/.codecoder/valuation.json)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the DCF growth rate (fraction)
    #[arg(long)]
    growth: Option<f64>,

    /// Override the DCF discount rate (fraction)
    #[arg(long)]
    discount: Option<f64>,

    /// Pretty-print the report
    #[arg(long)]
    pretty: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let (config, notices) = Config::load_and_validate(cli.config.as_deref())?;

    init_logging_with_exclusions(
        &config.observability.log_level,
        &config.observability.log_format,
        &config.observability.excluded_targets,
    );

    tracing::info!("Zero Valuation v{}", env!("CARGO_PKG_VERSION"));
    for notice in &notices {
        notice.log();
    }

    let provider = SnapshotProvider::from_file(&cli.snapshot).await?;

    let symbol = match cli.symbol {
        Some(symbol) => symbol,
        None => {
            let symbols: Vec<&str> = provider.symbols().collect();
            match symbols.as_slice() {
                [only] => only.to_string(),
                _ => anyhow::bail!(
                    "--symbol is required when the snapshot holds {} companies",
                    symbols.len()
                ),
            }
        }
    };

    let service = ValuationService::new(Arc::new(provider), &config)
        .with_rates(cli.growth, cli.discount);

    let report = service.analyze(&symbol).await?;

    let output = if cli.pretty {
        serde_json::to_string_pretty(&report)
    } else {
        serde_json::to_string(&report)
    }
    .context("Failed to serialize report")?;

    println!("{output}");
    Ok(())
}
