//! Wallet Scorer
//!
//! Scores DeFi lending wallets for creditworthiness from a transaction dump.

mod report;

use anyhow::{Context, Result};
use clap::Parser;
use credit_core::config::Config;
use credit_core::{io, ScoringPipeline};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "wallet-scorer", version, about = "Score wallets from lending transactions")]
struct Args {
    /// JSON file of transaction records (array or JSON lines).
    #[arg(short, long, alias = "input")]
    transactions: PathBuf,

    /// CSV file with a `wallet_id` column.
    #[arg(short, long)]
    wallets: PathBuf,

    /// Where to write `wallet_id,score` rows [default: $CREDIT_SCORES_OUTPUT or wallet_scores.csv].
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Also write per-wallet features to this CSV file.
    #[arg(long)]
    features_output: Option<PathBuf>,

    /// Print a ranked summary after scoring.
    #[arg(long)]
    report: bool,

    /// Emit logs as JSON.
    #[arg(long)]
    json_logs: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.json_logs);

    info!("Starting Wallet Scorer");

    let config = Config::from_env()?;
    let output_path = args
        .output
        .clone()
        .unwrap_or_else(|| config.output.scores_path.clone());

    let pipeline = ScoringPipeline::from_config(&config);
    let output = pipeline
        .run_files(&args.transactions, &args.wallets)
        .context("Scoring failed")?;

    let malformed = output.report.malformed_total();
    if malformed > 0 {
        warn!("{} transaction records were rejected as malformed", malformed);
        for sample in &output.report.samples {
            warn!("  record {}: {}", sample.index, sample.reason);
        }
    }

    io::write_scores(&output_path, &output.scores)
        .with_context(|| format!("Failed to write scores to {}", output_path.display()))?;

    if let Some(path) = &args.features_output {
        io::write_features(path, &output.feature_rows())
            .with_context(|| format!("Failed to write features to {}", path.display()))?;
    }

    if args.report {
        print!("{}", report::generate_report(&output, config.report.top_n));
    }

    info!("Scoring complete");
    Ok(())
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "wallet_scorer=info,credit_core=info".into());
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_cli_parses_input_alias() {
        let args = Args::try_parse_from([
            "wallet-scorer",
            "--input",
            "tx.json",
            "-w",
            "wallets.csv",
            "--report",
        ])
        .unwrap();
        assert_eq!(args.transactions, PathBuf::from("tx.json"));
        assert_eq!(args.wallets, PathBuf::from("wallets.csv"));
        assert!(args.output.is_none());
        assert!(args.report);
    }

    #[test]
    fn test_cli_requires_both_inputs() {
        assert!(Args::try_parse_from(["wallet-scorer", "-t", "tx.json"]).is_err());
    }
}
