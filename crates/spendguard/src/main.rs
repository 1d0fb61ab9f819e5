// SPDX-FileCopyrightText: 2026 Spendguard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Spendguard - cost accounting for LLM API calls.
//!
//! This is the binary entry point. Every command prints JSON on stdout;
//! logs and diagnostics go to stderr.

mod estimate;
mod input;
mod quote;
mod rates;
mod settle;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use spendguard_config::SpendguardConfig;
use spendguard_core::SpendguardError;
use tracing::error;

/// Spendguard - price LLM API calls in exact integer microcents.
#[derive(Parser, Debug)]
#[command(name = "spendguard", version, about, long_about = None)]
struct Cli {
    /// Load this configuration file instead of the standard lookup.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Price a call from explicit usage counters or a JSON request.
    Quote(quote::QuoteArgs),
    /// Worst-case cost of a call before it is made.
    Estimate(estimate::EstimateArgs),
    /// Price a call from the provider's response body.
    Settle(settle::SettleArgs),
    /// Print the effective rate catalog.
    Rates(rates::RatesArgs),
}

fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => spendguard_config::load_and_validate_path(path),
        None => spendguard_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            spendguard_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.logging.level);

    if let Err(e) = run(cli.command, &config) {
        error!(error = %e, "command failed");
        eprintln!("spendguard: {e}");
        std::process::exit(1);
    }
}

fn run(command: Commands, config: &SpendguardConfig) -> Result<(), SpendguardError> {
    let catalog = config.rate_catalog();
    let output = match command {
        Commands::Quote(args) => to_json(&quote::run_quote(&args, &catalog)?)?,
        Commands::Estimate(args) => {
            to_json(&estimate::run_estimate(&args, &catalog, &config.limits)?)?
        }
        Commands::Settle(args) => to_json(&settle::run_settle(&args, &catalog)?)?,
        Commands::Rates(args) => rates::run_rates(&args, &catalog)?,
    };
    println!("{output}");
    Ok(())
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, SpendguardError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| SpendguardError::Internal(format!("failed to serialize output: {e}")))
}

/// Initialize the tracing subscriber on stderr.
///
/// `RUST_LOG` wins over the configured level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("spendguard={},warn", log_level.to_ascii_lowercase()))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}
