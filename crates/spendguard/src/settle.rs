// SPDX-FileCopyrightText: 2026 Spendguard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `spendguard settle` command implementation.
//!
//! Takes the JSON body a provider returned, extracts its usage block and
//! prices it. The completion text is echoed back alongside the breakdown.

use std::path::PathBuf;

use clap::Args;
use serde::Serialize;
use serde_json::Value;
use spendguard_core::{Provider, SpendguardError};
use spendguard_cost::{CostBreakdown, RateCatalog, compute_cost_breakdown};
use spendguard_providers::extractor_for;
use tracing::info;

use crate::input::read_json;

#[derive(Args, Debug)]
pub struct SettleArgs {
    /// Provider that produced the response (openai, anthropic, gemini, grok).
    #[arg(long)]
    pub provider: Provider,

    #[arg(long)]
    pub model: String,

    /// The provider's JSON response body (`-` reads stdin).
    #[arg(long, value_name = "FILE")]
    pub response: PathBuf,
}

/// Priced breakdown plus the response's completion text.
#[derive(Debug, Serialize)]
pub struct SettleReport {
    #[serde(flatten)]
    pub breakdown: CostBreakdown,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completion: Option<String>,
}

/// Run the `spendguard settle` command.
pub fn run_settle(
    args: &SettleArgs,
    catalog: &RateCatalog,
) -> Result<SettleReport, SpendguardError> {
    let body: Value = read_json(&args.response, "response")?;
    settle_body(args.provider, &args.model, &body, catalog)
}

/// Price a response body already in memory.
pub fn settle_body(
    provider: Provider,
    model: &str,
    body: &Value,
    catalog: &RateCatalog,
) -> Result<SettleReport, SpendguardError> {
    let card = catalog.lookup(provider.as_str(), model)?;
    let extractor = extractor_for(provider);
    let usage = extractor.extract_usage(body)?;
    let breakdown = compute_cost_breakdown(provider.as_str(), model, card, &usage);

    info!(
        provider = %provider,
        model,
        cents = breakdown.cents(),
        microcents = breakdown.totals.realized_microcents,
        "call settled"
    );

    Ok(SettleReport {
        breakdown,
        completion: extractor.extract_completion(body),
    })
}
