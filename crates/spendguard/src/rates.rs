// SPDX-FileCopyrightText: 2026 Spendguard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `spendguard rates` command implementation.
//!
//! Prints the effective catalog, after config overlays, as JSON or as a
//! `[pricing.rates]` TOML overlay that can be pasted into `spendguard.toml`.

use clap::Args;
use serde::Serialize;
use spendguard_core::SpendguardError;
use spendguard_cost::RateCatalog;

#[derive(Args, Debug)]
pub struct RatesArgs {
    /// Only print this provider's models.
    #[arg(long)]
    pub provider: Option<String>,

    /// Print a TOML config overlay instead of JSON.
    #[arg(long)]
    pub toml: bool,
}

#[derive(Serialize)]
struct Overlay<'a> {
    pricing: OverlayPricing<'a>,
}

#[derive(Serialize)]
struct OverlayPricing<'a> {
    rates: &'a RateCatalog,
}

/// Run the `spendguard rates` command, returning the rendered output.
pub fn run_rates(args: &RatesArgs, catalog: &RateCatalog) -> Result<String, SpendguardError> {
    let selected = match &args.provider {
        Some(provider) => provider_rates(catalog, provider)?,
        None => catalog.copy(),
    };

    if args.toml {
        let overlay = Overlay {
            pricing: OverlayPricing { rates: &selected },
        };
        toml::to_string_pretty(&overlay)
            .map_err(|e| SpendguardError::Internal(format!("failed to render TOML: {e}")))
    } else {
        serde_json::to_string_pretty(&selected)
            .map_err(|e| SpendguardError::Internal(format!("failed to serialize output: {e}")))
    }
}

/// The single-provider slice of `catalog`.
fn provider_rates(catalog: &RateCatalog, provider: &str) -> Result<RateCatalog, SpendguardError> {
    let subset: RateCatalog = catalog
        .models(provider)
        .map(|(model, card)| (provider.to_string(), model.to_string(), card.clone()))
        .collect();
    if subset.is_empty() {
        return Err(SpendguardError::UnknownProvider {
            provider: provider.to_string(),
        });
    }
    Ok(subset)
}
