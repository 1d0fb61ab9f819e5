// SPDX-FileCopyrightText: 2026 Spendguard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for spendguard.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages. Rate-card
//! overlays reuse [`RateCard`](spendguard_cost::RateCard) directly, so a typo
//! in a rate field is caught the same way.

use serde::{Deserialize, Serialize};
use spendguard_cost::{RateCatalog, copy_rates, merge_rates};
use tracing::info;

/// Top-level spendguard configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SpendguardConfig {
    /// Log output settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Rate catalog overlays.
    #[serde(default)]
    pub pricing: PricingConfig,

    /// Provider-side request ceilings.
    #[serde(default)]
    pub limits: LimitsConfig,
}

impl SpendguardConfig {
    /// The effective rate catalog: a copy of the built-in defaults (unless
    /// `pricing.include_defaults` is off) with `pricing.rates` merged on top.
    ///
    /// The process-wide defaults are never modified.
    pub fn rate_catalog(&self) -> RateCatalog {
        let mut catalog = if self.pricing.include_defaults {
            copy_rates(RateCatalog::defaults())
        } else {
            RateCatalog::new()
        };
        merge_rates(&mut catalog, &self.pricing.rates);
        info!(
            include_defaults = self.pricing.include_defaults,
            overrides = self.pricing.rates.len(),
            models = catalog.len(),
            "rate catalog resolved"
        );
        catalog
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Logging level (trace, debug, info, warn, error). `RUST_LOG` takes precedence.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Pricing configuration.
///
/// ```toml
/// [pricing]
/// include_defaults = true
///
/// [pricing.rates.openai."gpt-5.2"]
/// input_cents_per_1m = 175
/// output_cents_per_1m = 1400
/// cached_input_cents_per_1m = 18
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PricingConfig {
    /// Start from the built-in catalog. When false only `rates` is priced.
    #[serde(default = "default_include_defaults")]
    pub include_defaults: bool,

    /// Provider -> model -> rate card overlays. Same-named models replace defaults.
    #[serde(default)]
    pub rates: RateCatalog,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            include_defaults: default_include_defaults(),
            rates: RateCatalog::new(),
        }
    }
}

fn default_include_defaults() -> bool {
    true
}

/// Output-token ceilings enforced before a request reaches the provider.
///
/// A budget-derived `max_tokens` can exceed what a model accepts, which the
/// provider answers with a 400. A value of zero or less disables the ceiling.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LimitsConfig {
    /// Ceiling for `max_tokens` on OpenAI Chat Completions requests.
    #[serde(default = "default_openai_max_tokens")]
    pub openai_max_completion_tokens: i64,

    /// Ceiling for `max_output_tokens` on OpenAI Responses requests.
    #[serde(default = "default_openai_max_tokens")]
    pub openai_max_output_tokens: i64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            openai_max_completion_tokens: default_openai_max_tokens(),
            openai_max_output_tokens: default_openai_max_tokens(),
        }
    }
}

fn default_openai_max_tokens() -> i64 {
    16_384
}
