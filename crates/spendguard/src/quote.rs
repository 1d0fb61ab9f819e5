// SPDX-FileCopyrightText: 2026 Spendguard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `spendguard quote` command implementation.
//!
//! Prices a finished call from usage counters, either given as flags or as a
//! JSON request document. A request may carry its own `rate_card`; otherwise
//! the card comes from the effective catalog.

use std::path::PathBuf;

use clap::Args;
use serde::Deserialize;
use spendguard_core::SpendguardError;
use spendguard_cost::{
    CostBreakdown, CostRequest, FILE_SEARCH_CALL, RateCard, RateCatalog, UsageRecord,
    WEB_SEARCH_CALL,
};
use tracing::info;

use crate::input::read_json;

#[derive(Args, Debug)]
pub struct QuoteArgs {
    /// JSON request with provider, model, usage counters and an optional
    /// `rate_card` (`-` reads stdin).
    #[arg(long, value_name = "FILE", conflicts_with_all = ["provider", "model"])]
    pub request: Option<PathBuf>,

    #[arg(long, required_unless_present = "request")]
    pub provider: Option<String>,

    #[arg(long, required_unless_present = "request")]
    pub model: Option<String>,

    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub input_tokens: i64,

    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub output_tokens: i64,

    /// Input tokens served from the provider's implicit cache.
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub cached_input_tokens: i64,

    /// Output tokens spent on reasoning.
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub reasoning_tokens: i64,

    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub cache_write_input_tokens: i64,

    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub cache_read_input_tokens: i64,

    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub grounding_queries: i64,

    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub web_search_calls: i64,

    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub file_search_calls: i64,
}

impl QuoteArgs {
    fn usage(&self) -> UsageRecord {
        let mut usage = UsageRecord::new(self.input_tokens, self.output_tokens)
            .with_cached_input(self.cached_input_tokens)
            .with_reasoning(self.reasoning_tokens)
            .with_cache_write(self.cache_write_input_tokens)
            .with_cache_read(self.cache_read_input_tokens)
            .with_grounding_queries(self.grounding_queries);
        if self.web_search_calls != 0 {
            usage = usage.with_tool_calls(WEB_SEARCH_CALL, self.web_search_calls);
        }
        if self.file_search_calls != 0 {
            usage = usage.with_tool_calls(FILE_SEARCH_CALL, self.file_search_calls);
        }
        usage
    }
}

/// Request document accepted by `--request`.
///
/// A [`CostRequest`] whose `rate_card` may be left out.
#[derive(Debug, Deserialize)]
pub struct QuoteRequest {
    pub provider: String,
    pub model: String,
    #[serde(default)]
    pub rate_card: Option<RateCard>,
    #[serde(flatten)]
    pub usage: UsageRecord,
}

impl QuoteRequest {
    /// Fill in the rate card from `catalog` when the request has none.
    pub fn resolve(self, catalog: &RateCatalog) -> Result<CostRequest, SpendguardError> {
        let rate_card = match self.rate_card {
            Some(card) => card,
            None => catalog.lookup(&self.provider, &self.model)?.clone(),
        };
        Ok(CostRequest {
            provider: self.provider,
            model: self.model,
            rate_card,
            usage: self.usage,
        })
    }
}

/// Run the `spendguard quote` command.
pub fn run_quote(args: &QuoteArgs, catalog: &RateCatalog) -> Result<CostBreakdown, SpendguardError> {
    let request = match &args.request {
        Some(path) => read_json::<QuoteRequest>(path, "request")?,
        None => QuoteRequest {
            provider: args.provider.clone().unwrap_or_default(),
            model: args.model.clone().unwrap_or_default(),
            rate_card: None,
            usage: args.usage(),
        },
    };
    quote_request(request, catalog)
}

/// Price a request, resolving its rate card from `catalog` when it has none.
pub fn quote_request(
    request: QuoteRequest,
    catalog: &RateCatalog,
) -> Result<CostBreakdown, SpendguardError> {
    let inline_rate_card = request.rate_card.is_some();
    let request = request.resolve(catalog)?;
    let breakdown = request.compute();
    info!(
        provider = %request.provider,
        model = %request.model,
        inline_rate_card,
        cents = breakdown.cents(),
        "call quoted"
    );
    Ok(breakdown)
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use spendguard_cost::ChargeName;

    use super::*;

    fn request(value: serde_json::Value) -> QuoteRequest {
        serde_json::from_value(value).expect("valid request")
    }

    #[test]
    fn catalog_card_is_used_without_inline_card() {
        let req = request(json!({
            "provider": "openai",
            "model": "gpt-4o",
            "input_tokens": 1_000_000,
            "output_tokens": 0
        }));
        let breakdown = quote_request(req, RateCatalog::defaults()).unwrap();
        assert_eq!(breakdown.cents(), 250);
    }

    #[test]
    fn inline_card_wins_and_needs_no_catalog_entry() {
        let req = request(json!({
            "provider": "private",
            "model": "tuned-7b",
            "rate_card": {"input_cents_per_1m": 10, "output_cents_per_1m": 20},
            "input_tokens": 1_000_000,
            "output_tokens": 1_000_000
        }));
        let breakdown = quote_request(req, &RateCatalog::new()).unwrap();
        assert_eq!(breakdown.cents(), 30);
    }

    #[test]
    fn resolved_request_carries_catalog_card() {
        let req = request(json!({
            "provider": "openai",
            "model": "gpt-4o",
            "input_tokens": 10,
            "output_tokens": 5
        }));
        let resolved = req.resolve(RateCatalog::defaults()).unwrap();
        assert_eq!(
            &resolved.rate_card,
            RateCatalog::defaults().lookup("openai", "gpt-4o").unwrap()
        );
        assert_eq!(resolved.usage.input_tokens, 10);
    }

    #[test]
    fn unknown_model_is_reported() {
        let req = request(json!({
            "provider": "openai",
            "model": "gpt-9",
            "input_tokens": 1,
            "output_tokens": 1
        }));
        let err = quote_request(req, RateCatalog::defaults()).unwrap_err();
        assert!(matches!(err, SpendguardError::UnknownModel { .. }));
    }

    #[test]
    fn flags_build_tool_calls() {
        let args = QuoteArgs {
            request: None,
            provider: Some("openai".into()),
            model: Some("gpt-5.2".into()),
            input_tokens: 100,
            output_tokens: 10,
            cached_input_tokens: 0,
            reasoning_tokens: 0,
            cache_write_input_tokens: 0,
            cache_read_input_tokens: 0,
            grounding_queries: 0,
            web_search_calls: 3,
            file_search_calls: 0,
        };
        let usage = args.usage();
        assert_eq!(usage.tool_call_count(WEB_SEARCH_CALL), 3);
        assert!(!usage.tool_calls.contains_key(FILE_SEARCH_CALL));

        let mut catalog = RateCatalog::new();
        catalog.insert("openai", "gpt-5.2", RateCard::new(175, 1400).with_web_search(1));
        let breakdown = run_quote(&args, &catalog).unwrap();
        assert_eq!(
            breakdown.charge(ChargeName::ToolWebSearchCall).map(|c| c.cost_microcents),
            Some(3_000_000)
        );
    }
}
