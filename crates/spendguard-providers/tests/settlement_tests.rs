// SPDX-FileCopyrightText: 2026 Spendguard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider payload -> usage -> priced breakdown, against the default catalog.

use serde_json::json;
use spendguard_core::Provider;
use spendguard_cost::{ChargeName, RateCard, RateCatalog, compute_cost_breakdown};
use spendguard_providers::{clamp_max_tokens, extractor_for};
use tracing_test::traced_test;

#[test]
fn openai_chat_response_prices_cached_split() {
    let body = json!({
        "id": "chatcmpl-1",
        "model": "gpt-5.2",
        "choices": [{"index": 0, "message": {"role": "assistant", "content": "ok"}}],
        "usage": {
            "prompt_tokens": 1_000_000,
            "completion_tokens": 1_000_000,
            "prompt_tokens_details": {"cached_tokens": 500_000}
        }
    });
    let extractor = extractor_for(Provider::OpenAi);
    let usage = extractor.extract_usage(&body).unwrap();
    let card = RateCatalog::defaults().lookup("openai", "gpt-5.2").unwrap();
    let breakdown = compute_cost_breakdown("openai", "gpt-5.2", card, &usage);

    // 500k uncached at 175 + 500k cached at 18 + 1M output at 1400
    let uncached = breakdown.charge(ChargeName::InputTokensUncached).unwrap();
    let cached = breakdown.charge(ChargeName::InputTokensCached).unwrap();
    assert_eq!(uncached.cost_microcents, 87_500_000);
    assert_eq!(cached.cost_microcents, 9_000_000);
    assert_eq!(breakdown.totals.realized_microcents, 1_496_500_000);
    assert_eq!(breakdown.cents(), 1497);
    assert_eq!(extractor.extract_completion(&body).as_deref(), Some("ok"));
}

#[test]
fn anthropic_response_prices_cache_tiers() {
    let body = json!({
        "type": "message",
        "content": [{"type": "text", "text": "cached answer"}],
        "usage": {
            "input_tokens": 100_000,
            "output_tokens": 10_000,
            "cache_creation_input_tokens": 200_000,
            "cache_read_input_tokens": 700_000
        }
    });
    let usage = extractor_for(Provider::Anthropic).extract_usage(&body).unwrap();
    let card = RateCard::new(300, 1500).with_cache_tiers(375, 30);
    let breakdown = compute_cost_breakdown("anthropic", "claude-cached", &card, &usage);

    let names: Vec<ChargeName> = breakdown.charges.iter().map(|c| c.name).collect();
    assert_eq!(
        names,
        vec![
            ChargeName::InputTokensBase,
            ChargeName::InputTokensCacheWrite,
            ChargeName::InputTokensCacheRead,
            ChargeName::OutputTokens,
        ]
    );
    // 100k*300 + 200k*375 + 700k*30 + 10k*1500, in microcents
    assert_eq!(
        breakdown.totals.realized_microcents,
        30_000_000 + 75_000_000 + 21_000_000 + 15_000_000
    );
}

#[test]
fn gemini_grounded_response_adds_query_fee() {
    let body = json!({
        "candidates": [{
            "content": {"parts": [{"text": "grounded"}]},
            "groundingMetadata": {"webSearchQueries": ["a", "b", "c", "d", "e", "f", "g"]}
        }],
        "usageMetadata": {"promptTokenCount": 0, "candidatesTokenCount": 0}
    });
    let usage = extractor_for(Provider::Gemini).extract_usage(&body).unwrap();
    let card = RateCard::new(50, 200).with_grounding(3500);
    let breakdown = compute_cost_breakdown("gemini", "gemini-grounded", &card, &usage);

    let grounding = breakdown.charge(ChargeName::GroundingQueries).unwrap();
    assert_eq!(grounding.quantity, 7);
    // 7 queries * 3500 cents / 1000 = 24.5 cents
    assert_eq!(grounding.cost_microcents, 24_500_000);
    assert_eq!(breakdown.cents(), 25);
}

#[test]
fn responses_tool_calls_are_billed() {
    let body = json!({
        "output": [
            {"type": "web_search_call"},
            {"type": "web_search_call"},
            {"type": "message", "content": [{"type": "output_text", "text": "found it"}]}
        ],
        "usage": {"input_tokens": 0, "output_tokens": 0}
    });
    let usage = extractor_for(Provider::OpenAi).extract_usage(&body).unwrap();
    let card = RateCard::new(175, 1400).with_web_search(1);
    let breakdown = compute_cost_breakdown("openai", "gpt-5.2", &card, &usage);

    let fee = breakdown.charge(ChargeName::ToolWebSearchCall).unwrap();
    assert_eq!(fee.quantity, 2);
    assert_eq!(fee.cost_microcents, 2_000_000);
}

#[traced_test]
#[test]
fn inconsistent_payload_is_clamped_and_logged() {
    // A provider reporting more cached tokens than input tokens.
    let body = json!({
        "usage": {
            "prompt_tokens": 100,
            "completion_tokens": 10,
            "prompt_tokens_details": {"cached_tokens": 5000}
        }
    });
    let usage = extractor_for(Provider::Grok).extract_usage(&body).unwrap();
    let card = RateCatalog::defaults().lookup("grok", "grok-3").unwrap();
    let breakdown = compute_cost_breakdown("grok", "grok-3", card, &usage);

    assert_eq!(breakdown.usage.cached_input_tokens, 100);
    assert_eq!(
        breakdown.charge(ChargeName::InputTokensUncached).unwrap().quantity,
        0
    );
    assert!(logs_contain("usage counts clamped before pricing"));
}

#[test]
fn budget_derived_limit_is_capped() {
    let budget_tokens = 120_000;
    assert_eq!(clamp_max_tokens(budget_tokens, 16_384), 16_384);
    assert_eq!(clamp_max_tokens(budget_tokens, 0), budget_tokens);
}
