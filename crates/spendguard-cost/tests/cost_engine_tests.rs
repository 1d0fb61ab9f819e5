// SPDX-FileCopyrightText: 2026 Spendguard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the cost engine: tiering, fees, totals, and the
//! serialized breakdown contract.

use serde_json::json;
use spendguard_cost::{
    AppliedRate, ChargeName, ChargeUnit, CostRequest, FILE_SEARCH_CALL, RateCard, RateCatalog,
    UsageRecord, WEB_SEARCH_CALL, apply_context_cliff, compute_cost_breakdown,
};

fn names(breakdown: &spendguard_cost::CostBreakdown) -> Vec<ChargeName> {
    breakdown.charges.iter().map(|c| c.name).collect()
}

// ---- Input tiering ----

#[test]
fn cached_split_matches_reference_scenario() {
    let card = RateCard::new(175, 1400).with_cached_input(18);
    let usage = UsageRecord::new(2_000_000, 1_000_000).with_cached_input(500_000);

    let b = compute_cost_breakdown("openai", "gpt-5.2", &card, &usage);

    assert_eq!(
        names(&b),
        vec![
            ChargeName::InputTokensUncached,
            ChargeName::InputTokensCached,
            ChargeName::OutputTokens,
        ]
    );
    assert_eq!(b.charges[0].quantity, 1_500_000);
    assert_eq!(b.charges[0].cost_microcents, 262_500_000);
    assert_eq!(b.charges[1].quantity, 500_000);
    assert_eq!(b.charges[1].cost_microcents, 9_000_000);
    assert_eq!(b.charges[2].quantity, 1_000_000);
    assert_eq!(b.charges[2].cost_microcents, 1_400_000_000);
    assert_eq!(b.totals.realized_microcents, 1_671_500_000);
    assert_eq!(b.totals.realized_cents_ceiled, 1672);
}

#[test]
fn cached_split_falls_back_to_input_rate_when_unconfigured() {
    let card = RateCard::new(100, 200);
    let usage = UsageRecord::new(1_000, 0).with_cached_input(400);
    let b = compute_cost_breakdown("gemini", "gemini-1.5-flash", &card, &usage);

    let uncached = b.charge(ChargeName::InputTokensUncached).unwrap();
    let cached = b.charge(ChargeName::InputTokensCached).unwrap();
    assert_eq!(uncached.rate, AppliedRate::PerMillionTokens { cents_per_1m: 100 });
    assert_eq!(cached.rate, AppliedRate::PerMillionTokens { cents_per_1m: 100 });
    assert_eq!(uncached.cost_microcents + cached.cost_microcents, 100_000);
}

#[test]
fn uncached_rate_overrides_input_rate() {
    let card = RateCard::new(100, 200).with_cached_input(10).with_uncached_input(120);
    let usage = UsageRecord::new(1_000, 0).with_cached_input(400);
    let b = compute_cost_breakdown("openai", "m", &card, &usage);
    assert_eq!(b.charges[0].cost_microcents, 600 * 120);
    assert_eq!(b.charges[1].cost_microcents, 400 * 10);
}

#[test]
fn cache_write_read_split_emits_three_input_items() {
    let card = RateCard::new(300, 1500).with_cache_tiers(375, 30);
    let usage = UsageRecord::new(10_000, 500)
        .with_cache_write(2_000)
        .with_cache_read(6_000);

    let b = compute_cost_breakdown("anthropic", "claude-sonnet", &card, &usage);

    assert_eq!(
        names(&b),
        vec![
            ChargeName::InputTokensBase,
            ChargeName::InputTokensCacheWrite,
            ChargeName::InputTokensCacheRead,
            ChargeName::OutputTokens,
        ]
    );
    assert_eq!(b.charges[0].quantity, 2_000);
    assert_eq!(b.charges[0].cost_microcents, 600_000);
    assert_eq!(b.charges[1].cost_microcents, 750_000);
    assert_eq!(b.charges[2].cost_microcents, 180_000);
    assert_eq!(b.charges[3].cost_microcents, 750_000);
    assert_eq!(b.totals.realized_microcents, 2_280_000);
    assert_eq!(b.totals.realized_cents_ceiled, 3);
}

#[test]
fn cache_tiers_fall_back_to_cliff_adjusted_input_rate() {
    let card = RateCard::new(100, 100).with_context_cliff(1_000, Some(2.0), None);
    let usage = UsageRecord::new(5_000, 0).with_cache_read(1_000);
    let b = compute_cost_breakdown("anthropic", "m", &card, &usage);
    assert!(b.cliff.applied);
    for item in &b.charges[..3] {
        assert_eq!(item.rate, AppliedRate::PerMillionTokens { cents_per_1m: 200 });
    }
}

#[test]
fn cached_counts_win_over_cache_write_read_counts() {
    let card = RateCard::new(100, 100).with_cached_input(10).with_cache_tiers(125, 10);
    let usage = UsageRecord::new(1_000, 0)
        .with_cached_input(100)
        .with_cache_write(200)
        .with_cache_read(300);
    let b = compute_cost_breakdown("openai", "m", &card, &usage);
    assert_eq!(
        names(&b),
        vec![
            ChargeName::InputTokensUncached,
            ChargeName::InputTokensCached,
            ChargeName::OutputTokens,
        ]
    );
}

// ---- Output tiering ----

#[test]
fn reasoning_split_requires_configured_rate() {
    let usage = UsageRecord::new(0, 1_000).with_reasoning(600);

    let plain = compute_cost_breakdown("openai", "o3", &RateCard::new(200, 800), &usage);
    assert_eq!(names(&plain), vec![ChargeName::InputTokens, ChargeName::OutputTokens]);
    assert_eq!(plain.charges[1].cost_microcents, 800_000);

    let card = RateCard::new(200, 800).with_reasoning_output(1_000);
    let split = compute_cost_breakdown("openai", "o3", &card, &usage);
    assert_eq!(
        names(&split),
        vec![
            ChargeName::InputTokens,
            ChargeName::OutputTokensNonReasoning,
            ChargeName::OutputTokensReasoning,
        ]
    );
    assert_eq!(split.charges[1].quantity, 400);
    assert_eq!(split.charges[1].cost_microcents, 320_000);
    assert_eq!(split.charges[2].quantity, 600);
    assert_eq!(split.charges[2].cost_microcents, 600_000);
}

// ---- Context cliff ----

#[test]
fn cliff_scenario_raises_input_rate() {
    let card = RateCard::new(100, 500).with_context_cliff(100_000, Some(1.5), None);
    let adj = apply_context_cliff(&card, 200_000);
    assert_eq!(adj.input_cents_per_1m, 150);
    assert_eq!(adj.output_cents_per_1m, 500);
    assert!(adj.applied);

    let b = compute_cost_breakdown("anthropic", "m", &card, &UsageRecord::new(200_000, 0));
    assert!(b.cliff.applied);
    assert_eq!(b.cliff.configured.threshold_tokens, Some(100_000));
    assert_eq!(b.charges[0].cost_microcents, 200_000 * 150);
}

#[test]
fn cliff_uses_clamped_input_count() {
    let card = RateCard::new(100, 500).with_context_cliff(0, Some(2.0), None);
    let b = compute_cost_breakdown("anthropic", "m", &card, &UsageRecord::new(-50, 0));
    assert!(!b.cliff.applied);
}

// ---- Ancillary fees ----

#[test]
fn grounding_fee_is_per_thousand_queries() {
    let card = RateCard::new(0, 0).with_grounding(50);
    let usage = UsageRecord::new(0, 0).with_grounding_queries(7);
    let b = compute_cost_breakdown("gemini", "gemini-3-pro-preview", &card, &usage);

    let item = b.charge(ChargeName::GroundingQueries).unwrap();
    assert_eq!(item.unit, ChargeUnit::Queries);
    assert_eq!(item.rate, AppliedRate::PerThousandQueries { cents_per_1k: 50 });
    assert_eq!(item.cost_microcents, 350_000);
    assert_eq!(b.totals.realized_cents_ceiled, 1);
}

#[test]
fn tool_fees_follow_grounding_in_order() {
    let card = RateCard::new(100, 100)
        .with_grounding(35)
        .with_web_search(3)
        .with_file_search(1);
    let usage = UsageRecord::new(10, 10)
        .with_grounding_queries(2)
        .with_tool_calls(FILE_SEARCH_CALL, 4)
        .with_tool_calls(WEB_SEARCH_CALL, 2)
        .with_tool_calls("code_interpreter_call", 9);

    let b = compute_cost_breakdown("openai", "gpt-5.2", &card, &usage);

    assert_eq!(
        names(&b),
        vec![
            ChargeName::InputTokens,
            ChargeName::OutputTokens,
            ChargeName::GroundingQueries,
            ChargeName::ToolWebSearchCall,
            ChargeName::ToolFileSearchCall,
        ]
    );
    let web = b.charge(ChargeName::ToolWebSearchCall).unwrap();
    assert_eq!(web.cost_microcents, 6_000_000);
    assert_eq!(web.unit, ChargeUnit::Calls);
    let file = b.charge(ChargeName::ToolFileSearchCall).unwrap();
    assert_eq!(file.cost_microcents, 4_000_000);
}

#[test]
fn fees_without_rates_are_omitted() {
    let usage = UsageRecord::new(10, 10)
        .with_grounding_queries(5)
        .with_tool_calls(WEB_SEARCH_CALL, 1);
    let b = compute_cost_breakdown("openai", "gpt-4o", &RateCard::new(1, 1), &usage);
    assert_eq!(names(&b), vec![ChargeName::InputTokens, ChargeName::OutputTokens]);
}

// ---- Normalization ----

#[test]
fn oversized_categories_never_inflate_total() {
    let card = RateCard::new(100, 100).with_cached_input(1_000);
    let honest_usage = UsageRecord::new(1_000, 0).with_cached_input(1_000);
    let inflated_usage = UsageRecord::new(1_000, 0).with_cached_input(1_000_000);
    let honest = compute_cost_breakdown("openai", "m", &card, &honest_usage);
    let inflated = compute_cost_breakdown("openai", "m", &card, &inflated_usage);
    assert_eq!(honest.totals, inflated.totals);
    assert_eq!(inflated.usage.cached_input_tokens, 1_000);
}

#[test]
fn zero_usage_costs_nothing() {
    let card = RateCard::new(250, 1000);
    let b = compute_cost_breakdown("openai", "gpt-4o", &card, &UsageRecord::default());
    assert_eq!(b.totals.realized_microcents, 0);
    assert_eq!(b.totals.realized_cents_ceiled, 0);
    assert_eq!(b.charges.len(), 2);
}

// ---- Serialized contract ----

#[test]
fn breakdown_serializes_to_documented_shape() {
    let card = RateCatalog::defaults().lookup("openai", "gpt-5.2").unwrap();
    let usage = UsageRecord::new(2_000_000, 1_000_000).with_cached_input(500_000);
    let b = compute_cost_breakdown("openai", "gpt-5.2", card, &usage);

    let value = serde_json::to_value(&b).unwrap();
    assert_eq!(
        value,
        json!({
            "provider": "openai",
            "model": "gpt-5.2",
            "usage": {
                "input_tokens": 2_000_000,
                "output_tokens": 1_000_000,
                "cached_input_tokens": 500_000,
                "reasoning_tokens": 0,
                "cache_write_input_tokens": 0,
                "cache_read_input_tokens": 0,
                "grounding_queries": 0,
                "tool_calls": {}
            },
            "cliff": {
                "configured": {
                    "threshold_tokens": null,
                    "input_multiplier": null,
                    "output_multiplier": null
                },
                "applied": false
            },
            "charges": [
                {
                    "name": "input_tokens_uncached",
                    "quantity": 1_500_000,
                    "unit": "tokens",
                    "rate": {"cents_per_1m": 175},
                    "cost_microcents": 262_500_000
                },
                {
                    "name": "input_tokens_cached",
                    "quantity": 500_000,
                    "unit": "tokens",
                    "rate": {"cents_per_1m": 18},
                    "cost_microcents": 9_000_000
                },
                {
                    "name": "output_tokens",
                    "quantity": 1_000_000,
                    "unit": "tokens",
                    "rate": {"cents_per_1m": 1400},
                    "cost_microcents": 1_400_000_000_i64
                }
            ],
            "totals": {
                "realized_microcents": 1_671_500_000_i64,
                "realized_cents_ceiled": 1672
            }
        })
    );

    let back: spendguard_cost::CostBreakdown = serde_json::from_value(value).unwrap();
    assert_eq!(back, b);
}

#[test]
fn cost_request_parses_flat_usage_fields() {
    let json = r#"{
        "provider": "gemini",
        "model": "gemini-3-pro-preview",
        "rate_card": {
            "input_cents_per_1m": 200,
            "output_cents_per_1m": 1200,
            "grounding_cents_per_1k_queries": 3500
        },
        "input_tokens": 1000,
        "output_tokens": 100,
        "grounding_queries": 2,
        "tool_calls": {"web_search_call": 1}
    }"#;
    let request: CostRequest = serde_json::from_str(json).unwrap();
    assert_eq!(request.usage.grounding_queries, 2);
    assert_eq!(request.usage.cached_input_tokens, 0);

    let b = request.compute();
    assert_eq!(b.provider, "gemini");
    // 1000*200 + 100*1200 + ceil(2*3500*1e6/1000)
    assert_eq!(b.totals.realized_microcents, 200_000 + 120_000 + 7_000_000);
    assert_eq!(b.totals.realized_cents_ceiled, 8);
}
