// SPDX-FileCopyrightText: 2026 Spendguard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Itemized, integer-exact cost breakdowns.
//!
//! All money is tracked in microcents (one millionth of a cent). Because rate
//! cards quote cents per one million tokens, `tokens * cents_per_1m` is the
//! exact microcent cost of a token line item with no rounding. The only
//! rounding steps are the context-cliff rate adjustment and the per-1000
//! grounding fee, and both round up. The final total is ceiled to whole cents,
//! which is what the budget layer actually decrements.
//!
//! [`compute_cost_breakdown`] is used for both the pre-call estimate and the
//! post-call settlement, so the two always agree on which rates were in force.

use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tracing::{debug, warn};

use crate::pricing::{ContextCliff, RateCard};
use crate::usage::{FILE_SEARCH_CALL, UsageRecord, WEB_SEARCH_CALL};

/// Microcents in one cent.
pub const MICROCENTS_PER_CENT: i64 = 1_000_000;

/// Queries per grounding billing unit.
const QUERIES_PER_GROUNDING_UNIT: i128 = 1_000;

/// Name tag of a priced component. The set is closed.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ChargeName {
    InputTokens,
    InputTokensUncached,
    InputTokensCached,
    InputTokensBase,
    InputTokensCacheWrite,
    InputTokensCacheRead,
    OutputTokens,
    OutputTokensNonReasoning,
    OutputTokensReasoning,
    GroundingQueries,
    ToolWebSearchCall,
    ToolFileSearchCall,
}

/// What a line item's quantity counts.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ChargeUnit {
    Tokens,
    Queries,
    Calls,
}

/// The rate actually applied to a line item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AppliedRate {
    PerMillionTokens { cents_per_1m: i64 },
    PerThousandQueries { cents_per_1k: i64 },
    PerCall { cents_per_call: i64 },
}

/// One priced component of a call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub name: ChargeName,
    pub quantity: i64,
    pub unit: ChargeUnit,
    pub rate: AppliedRate,
    pub cost_microcents: i64,
}

impl LineItem {
    fn tokens(name: ChargeName, quantity: i64, cents_per_1m: i64) -> Self {
        Self {
            name,
            quantity,
            unit: ChargeUnit::Tokens,
            rate: AppliedRate::PerMillionTokens { cents_per_1m },
            cost_microcents: token_cost_microcents(quantity, cents_per_1m),
        }
    }
}

/// Base rates after the context cliff has been considered.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CliffAdjustment {
    pub input_cents_per_1m: i64,
    pub output_cents_per_1m: i64,
    /// Whether at least one multiplier fired.
    pub applied: bool,
    /// The card's cliff knobs, echoed for auditing.
    pub configured: ContextCliff,
}

/// Cliff section of a breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CliffReport {
    pub configured: ContextCliff,
    pub applied: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    /// Exact sum of every line item.
    pub realized_microcents: i64,
    /// `realized_microcents` rounded up to whole cents; the amount to charge.
    pub realized_cents_ceiled: i64,
}

/// Fully itemized cost of one call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub provider: String,
    pub model: String,
    /// The usage counters after normalization.
    pub usage: UsageRecord,
    pub cliff: CliffReport,
    /// Line items in input, output, grounding, tool order.
    pub charges: Vec<LineItem>,
    pub totals: Totals,
}

impl CostBreakdown {
    /// The line item with the given name, if it was emitted.
    pub fn charge(&self, name: ChargeName) -> Option<&LineItem> {
        self.charges.iter().find(|item| item.name == name)
    }

    /// Whole cents to charge for this call.
    pub fn cents(&self) -> i64 {
        self.totals.realized_cents_ceiled
    }
}

/// A self-contained pricing request: who was called, at what rates, and what
/// the provider reported.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CostRequest {
    pub provider: String,
    pub model: String,
    pub rate_card: RateCard,
    #[serde(flatten)]
    pub usage: UsageRecord,
}

impl CostRequest {
    pub fn compute(&self) -> CostBreakdown {
        compute_cost_breakdown(&self.provider, &self.model, &self.rate_card, &self.usage)
    }
}

/// Ceiling division for non-negative quotients.
///
/// Non-positive numerators yield zero.
///
/// # Panics
///
/// Panics if `divisor <= 0`. No caller in this crate can pass one; reaching
/// it means a programming error, and returning a number would misprice.
pub fn ceil_div(numerator: i128, divisor: i128) -> i128 {
    assert!(divisor > 0, "divisor must be > 0, got {divisor}");
    if numerator <= 0 {
        return 0;
    }
    (numerator - 1) / divisor + 1
}

/// Whole cents for a microcent amount, rounded up.
pub fn cents_ceiled_from_microcents(microcents: i64) -> i64 {
    let cents = ceil_div(i128::from(microcents), i128::from(MICROCENTS_PER_CENT));
    saturate(cents)
}

/// Exact microcent cost of `tokens` at `cents_per_1m`.
pub fn token_cost_microcents(tokens: i64, cents_per_1m: i64) -> i64 {
    if tokens <= 0 || cents_per_1m <= 0 {
        return 0;
    }
    tokens.saturating_mul(cents_per_1m)
}

/// Microcent cost of `calls` invocations at a flat per-call fee.
pub fn per_call_cost_microcents(calls: i64, cents_per_call: i64) -> i64 {
    if calls <= 0 || cents_per_call <= 0 {
        return 0;
    }
    saturate(i128::from(calls) * i128::from(cents_per_call) * i128::from(MICROCENTS_PER_CENT))
}

/// Microcent cost of `count` units billed per thousand, rounded up.
pub fn per_1k_cost_microcents(count: i64, cents_per_1k: i64) -> i64 {
    if count <= 0 || cents_per_1k <= 0 {
        return 0;
    }
    let numerator = i128::from(count) * i128::from(cents_per_1k) * i128::from(MICROCENTS_PER_CENT);
    saturate(ceil_div(numerator, QUERIES_PER_GROUNDING_UNIT))
}

fn saturate(value: i128) -> i64 {
    i64::try_from(value).unwrap_or(if value < 0 { i64::MIN } else { i64::MAX })
}

/// Scale an integer rate by a float multiplier, rounding up to a whole rate.
///
/// The multiplier is taken at its shortest decimal representation (`1.1`, not
/// `1.100000000000000088...`) and the product computed in decimal, so
/// `100 * 1.1` is exactly 110 on every platform.
fn scale_rate_ceil(rate: i64, multiplier: f64) -> i64 {
    exact_multiplier(multiplier)
        .and_then(|m| Decimal::from(rate).checked_mul(m))
        .and_then(|product| product.ceil().to_i64())
        // Out of decimal range (or not finite): saturating float ceiling.
        .unwrap_or_else(|| (rate as f64 * multiplier).ceil() as i64)
}

/// Fractional digits a `Decimal` can hold.
const DECIMAL_MAX_SCALE: u32 = 28;

/// `multiplier` as a decimal, or `None` when parsing would have rounded it.
///
/// A value with more fractional digits than `Decimal` holds is rounded on
/// parse, down to zero for tiny multipliers; those take the float path.
fn exact_multiplier(multiplier: f64) -> Option<Decimal> {
    let m = Decimal::from_str(&multiplier.to_string()).ok()?;
    if m.scale() >= DECIMAL_MAX_SCALE || (m.is_zero() && multiplier != 0.0) {
        return None;
    }
    Some(m)
}

/// Resolve the base input/output rates for a call of `input_tokens` tokens.
///
/// When the card has a cliff threshold and `input_tokens` exceeds it, each
/// configured multiplier scales its base rate, rounding up. Otherwise the base
/// rates pass through. Estimation and settlement must both go through here.
pub fn apply_context_cliff(rate_card: &RateCard, input_tokens: i64) -> CliffAdjustment {
    let input_tokens = input_tokens.max(0);
    let configured = rate_card.context_cliff();
    let mut adjustment = CliffAdjustment {
        input_cents_per_1m: rate_card.input_cents_per_1m,
        output_cents_per_1m: rate_card.output_cents_per_1m,
        applied: false,
        configured,
    };

    let Some(threshold) = configured.threshold_tokens else {
        return adjustment;
    };
    if input_tokens <= threshold {
        return adjustment;
    }

    if let Some(multiplier) = configured.input_multiplier {
        adjustment.input_cents_per_1m = scale_rate_ceil(rate_card.input_cents_per_1m, multiplier);
        adjustment.applied = true;
    }
    if let Some(multiplier) = configured.output_multiplier {
        adjustment.output_cents_per_1m = scale_rate_ceil(rate_card.output_cents_per_1m, multiplier);
        adjustment.applied = true;
    }
    adjustment
}

/// Price one call.
///
/// Never fails: usage is normalized first (see [`UsageRecord::normalized`]),
/// then line items are emitted in a fixed order:
///
/// - input: cached/uncached split if any cached tokens were reported, else a
///   base/cache-write/cache-read split if any explicit cache traffic was
///   reported, else a single input item;
/// - output: non-reasoning/reasoning split if reasoning tokens were reported
///   and the card prices them, else a single output item;
/// - grounding queries, then web-search and file-search tool fees, each only
///   when both the count and the rate are present.
///
/// `provider` and `model` are echoed verbatim; catalog lookup is the caller's job.
pub fn compute_cost_breakdown(
    provider: &str,
    model: &str,
    rate_card: &RateCard,
    usage: &UsageRecord,
) -> CostBreakdown {
    let normalized = usage.normalized();
    if normalized != *usage {
        warn!(
            provider,
            model,
            input_tokens = usage.input_tokens,
            output_tokens = usage.output_tokens,
            cached_input_tokens = usage.cached_input_tokens,
            reasoning_tokens = usage.reasoning_tokens,
            cache_write_input_tokens = usage.cache_write_input_tokens,
            cache_read_input_tokens = usage.cache_read_input_tokens,
            "usage counts clamped before pricing"
        );
    }
    let usage = normalized;

    let cliff = apply_context_cliff(rate_card, usage.input_tokens);
    let input_rate = cliff.input_cents_per_1m;
    let output_rate = cliff.output_cents_per_1m;

    let mut charges = Vec::with_capacity(6);

    // Cached/uncached takes priority should a payload report both kinds of cache traffic.
    if usage.cached_input_tokens > 0 {
        let uncached = usage.input_tokens - usage.cached_input_tokens;
        charges.push(LineItem::tokens(
            ChargeName::InputTokensUncached,
            uncached,
            rate_card.uncached_input_cents_per_1m.unwrap_or(input_rate),
        ));
        charges.push(LineItem::tokens(
            ChargeName::InputTokensCached,
            usage.cached_input_tokens,
            rate_card.cached_input_cents_per_1m.unwrap_or(input_rate),
        ));
    } else if usage.cache_write_input_tokens > 0 || usage.cache_read_input_tokens > 0 {
        let base = usage.input_tokens - usage.cache_write_input_tokens - usage.cache_read_input_tokens;
        charges.push(LineItem::tokens(ChargeName::InputTokensBase, base, input_rate));
        charges.push(LineItem::tokens(
            ChargeName::InputTokensCacheWrite,
            usage.cache_write_input_tokens,
            rate_card.cache_write_input_cents_per_1m.unwrap_or(input_rate),
        ));
        charges.push(LineItem::tokens(
            ChargeName::InputTokensCacheRead,
            usage.cache_read_input_tokens,
            rate_card.cache_read_input_cents_per_1m.unwrap_or(input_rate),
        ));
    } else {
        charges.push(LineItem::tokens(ChargeName::InputTokens, usage.input_tokens, input_rate));
    }

    match rate_card.reasoning_output_cents_per_1m {
        Some(reasoning_rate) if usage.reasoning_tokens > 0 => {
            charges.push(LineItem::tokens(
                ChargeName::OutputTokensNonReasoning,
                usage.output_tokens - usage.reasoning_tokens,
                output_rate,
            ));
            charges.push(LineItem::tokens(
                ChargeName::OutputTokensReasoning,
                usage.reasoning_tokens,
                reasoning_rate,
            ));
        }
        _ => {
            charges.push(LineItem::tokens(ChargeName::OutputTokens, usage.output_tokens, output_rate));
        }
    }

    if let Some(cents_per_1k) = rate_card.grounding_cents_per_1k_queries
        && usage.grounding_queries > 0
    {
        charges.push(LineItem {
            name: ChargeName::GroundingQueries,
            quantity: usage.grounding_queries,
            unit: ChargeUnit::Queries,
            rate: AppliedRate::PerThousandQueries { cents_per_1k },
            cost_microcents: per_1k_cost_microcents(usage.grounding_queries, cents_per_1k),
        });
    }

    let tool_fees = [
        (ChargeName::ToolWebSearchCall, WEB_SEARCH_CALL, rate_card.web_search_cents_per_call),
        (ChargeName::ToolFileSearchCall, FILE_SEARCH_CALL, rate_card.file_search_cents_per_call),
    ];
    for (name, tool, rate) in tool_fees {
        let calls = usage.tool_call_count(tool);
        if let Some(cents_per_call) = rate
            && calls > 0
        {
            charges.push(LineItem {
                name,
                quantity: calls,
                unit: ChargeUnit::Calls,
                rate: AppliedRate::PerCall { cents_per_call },
                cost_microcents: per_call_cost_microcents(calls, cents_per_call),
            });
        }
    }

    let realized_microcents = charges
        .iter()
        .fold(0_i64, |total, item| total.saturating_add(item.cost_microcents));
    let totals = Totals {
        realized_microcents,
        realized_cents_ceiled: cents_ceiled_from_microcents(realized_microcents),
    };

    debug!(
        provider,
        model,
        cliff_applied = cliff.applied,
        charges = charges.len(),
        realized_microcents,
        realized_cents = totals.realized_cents_ceiled,
        "cost breakdown computed"
    );

    CostBreakdown {
        provider: provider.to_string(),
        model: model.to_string(),
        usage,
        cliff: CliffReport {
            configured: cliff.configured,
            applied: cliff.applied,
        },
        charges,
        totals,
    }
}
