// SPDX-FileCopyrightText: 2026 Spendguard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Worst-case pre-call estimates.
//!
//! Before a call is made, the budget layer reserves the most the call could
//! cost: every input token at the full (uncached) rate and the whole
//! `max_output_tokens` allowance at the output rate. The estimate goes through
//! [`compute_cost_breakdown`] so the context cliff is resolved exactly as it
//! will be at settlement.

use crate::billing::{CostBreakdown, compute_cost_breakdown};
use crate::pricing::{RateCard, estimate_tokens_text};
use crate::usage::UsageRecord;

/// Reserve-sized breakdown for a call with a known input size.
pub fn worst_case_estimate(
    provider: &str,
    model: &str,
    rate_card: &RateCard,
    input_tokens: i64,
    max_output_tokens: i64,
) -> CostBreakdown {
    let usage = UsageRecord::new(input_tokens, max_output_tokens);
    compute_cost_breakdown(provider, model, rate_card, &usage)
}

/// Reserve-sized breakdown for a call whose input is only known as text.
///
/// The token count comes from [`estimate_tokens_text`], which deliberately
/// over-counts.
pub fn worst_case_estimate_text(
    provider: &str,
    model: &str,
    rate_card: &RateCard,
    prompt: &str,
    max_output_tokens: i64,
) -> CostBreakdown {
    worst_case_estimate(
        provider,
        model,
        rate_card,
        estimate_tokens_text(prompt),
        max_output_tokens,
    )
}
