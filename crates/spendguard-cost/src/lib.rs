// SPDX-FileCopyrightText: 2026 Spendguard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Rate catalog and cost engine for spendguard.
//!
//! This crate provides:
//! - **Pricing**: the `RateCard` model, the built-in default catalog, and
//!   copy/merge for overlaying operator rates
//! - **Usage**: per-call usage counters and the clamping policy applied to them
//! - **Billing**: the itemized, integer-exact cost breakdown
//! - **Estimate**: worst-case pre-call reservations priced through the same engine

pub mod billing;
pub mod estimate;
pub mod pricing;
pub mod usage;

pub use billing::{
    AppliedRate, ChargeName, ChargeUnit, CliffAdjustment, CliffReport, CostBreakdown, CostRequest,
    LineItem, MICROCENTS_PER_CENT, Totals, apply_context_cliff, cents_ceiled_from_microcents,
    compute_cost_breakdown,
};
pub use estimate::{worst_case_estimate, worst_case_estimate_text};
pub use pricing::{
    ContextCliff, RateCard, RateCatalog, copy_rates, cost_cents, estimate_tokens_text, merge_rates,
};
pub use usage::{FILE_SEARCH_CALL, UsageRecord, WEB_SEARCH_CALL};
