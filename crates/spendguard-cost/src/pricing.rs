// SPDX-FileCopyrightText: 2026 Spendguard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Rate cards and the provider/model rate catalog.
//!
//! Rates are integer cents per 1,000,000 tokens unless the field name says
//! otherwise. Optional fields distinguish "not configured for this model"
//! (`None`) from "free" (`Some(0)`); the cost engine only falls back to a base
//! rate when a specialized rate is absent.
//!
//! The built-in defaults are conservative placeholders. Deployments overlay
//! their own rates by copying the defaults and merging a config-supplied
//! catalog on top:
//!
//! ```
//! use spendguard_cost::pricing::{RateCard, RateCatalog, copy_rates, merge_rates};
//!
//! let mut rates = copy_rates(RateCatalog::defaults());
//! let mut overlay = RateCatalog::new();
//! overlay.insert("openai", "gpt-4o", RateCard::new(200, 800));
//! merge_rates(&mut rates, &overlay);
//! assert_eq!(rates.get("openai", "gpt-4o").map(|c| c.input_cents_per_1m), Some(200));
//! ```

use std::collections::BTreeMap;
use std::sync::{Arc, LazyLock};

use serde::{Deserialize, Serialize};
use spendguard_core::SpendguardError;
use tracing::debug;

/// Pricing for a single provider/model pair.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RateCard {
    /// Base rate for input tokens.
    pub input_cents_per_1m: i64,
    /// Base rate for output tokens.
    pub output_cents_per_1m: i64,

    /// Rate for input tokens served from the provider's prompt cache.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cached_input_cents_per_1m: Option<i64>,
    /// Rate for input tokens that missed the cache, when it differs from the base rate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uncached_input_cents_per_1m: Option<i64>,
    /// Rate for reasoning-only output tokens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning_output_cents_per_1m: Option<i64>,

    /// Rate for input tokens written to an explicit prompt cache.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_write_input_cents_per_1m: Option<i64>,
    /// Rate for input tokens read from an explicit prompt cache.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_read_input_cents_per_1m: Option<i64>,

    /// Flat fee per 1000 grounding/search queries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grounding_cents_per_1k_queries: Option<i64>,

    /// Flat fee per hosted web-search tool invocation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web_search_cents_per_call: Option<i64>,
    /// Flat fee per hosted file-search tool invocation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_search_cents_per_call: Option<i64>,

    /// Input size above which the cliff multipliers apply.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_cliff_threshold_tokens: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_cliff_input_multiplier: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_cliff_output_multiplier: Option<f64>,
}

impl RateCard {
    /// A card with only the two required base rates configured.
    pub const fn new(input_cents_per_1m: i64, output_cents_per_1m: i64) -> Self {
        Self {
            input_cents_per_1m,
            output_cents_per_1m,
            cached_input_cents_per_1m: None,
            uncached_input_cents_per_1m: None,
            reasoning_output_cents_per_1m: None,
            cache_write_input_cents_per_1m: None,
            cache_read_input_cents_per_1m: None,
            grounding_cents_per_1k_queries: None,
            web_search_cents_per_call: None,
            file_search_cents_per_call: None,
            context_cliff_threshold_tokens: None,
            context_cliff_input_multiplier: None,
            context_cliff_output_multiplier: None,
        }
    }

    pub const fn with_cached_input(mut self, cents_per_1m: i64) -> Self {
        self.cached_input_cents_per_1m = Some(cents_per_1m);
        self
    }

    pub const fn with_uncached_input(mut self, cents_per_1m: i64) -> Self {
        self.uncached_input_cents_per_1m = Some(cents_per_1m);
        self
    }

    pub const fn with_reasoning_output(mut self, cents_per_1m: i64) -> Self {
        self.reasoning_output_cents_per_1m = Some(cents_per_1m);
        self
    }

    /// Set both explicit prompt-cache tiers.
    pub const fn with_cache_tiers(mut self, write_cents_per_1m: i64, read_cents_per_1m: i64) -> Self {
        self.cache_write_input_cents_per_1m = Some(write_cents_per_1m);
        self.cache_read_input_cents_per_1m = Some(read_cents_per_1m);
        self
    }

    pub const fn with_grounding(mut self, cents_per_1k_queries: i64) -> Self {
        self.grounding_cents_per_1k_queries = Some(cents_per_1k_queries);
        self
    }

    pub const fn with_web_search(mut self, cents_per_call: i64) -> Self {
        self.web_search_cents_per_call = Some(cents_per_call);
        self
    }

    pub const fn with_file_search(mut self, cents_per_call: i64) -> Self {
        self.file_search_cents_per_call = Some(cents_per_call);
        self
    }

    /// Configure a context-length cliff. Either multiplier may be left unset.
    pub const fn with_context_cliff(
        mut self,
        threshold_tokens: i64,
        input_multiplier: Option<f64>,
        output_multiplier: Option<f64>,
    ) -> Self {
        self.context_cliff_threshold_tokens = Some(threshold_tokens);
        self.context_cliff_input_multiplier = input_multiplier;
        self.context_cliff_output_multiplier = output_multiplier;
        self
    }

    /// The cliff knobs of this card, as reported in a cost breakdown.
    pub fn context_cliff(&self) -> ContextCliff {
        ContextCliff {
            threshold_tokens: self.context_cliff_threshold_tokens,
            input_multiplier: self.context_cliff_input_multiplier,
            output_multiplier: self.context_cliff_output_multiplier,
        }
    }
}

/// Context-cliff configuration of a rate card.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize, Serialize)]
pub struct ContextCliff {
    pub threshold_tokens: Option<i64>,
    pub input_multiplier: Option<f64>,
    pub output_multiplier: Option<f64>,
}

/// Two-level mapping of provider name to model name to rate card.
///
/// Cards are held behind `Arc` so that copies of a catalog share the
/// immutable card values and only duplicate the maps.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct RateCatalog {
    providers: BTreeMap<String, BTreeMap<String, Arc<RateCard>>>,
}

impl RateCatalog {
    /// An empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in, process-wide default catalog.
    pub fn defaults() -> &'static RateCatalog {
        &DEFAULT_RATES
    }

    /// Insert or replace a single card.
    pub fn insert(&mut self, provider: impl Into<String>, model: impl Into<String>, card: RateCard) {
        self.providers
            .entry(provider.into())
            .or_default()
            .insert(model.into(), Arc::new(card));
    }

    pub fn get(&self, provider: &str, model: &str) -> Option<&RateCard> {
        self.providers
            .get(provider)
            .and_then(|models| models.get(model))
            .map(Arc::as_ref)
    }

    /// Like [`get`](Self::get) but distinguishes a missing provider from a missing model.
    pub fn lookup(&self, provider: &str, model: &str) -> Result<&RateCard, SpendguardError> {
        let models = self
            .providers
            .get(provider)
            .ok_or_else(|| SpendguardError::UnknownProvider {
                provider: provider.to_string(),
            })?;
        models
            .get(model)
            .map(Arc::as_ref)
            .ok_or_else(|| SpendguardError::UnknownModel {
                provider: provider.to_string(),
                model: model.to_string(),
            })
    }

    pub fn contains(&self, provider: &str, model: &str) -> bool {
        self.get(provider, model).is_some()
    }

    pub fn providers(&self) -> impl Iterator<Item = &str> {
        self.providers.keys().map(String::as_str)
    }

    /// Models priced for `provider`, in name order. Empty for unknown providers.
    pub fn models<'a>(&'a self, provider: &str) -> impl Iterator<Item = (&'a str, &'a RateCard)> {
        self.providers
            .get(provider)
            .into_iter()
            .flat_map(|models| models.iter().map(|(name, card)| (name.as_str(), card.as_ref())))
    }

    /// Every `(provider, model, card)` entry, ordered by provider then model.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, &RateCard)> {
        self.providers.iter().flat_map(|(provider, models)| {
            models
                .iter()
                .map(move |(model, card)| (provider.as_str(), model.as_str(), card.as_ref()))
        })
    }

    /// Total number of priced models across all providers.
    pub fn len(&self) -> usize {
        self.providers.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A structurally independent copy that shares the card values.
    pub fn copy(&self) -> RateCatalog {
        self.clone()
    }

    /// Overlay `other` onto this catalog; see [`merge_rates`].
    pub fn merge(&mut self, other: &RateCatalog) {
        for (provider, models) in &other.providers {
            let target = self.providers.entry(provider.clone()).or_default();
            for (model, card) in models {
                let replaced = target.insert(model.clone(), Arc::clone(card)).is_some();
                debug!(provider = %provider, model = %model, replaced, "rate card merged");
            }
        }
    }
}

impl FromIterator<(String, String, RateCard)> for RateCatalog {
    fn from_iter<I: IntoIterator<Item = (String, String, RateCard)>>(iter: I) -> Self {
        let mut catalog = RateCatalog::new();
        for (provider, model, card) in iter {
            catalog.insert(provider, model, card);
        }
        catalog
    }
}

/// Return an independent copy of `rates`, safe to merge overlays into.
pub fn copy_rates(rates: &RateCatalog) -> RateCatalog {
    rates.copy()
}

/// Merge `overlay` into `base` in place.
///
/// Every provider in `overlay` is added to `base`; within a provider,
/// same-named models are replaced and new models inserted. Models that exist
/// only in `base` are left untouched. Nothing is ever removed.
pub fn merge_rates(base: &mut RateCatalog, overlay: &RateCatalog) {
    base.merge(overlay);
}

// Conservative defaults; deployments should override these through config.
// Fractional-cent upstream prices are rounded up to whole cents per 1M.
static DEFAULT_RATES: LazyLock<RateCatalog> = LazyLock::new(|| {
    let entries: &[(&str, &str, RateCard)] = &[
        ("openai", "gpt-4o-mini", RateCard::new(30, 120)),
        ("openai", "gpt-4o", RateCard::new(250, 1000)),
        ("openai", "gpt-5.2", RateCard::new(175, 1400).with_cached_input(18)),
        ("openai", "gpt-5.2-chat-latest", RateCard::new(175, 1400).with_cached_input(18)),
        ("openai", "gpt-5.2-codex", RateCard::new(175, 1400).with_cached_input(18)),
        ("openai", "gpt-5.2-pro", RateCard::new(2100, 16800)),
        ("openai", "o3-mini", RateCard::new(110, 440).with_cached_input(55)),
        ("openai", "o3", RateCard::new(200, 800).with_cached_input(50)),
        ("openai", "o3-pro", RateCard::new(2000, 8000)),
        ("openai", "o3-deep-research", RateCard::new(1000, 4000).with_cached_input(250)),
        ("openai", "o1-mini", RateCard::new(110, 440).with_cached_input(55)),
        ("openai", "o1", RateCard::new(1500, 6000).with_cached_input(750)),
        ("gemini", "gemini-3-flash-preview", RateCard::new(50, 200)),
        ("gemini", "gemini-3-pro-preview", RateCard::new(200, 1200).with_cached_input(20)),
        ("gemini", "gemini-1.5-flash", RateCard::new(35, 150)),
        ("anthropic", "claude-opus-4-6", RateCard::new(500, 2500)),
        ("anthropic", "claude-3-5-sonnet-latest", RateCard::new(400, 2000)),
        ("anthropic", "claude-3-5-haiku-latest", RateCard::new(100, 500)),
        ("grok", "grok-3", RateCard::new(300, 1500).with_cached_input(75)),
        ("grok", "grok-3-latest", RateCard::new(300, 1500).with_cached_input(75)),
        ("grok", "grok-3-fast-latest", RateCard::new(300, 1500).with_cached_input(75)),
    ];
    entries
        .iter()
        .map(|(provider, model, card)| (provider.to_string(), model.to_string(), card.clone()))
        .collect()
});

/// Rough token count for a piece of text, biased high.
///
/// Typical English runs about four characters per token; dividing by three
/// over-estimates so pre-call quotes err on the expensive side.
pub fn estimate_tokens_text(text: &str) -> i64 {
    if text.is_empty() {
        return 0;
    }
    let chars = i64::try_from(text.chars().count()).unwrap_or(i64::MAX);
    ((chars.saturating_add(2)) / 3).max(1)
}

/// Whole-cent cost of `tokens` at `cents_per_1m`, rounded up.
pub fn cost_cents(tokens: i64, cents_per_1m: i64) -> i64 {
    if tokens <= 0 || cents_per_1m <= 0 {
        return 0;
    }
    let microcents = i128::from(tokens) * i128::from(cents_per_1m);
    let cents = (microcents - 1) / 1_000_000 + 1;
    i64::try_from(cents).unwrap_or(i64::MAX)
}
