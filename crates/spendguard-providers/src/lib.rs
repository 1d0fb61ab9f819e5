// SPDX-FileCopyrightText: 2026 Spendguard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider response parsing for spendguard.
//!
//! Each module turns one provider's JSON response body into a
//! [`UsageRecord`](spendguard_cost::UsageRecord) the cost engine can price,
//! and pulls out the completion text. Nothing here talks to the network;
//! callers hand over the body they already received.
//!
//! ```
//! use serde_json::json;
//! use spendguard_core::Provider;
//! use spendguard_providers::extractor_for;
//!
//! let body = json!({"usage": {"prompt_tokens": 12, "completion_tokens": 34}});
//! let usage = extractor_for(Provider::OpenAi).extract_usage(&body).unwrap();
//! assert_eq!((usage.input_tokens, usage.output_tokens), (12, 34));
//! ```

pub mod anthropic;
pub mod gemini;
pub mod openai;

use serde::de::DeserializeOwned;
use serde_json::Value;
use spendguard_core::{Provider, SpendguardError};
use spendguard_cost::UsageRecord;

pub use anthropic::AnthropicExtractor;
pub use gemini::GeminiExtractor;
pub use openai::OpenAiExtractor;

/// Parses a provider's response body.
pub trait UsageExtractor: Send + Sync {
    /// The provider whose payloads this extractor understands.
    fn provider(&self) -> Provider;

    /// Usage counters from a complete (non-streaming) response body.
    ///
    /// Fails when the body has no usage block or the block is malformed.
    fn extract_usage(&self, body: &Value) -> Result<UsageRecord, SpendguardError>;

    /// Completion text, text blocks joined by `\n`. `None` when the response
    /// carries no text.
    fn extract_completion(&self, body: &Value) -> Option<String>;
}

static OPENAI: OpenAiExtractor = OpenAiExtractor::new(Provider::OpenAi);
static GROK: OpenAiExtractor = OpenAiExtractor::new(Provider::Grok);
static ANTHROPIC: AnthropicExtractor = AnthropicExtractor;
static GEMINI: GeminiExtractor = GeminiExtractor;

/// The extractor for `provider`. Grok speaks the OpenAI wire format.
pub fn extractor_for(provider: Provider) -> &'static dyn UsageExtractor {
    match provider {
        Provider::OpenAi => &OPENAI,
        Provider::Grok => &GROK,
        Provider::Anthropic => &ANTHROPIC,
        Provider::Gemini => &GEMINI,
    }
}

/// Apply a provider-side ceiling to a requested output-token limit.
///
/// Budget-derived limits can exceed what a model accepts. A `cap` of zero or
/// less disables the ceiling.
pub fn clamp_max_tokens(requested: i64, cap: i64) -> i64 {
    if cap <= 0 { requested } else { requested.min(cap) }
}

/// Deserialize the `usage`-style block at `key` into `T`.
pub(crate) fn parse_block<T: DeserializeOwned>(
    provider: Provider,
    body: &Value,
    key: &str,
) -> Result<T, SpendguardError> {
    let block = body.get(key).filter(|v| v.is_object()).ok_or_else(|| {
        SpendguardError::invalid_payload(provider.as_str(), format!("missing `{key}` object"))
    })?;
    T::deserialize(block).map_err(|e| SpendguardError::InvalidPayload {
        provider: provider.as_str().to_string(),
        message: format!("malformed `{key}` object: {e}"),
        source: Some(Box::new(e)),
    })
}

/// Join non-empty text fragments with newlines, `None` if there are none.
pub(crate) fn join_texts<'a>(texts: impl IntoIterator<Item = &'a str>) -> Option<String> {
    let texts: Vec<&str> = texts.into_iter().filter(|t| !t.is_empty()).collect();
    if texts.is_empty() {
        None
    } else {
        Some(texts.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_respects_positive_cap() {
        assert_eq!(clamp_max_tokens(50_000, 16_384), 16_384);
        assert_eq!(clamp_max_tokens(1_000, 16_384), 1_000);
    }

    #[test]
    fn non_positive_cap_disables_clamp() {
        assert_eq!(clamp_max_tokens(50_000, 0), 50_000);
        assert_eq!(clamp_max_tokens(50_000, -1), 50_000);
    }

    #[test]
    fn extractor_for_maps_grok_to_openai_shape() {
        assert_eq!(extractor_for(Provider::Grok).provider(), Provider::Grok);
        assert_eq!(extractor_for(Provider::OpenAi).provider(), Provider::OpenAi);
        assert_eq!(extractor_for(Provider::Gemini).provider(), Provider::Gemini);
        assert_eq!(extractor_for(Provider::Anthropic).provider(), Provider::Anthropic);
    }

    #[test]
    fn join_texts_skips_empty_fragments() {
        assert_eq!(join_texts(["a", "", "b"]), Some("a\nb".to_string()));
        assert_eq!(join_texts(["", ""]), None);
    }
}
