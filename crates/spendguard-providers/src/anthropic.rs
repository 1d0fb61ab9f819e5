// SPDX-FileCopyrightText: 2026 Spendguard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Anthropic Messages API payloads.

use serde::Deserialize;
use serde_json::Value;
use spendguard_core::{Provider, SpendguardError};
use spendguard_cost::UsageRecord;
use tracing::debug;

use crate::{UsageExtractor, join_texts, parse_block};

/// Token usage statistics from the Messages API.
///
/// Anthropic reports cache traffic separately: `input_tokens` counts only the
/// uncached remainder, so the total prompt size is the sum of all three.
#[derive(Debug, Clone, Deserialize)]
pub struct AnthropicUsage {
    pub input_tokens: i64,
    pub output_tokens: i64,
    /// Tokens written to the prompt cache.
    #[serde(default)]
    pub cache_creation_input_tokens: Option<i64>,
    /// Tokens read from the prompt cache.
    #[serde(default)]
    pub cache_read_input_tokens: Option<i64>,
}

impl From<AnthropicUsage> for UsageRecord {
    fn from(usage: AnthropicUsage) -> Self {
        let cache_write = usage.cache_creation_input_tokens.unwrap_or(0).max(0);
        let cache_read = usage.cache_read_input_tokens.unwrap_or(0).max(0);
        let total_input = usage
            .input_tokens
            .max(0)
            .saturating_add(cache_write)
            .saturating_add(cache_read);
        UsageRecord::new(total_input, usage.output_tokens)
            .with_cache_write(cache_write)
            .with_cache_read(cache_read)
    }
}

/// Extractor for Anthropic Messages responses.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnthropicExtractor;

impl UsageExtractor for AnthropicExtractor {
    fn provider(&self) -> Provider {
        Provider::Anthropic
    }

    fn extract_usage(&self, body: &Value) -> Result<UsageRecord, SpendguardError> {
        let usage: AnthropicUsage = parse_block(Provider::Anthropic, body, "usage")?;
        let record = UsageRecord::from(usage);
        debug!(
            input_tokens = record.input_tokens,
            output_tokens = record.output_tokens,
            cache_write_input_tokens = record.cache_write_input_tokens,
            cache_read_input_tokens = record.cache_read_input_tokens,
            "anthropic usage extracted"
        );
        Ok(record)
    }

    /// Text of every `text` content block; `tool_use` and `thinking` blocks are skipped.
    fn extract_completion(&self, body: &Value) -> Option<String> {
        let blocks = body.get("content")?.as_array()?;
        join_texts(
            blocks
                .iter()
                .filter(|block| block.get("type").and_then(Value::as_str) == Some("text"))
                .filter_map(|block| block.get("text").and_then(Value::as_str)),
        )
    }
}
