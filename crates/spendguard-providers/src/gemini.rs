// SPDX-FileCopyrightText: 2026 Spendguard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gemini `generateContent` payloads.
//!
//! Gemini bills thinking tokens as output but reports them outside
//! `candidatesTokenCount`, so output is the sum of both with the thoughts
//! recorded as reasoning. Grounded responses list the search queries they ran
//! under `groundingMetadata.webSearchQueries`; each query is billable.

use serde::Deserialize;
use serde_json::Value;
use spendguard_core::{Provider, SpendguardError};
use spendguard_cost::UsageRecord;
use tracing::debug;

use crate::{UsageExtractor, parse_block};

/// The `usageMetadata` block.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    #[serde(default)]
    pub prompt_token_count: i64,
    #[serde(default)]
    pub candidates_token_count: i64,
    /// Portion of the prompt served from a context cache.
    #[serde(default)]
    pub cached_content_token_count: i64,
    #[serde(default)]
    pub thoughts_token_count: i64,
}

impl From<UsageMetadata> for UsageRecord {
    fn from(meta: UsageMetadata) -> Self {
        let thoughts = meta.thoughts_token_count.max(0);
        UsageRecord::new(
            meta.prompt_token_count,
            meta.candidates_token_count.max(0).saturating_add(thoughts),
        )
        .with_cached_input(meta.cached_content_token_count)
        .with_reasoning(thoughts)
    }
}

/// Extractor for Gemini `generateContent` responses.
#[derive(Debug, Clone, Copy, Default)]
pub struct GeminiExtractor;

impl UsageExtractor for GeminiExtractor {
    fn provider(&self) -> Provider {
        Provider::Gemini
    }

    fn extract_usage(&self, body: &Value) -> Result<UsageRecord, SpendguardError> {
        let meta: UsageMetadata = parse_block(Provider::Gemini, body, "usageMetadata")?;
        let queries = grounding_query_count(body);
        let record = UsageRecord::from(meta).with_grounding_queries(queries);
        debug!(
            input_tokens = record.input_tokens,
            output_tokens = record.output_tokens,
            grounding_queries = queries,
            "gemini usage extracted"
        );
        Ok(record)
    }

    /// Text parts of the first candidate.
    ///
    /// Empty parts are kept, so the join preserves Gemini's part boundaries.
    fn extract_completion(&self, body: &Value) -> Option<String> {
        let parts = body.pointer("/candidates/0/content/parts")?.as_array()?;
        let texts: Vec<&str> = parts
            .iter()
            .filter_map(|part| part.get("text").and_then(Value::as_str))
            .collect();
        (!texts.is_empty()).then(|| texts.join("\n"))
    }
}

/// Total `webSearchQueries` across every candidate's grounding metadata.
pub fn grounding_query_count(body: &Value) -> i64 {
    body.get("candidates")
        .and_then(Value::as_array)
        .map(|candidates| {
            candidates
                .iter()
                .filter_map(|c| c.pointer("/groundingMetadata/webSearchQueries"))
                .filter_map(Value::as_array)
                .map(|queries| queries.len() as i64)
                .sum()
        })
        .unwrap_or(0)
}
