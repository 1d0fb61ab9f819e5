// SPDX-FileCopyrightText: 2026 Spendguard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! OpenAI Chat Completions and Responses API payloads.
//!
//! The two APIs name their counters differently (`prompt_tokens` versus
//! `input_tokens`); the usage block is accepted in either shape. Grok's API
//! is wire-compatible and reuses this extractor.

use serde::Deserialize;
use serde_json::Value;
use spendguard_core::{Provider, SpendguardError};
use spendguard_cost::{FILE_SEARCH_CALL, UsageRecord, WEB_SEARCH_CALL};
use tracing::debug;

use crate::{UsageExtractor, join_texts, parse_block};

/// Usage block of either OpenAI API.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OpenAiUsage {
    /// `/v1/chat/completions`
    Chat(ChatUsage),
    /// `/v1/responses`
    Responses(ResponsesUsage),
}

/// Chat Completions usage.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatUsage {
    pub prompt_tokens: i64,
    pub completion_tokens: i64,
    #[serde(default)]
    pub prompt_tokens_details: Option<InputTokensDetails>,
    #[serde(default)]
    pub completion_tokens_details: Option<OutputTokensDetails>,
}

/// Responses API usage.
#[derive(Debug, Clone, Deserialize)]
pub struct ResponsesUsage {
    pub input_tokens: i64,
    pub output_tokens: i64,
    #[serde(default)]
    pub input_tokens_details: Option<InputTokensDetails>,
    #[serde(default)]
    pub output_tokens_details: Option<OutputTokensDetails>,
}

/// Breakdown of input tokens; `cached_tokens` is a subset of the input total.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InputTokensDetails {
    #[serde(default)]
    pub cached_tokens: Option<i64>,
}

/// Breakdown of output tokens; `reasoning_tokens` is a subset of the output total.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputTokensDetails {
    #[serde(default)]
    pub reasoning_tokens: Option<i64>,
}

impl From<OpenAiUsage> for UsageRecord {
    fn from(usage: OpenAiUsage) -> Self {
        let (input, output, input_details, output_details) = match usage {
            OpenAiUsage::Chat(u) => (
                u.prompt_tokens,
                u.completion_tokens,
                u.prompt_tokens_details,
                u.completion_tokens_details,
            ),
            OpenAiUsage::Responses(u) => (
                u.input_tokens,
                u.output_tokens,
                u.input_tokens_details,
                u.output_tokens_details,
            ),
        };
        UsageRecord::new(input, output)
            .with_cached_input(input_details.and_then(|d| d.cached_tokens).unwrap_or(0))
            .with_reasoning(output_details.and_then(|d| d.reasoning_tokens).unwrap_or(0))
    }
}

/// Extractor for OpenAI-shaped payloads.
#[derive(Debug, Clone, Copy)]
pub struct OpenAiExtractor {
    provider: Provider,
}

impl OpenAiExtractor {
    /// An extractor that reports errors under `provider`'s name.
    pub const fn new(provider: Provider) -> Self {
        Self { provider }
    }
}

impl UsageExtractor for OpenAiExtractor {
    fn provider(&self) -> Provider {
        self.provider
    }

    fn extract_usage(&self, body: &Value) -> Result<UsageRecord, SpendguardError> {
        let usage: OpenAiUsage = parse_block(self.provider, body, "usage")?;
        let mut record = UsageRecord::from(usage);
        for tool in [WEB_SEARCH_CALL, FILE_SEARCH_CALL] {
            let calls = count_output_items(body, tool);
            if calls > 0 {
                record = record.with_tool_calls(tool, calls);
            }
        }
        debug!(
            provider = %self.provider,
            input_tokens = record.input_tokens,
            output_tokens = record.output_tokens,
            "openai usage extracted"
        );
        Ok(record)
    }

    fn extract_completion(&self, body: &Value) -> Option<String> {
        chat_completion_text(body).or_else(|| responses_output_text(body))
    }
}

/// Number of Responses API `output[]` items whose `type` is `kind`.
pub fn count_output_items(body: &Value, kind: &str) -> i64 {
    body.get("output")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter(|item| item.get("type").and_then(Value::as_str) == Some(kind))
                .count() as i64
        })
        .unwrap_or(0)
}

/// `choices[0].message.content` of a chat completion.
fn chat_completion_text(body: &Value) -> Option<String> {
    let content = body.pointer("/choices/0/message/content")?.as_str()?;
    join_texts([content])
}

/// `output_text` parts of every `message` item in a Responses API body.
fn responses_output_text(body: &Value) -> Option<String> {
    let items = body.get("output")?.as_array()?;
    join_texts(
        items
            .iter()
            .filter(|item| item.get("type").and_then(Value::as_str) == Some("message"))
            .filter_map(|item| item.get("content").and_then(Value::as_array))
            .flatten()
            .filter(|part| part.get("type").and_then(Value::as_str) == Some("output_text"))
            .filter_map(|part| part.get("text").and_then(Value::as_str)),
    )
}
