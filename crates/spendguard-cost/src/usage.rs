// SPDX-FileCopyrightText: 2026 Spendguard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-call usage counters and their normalization.
//!
//! Provider responses are not trusted: counts may be negative, or a category
//! (cached, cache-write, reasoning, ...) may claim more tokens than the total
//! it belongs to. [`UsageRecord::normalized`] clamps every count to a
//! conservative ceiling so a malformed payload can never bill more than the
//! raw input/output totals justify.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Tool-call key for hosted web search invocations.
pub const WEB_SEARCH_CALL: &str = "web_search_call";
/// Tool-call key for hosted file search invocations.
pub const FILE_SEARCH_CALL: &str = "file_search_call";

/// Raw usage counters for a single LLM call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct UsageRecord {
    pub input_tokens: i64,
    pub output_tokens: i64,
    /// Input tokens served from the provider's implicit prompt cache.
    #[serde(default)]
    pub cached_input_tokens: i64,
    /// Output tokens spent on hidden reasoning (a subset of `output_tokens`).
    #[serde(default)]
    pub reasoning_tokens: i64,
    /// Input tokens written to an explicit prompt cache.
    #[serde(default)]
    pub cache_write_input_tokens: i64,
    /// Input tokens read from an explicit prompt cache.
    #[serde(default)]
    pub cache_read_input_tokens: i64,
    #[serde(default)]
    pub grounding_queries: i64,
    /// Tool name to invocation count.
    #[serde(default)]
    pub tool_calls: BTreeMap<String, i64>,
}

impl UsageRecord {
    /// A record with only input and output counts.
    pub fn new(input_tokens: i64, output_tokens: i64) -> Self {
        Self {
            input_tokens,
            output_tokens,
            ..Self::default()
        }
    }

    pub fn with_cached_input(mut self, tokens: i64) -> Self {
        self.cached_input_tokens = tokens;
        self
    }

    pub fn with_reasoning(mut self, tokens: i64) -> Self {
        self.reasoning_tokens = tokens;
        self
    }

    pub fn with_cache_write(mut self, tokens: i64) -> Self {
        self.cache_write_input_tokens = tokens;
        self
    }

    pub fn with_cache_read(mut self, tokens: i64) -> Self {
        self.cache_read_input_tokens = tokens;
        self
    }

    pub fn with_grounding_queries(mut self, queries: i64) -> Self {
        self.grounding_queries = queries;
        self
    }

    /// Add `count` invocations of `tool` to the tool-call map.
    pub fn with_tool_calls(mut self, tool: impl Into<String>, count: i64) -> Self {
        let entry = self.tool_calls.entry(tool.into()).or_insert(0);
        *entry = entry.saturating_add(count);
        self
    }

    /// Invocation count for `tool`, zero when absent.
    pub fn tool_call_count(&self, tool: &str) -> i64 {
        self.tool_calls.get(tool).copied().unwrap_or(0)
    }

    /// Apply the clamping policy, in order:
    ///
    /// 1. negative counts become zero;
    /// 2. `cached_input_tokens` is capped at `input_tokens`;
    /// 3. `cache_write_input_tokens` is capped at `input_tokens`, then
    ///    `cache_read_input_tokens` at what remains after the writes;
    /// 4. `reasoning_tokens` is capped at `output_tokens`.
    ///
    /// The result is a fixed point: normalizing it again changes nothing.
    pub fn normalized(&self) -> UsageRecord {
        let input_tokens = self.input_tokens.max(0);
        let output_tokens = self.output_tokens.max(0);
        let cache_write_input_tokens = self.cache_write_input_tokens.clamp(0, input_tokens);

        UsageRecord {
            input_tokens,
            output_tokens,
            cached_input_tokens: self.cached_input_tokens.clamp(0, input_tokens),
            reasoning_tokens: self.reasoning_tokens.clamp(0, output_tokens),
            cache_write_input_tokens,
            cache_read_input_tokens: self
                .cache_read_input_tokens
                .clamp(0, input_tokens - cache_write_input_tokens),
            grounding_queries: self.grounding_queries.max(0),
            tool_calls: self
                .tool_calls
                .iter()
                .map(|(tool, count)| (tool.clone(), (*count).max(0)))
                .collect(),
        }
    }
}
