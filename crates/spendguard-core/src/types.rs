// SPDX-FileCopyrightText: 2026 Spendguard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared across the spendguard crates.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Upstream LLM providers whose response payloads spendguard understands.
///
/// The rate catalog itself is keyed by plain strings so operators can add
/// providers through config; this enum only covers providers with a known
/// response shape.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumString,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    OpenAi,
    Anthropic,
    Gemini,
    Grok,
}

impl Provider {
    /// Catalog key for this provider.
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::OpenAi => "openai",
            Provider::Anthropic => "anthropic",
            Provider::Gemini => "gemini",
            Provider::Grok => "grok",
        }
    }
}
