// SPDX-FileCopyrightText: 2026 Spendguard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the spendguard workspace.

use thiserror::Error;

/// The primary error type used across the spendguard crates.
///
/// The cost engine itself is infallible; these errors come from the layers
/// around it (catalog lookup, provider payload parsing, schema validation).
#[derive(Debug, Error)]
pub enum SpendguardError {
    /// The rate catalog has no entry for this provider.
    #[error("unknown provider `{provider}`")]
    UnknownProvider { provider: String },

    /// The provider exists in the rate catalog but this model does not.
    #[error("unknown model `{model}` for provider `{provider}`")]
    UnknownModel { provider: String, model: String },

    /// A provider response body could not be interpreted.
    #[error("invalid {provider} payload: {message}")]
    InvalidPayload {
        provider: String,
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A request record failed semantic validation.
    #[error("validation error: {field}: {message}")]
    Validation { field: String, message: String },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl SpendguardError {
    /// Shorthand for a payload error without an underlying cause.
    pub fn invalid_payload(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidPayload {
            provider: provider.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Shorthand for a field validation error.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }
}
