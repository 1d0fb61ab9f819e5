// SPDX-FileCopyrightText: 2026 Spendguard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Rate values themselves are not checked: zero and negative rates are legal
//! and price as free. What is rejected here are values the cost engine cannot
//! give a meaning to, such as a NaN cliff multiplier.

use crate::diagnostic::ConfigError;
use crate::model::SpendguardConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &SpendguardConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let level = config.logging.level.trim().to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "logging.level `{}` is not one of {}",
                config.logging.level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    for (provider, model, card) in config.pricing.rates.iter() {
        if provider.trim().is_empty() {
            errors.push(ConfigError::Validation {
                message: "pricing.rates provider names must not be empty".to_string(),
            });
        }
        if model.trim().is_empty() {
            errors.push(ConfigError::Validation {
                message: format!("pricing.rates.{provider} model names must not be empty"),
            });
        }

        let table = format!("pricing.rates.{provider}.\"{model}\"");

        if let Some(threshold) = card.context_cliff_threshold_tokens
            && threshold < 0
        {
            errors.push(ConfigError::Validation {
                message: format!(
                    "{table}.context_cliff_threshold_tokens must be non-negative, got {threshold}"
                ),
            });
        }

        let multipliers = [
            ("context_cliff_input_multiplier", card.context_cliff_input_multiplier),
            ("context_cliff_output_multiplier", card.context_cliff_output_multiplier),
        ];
        for (field, multiplier) in multipliers {
            if let Some(m) = multiplier
                && !(m.is_finite() && m > 0.0)
            {
                errors.push(ConfigError::Validation {
                    message: format!("{table}.{field} must be a positive finite number, got {m}"),
                });
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
