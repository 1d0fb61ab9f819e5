// SPDX-FileCopyrightText: 2026 Spendguard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./spendguard.toml` > `~/.config/spendguard/spendguard.toml`
//! > `/etc/spendguard/spendguard.toml`, with environment variable overrides via
//! the `SPENDGUARD_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::SpendguardConfig;

/// Sections reachable from environment variables.
const ENV_SECTIONS: &[&str] = &["logging", "pricing", "limits"];

/// System-wide config file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/spendguard/spendguard.toml";

/// Config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "spendguard.toml";

/// `~/.config/spendguard/spendguard.toml`, when a config dir exists.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("spendguard").join(LOCAL_CONFIG_FILE))
}

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/spendguard/spendguard.toml` (system-wide)
/// 3. `~/.config/spendguard/spendguard.toml` (user XDG config)
/// 4. `./spendguard.toml` (local directory)
/// 5. `SPENDGUARD_*` environment variables
pub fn load_config() -> Result<SpendguardConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no files, no env vars).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<SpendguardConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(SpendguardConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
///
/// Unlike the XDG lookup, a missing file here is an error.
pub fn load_config_from_path(path: &Path) -> Result<SpendguardConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(SpendguardConfig::default()))
        .merge(Toml::file_exact(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading (exposed for diagnostic use).
///
/// Returns the Figment before extraction so callers can inspect metadata.
pub fn build_figment() -> Figment {
    let mut figment = Figment::new()
        .merge(Serialized::defaults(SpendguardConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH));
    if let Some(user) = user_config_path() {
        figment = figment.merge(Toml::file(user));
    }
    figment
        .merge(Toml::file(LOCAL_CONFIG_FILE))
        .merge(env_provider())
}

/// Create the environment variable provider.
///
/// Only the section name is split off: `SPENDGUARD_LIMITS_OPENAI_MAX_OUTPUT_TOKENS`
/// maps to `limits.openai_max_output_tokens`, not `limits.openai.max...`.
fn env_provider() -> Env {
    Env::prefixed("SPENDGUARD_").map(|key| map_env_key(&key.as_str().to_ascii_lowercase()).into())
}

/// Map a lowercased, prefix-stripped env var name to a dotted config key.
pub(crate) fn map_env_key(key: &str) -> String {
    for section in ENV_SECTIONS {
        if let Some(rest) = key
            .strip_prefix(section)
            .and_then(|rest| rest.strip_prefix('_'))
        {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}
