// SPDX-FileCopyrightText: 2026 Spendguard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reading command input from files or stdin.

use std::io::Read;
use std::path::Path;

use serde::de::DeserializeOwned;
use spendguard_core::SpendguardError;

/// Read `path` to a string; `-` reads stdin.
pub fn read_input(path: &Path) -> Result<String, SpendguardError> {
    if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| SpendguardError::Internal(format!("failed to read stdin: {e}")))?;
        return Ok(buf);
    }
    std::fs::read_to_string(path).map_err(|e| {
        SpendguardError::Internal(format!("failed to read {}: {e}", path.display()))
    })
}

/// Read and parse a JSON document from `path`.
///
/// `what` names the document in error messages, e.g. `"openai response"`.
pub fn read_json<T: DeserializeOwned>(path: &Path, what: &str) -> Result<T, SpendguardError> {
    let raw = read_input(path)?;
    serde_json::from_str(&raw).map_err(|e| SpendguardError::Validation {
        field: what.to_string(),
        message: format!("invalid JSON: {e}"),
    })
}
