// SPDX-FileCopyrightText: 2026 Spendguard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Request and response records for the agent/budget API.
//!
//! The budget-enforcement layer decrements an agent's balance by the
//! `realized_cents_ceiled` total of a cost breakdown; these are the records it
//! exchanges with callers. Deserialization accepts any integers, semantic
//! checks live in `validate()`.

use serde::{Deserialize, Serialize};

use crate::error::SpendguardError;

/// Request to register a new agent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct AgentCreateRequest {
    /// Optional human-readable label.
    #[serde(default)]
    pub name: Option<String>,
}

/// Response to a successful agent registration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AgentCreateResponse {
    pub agent_id: String,
}

/// Request to set (or top up) an agent's budget.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct BudgetSetRequest {
    /// Hard ceiling in whole cents. Must be positive.
    pub hard_limit_cents: i64,
    /// Amount added to the remaining balance. Must be non-negative.
    #[serde(default)]
    pub topup_cents: i64,
}

impl BudgetSetRequest {
    /// Check the numeric constraints on the request.
    pub fn validate(&self) -> Result<(), SpendguardError> {
        if self.hard_limit_cents <= 0 {
            return Err(SpendguardError::validation(
                "hard_limit_cents",
                format!("must be greater than 0, got {}", self.hard_limit_cents),
            ));
        }
        if self.topup_cents < 0 {
            return Err(SpendguardError::validation(
                "topup_cents",
                format!("must be greater than or equal to 0, got {}", self.topup_cents),
            ));
        }
        Ok(())
    }
}

/// Snapshot of an agent's budget.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct BudgetResponse {
    pub agent_id: String,
    pub hard_limit_cents: i64,
    pub remaining_cents: i64,
    /// Cents reserved by an in-flight run.
    pub locked_cents: i64,
    #[serde(default)]
    pub locked_run_id: Option<String>,
    /// RFC 3339 timestamp at which the lock lapses.
    #[serde(default)]
    pub locked_expires_at: Option<String>,
}
