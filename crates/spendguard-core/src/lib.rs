// SPDX-FileCopyrightText: 2026 Spendguard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the spendguard pricing kernel.
//!
//! This crate provides the error type, provider identifiers, and the
//! agent/budget API records shared by every other spendguard crate.

pub mod error;
pub mod schemas;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::SpendguardError;
pub use schemas::{AgentCreateRequest, AgentCreateResponse, BudgetResponse, BudgetSetRequest};
pub use types::Provider;
