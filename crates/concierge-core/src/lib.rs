// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Concierge policy engine.
//!
//! This crate provides the error type, the plain data types exchanged by the
//! policy components, and the traits for the external collaborators the
//! engine depends on: the usage ledger, the pricing table, and agent tools.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::ConciergeError;
pub use traits::{PriceModel, Tool, UsageLedger};
pub use types::{
    ModelUsage, Provider, SessionId, TokenUsage, ToolCall, ToolOutput, UsageRecord,
    UsageSnapshot,
};
