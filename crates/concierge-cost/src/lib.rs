// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Spend tracking, budget caps, and pricing for the Concierge policy engine.
//!
//! This crate provides:
//! - **Usage ledger**: SQLite record of every model invocation with its cost
//! - **Budget caps**: daily and per-session limits with 80% warnings
//! - **Pricing**: substring-keyed per-model price table with config overrides

pub mod budget;
pub mod ledger;
pub mod pricing;

pub use budget::{BudgetCaps, BudgetStatus};
pub use ledger::{new_record, SqliteUsageLedger, UsageEntry};
pub use pricing::{ModelPricing, PricingTable};
