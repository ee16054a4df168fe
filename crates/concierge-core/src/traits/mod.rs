// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Seams between the policy engine and its external collaborators.
//!
//! Async collaborators use `#[async_trait]` for dynamic dispatch compatibility.

pub mod ledger;
pub mod pricing;
pub mod tool;

pub use ledger::UsageLedger;
pub use pricing::PriceModel;
pub use tool::Tool;
