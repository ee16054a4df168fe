// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Model routing for the Concierge policy engine.
//!
//! Classifies message complexity with zero-cost heuristics, selects the
//! cheapest model of the resolved tier under daily and session budget caps,
//! and suggests stronger models for demanding requests on cheap ones.

pub mod classifier;
pub mod policy;
pub mod upgrade;

pub use classifier::{classify, ClassificationResult, Complexity};
pub use policy::{CostPolicyEngine, PolicyDecision, PolicyRequest, PolicyTier};
pub use upgrade::{detect_upgrade, UpgradeSuggestion};
