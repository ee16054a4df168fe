// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pre-action guards for the Concierge policy engine.
//!
//! - **Confidence**: heuristic rating of how safely the agent can act
//!   without asking, turned into a guidance line for the agent context
//! - **Approval**: blocks sensitive tools the user has not approved
//!
//! Both are pure, offline, and deterministic.

pub mod approval;
pub mod confidence;

pub use approval::{evaluate_approval, is_sensitive_tool, ApprovalDecision};
pub use confidence::{confidence_context, score_confidence, ConfidenceLevel, ConfidenceScore};
