// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-turn policy pipeline for the Concierge agent.
//!
//! The [`TurnPipeline`] wires the policy components in the order a turn
//! needs them:
//! - Reads a usage snapshot and selects the model under the cost policy
//! - Scores confidence and builds the guidance line for the agent context
//! - Surfaces an advisory upgrade suggestion
//! - Gates requested tools and runs the approved ones with bounded retry
//! - Prices actual usage and appends it to the ledger

pub mod pipeline;
pub mod registry;

pub use pipeline::{ToolExecution, ToolResult, TurnPipeline, TurnPlan, TurnRequest, UsageReport};
pub use registry::ToolRegistry;
