// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Concierge integration tests.
//!
//! Provides in-memory collaborators for fast, deterministic tests without a
//! database or real tools.
//!
//! # Components
//!
//! - [`MockLedger`] - In-memory usage ledger with preset spend and read failures
//! - [`FlakyTool`] - Tool that fails a configured number of times before succeeding
//! - [`EchoTool`] - Tool that echoes its `message` argument

pub mod mock_ledger;
pub mod mock_tools;

pub use mock_ledger::MockLedger;
pub use mock_tools::{EchoTool, FlakyTool};
