// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tool trait for externally implemented agent tools.

use async_trait::async_trait;

use crate::error::ConciergeError;
use crate::types::ToolOutput;

/// An agent tool (email, calendar, search, workflow trigger, ...).
///
/// The policy engine never looks inside a tool; it gates tools by name and
/// wraps `invoke` in bounded retry. Failure messages matter: the retry wrapper
/// decides transient vs permanent from the error text.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Returns the tool's unique name (used for lookup and approval gating).
    fn name(&self) -> &str;

    /// Returns a human-readable description of what the tool does.
    fn description(&self) -> &str;

    /// Invokes the tool with the given JSON arguments.
    async fn invoke(&self, arguments: serde_json::Value) -> Result<ToolOutput, ConciergeError>;
}
