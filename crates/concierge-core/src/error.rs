// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Concierge policy engine.

use thiserror::Error;

/// The primary error type used across Concierge traits and core operations.
///
/// Policy evaluation itself never produces one of these: budget exhaustion
/// and approval requirements are reported as values. Errors only come from
/// configuration, persistence, and tool execution.
#[derive(Debug, Error)]
pub enum ConciergeError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Usage ledger errors (database connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A tool invocation failed. The message is what the retry wrapper inspects.
    #[error("tool `{name}` failed: {message}")]
    Tool { name: String, message: String },

    /// Requested tool is not registered.
    #[error("tool not found: {0}")]
    ToolNotFound(String),

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ConciergeError {
    /// Convenience constructor for tool failures.
    pub fn tool(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Tool {
            name: name.into(),
            message: message.into(),
        }
    }
}
