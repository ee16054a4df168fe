// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Sensitive-tool approval gate.
//!
//! A tool is sensitive when its name starts with one of the prefixes below.
//! Sensitive tools run only when the user approved that exact name.

use serde::{Deserialize, Serialize};
use tracing::info;

/// Name prefixes of tools with outward or destructive side effects.
pub const SENSITIVE_TOOL_PREFIXES: &[&str] = &[
    "send_email",
    "post_",
    "publish_",
    "delete_",
    "archive_",
    "remove_",
    "execute_",
];

/// Outcome of gating a turn's requested tools.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalDecision {
    pub approved: bool,
    /// Blocked tool names, in request order.
    pub blocked_tools: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

pub fn is_sensitive_tool(tool_name: &str) -> bool {
    SENSITIVE_TOOL_PREFIXES
        .iter()
        .any(|prefix| tool_name.starts_with(prefix))
}

/// Block every sensitive tool in `requested` whose name is not in `approved`.
pub fn evaluate_approval<S: AsRef<str>>(requested: &[S], approved: &[S]) -> ApprovalDecision {
    let mut blocked_tools = Vec::new();
    for name in requested {
        let name: &str = name.as_ref();
        if is_sensitive_tool(name) && !approved.iter().any(|a| a.as_ref() == name) {
            blocked_tools.push(name.to_string());
        }
    }

    if blocked_tools.is_empty() {
        return ApprovalDecision {
            approved: true,
            blocked_tools,
            message: None,
        };
    }

    let message = format!(
        "Approval required for sensitive tools: {}",
        blocked_tools.join(", ")
    );
    info!(blocked = %blocked_tools.join(","), "tool approval required");

    ApprovalDecision {
        approved: false,
        blocked_tools,
        message: Some(message),
    }
}
