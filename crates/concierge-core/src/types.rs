// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared between the policy components and their collaborators.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Unique identifier for a conversation session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Token counts reported by a model invocation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl TokenUsage {
    pub fn new(input_tokens: u32, output_tokens: u32) -> Self {
        Self {
            input_tokens,
            output_tokens,
        }
    }

    pub fn total(&self) -> u64 {
        u64::from(self.input_tokens) + u64::from(self.output_tokens)
    }
}

/// Upstream model vendor, inferred from the model identifier.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    OpenAi,
    Anthropic,
    Perplexity,
    Google,
    OpenRouter,
    Moonshot,
    Groq,
}

impl Provider {
    /// Infer the provider from a model identifier's prefix.
    ///
    /// Unknown identifiers are attributed to OpenAI.
    pub fn for_model(model: &str) -> Self {
        if model.starts_with("or:") {
            Provider::OpenRouter
        } else if model.starts_with("groq:") {
            Provider::Groq
        } else if model.starts_with("claude-") {
            Provider::Anthropic
        } else if model.starts_with("sonar") {
            Provider::Perplexity
        } else if model.starts_with("gemini-") {
            Provider::Google
        } else if model.starts_with("kimi-") {
            Provider::Moonshot
        } else {
            Provider::OpenAi
        }
    }
}

/// Per-model request and spend aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelUsage {
    pub model: String,
    pub requests: u64,
    pub cost: f64,
    pub tokens: u64,
}

/// Point-in-time view of spend, read by the cost policy before each turn.
///
/// This is a snapshot: concurrent turns may each observe the same totals
/// before either records its own usage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageSnapshot {
    pub cost_today: f64,
    pub session_cost: f64,
    /// Ordered by cost, most expensive first.
    pub model_breakdown: Vec<ModelUsage>,
}

/// One row of the usage ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageRecord {
    /// Unique record identifier (UUID v4).
    pub id: String,
    pub session_id: String,
    pub model: String,
    pub provider: Provider,
    pub input_tokens: u32,
    pub output_tokens: u32,
    /// Actual cost in USD.
    pub cost_usd: f64,
    pub success: bool,
    /// Comma-joined names of the tools the turn invoked.
    pub tool_used: Option<String>,
    /// Reason reported by the cost policy for the model choice.
    pub routing_reason: Option<String>,
    /// Cost the policy estimated before the call.
    pub estimated_cost: Option<f64>,
    /// RFC 3339 UTC timestamp with millisecond precision.
    pub created_at: String,
}

/// A tool call requested by the agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub name: String,
    #[serde(default)]
    pub arguments: serde_json::Value,
}

impl ToolCall {
    pub fn new(name: impl Into<String>, arguments: serde_json::Value) -> Self {
        Self {
            name: name.into(),
            arguments,
        }
    }
}

/// Output from a tool invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolOutput {
    /// The content returned by the tool (text output, JSON, etc.).
    pub content: String,
    /// Whether the tool reported an application-level error.
    pub is_error: bool,
}

impl ToolOutput {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            is_error: false,
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            is_error: true,
        }
    }
}
