// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Heuristic confidence scoring before the agent acts.
//!
//! Starts from a per-tool prior (or 0.7), then adjusts for a missing API key,
//! clear wording, vague or destructive wording, and very short messages.
//! The score is clamped to `[0, 1]` and mapped to a level and a fixed hint.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

const BASE_SCORE: f64 = 0.7;

/// Tools with predictable behavior.
const RELIABLE_TOOLS: &[(&str, f64)] = &[
    ("check_email", 0.9),
    ("check_calendar", 0.9),
    ("manage_task", 0.85),
    ("save_memory", 0.9),
    ("recall_memory", 0.85),
    ("web_search", 0.8),
    ("wikipedia", 0.9),
    ("hacker_news", 0.9),
    ("youtube_analytics", 0.85),
];

/// Tools whose side effects call for caution.
const SENSITIVE_TOOLS: &[(&str, f64)] = &[
    ("send_email", 0.5),
    ("call_user", 0.4),
    ("github", 0.6),
    ("n8n_workflow", 0.5),
    ("mcp_call", 0.4),
];

/// Clear, specific requests.
static CLEAR_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        // Read-only queries
        Regex::new(r"(?i)\b(check|show|list|get|read|how many)\b").unwrap(),
        Regex::new(r"(?i)\b(what|when|where|who)\b.{0,20}\b(my|the|our)\b").unwrap(),
        Regex::new(r"(?i)\b(create|add|make)\b.{0,20}\b(task|todo|note)\b").unwrap(),
    ]
});

/// Vague, destructive, or mass-action requests.
static VAGUE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"(?i)\b(everything|all of|do it all|handle it|figure it out|whatever)\b")
            .unwrap(),
        Regex::new(r"(?i)\b(maybe|probably|not sure|I think|might)\b").unwrap(),
        Regex::new(r"(?i)\b(delete|remove|cancel|undo|revert)\b").unwrap(),
        Regex::new(r"(?i)\b(send to everyone|blast|mass|bulk)\b").unwrap(),
    ]
});

/// Confidence band derived from the score.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
}

impl ConfidenceLevel {
    /// `>= 0.8` is high, `>= 0.5` is medium, anything else is low.
    pub fn from_score(score: f64) -> Self {
        if score >= 0.8 {
            ConfidenceLevel::High
        } else if score >= 0.5 {
            ConfidenceLevel::Medium
        } else {
            ConfidenceLevel::Low
        }
    }

    /// Guidance for the agent at this level.
    pub fn hint(self) -> &'static str {
        match self {
            ConfidenceLevel::High => "You are confident about this request. Act decisively.",
            ConfidenceLevel::Medium => {
                "You are moderately confident. Proceed but briefly mention if you are making assumptions."
            }
            ConfidenceLevel::Low => {
                "You have low confidence about this request. Ask the user to clarify before taking action. Do NOT guess."
            }
        }
    }
}

/// Result of scoring a request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceScore {
    /// Rounded to 6 decimals, then clamped to `[0, 1]`. The level is derived
    /// from this rounded value, so `0.7 + 0.1` scores exactly `0.8` (high).
    pub score: f64,
    pub level: ConfidenceLevel,
    /// Applied adjustments, joined with `", "`.
    pub reason: String,
    pub hint: String,
}

impl ConfidenceScore {
    /// Guidance line merged into the agent's operating context.
    pub fn context_line(&self) -> String {
        format!("\nConfidence: {}. {}", self.level, self.hint)
    }
}

fn prior(table: &[(&str, f64)], tool: &str) -> Option<f64> {
    table
        .iter()
        .find(|(name, _)| *name == tool)
        .map(|(_, score)| *score)
}

/// Rate how safely the agent can act on `user_message` without asking.
///
/// `has_api_key` of `None` means unknown and applies no penalty.
pub fn score_confidence(
    user_message: &str,
    tool_name: Option<&str>,
    has_api_key: Option<bool>,
) -> ConfidenceScore {
    let mut score = BASE_SCORE;
    let mut reasons: Vec<String> = Vec::new();

    if let Some(tool) = tool_name {
        if let Some(p) = prior(RELIABLE_TOOLS, tool) {
            score = p;
            reasons.push(format!("{tool} is reliable"));
        } else if let Some(p) = prior(SENSITIVE_TOOLS, tool) {
            score = p;
            reasons.push(format!("{tool} needs caution"));
        }
    }

    if has_api_key == Some(false) {
        score *= 0.3;
        reasons.push("API key missing".into());
    }

    if CLEAR_PATTERNS.iter().any(|p| p.is_match(user_message)) {
        score = (score + 0.1).min(1.0);
        reasons.push("clear request".into());
    }
    if VAGUE_PATTERNS.iter().any(|p| p.is_match(user_message)) {
        score = (score - 0.2).max(0.1);
        reasons.push("vague/risky request".into());
    }

    if user_message.trim().chars().count() < 10 {
        score = (score - 0.1).max(0.3);
        reasons.push("very short message".into());
    }

    // Rounded so 0.7 + 0.1 lands on the 0.8 threshold.
    let score = ((score * 1e6).round() / 1e6).clamp(0.0, 1.0);
    let level = ConfidenceLevel::from_score(score);

    ConfidenceScore {
        score,
        level,
        reason: reasons.join(", "),
        hint: level.hint().to_string(),
    }
}

/// One-line guidance to merge into the agent's operating context.
pub fn confidence_context(user_message: &str) -> String {
    score_confidence(user_message, None, None).context_line()
}
