// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Advisory stronger-model suggestions for demanding requests.
//!
//! Only turns running on a cheap model are considered. Rules are checked in
//! order and the first match wins. The suggestion is never applied
//! automatically; the caller surfaces it and the user decides.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Models cheap enough that an upgrade may be worth suggesting.
pub const CHEAP_MODELS: &[&str] = &[
    "gpt-4.1-nano",
    "gpt-4.1-mini",
    "gpt-4o-mini",
    "groq:mixtral-8x7b-32768",
    "groq:gemma2-9b-it",
    "groq:llama-3.3-70b-versatile",
    "groq:llama-4-scout-17b-16e-instruct",
    "or:google/gemini-3-flash-preview",
    "or:google/gemini-2.5-flash",
    "gemini-2.5-flash",
    "kimi-k2.5",
];

/// A suggested upgrade. All strings are empty when `should_upgrade` is false.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradeSuggestion {
    pub should_upgrade: bool,
    pub suggested_model: String,
    pub suggested_label: String,
    pub reason: String,
    pub estimated_extra_cost: String,
}

struct UpgradeRule {
    pattern: Regex,
    model: &'static str,
    label: &'static str,
    reason: &'static str,
    extra_cost: &'static str,
}

const SONNET: &str = "claude-sonnet-4-5-20250929";

static UPGRADE_RULES: LazyLock<Vec<UpgradeRule>> = LazyLock::new(|| {
    vec![
        // Deep analysis
        UpgradeRule {
            pattern: Regex::new(
                r"(?i)\b(analyze|analysis|compare|evaluate|assess|audit|review in detail|deep dive|comprehensive|thorough)\b.{0,60}\b(strategy|business|market|competitor|architecture|codebase|system|proposal|plan)\b",
            )
            .unwrap(),
            model: "gpt-4.1",
            label: "GPT-4.1",
            reason: "Deep analysis benefits from a stronger reasoning model",
            extra_cost: "~$0.003",
        },
        // Long-form writing
        UpgradeRule {
            pattern: Regex::new(
                r"(?i)\b(write|draft|create|compose)\b.{0,40}\b(proposal|report|document|article|whitepaper|pitch deck|business plan|case study|email campaign)\b",
            )
            .unwrap(),
            model: SONNET,
            label: "Claude Sonnet 4.5",
            reason: "Long-form writing quality is much better with Sonnet",
            extra_cost: "~$0.005",
        },
        // Code generation
        UpgradeRule {
            pattern: Regex::new(
                r"(?i)\b(build|code|implement|develop|create|write)\b.{0,40}\b(app|api|function|component|script|workflow|integration|backend|frontend|database|migration)\b",
            )
            .unwrap(),
            model: "gpt-4.1",
            label: "GPT-4.1",
            reason: "Code generation is significantly better with GPT-4.1",
            extra_cost: "~$0.003",
        },
        // Reasoning and debugging
        UpgradeRule {
            pattern: Regex::new(
                r"(?i)\b(reason|think through|figure out|calculate|solve|debug|diagnose|why is|what went wrong|root cause)\b",
            )
            .unwrap(),
            model: "or:deepseek/deepseek-r1",
            label: "DeepSeek R1",
            reason: "Deep reasoning tasks perform much better with R1",
            extra_cost: "~$0.002",
        },
        // Multi-step planning
        UpgradeRule {
            pattern: Regex::new(
                r"(?i)\b(plan|roadmap|strategy|step.by.step|action plan|project plan|sprint plan|break down|phase)\b.{0,40}\b(for|to|how|building|launching|shipping)\b",
            )
            .unwrap(),
            model: SONNET,
            label: "Claude Sonnet 4.5",
            reason: "Multi-step planning is more reliable with Sonnet",
            extra_cost: "~$0.005",
        },
    ]
});

/// Whether `model` is in the cheap set.
pub fn is_cheap_model(model: &str) -> bool {
    CHEAP_MODELS.contains(&model)
}

/// Suggest a stronger model when a cheap one is handling a demanding request.
pub fn detect_upgrade(user_message: &str, current_model: &str) -> UpgradeSuggestion {
    if !is_cheap_model(current_model) {
        return UpgradeSuggestion::default();
    }

    UPGRADE_RULES
        .iter()
        .find(|rule| rule.pattern.is_match(user_message))
        .map(|rule| UpgradeSuggestion {
            should_upgrade: true,
            suggested_model: rule.model.to_string(),
            suggested_label: rule.label.to_string(),
            reason: rule.reason.to_string(),
            estimated_extra_cost: rule.extra_cost.to_string(),
        })
        .unwrap_or_default()
}
