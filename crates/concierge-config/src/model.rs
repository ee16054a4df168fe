// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Concierge policy engine.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages. The loaded
//! value is immutable for the process lifetime and handed to each component
//! by reference.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Tier names the cost policy understands, in escalation order.
pub const TIER_NAMES: &[&str] = &["simple", "moderate", "complex", "tool_call", "critical"];

/// Top-level Concierge configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ConciergeConfig {
    /// Agent identity and logging.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Cost policy: budgets, token estimates, and per-tier model pools.
    #[serde(default)]
    pub policy: PolicyConfig,

    /// Tool retry behavior.
    #[serde(default)]
    pub retry: RetryConfig,

    /// Pricing fallbacks and per-model overrides.
    #[serde(default)]
    pub pricing: PricingConfig,

    /// Usage ledger storage.
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Agent identity and behavior configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Display name of the agent.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Model used when the user has not picked one.
    #[serde(default = "default_model")]
    pub default_model: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
            default_model: default_model(),
        }
    }
}

fn default_agent_name() -> String {
    "concierge".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_model() -> String {
    "or:google/gemini-3-flash-preview".to_string()
}

/// Cost policy configuration.
///
/// Budgets of `0.0` mean "no cap". Token estimates are a static proxy used
/// to compare candidate models, not the real size of any request.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PolicyConfig {
    /// When false, the requested model is always used unchanged.
    #[serde(default = "default_policy_enabled")]
    pub enabled: bool,

    /// Daily spending cap in USD (0 = no cap).
    #[serde(default)]
    pub daily_budget_usd: f64,

    /// Per-session spending cap in USD (0 = no cap).
    #[serde(default)]
    pub session_budget_usd: f64,

    /// Input tokens assumed when estimating a candidate's cost.
    #[serde(default = "default_estimated_input_tokens")]
    pub estimated_input_tokens: u32,

    /// Output tokens assumed when estimating a candidate's cost.
    #[serde(default = "default_estimated_output_tokens")]
    pub estimated_output_tokens: u32,

    /// Ordered candidate models per tier. Must contain `simple`.
    #[serde(default = "default_tiers")]
    pub tiers: BTreeMap<String, Vec<String>>,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            enabled: default_policy_enabled(),
            daily_budget_usd: 0.0,
            session_budget_usd: 0.0,
            estimated_input_tokens: default_estimated_input_tokens(),
            estimated_output_tokens: default_estimated_output_tokens(),
            tiers: default_tiers(),
        }
    }
}

impl PolicyConfig {
    /// Candidate pool for a tier, if configured.
    pub fn tier(&self, name: &str) -> Option<&[String]> {
        self.tiers.get(name).map(Vec::as_slice)
    }
}

fn default_policy_enabled() -> bool {
    true
}

fn default_estimated_input_tokens() -> u32 {
    900
}

fn default_estimated_output_tokens() -> u32 {
    500
}

fn default_tiers() -> BTreeMap<String, Vec<String>> {
    let tier = |models: &[&str]| models.iter().map(|m| m.to_string()).collect::<Vec<_>>();
    BTreeMap::from([
        (
            "simple".to_string(),
            tier(&["or:google/gemini-3-flash-preview", "gpt-4.1-nano", "gpt-4o-mini"]),
        ),
        (
            "moderate".to_string(),
            tier(&["gpt-4.1-mini", "or:deepseek/deepseek-v3.2"]),
        ),
        (
            "complex".to_string(),
            tier(&["kimi-k2.5", "gpt-4.1", "claude-sonnet-4-5-20250929"]),
        ),
        (
            "tool_call".to_string(),
            tier(&["gpt-4.1-mini", "gpt-4o-mini"]),
        ),
        (
            "critical".to_string(),
            tier(&["claude-sonnet-4-5-20250929", "gpt-4.1"]),
        ),
    ])
}

/// Tool retry configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RetryConfig {
    /// Retries after the first attempt (total attempts = max_retries + 1).
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Linear backoff unit; retry `n` waits `n * base_delay_ms`.
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            base_delay_ms: default_base_delay_ms(),
        }
    }
}

fn default_max_retries() -> u32 {
    2
}

fn default_base_delay_ms() -> u64 {
    500
}

/// Pricing configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PricingConfig {
    /// USD per million input tokens for models with no table entry.
    #[serde(default = "default_input_per_mtok")]
    pub default_input_per_mtok: f64,

    /// USD per million output tokens for models with no table entry.
    #[serde(default = "default_output_per_mtok")]
    pub default_output_per_mtok: f64,

    /// Extra or replacement entries keyed by model-id substring.
    #[serde(default)]
    pub overrides: BTreeMap<String, ModelPriceConfig>,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            default_input_per_mtok: default_input_per_mtok(),
            default_output_per_mtok: default_output_per_mtok(),
            overrides: BTreeMap::new(),
        }
    }
}

fn default_input_per_mtok() -> f64 {
    1.0
}

fn default_output_per_mtok() -> f64 {
    4.0
}

/// A single pricing override.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ModelPriceConfig {
    pub input_per_mtok: f64,
    pub output_per_mtok: f64,
}

/// Usage ledger storage configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite usage ledger.
    #[serde(default = "default_database_path")]
    pub database_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("concierge").join("usage.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("usage.db"))
        .to_string_lossy()
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_tiers_cover_every_tier_name() {
        let policy = PolicyConfig::default();
        for name in TIER_NAMES {
            let pool = policy.tier(name).expect("tier should have a default pool");
            assert!(!pool.is_empty(), "{name} pool should not be empty");
        }
    }

    #[test]
    fn budgets_default_to_no_cap() {
        let policy = PolicyConfig::default();
        assert_eq!(policy.daily_budget_usd, 0.0);
        assert_eq!(policy.session_budget_usd, 0.0);
        assert!(policy.enabled);
    }

    #[test]
    fn integer_budget_deserializes_as_float() {
        let config: ConciergeConfig = toml::from_str("[policy]\ndaily_budget_usd = 5\n").unwrap();
        assert!((config.policy.daily_budget_usd - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn pricing_overrides_deserialize() {
        let toml_str = r#"
[pricing.overrides."my-local-model"]
input_per_mtok = 0.0
output_per_mtok = 0.0
"#;
        let config: ConciergeConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(
            config.pricing.overrides.get("my-local-model"),
            Some(&ModelPriceConfig {
                input_per_mtok: 0.0,
                output_per_mtok: 0.0,
            })
        );
    }
}
