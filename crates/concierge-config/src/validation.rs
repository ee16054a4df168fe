// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Checks the constraints serde cannot express: non-negative budgets and
//! prices, non-empty tier pools, a mandatory `simple` tier, and known tier
//! names. All errors are collected rather than failing on the first.

use crate::diagnostic::{suggest_key, ConfigError};
use crate::model::{ConciergeConfig, TIER_NAMES};

/// Validate a deserialized configuration for semantic correctness.
pub fn validate_config(config: &ConciergeConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let policy = &config.policy;
    for (key, value) in [
        ("daily_budget_usd", policy.daily_budget_usd),
        ("session_budget_usd", policy.session_budget_usd),
    ] {
        if !(value >= 0.0) {
            errors.push(ConfigError::validation(format!(
                "policy.{key} must be non-negative (0 disables the cap), got {value}"
            )));
        }
    }

    if !policy.tiers.contains_key("simple") {
        errors.push(ConfigError::validation(
            "policy.tiers must define a `simple` tier (used as the budget fallback)",
        ));
    }

    for (tier, models) in &policy.tiers {
        if !TIER_NAMES.contains(&tier.as_str()) {
            errors.push(ConfigError::UnknownTier {
                tier: tier.clone(),
                suggestion: suggest_key(tier, TIER_NAMES),
                valid_tiers: TIER_NAMES.join(", "),
            });
        }
        if models.is_empty() {
            errors.push(ConfigError::validation(format!(
                "policy.tiers.{tier} must list at least one model"
            )));
        }
        if models.iter().any(|m| m.trim().is_empty()) {
            errors.push(ConfigError::validation(format!(
                "policy.tiers.{tier} contains an empty model identifier"
            )));
        }
    }

    if config.retry.base_delay_ms == 0 {
        errors.push(ConfigError::validation(
            "retry.base_delay_ms must be greater than zero",
        ));
    }

    let pricing = &config.pricing;
    let mut prices = vec![
        ("pricing.default_input_per_mtok".to_string(), pricing.default_input_per_mtok),
        ("pricing.default_output_per_mtok".to_string(), pricing.default_output_per_mtok),
    ];
    for (model, price) in &pricing.overrides {
        prices.push((format!("pricing.overrides.{model}.input_per_mtok"), price.input_per_mtok));
        prices.push((format!("pricing.overrides.{model}.output_per_mtok"), price.output_per_mtok));
    }
    for (key, value) in prices {
        if !(value >= 0.0) {
            errors.push(ConfigError::validation(format!(
                "{key} must be non-negative, got {value}"
            )));
        }
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::validation(
            "storage.database_path must not be empty",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ModelPriceConfig;

    fn has_validation(errors: &[ConfigError], needle: &str) -> bool {
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains(needle)))
    }

    #[test]
    fn default_config_validates() {
        assert!(validate_config(&ConciergeConfig::default()).is_ok());
    }

    #[test]
    fn negative_budget_fails_validation() {
        let mut config = ConciergeConfig::default();
        config.policy.session_budget_usd = -1.0;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_validation(&errors, "session_budget_usd"));
    }

    #[test]
    fn nan_budget_fails_validation() {
        let mut config = ConciergeConfig::default();
        config.policy.daily_budget_usd = f64::NAN;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_validation(&errors, "daily_budget_usd"));
    }

    #[test]
    fn missing_simple_tier_fails_validation() {
        let mut config = ConciergeConfig::default();
        config.policy.tiers.remove("simple");
        let errors = validate_config(&config).unwrap_err();
        assert!(has_validation(&errors, "`simple` tier"));
    }

    #[test]
    fn empty_tier_pool_fails_validation() {
        let mut config = ConciergeConfig::default();
        config.policy.tiers.insert("complex".into(), vec![]);
        let errors = validate_config(&config).unwrap_err();
        assert!(has_validation(&errors, "policy.tiers.complex"));
    }

    #[test]
    fn unknown_tier_name_is_reported_with_suggestion() {
        let mut config = ConciergeConfig::default();
        config
            .policy
            .tiers
            .insert("moderat".into(), vec!["gpt-4.1-mini".into()]);
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(|e| matches!(
            e,
            ConfigError::UnknownTier { tier, suggestion, .. }
                if tier == "moderat" && suggestion.as_deref() == Some("moderate")
        )));
    }

    #[test]
    fn zero_retry_delay_fails_validation() {
        let mut config = ConciergeConfig::default();
        config.retry.base_delay_ms = 0;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_validation(&errors, "base_delay_ms"));
    }

    #[test]
    fn negative_price_override_fails_validation() {
        let mut config = ConciergeConfig::default();
        config.pricing.overrides.insert(
            "local".into(),
            ModelPriceConfig {
                input_per_mtok: -0.5,
                output_per_mtok: 1.0,
            },
        );
        let errors = validate_config(&config).unwrap_err();
        assert!(has_validation(&errors, "pricing.overrides.local.input_per_mtok"));
    }

    #[test]
    fn collects_every_error() {
        let mut config = ConciergeConfig::default();
        config.policy.daily_budget_usd = -1.0;
        config.storage.database_path = " ".into();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
    }
}
