// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./concierge.toml` > `~/.config/concierge/concierge.toml`
//! > `/etc/concierge/concierge.toml` with environment variable overrides via
//! the `CONCIERGE_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::ConciergeConfig;

/// System-wide config file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/concierge/concierge.toml";

/// Config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "concierge.toml";

/// User config file under the XDG config directory, if one can be resolved.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("concierge").join("concierge.toml"))
}

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/concierge/concierge.toml`
/// 3. `~/.config/concierge/concierge.toml`
/// 4. `./concierge.toml`
/// 5. `CONCIERGE_*` environment variables
pub fn load_config() -> Result<ConciergeConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no files, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<ConciergeConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ConciergeConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<ConciergeConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ConciergeConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used for hierarchy loading, before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(ConciergeConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG_FILE))
        .merge(env_provider())
}

/// Environment provider mapping `CONCIERGE_<SECTION>_<KEY>` to `section.key`.
///
/// Uses `Env::map()` rather than `Env::split("_")` because keys themselves
/// contain underscores: `CONCIERGE_POLICY_DAILY_BUDGET_USD` must become
/// `policy.daily_budget_usd`. Tier pools nest one level deeper, so
/// `CONCIERGE_POLICY_TIERS_TOOL_CALL` becomes `policy.tiers.tool_call`.
fn env_provider() -> Env {
    Env::prefixed("CONCIERGE_").map(|key| map_env_key(key.as_str()).into())
}

fn map_env_key(key: &str) -> String {
    key.replacen("agent_", "agent.", 1)
        .replacen("policy_", "policy.", 1)
        .replacen("policy.tiers_", "policy.tiers.", 1)
        .replacen("retry_", "retry.", 1)
        .replacen("pricing_", "pricing.", 1)
        .replacen("storage_", "storage.", 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_keys_map_to_sections() {
        assert_eq!(map_env_key("agent_log_level"), "agent.log_level");
        assert_eq!(map_env_key("policy_daily_budget_usd"), "policy.daily_budget_usd");
        assert_eq!(map_env_key("policy_tiers_tool_call"), "policy.tiers.tool_call");
        assert_eq!(map_env_key("retry_base_delay_ms"), "retry.base_delay_ms");
        assert_eq!(map_env_key("storage_database_path"), "storage.database_path");
    }

    #[test]
    fn env_overrides_policy_budget() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("CONCIERGE_POLICY_DAILY_BUDGET_USD", "7.5");
            jail.set_env("CONCIERGE_RETRY_MAX_RETRIES", "4");
            let config = load_config_from_path(Path::new("missing.toml"))?;
            assert!((config.policy.daily_budget_usd - 7.5).abs() < f64::EPSILON);
            assert_eq!(config.retry.max_retries, 4);
            Ok(())
        });
    }

    #[test]
    fn local_file_is_read_from_working_directory() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                LOCAL_CONFIG_FILE,
                r#"
                [agent]
                name = "from-file"

                [policy]
                session_budget_usd = 0.25
                "#,
            )?;
            let config = build_figment().extract::<ConciergeConfig>()?;
            assert_eq!(config.agent.name, "from-file");
            assert!((config.policy.session_budget_usd - 0.25).abs() < f64::EPSILON);
            Ok(())
        });
    }
}
