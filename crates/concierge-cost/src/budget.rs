// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Daily and per-session spending caps.
//!
//! Caps are read from `[policy]`; a value of `0` disables that cap. The check
//! works on a [`UsageSnapshot`](concierge_core::UsageSnapshot) taken before
//! the turn, so two concurrent turns can both pass a cap that only one of
//! them should have. Enforcement is best-effort.
//!
//! Every check that finds spend between 80% and 100% of a cap emits a
//! `tracing::warn`, so a session near its cap warns on each turn.

use concierge_config::model::PolicyConfig;
use serde::Serialize;
use strum::Display;
use tracing::warn;

/// Fraction of a cap at which a proximity warning is logged.
const WARN_THRESHOLD: f64 = 0.8;

/// Where current spend sits relative to the configured caps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum BudgetStatus {
    /// Below 80% of every active cap.
    Within,
    /// At or above 80% of some cap, below all of them.
    Approaching,
    /// At or above at least one cap.
    Exhausted,
}

/// Daily and per-session caps in USD (0 = unlimited).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BudgetCaps {
    pub daily_usd: f64,
    pub session_usd: f64,
}

impl BudgetCaps {
    pub fn new(daily_usd: f64, session_usd: f64) -> Self {
        Self {
            daily_usd,
            session_usd,
        }
    }

    pub fn from_policy(config: &PolicyConfig) -> Self {
        Self::new(config.daily_budget_usd, config.session_budget_usd)
    }

    /// Classify the given spend against both caps.
    ///
    /// Warns on every call that finds a cap at 80% or more but not yet reached.
    pub fn check(&self, cost_today: f64, session_cost: f64) -> BudgetStatus {
        let daily = Self::status_for(self.daily_usd, cost_today);
        let session = Self::status_for(self.session_usd, session_cost);

        if daily == BudgetStatus::Approaching {
            warn!(
                cost_today,
                daily_cap = self.daily_usd,
                "approaching daily budget cap (80%+)"
            );
        }
        if session == BudgetStatus::Approaching {
            warn!(
                session_cost,
                session_cap = self.session_usd,
                "approaching session budget cap (80%+)"
            );
        }

        daily.max_severity(session)
    }

    /// True when spend has reached either active cap.
    pub fn is_exhausted(&self, cost_today: f64, session_cost: f64) -> bool {
        self.check(cost_today, session_cost) == BudgetStatus::Exhausted
    }

    fn status_for(cap: f64, spent: f64) -> BudgetStatus {
        if cap <= 0.0 {
            BudgetStatus::Within
        } else if spent >= cap {
            BudgetStatus::Exhausted
        } else if spent >= cap * WARN_THRESHOLD {
            BudgetStatus::Approaching
        } else {
            BudgetStatus::Within
        }
    }
}

impl BudgetStatus {
    fn max_severity(self, other: Self) -> Self {
        use BudgetStatus::*;
        match (self, other) {
            (Exhausted, _) | (_, Exhausted) => Exhausted,
            (Approaching, _) | (_, Approaching) => Approaching,
            _ => Within,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_caps_are_unlimited() {
        let caps = BudgetCaps::new(0.0, 0.0);
        assert_eq!(caps.check(999_999.0, 999_999.0), BudgetStatus::Within);
        assert!(!caps.is_exhausted(999_999.0, 999_999.0));
    }

    #[test]
    fn daily_cap_reached_exhausts() {
        let caps = BudgetCaps::new(5.0, 0.0);
        assert!(caps.is_exhausted(5.0, 0.0));
        assert!(caps.is_exhausted(10.0, 0.0));
        assert!(!caps.is_exhausted(4.99, 0.0));
    }

    #[test]
    fn session_cap_reached_exhausts() {
        let caps = BudgetCaps::new(0.0, 0.5);
        assert!(caps.is_exhausted(0.0, 0.5));
        assert!(!caps.is_exhausted(100.0, 0.1));
    }

    #[test]
    #[tracing_test::traced_test]
    fn warning_at_80_percent() {
        let caps = BudgetCaps::new(10.0, 0.0);
        assert_eq!(caps.check(8.5, 0.0), BudgetStatus::Approaching);
        assert!(logs_contain("approaching daily budget cap"));
    }

    #[test]
    #[tracing_test::traced_test]
    fn warning_repeats_on_every_check() {
        let caps = BudgetCaps::new(0.0, 1.0);
        caps.check(0.0, 0.9);
        caps.check(0.0, 0.95);
        // Exhausted is not "approaching".
        caps.check(0.0, 1.0);
        logs_assert(|lines: &[&str]| {
            let warnings = lines
                .iter()
                .filter(|line| line.contains("approaching session budget cap"))
                .count();
            if warnings == 2 {
                Ok(())
            } else {
                Err(format!("expected 2 warnings, got {warnings}"))
            }
        });
    }

    #[test]
    fn exhausted_dominates_approaching() {
        let caps = BudgetCaps::new(10.0, 1.0);
        assert_eq!(caps.check(9.0, 1.0), BudgetStatus::Exhausted);
    }

    #[test]
    fn from_policy_reads_caps() {
        let mut config = PolicyConfig::default();
        config.daily_budget_usd = 3.0;
        config.session_budget_usd = 0.25;
        assert_eq!(BudgetCaps::from_policy(&config), BudgetCaps::new(3.0, 0.25));
    }

    #[test]
    fn status_display_is_snake_case() {
        assert_eq!(BudgetStatus::Approaching.to_string(), "approaching");
    }
}
