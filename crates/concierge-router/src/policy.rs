// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Budget-aware model selection from per-tier candidate pools.
//!
//! Resolution order: critical flag > tool use > message complexity. Within
//! the resolved tier the cheapest candidate (at the configured token
//! estimate) wins, ties going to the earlier entry. Once a daily or session
//! cap is reached, the cheapest `simple` candidate is used instead.
//!
//! The budget check reads the spend totals passed in by the caller. Two
//! concurrent turns can both observe a pre-cap total, so the cap is
//! best-effort rather than a hard limit.

use std::sync::Arc;

use concierge_config::model::PolicyConfig;
use concierge_core::PriceModel;
use concierge_cost::BudgetCaps;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tracing::{debug, info};

use crate::classifier::{self, Complexity};

/// Tier a turn is priced under.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PolicyTier {
    Simple,
    Moderate,
    Complex,
    ToolCall,
    Critical,
}

impl From<Complexity> for PolicyTier {
    fn from(complexity: Complexity) -> Self {
        match complexity {
            Complexity::Simple => PolicyTier::Simple,
            Complexity::Moderate => PolicyTier::Moderate,
            Complexity::Complex => PolicyTier::Complex,
        }
    }
}

/// Inputs to one model selection.
#[derive(Debug, Clone, Default)]
pub struct PolicyRequest<'a> {
    pub requested_model: &'a str,
    pub user_message: &'a str,
    pub has_tools: bool,
    pub is_critical: bool,
    pub cost_today_usd: f64,
    pub session_cost_usd: f64,
}

/// Outcome of a model selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyDecision {
    pub original_model: String,
    pub selected_model: String,
    pub tier: PolicyTier,
    /// Estimated cost of the selected model at the configured token estimate.
    pub estimated_cost: f64,
    pub reason: String,
    pub downgraded_for_budget: bool,
}

pub const REASON_DISABLED: &str = "cost policy disabled";
pub const REASON_BUDGET: &str = "budget cap reached, graceful downgrade";
pub const REASON_KEPT: &str = "requested model kept";

/// Picks the model for a turn under the configured tiers and budget caps.
pub struct CostPolicyEngine {
    config: PolicyConfig,
    caps: BudgetCaps,
    pricing: Arc<dyn PriceModel>,
}

impl CostPolicyEngine {
    pub fn new(config: &PolicyConfig, pricing: Arc<dyn PriceModel>) -> Self {
        Self {
            caps: BudgetCaps::from_policy(config),
            config: config.clone(),
            pricing,
        }
    }

    /// Tier for a request: critical, then tool use, then message complexity.
    pub fn resolve_tier(&self, request: &PolicyRequest<'_>) -> PolicyTier {
        if request.is_critical {
            PolicyTier::Critical
        } else if request.has_tools {
            PolicyTier::ToolCall
        } else {
            classifier::classify(request.user_message).into()
        }
    }

    /// Cost of `model` at the configured input/output token estimate.
    pub fn estimate(&self, model: &str) -> f64 {
        self.pricing.price(
            model,
            self.config.estimated_input_tokens,
            self.config.estimated_output_tokens,
        )
    }

    /// Select the model for a turn. Never fails.
    pub fn select_model(&self, request: &PolicyRequest<'_>) -> PolicyDecision {
        let requested = request.requested_model;
        let tier = self.resolve_tier(request);

        if !self.config.enabled {
            return PolicyDecision {
                original_model: requested.to_string(),
                selected_model: requested.to_string(),
                tier,
                estimated_cost: self.estimate(requested),
                reason: REASON_DISABLED.to_string(),
                downgraded_for_budget: false,
            };
        }

        if self
            .caps
            .is_exhausted(request.cost_today_usd, request.session_cost_usd)
        {
            let (selected, estimated_cost) = self.cheapest_in("simple", requested);
            info!(
                requested,
                selected = selected.as_str(),
                %tier,
                cost_today = request.cost_today_usd,
                session_cost = request.session_cost_usd,
                "budget cap reached, downgrading model"
            );
            return PolicyDecision {
                original_model: requested.to_string(),
                selected_model: selected,
                tier,
                estimated_cost,
                reason: REASON_BUDGET.to_string(),
                downgraded_for_budget: true,
            };
        }

        let (selected, estimated_cost) = self.cheapest_in(&tier.to_string(), requested);
        let reason = if selected == requested {
            REASON_KEPT.to_string()
        } else {
            format!("optimized by {tier} tier policy")
        };
        debug!(requested, selected = selected.as_str(), %tier, estimated_cost, "model selected");

        PolicyDecision {
            original_model: requested.to_string(),
            selected_model: selected,
            tier,
            estimated_cost,
            reason,
            downgraded_for_budget: false,
        }
    }

    /// Cheapest model of a tier's pool; a missing or empty pool means `[requested]`.
    fn cheapest_in(&self, tier: &str, requested: &str) -> (String, f64) {
        let pool = self
            .config
            .tier(tier)
            .filter(|pool| !pool.is_empty())
            .map(|pool| pool.iter().map(String::as_str).collect::<Vec<_>>())
            .unwrap_or_else(|| vec![requested]);

        let mut winner = pool[0];
        let mut winner_cost = self.estimate(winner);
        for &model in &pool[1..] {
            let cost = self.estimate(model);
            if cost < winner_cost {
                winner = model;
                winner_cost = cost;
            }
        }
        (winner.to_string(), winner_cost)
    }
}
