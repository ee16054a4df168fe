// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The per-turn policy pipeline.
//!
//! A turn runs in three steps:
//! - [`TurnPipeline::plan_turn`] before the model call: usage snapshot, cost
//!   policy, confidence guidance, upgrade advice
//! - [`TurnPipeline::execute_tools`] when the model requests tools: approval
//!   gate, then every approved call concurrently under the retry policy
//! - [`TurnPipeline::record_usage`] after the model call: price the actual
//!   token usage and append it to the ledger
//!
//! Ledger reads and writes never abort a turn. A failed read is treated as
//! zero spend and a failed write is logged.

use std::sync::Arc;

use concierge_config::ConciergeConfig;
use concierge_core::{
    ConciergeError, TokenUsage, ToolCall, ToolOutput, UsageLedger, UsageRecord, UsageSnapshot,
};
use concierge_cost::{new_record, PricingTable, UsageEntry};
use concierge_guard::{evaluate_approval, score_confidence, ApprovalDecision, ConfidenceScore};
use concierge_resilience::RetryPolicy;
use concierge_router::{detect_upgrade, CostPolicyEngine, PolicyDecision, PolicyRequest, UpgradeSuggestion};
use futures::future::join_all;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::registry::ToolRegistry;

/// Response sent instead of tool results when approval is missing.
const APPROVAL_FALLBACK: &str = "I need your confirmation before I can run sensitive actions.";

/// One incoming user turn.
#[derive(Debug, Clone, Default)]
pub struct TurnRequest<'a> {
    pub session_id: &'a str,
    pub user_message: &'a str,
    /// Model the user picked, if any. `None` means the configured default.
    pub requested_model: Option<&'a str>,
    /// Whether the agent will be offered tools this turn.
    pub has_tools: bool,
    pub is_critical: bool,
    /// Tool the turn is expected to use, for confidence scoring.
    pub intended_tool: Option<&'a str>,
    /// Whether the intended tool's credentials are present, if known.
    pub has_api_key: Option<bool>,
}

/// Everything decided before the model is invoked.
#[derive(Debug, Clone, Serialize)]
pub struct TurnPlan {
    /// Model to invoke.
    pub model: String,
    /// True when the user chose a non-default model, which is then kept.
    pub explicit_model: bool,
    pub decision: PolicyDecision,
    pub confidence: ConfidenceScore,
    /// Line to merge into the agent's operating context.
    pub guidance: String,
    pub upgrade: UpgradeSuggestion,
    pub usage: UsageSnapshot,
}

/// Output of one approved tool call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolResult {
    pub name: String,
    pub output: ToolOutput,
}

/// Outcome of the tool phase of a turn.
#[derive(Debug, Clone, Serialize)]
pub struct ToolExecution {
    pub approval: ApprovalDecision,
    /// Set when approval failed; the turn answers with this text instead.
    pub response: Option<String>,
    /// Results in request order. Empty when approval failed.
    pub results: Vec<ToolResult>,
}

impl ToolExecution {
    pub fn approval_required(&self) -> bool {
        !self.approval.approved
    }

    /// Names of the tools that ran, in request order.
    pub fn tool_names(&self) -> Vec<String> {
        self.results.iter().map(|r| r.name.clone()).collect()
    }
}

/// Actual usage of a finished turn.
#[derive(Debug, Clone, Default)]
pub struct UsageReport<'a> {
    pub session_id: &'a str,
    /// Model that actually answered, as reported by the provider.
    pub model: &'a str,
    pub usage: TokenUsage,
    pub success: bool,
    pub tools: Vec<String>,
}

/// Wires the policy components for each turn.
pub struct TurnPipeline {
    default_model: String,
    engine: CostPolicyEngine,
    pricing: Arc<PricingTable>,
    ledger: Arc<dyn UsageLedger>,
    tools: ToolRegistry,
    retry: RetryPolicy,
}

impl TurnPipeline {
    pub fn new(config: &ConciergeConfig, ledger: Arc<dyn UsageLedger>, tools: ToolRegistry) -> Self {
        let pricing = Arc::new(PricingTable::from_config(&config.pricing));
        Self {
            default_model: config.agent.default_model.clone(),
            engine: CostPolicyEngine::new(&config.policy, pricing.clone()),
            pricing,
            ledger,
            tools,
            retry: RetryPolicy::from(&config.retry),
        }
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Decide the model and guidance for a turn. Never fails.
    pub async fn plan_turn(&self, request: &TurnRequest<'_>) -> TurnPlan {
        let requested = request.requested_model.unwrap_or(self.default_model.as_str());
        let explicit_model = requested != self.default_model;

        let usage = match self.ledger.snapshot(request.session_id).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(error = %e, "usage lookup failed, continuing with zero spend");
                UsageSnapshot::default()
            }
        };

        let decision = self.engine.select_model(&PolicyRequest {
            requested_model: requested,
            user_message: request.user_message,
            has_tools: request.has_tools,
            is_critical: request.is_critical,
            cost_today_usd: usage.cost_today,
            session_cost_usd: usage.session_cost,
        });

        let model = if explicit_model {
            requested.to_string()
        } else {
            decision.selected_model.clone()
        };
        if model != requested {
            info!(
                from = requested,
                to = model.as_str(),
                reason = decision.reason.as_str(),
                "cost policy changed model"
            );
        }

        let confidence =
            score_confidence(request.user_message, request.intended_tool, request.has_api_key);
        let guidance = confidence.context_line();
        let upgrade = detect_upgrade(request.user_message, &model);
        if upgrade.should_upgrade {
            debug!(
                model = model.as_str(),
                suggested = upgrade.suggested_model.as_str(),
                "upgrade suggested"
            );
        }

        TurnPlan {
            model,
            explicit_model,
            decision,
            confidence,
            guidance,
            upgrade,
            usage,
        }
    }

    /// Gate the requested tool calls and run the approved ones.
    ///
    /// When any requested tool needs approval, nothing runs. Otherwise all
    /// calls run concurrently, each under the retry policy. Failures become
    /// error outputs rather than aborting the turn.
    pub async fn execute_tools(&self, calls: &[ToolCall], approved: &[String]) -> ToolExecution {
        let requested: Vec<&str> = calls.iter().map(|c| c.name.as_str()).collect();
        let approved: Vec<&str> = approved.iter().map(String::as_str).collect();
        let approval = evaluate_approval(&requested, &approved);

        if !approval.approved {
            let response = approval
                .message
                .clone()
                .unwrap_or_else(|| APPROVAL_FALLBACK.to_string());
            return ToolExecution {
                approval,
                response: Some(response),
                results: Vec::new(),
            };
        }

        let results = join_all(calls.iter().map(|call| self.run_tool(call))).await;

        ToolExecution {
            approval,
            response: None,
            results,
        }
    }

    async fn run_tool(&self, call: &ToolCall) -> ToolResult {
        let output = match self.tools.get(&call.name) {
            None => Err(ConciergeError::ToolNotFound(call.name.clone())),
            Some(tool) => {
                self.retry
                    .run(&call.name, || {
                        let tool = tool.clone();
                        let arguments = call.arguments.clone();
                        async move { tool.invoke(arguments).await }
                    })
                    .await
            }
        };

        let output = output.unwrap_or_else(|e| {
            warn!(tool = call.name.as_str(), error = %e, "tool call failed");
            ToolOutput::error(e.to_string())
        });

        ToolResult {
            name: call.name.clone(),
            output,
        }
    }

    /// Price the turn's actual usage and append it to the ledger.
    ///
    /// `decision` is the policy decision the turn ran under, if any; its
    /// reason and estimate are stored alongside the actual cost.
    pub async fn record_usage(
        &self,
        decision: Option<&PolicyDecision>,
        report: UsageReport<'_>,
    ) -> Result<UsageRecord, ConciergeError> {
        let cost_usd = self.pricing.calculate_cost(report.model, &report.usage);
        let record = new_record(UsageEntry {
            session_id: report.session_id.to_string(),
            model: report.model.to_string(),
            usage: report.usage,
            cost_usd,
            success: report.success,
            tools: report.tools,
            routing_reason: decision.map(|d| d.reason.clone()),
            estimated_cost: decision.map(|d| d.estimated_cost),
        });

        if let Err(e) = self.ledger.record(&record).await {
            warn!(error = %e, "usage logging failed");
            return Err(e);
        }
        Ok(record)
    }
}
