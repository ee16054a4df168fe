// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `concierge plan` and `concierge gate` command implementations.

use std::sync::Arc;

use clap::Args;
use concierge_agent::{ToolRegistry, TurnPipeline, TurnPlan, TurnRequest};
use concierge_config::model::ConciergeConfig;
use concierge_core::ConciergeError;
use concierge_cost::SqliteUsageLedger;
use concierge_guard::{evaluate_approval, ApprovalDecision};

use crate::print_json;

#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Session the turn belongs to.
    #[arg(long, default_value = "cli")]
    pub session: String,

    /// Model the user explicitly picked.
    #[arg(long)]
    pub model: Option<String>,

    /// The agent will be offered tools this turn.
    #[arg(long)]
    pub tools: bool,

    /// Mark the turn as critical.
    #[arg(long)]
    pub critical: bool,

    /// Tool the turn is expected to use, for confidence scoring.
    #[arg(long)]
    pub tool: Option<String>,

    /// The intended tool's credentials are missing.
    #[arg(long)]
    pub no_api_key: bool,

    /// The user message.
    pub message: String,
}

#[derive(Args, Debug)]
pub struct GateArgs {
    /// Tools the user has approved (comma-separated).
    #[arg(long, value_delimiter = ',')]
    pub approve: Vec<String>,

    /// Tools the agent requested.
    #[arg(required = true)]
    pub tools: Vec<String>,
}

/// Run the `concierge plan` command.
pub async fn run_plan(
    config: &ConciergeConfig,
    args: &PlanArgs,
    json: bool,
) -> Result<(), ConciergeError> {
    let ledger = SqliteUsageLedger::open(&config.storage.database_path).await?;
    let pipeline = TurnPipeline::new(config, Arc::new(ledger), ToolRegistry::new());

    let plan = pipeline
        .plan_turn(&TurnRequest {
            session_id: &args.session,
            user_message: &args.message,
            requested_model: args.model.as_deref(),
            has_tools: args.tools,
            is_critical: args.critical,
            intended_tool: args.tool.as_deref(),
            has_api_key: args.tool.as_ref().map(|_| !args.no_api_key),
        })
        .await;

    if json {
        print_json(&plan)
    } else {
        print!("{}", render_plan(&plan));
        Ok(())
    }
}

fn render_plan(plan: &TurnPlan) -> String {
    let d = &plan.decision;
    let mut out = format!(
        "model:      {}{}\n\
         tier:       {}\n\
         estimate:   ${:.6}\n\
         reason:     {}\n\
         confidence: {} ({:.2})\n\
         spend:      ${:.4} today, ${:.4} this session\n",
        plan.model,
        if plan.explicit_model { " (explicit)" } else { "" },
        d.tier,
        d.estimated_cost,
        d.reason,
        plan.confidence.level,
        plan.confidence.score,
        plan.usage.cost_today,
        plan.usage.session_cost,
    );
    if plan.upgrade.should_upgrade {
        out.push_str(&format!(
            "upgrade:    {} ({}, {} extra)\n",
            plan.upgrade.suggested_label, plan.upgrade.reason, plan.upgrade.estimated_extra_cost
        ));
    }
    out
}

/// Run the `concierge gate` command. Exits non-zero when approval is required.
pub fn run_gate(args: &GateArgs, json: bool) -> Result<(), ConciergeError> {
    let decision = evaluate_approval(&args.tools, &args.approve);

    if json {
        print_json(&decision)?;
    } else {
        println!("{}", render_gate(&decision));
    }

    if decision.approved {
        Ok(())
    } else {
        std::process::exit(2);
    }
}

fn render_gate(decision: &ApprovalDecision) -> String {
    match &decision.message {
        Some(message) if !decision.approved => message.clone(),
        _ => "approved".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use concierge_test_utils::MockLedger;

    #[tokio::test]
    async fn plan_rendering_mentions_upgrade() {
        let config = ConciergeConfig::default();
        let pipeline = TurnPipeline::new(&config, Arc::new(MockLedger::new()), ToolRegistry::new());
        let plan = pipeline
            .plan_turn(&TurnRequest {
                session_id: "s1",
                user_message: "write a business proposal for investors",
                ..TurnRequest::default()
            })
            .await;

        let text = render_plan(&plan);
        assert!(text.starts_with(&format!("model:      {}\n", plan.model)));
        assert!(text.contains("upgrade:    Claude Sonnet 4.5"));
    }

    #[test]
    fn gate_rendering() {
        let blocked = evaluate_approval(&["send_email"], &[]);
        assert_eq!(
            render_gate(&blocked),
            "Approval required for sensitive tools: send_email"
        );

        let ok = evaluate_approval(&["web_search"], &[]);
        assert_eq!(render_gate(&ok), "approved");
    }
}
