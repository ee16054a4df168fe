// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `concierge usage` and `concierge record` command implementations.

use std::sync::Arc;

use clap::Args;
use concierge_agent::{ToolRegistry, TurnPipeline, UsageReport};
use concierge_config::model::ConciergeConfig;
use concierge_core::{ConciergeError, TokenUsage, UsageLedger, UsageRecord, UsageSnapshot};
use concierge_cost::{BudgetCaps, BudgetStatus, SqliteUsageLedger};
use serde::Serialize;
use tracing::debug;

use crate::print_json;

#[derive(Args, Debug)]
pub struct UsageArgs {
    /// Session to report spend for.
    #[arg(long, default_value = "cli")]
    pub session: String,

    /// Number of recent records to list.
    #[arg(long, default_value_t = 10)]
    pub limit: usize,
}

#[derive(Args, Debug)]
pub struct RecordArgs {
    /// Session the turn belongs to.
    #[arg(long, default_value = "cli")]
    pub session: String,

    /// Model that answered.
    #[arg(long)]
    pub model: String,

    /// Input tokens consumed.
    #[arg(long)]
    pub input_tokens: u32,

    /// Output tokens produced.
    #[arg(long)]
    pub output_tokens: u32,

    /// Tools the turn invoked (comma-separated).
    #[arg(long, value_delimiter = ',')]
    pub tools: Vec<String>,

    /// The turn failed.
    #[arg(long)]
    pub failed: bool,
}

/// Structured output for `concierge usage --json`.
#[derive(Debug, Serialize)]
pub struct UsageSummary {
    pub session_id: String,
    pub budget: BudgetStatus,
    #[serde(flatten)]
    pub snapshot: UsageSnapshot,
    pub recent: Vec<UsageRecord>,
}

async fn open_ledger(config: &ConciergeConfig) -> Result<SqliteUsageLedger, ConciergeError> {
    debug!(path = config.storage.database_path.as_str(), "opening usage ledger");
    SqliteUsageLedger::open(&config.storage.database_path).await
}

/// Run the `concierge usage` command.
pub async fn run_usage(
    config: &ConciergeConfig,
    args: &UsageArgs,
    json: bool,
) -> Result<(), ConciergeError> {
    let ledger = open_ledger(config).await?;
    let summary = summarize(config, &ledger, &args.session, args.limit).await?;

    if json {
        print_json(&summary)
    } else {
        print!("{}", render_summary(config, &summary));
        Ok(())
    }
}

async fn summarize(
    config: &ConciergeConfig,
    ledger: &SqliteUsageLedger,
    session_id: &str,
    limit: usize,
) -> Result<UsageSummary, ConciergeError> {
    let snapshot = ledger.snapshot(session_id).await?;
    let budget = BudgetCaps::from_policy(&config.policy)
        .check(snapshot.cost_today, snapshot.session_cost);
    Ok(UsageSummary {
        session_id: session_id.to_string(),
        budget,
        snapshot,
        recent: ledger.recent(limit).await?,
    })
}

fn cap(value: f64) -> String {
    if value > 0.0 {
        format!("${value:.2}")
    } else {
        "none".to_string()
    }
}

fn render_summary(config: &ConciergeConfig, summary: &UsageSummary) -> String {
    let s = &summary.snapshot;
    let mut out = format!(
        "today:   ${:.4} (cap {})\n\
         session: ${:.4} (cap {}) [{}]\n\
         budget:  {}\n",
        s.cost_today,
        cap(config.policy.daily_budget_usd),
        s.session_cost,
        cap(config.policy.session_budget_usd),
        summary.session_id,
        summary.budget,
    );

    if !s.model_breakdown.is_empty() {
        out.push_str("\nby model:\n");
        for m in &s.model_breakdown {
            out.push_str(&format!(
                "  {:<40} {:>6} req  {:>10} tok  ${:.4}\n",
                m.model, m.requests, m.tokens, m.cost
            ));
        }
    }

    if !summary.recent.is_empty() {
        out.push_str("\nrecent:\n");
        for r in &summary.recent {
            out.push_str(&format!(
                "  {}  {:<40} ${:.6}{}\n",
                r.created_at,
                r.model,
                r.cost_usd,
                if r.success { "" } else { "  (failed)" }
            ));
        }
    }
    out
}

/// Run the `concierge record` command.
pub async fn run_record(
    config: &ConciergeConfig,
    args: &RecordArgs,
    json: bool,
) -> Result<(), ConciergeError> {
    let ledger = open_ledger(config).await?;
    let pipeline = TurnPipeline::new(config, Arc::new(ledger), ToolRegistry::new());

    let record = pipeline
        .record_usage(
            None,
            UsageReport {
                session_id: &args.session,
                model: &args.model,
                usage: TokenUsage::new(args.input_tokens, args.output_tokens),
                success: !args.failed,
                tools: args.tools.clone(),
            },
        )
        .await?;

    if json {
        print_json(&record)
    } else {
        println!("recorded {} (${:.6})", record.id, record.cost_usd);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use concierge_cost::{new_record, UsageEntry};

    #[tokio::test]
    async fn summary_reports_budget_status() {
        let mut config = ConciergeConfig::default();
        config.policy.session_budget_usd = 0.01;
        let ledger = SqliteUsageLedger::open_in_memory().await.unwrap();
        ledger
            .record(&new_record(UsageEntry {
                session_id: "s1".into(),
                model: "gpt-4.1".into(),
                cost_usd: 0.009,
                success: true,
                ..UsageEntry::default()
            }))
            .await
            .unwrap();

        let summary = summarize(&config, &ledger, "s1", 5).await.unwrap();
        assert_eq!(summary.budget, BudgetStatus::Approaching);
        assert_eq!(summary.recent.len(), 1);

        let text = render_summary(&config, &summary);
        assert!(text.contains("session: $0.0090 (cap $0.01) [s1]"));
        assert!(text.contains("gpt-4.1"));

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["budget"], "approaching");
        assert!(json["cost_today"].is_number());
    }

    #[test]
    fn uncapped_budgets_render_as_none() {
        assert_eq!(cap(0.0), "none");
        assert_eq!(cap(2.5), "$2.50");
    }
}
