// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory usage ledger for deterministic testing.
//!
//! Every recorded entry counts towards "today". Preset totals stand in for
//! spend recorded before the test started.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use concierge_core::{ConciergeError, ModelUsage, UsageLedger, UsageRecord};

/// A mock ledger that keeps records in memory.
#[derive(Clone, Default)]
pub struct MockLedger {
    records: Arc<Mutex<Vec<UsageRecord>>>,
    preset_today: f64,
    preset_session: f64,
    fail_reads: Arc<AtomicBool>,
}

impl MockLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// A ledger that already reports the given spend for today and for every session.
    pub fn with_spend(cost_today: f64, session_cost: f64) -> Self {
        Self {
            preset_today: cost_today,
            preset_session: session_cost,
            ..Self::default()
        }
    }

    /// Make every read fail with a storage error.
    pub fn fail_reads(&self) {
        self.fail_reads.store(true, Ordering::SeqCst);
    }

    /// Snapshot of everything recorded so far.
    pub async fn records(&self) -> Vec<UsageRecord> {
        self.records.lock().await.clone()
    }

    fn check_reads(&self) -> Result<(), ConciergeError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(ConciergeError::Storage {
                source: "mock ledger unavailable".into(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl UsageLedger for MockLedger {
    async fn record(&self, record: &UsageRecord) -> Result<(), ConciergeError> {
        self.records.lock().await.push(record.clone());
        Ok(())
    }

    async fn cost_today(&self) -> Result<f64, ConciergeError> {
        self.check_reads()?;
        let recorded: f64 = self.records.lock().await.iter().map(|r| r.cost_usd).sum();
        Ok(self.preset_today + recorded)
    }

    async fn session_cost(&self, session_id: &str) -> Result<f64, ConciergeError> {
        self.check_reads()?;
        let recorded: f64 = self
            .records
            .lock()
            .await
            .iter()
            .filter(|r| r.session_id == session_id)
            .map(|r| r.cost_usd)
            .sum();
        Ok(self.preset_session + recorded)
    }

    async fn model_breakdown(&self) -> Result<Vec<ModelUsage>, ConciergeError> {
        self.check_reads()?;
        let mut by_model: BTreeMap<String, ModelUsage> = BTreeMap::new();
        for r in self.records.lock().await.iter() {
            let entry = by_model.entry(r.model.clone()).or_insert_with(|| ModelUsage {
                model: r.model.clone(),
                requests: 0,
                cost: 0.0,
                tokens: 0,
            });
            entry.requests += 1;
            entry.cost += r.cost_usd;
            entry.tokens += u64::from(r.input_tokens) + u64::from(r.output_tokens);
        }
        let mut breakdown: Vec<ModelUsage> = by_model.into_values().collect();
        breakdown.sort_by(|a, b| b.cost.total_cmp(&a.cost));
        Ok(breakdown)
    }
}
