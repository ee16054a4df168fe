// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Usage ledger trait for append-only spend tracking.

use async_trait::async_trait;

use crate::error::ConciergeError;
use crate::types::{ModelUsage, UsageRecord, UsageSnapshot};

/// Append-only record of model invocations and their cost.
///
/// Implementations must be safe to share across concurrent turns. The policy
/// engine only ever reads a [`UsageSnapshot`]; writes happen after a turn.
#[async_trait]
pub trait UsageLedger: Send + Sync {
    /// Appends a usage record.
    async fn record(&self, record: &UsageRecord) -> Result<(), ConciergeError>;

    /// Total spend since UTC midnight.
    async fn cost_today(&self) -> Result<f64, ConciergeError>;

    /// Total spend attributed to one session.
    async fn session_cost(&self, session_id: &str) -> Result<f64, ConciergeError>;

    /// Per-model aggregates, most expensive first.
    async fn model_breakdown(&self) -> Result<Vec<ModelUsage>, ConciergeError>;

    /// Reads all three aggregates for one session.
    async fn snapshot(&self, session_id: &str) -> Result<UsageSnapshot, ConciergeError> {
        Ok(UsageSnapshot {
            cost_today: self.cost_today().await?,
            session_cost: self.session_cost(session_id).await?,
            model_breakdown: self.model_breakdown().await?,
        })
    }
}
