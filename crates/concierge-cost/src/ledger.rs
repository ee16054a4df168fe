// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Usage ledger for persisting model invocation records to SQLite.
//!
//! Each turn's model call is recorded with its token counts, actual cost in
//! USD, the routing reason, and the tools it used. The ledger answers the
//! daily and per-session totals the cost policy reads before each turn.

use async_trait::async_trait;
use concierge_core::{
    ConciergeError, ModelUsage, Provider, TokenUsage, UsageLedger, UsageRecord,
};
use tracing::info;

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS usage_ledger (
        id TEXT PRIMARY KEY NOT NULL,
        session_id TEXT NOT NULL,
        model TEXT NOT NULL,
        provider TEXT NOT NULL,
        input_tokens INTEGER NOT NULL DEFAULT 0,
        output_tokens INTEGER NOT NULL DEFAULT 0,
        cost_usd REAL NOT NULL DEFAULT 0.0,
        success INTEGER NOT NULL DEFAULT 1,
        tool_used TEXT,
        routing_reason TEXT,
        estimated_cost REAL,
        created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
    );
    CREATE INDEX IF NOT EXISTS idx_usage_ledger_session ON usage_ledger(session_id);
    CREATE INDEX IF NOT EXISTS idx_usage_ledger_created ON usage_ledger(created_at);
    CREATE INDEX IF NOT EXISTS idx_usage_ledger_model ON usage_ledger(model);";

/// Fields of a usage record known at the end of a turn.
#[derive(Debug, Clone, Default)]
pub struct UsageEntry {
    pub session_id: String,
    pub model: String,
    pub usage: TokenUsage,
    pub cost_usd: f64,
    pub success: bool,
    pub tools: Vec<String>,
    pub routing_reason: Option<String>,
    pub estimated_cost: Option<f64>,
}

/// Build a ledger row with a fresh id, the inferred provider, and a UTC timestamp.
pub fn new_record(entry: UsageEntry) -> UsageRecord {
    UsageRecord {
        id: uuid::Uuid::new_v4().to_string(),
        provider: Provider::for_model(&entry.model),
        session_id: entry.session_id,
        model: entry.model,
        input_tokens: entry.usage.input_tokens,
        output_tokens: entry.usage.output_tokens,
        cost_usd: entry.cost_usd,
        success: entry.success,
        tool_used: (!entry.tools.is_empty()).then(|| entry.tools.join(", ")),
        routing_reason: entry.routing_reason,
        estimated_cost: entry.estimated_cost,
        created_at: chrono::Utc::now()
            .format("%Y-%m-%dT%H:%M:%S%.3fZ")
            .to_string(),
    }
}

/// Today's UTC date as `YYYY-MM-DD`.
fn today() -> String {
    chrono::Utc::now().format("%Y-%m-%d").to_string()
}

fn round_usd(value: f64) -> f64 {
    (value * 1_000_000.0).round() / 1_000_000.0
}

/// Convert a tokio-rusqlite error into ConciergeError::Storage.
fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> ConciergeError {
    ConciergeError::Storage {
        source: Box::new(e),
    }
}

/// Persistent usage ledger backed by SQLite.
///
/// All operations go through the single tokio-rusqlite background thread,
/// which serializes writes from concurrent turns.
pub struct SqliteUsageLedger {
    conn: tokio_rusqlite::Connection,
}

impl SqliteUsageLedger {
    /// Wrap an existing connection, creating the `usage_ledger` table if absent.
    pub async fn new(conn: tokio_rusqlite::Connection) -> Result<Self, ConciergeError> {
        conn.call(|conn| conn.execute_batch(SCHEMA))
            .await
            .map_err(map_tr_err)?;
        Ok(Self { conn })
    }

    /// Open a ledger from a database file path, creating parent directories.
    pub async fn open(path: &str) -> Result<Self, ConciergeError> {
        if let Some(parent) = std::path::Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| ConciergeError::Storage {
                    source: Box::new(e),
                })?;
            }
        }
        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(|e| ConciergeError::Storage {
                source: Box::new(e),
            })?;
        Self::new(conn).await
    }

    /// Open an in-memory ledger.
    pub async fn open_in_memory() -> Result<Self, ConciergeError> {
        let conn = tokio_rusqlite::Connection::open_in_memory()
            .await
            .map_err(|e| ConciergeError::Storage {
                source: Box::new(e),
            })?;
        Self::new(conn).await
    }

    /// Sum of costs for a given UTC date (e.g. "2026-03-01").
    pub async fn daily_total(&self, date: &str) -> Result<f64, ConciergeError> {
        let date = date.to_string();
        let total = self
            .conn
            .call(move |conn| {
                conn.query_row(
                    "SELECT COALESCE(SUM(cost_usd), 0.0) FROM usage_ledger \
                     WHERE created_at >= ?1 AND created_at < date(?1, '+1 day')",
                    rusqlite::params![date],
                    |row| row.get::<_, f64>(0),
                )
            })
            .await
            .map_err(map_tr_err)?;
        Ok(round_usd(total))
    }

    /// The most recent records, newest first.
    pub async fn recent(&self, limit: usize) -> Result<Vec<UsageRecord>, ConciergeError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT id, session_id, model, provider, input_tokens, output_tokens, \
                     cost_usd, success, tool_used, routing_reason, estimated_cost, created_at \
                     FROM usage_ledger ORDER BY created_at DESC, rowid DESC LIMIT ?1",
                )?;
                let rows = stmt.query_map(rusqlite::params![limit], |row| {
                    let provider: String = row.get(3)?;
                    Ok(UsageRecord {
                        id: row.get(0)?,
                        session_id: row.get(1)?,
                        model: row.get(2)?,
                        provider: provider.parse().unwrap_or(Provider::OpenAi),
                        input_tokens: row.get(4)?,
                        output_tokens: row.get(5)?,
                        cost_usd: row.get(6)?,
                        success: row.get(7)?,
                        tool_used: row.get(8)?,
                        routing_reason: row.get(9)?,
                        estimated_cost: row.get(10)?,
                        created_at: row.get(11)?,
                    })
                })?;
                rows.collect::<Result<Vec<_>, _>>()
            })
            .await
            .map_err(map_tr_err)
    }
}

#[async_trait]
impl UsageLedger for SqliteUsageLedger {
    async fn record(&self, record: &UsageRecord) -> Result<(), ConciergeError> {
        let row = record.clone();

        self.conn
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO usage_ledger (id, session_id, model, provider, \
                     input_tokens, output_tokens, cost_usd, success, tool_used, \
                     routing_reason, estimated_cost, created_at) \
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
                    rusqlite::params![
                        row.id,
                        row.session_id,
                        row.model,
                        row.provider.to_string(),
                        row.input_tokens,
                        row.output_tokens,
                        row.cost_usd,
                        row.success,
                        row.tool_used,
                        row.routing_reason,
                        row.estimated_cost,
                        row.created_at,
                    ],
                )
            })
            .await
            .map_err(map_tr_err)?;

        info!(
            session_id = %record.session_id,
            model = %record.model,
            provider = %record.provider,
            input_tokens = record.input_tokens,
            output_tokens = record.output_tokens,
            cost_usd = record.cost_usd,
            success = record.success,
            "usage recorded"
        );

        Ok(())
    }

    async fn cost_today(&self) -> Result<f64, ConciergeError> {
        self.daily_total(&today()).await
    }

    async fn session_cost(&self, session_id: &str) -> Result<f64, ConciergeError> {
        if session_id.is_empty() {
            return Ok(0.0);
        }
        let session_id = session_id.to_string();
        let total = self
            .conn
            .call(move |conn| {
                conn.query_row(
                    "SELECT COALESCE(SUM(cost_usd), 0.0) FROM usage_ledger \
                     WHERE session_id = ?1",
                    rusqlite::params![session_id],
                    |row| row.get::<_, f64>(0),
                )
            })
            .await
            .map_err(map_tr_err)?;
        Ok(round_usd(total))
    }

    async fn model_breakdown(&self) -> Result<Vec<ModelUsage>, ConciergeError> {
        self.conn
            .call(|conn| {
                let mut stmt = conn.prepare(
                    "SELECT model, COUNT(*), COALESCE(SUM(cost_usd), 0.0), \
                     COALESCE(SUM(input_tokens + output_tokens), 0) \
                     FROM usage_ledger GROUP BY model \
                     ORDER BY SUM(cost_usd) DESC, model ASC",
                )?;
                let rows = stmt.query_map([], |row| {
                    Ok(ModelUsage {
                        model: row.get(0)?,
                        requests: row.get::<_, i64>(1)? as u64,
                        cost: round_usd(row.get(2)?),
                        tokens: row.get::<_, i64>(3)? as u64,
                    })
                })?;
                rows.collect::<Result<Vec<_>, _>>()
            })
            .await
            .map_err(map_tr_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record(session_id: &str, model: &str, cost_usd: f64, created_at: &str) -> UsageRecord {
        UsageRecord {
            id: uuid::Uuid::new_v4().to_string(),
            session_id: session_id.to_string(),
            model: model.to_string(),
            provider: Provider::for_model(model),
            input_tokens: 1000,
            output_tokens: 500,
            cost_usd,
            success: true,
            tool_used: None,
            routing_reason: None,
            estimated_cost: None,
            created_at: created_at.to_string(),
        }
    }

    #[tokio::test]
    async fn record_inserts_row() {
        let ledger = SqliteUsageLedger::open_in_memory().await.unwrap();
        let record = new_record(UsageEntry {
            session_id: "sess-1".into(),
            model: "gpt-4.1-mini".into(),
            usage: TokenUsage::new(100, 50),
            cost_usd: 0.001,
            success: true,
            ..Default::default()
        });
        ledger.record(&record).await.unwrap();

        let total = ledger.session_cost("sess-1").await.unwrap();
        assert!((total - 0.001).abs() < 1e-10);
        let today = ledger.cost_today().await.unwrap();
        assert!((today - 0.001).abs() < 1e-10);
    }

    #[tokio::test]
    async fn daily_total_excludes_other_days() {
        let ledger = SqliteUsageLedger::open_in_memory().await.unwrap();
        ledger
            .record(&sample_record("s1", "gpt-4.1", 1.50, "2026-03-01T10:00:00.000Z"))
            .await
            .unwrap();
        ledger
            .record(&sample_record("s1", "gpt-4.1", 0.75, "2026-03-01T23:59:59.999Z"))
            .await
            .unwrap();
        ledger
            .record(&sample_record("s1", "gpt-4.1", 4.00, "2026-03-02T00:00:00.000Z"))
            .await
            .unwrap();

        let total = ledger.daily_total("2026-03-01").await.unwrap();
        assert!((total - 2.25).abs() < 1e-10, "expected 2.25, got {total}");
    }

    #[tokio::test]
    async fn session_cost_filters_by_session() {
        let ledger = SqliteUsageLedger::open_in_memory().await.unwrap();
        let ts = "2026-03-01T10:00:00.000Z";
        ledger
            .record(&sample_record("sess-a", "gpt-4.1", 1.0, ts))
            .await
            .unwrap();
        ledger
            .record(&sample_record("sess-b", "gpt-4.1", 2.0, ts))
            .await
            .unwrap();

        assert!((ledger.session_cost("sess-a").await.unwrap() - 1.0).abs() < 1e-10);
        assert!((ledger.session_cost("sess-b").await.unwrap() - 2.0).abs() < 1e-10);
        assert_eq!(ledger.session_cost("").await.unwrap(), 0.0);
    }

    #[tokio::test]
    async fn model_breakdown_orders_by_cost_descending() {
        let ledger = SqliteUsageLedger::open_in_memory().await.unwrap();
        let ts = "2026-03-01T10:00:00.000Z";
        ledger
            .record(&sample_record("s", "gpt-4.1-nano", 0.01, ts))
            .await
            .unwrap();
        ledger
            .record(&sample_record("s", "claude-sonnet-4-5-20250929", 0.50, ts))
            .await
            .unwrap();
        ledger
            .record(&sample_record("s", "gpt-4.1-nano", 0.02, ts))
            .await
            .unwrap();

        let breakdown = ledger.model_breakdown().await.unwrap();
        assert_eq!(breakdown.len(), 2);
        assert_eq!(breakdown[0].model, "claude-sonnet-4-5-20250929");
        assert_eq!(breakdown[1].model, "gpt-4.1-nano");
        assert_eq!(breakdown[1].requests, 2);
        assert_eq!(breakdown[1].tokens, 3000);
        assert!((breakdown[1].cost - 0.03).abs() < 1e-10);
    }

    #[tokio::test]
    async fn recent_round_trips_optional_fields() {
        let ledger = SqliteUsageLedger::open_in_memory().await.unwrap();
        let record = new_record(UsageEntry {
            session_id: "s".into(),
            model: "or:deepseek/deepseek-r1".into(),
            usage: TokenUsage::new(10, 20),
            cost_usd: 0.0002,
            success: false,
            tools: vec!["check_email".into(), "web_search".into()],
            routing_reason: Some("optimized by moderate tier policy".into()),
            estimated_cost: Some(0.0011),
        });
        ledger.record(&record).await.unwrap();

        let recent = ledger.recent(5).await.unwrap();
        assert_eq!(recent, vec![record]);
        assert_eq!(recent[0].provider, Provider::OpenRouter);
        assert_eq!(recent[0].tool_used.as_deref(), Some("check_email, web_search"));
    }

    #[tokio::test]
    async fn open_creates_database_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("usage.db");
        let path = path.to_str().unwrap();

        {
            let ledger = SqliteUsageLedger::open(path).await.unwrap();
            ledger
                .record(&sample_record("s", "gpt-4o", 0.25, "2026-03-01T10:00:00.000Z"))
                .await
                .unwrap();
        }

        let reopened = SqliteUsageLedger::open(path).await.unwrap();
        assert!((reopened.session_cost("s").await.unwrap() - 0.25).abs() < 1e-10);
    }

    #[test]
    fn new_record_sets_fields() {
        let rec = new_record(UsageEntry {
            session_id: "s1".into(),
            model: "claude-sonnet-4-5-20250929".into(),
            usage: TokenUsage::new(500, 200),
            cost_usd: 0.05,
            success: true,
            ..Default::default()
        });
        assert_eq!(rec.provider, Provider::Anthropic);
        assert_eq!(rec.input_tokens, 500);
        assert!(rec.tool_used.is_none());
        assert!(!rec.id.is_empty());
        assert!(rec.created_at.ends_with('Z'));
    }
}
