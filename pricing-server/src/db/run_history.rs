//! Pricing run audit history

use std::collections::VecDeque;

use async_trait::async_trait;
use parking_lot::RwLock;
use shared::error::{AppError, AppResult};
use shared::models::RunSummary;
use sqlx::PgPool;
use sqlx::types::Json;

/// Runs kept by the in-memory store
const MEMORY_CAPACITY: usize = 500;

#[async_trait]
pub trait RunHistoryStore: Send + Sync {
    async fn record(&self, summary: &RunSummary) -> AppResult<()>;

    /// Most recent runs first
    async fn recent(&self, limit: usize) -> AppResult<Vec<RunSummary>>;
}

#[derive(Clone)]
pub struct PgRunHistoryStore {
    pool: PgPool,
}

impl PgRunHistoryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RunHistoryStore for PgRunHistoryStore {
    async fn record(&self, summary: &RunSummary) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO pricing_runs (run_id, started_at, summary) VALUES ($1, $2, $3)
             ON CONFLICT (run_id) DO NOTHING",
        )
        .bind(summary.run_id.to_string())
        .bind(summary.started_at)
        .bind(Json(summary))
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(e.to_string()))?;
        Ok(())
    }

    async fn recent(&self, limit: usize) -> AppResult<Vec<RunSummary>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows: Vec<(Json<RunSummary>,)> =
            sqlx::query_as("SELECT summary FROM pricing_runs ORDER BY started_at DESC LIMIT $1")
                .bind(limit)
                .fetch_all(&self.pool)
                .await
                .map_err(|e| AppError::database(e.to_string()))?;
        Ok(rows.into_iter().map(|(Json(s),)| s).collect())
    }
}

#[derive(Default)]
pub struct MemoryRunHistoryStore {
    runs: RwLock<VecDeque<RunSummary>>,
}

impl MemoryRunHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RunHistoryStore for MemoryRunHistoryStore {
    async fn record(&self, summary: &RunSummary) -> AppResult<()> {
        let mut runs = self.runs.write();
        runs.push_front(summary.clone());
        runs.truncate(MEMORY_CAPACITY);
        Ok(())
    }

    async fn recent(&self, limit: usize) -> AppResult<Vec<RunSummary>> {
        Ok(self.runs.read().iter().take(limit).cloned().collect())
    }
}
