//! Pricing Run API Handlers

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use shared::error::{AppError, AppResult};
use shared::models::{
    PricingRunRequest, PricingRunResult, ProductPricingRequest, ProductPricingResult, RunSummary,
};

use crate::audit_log;
use crate::core::ServerState;
use crate::pricing::{map_row, map_rows, price_single_row, run_pricing_batch};

const MAX_RECENT_RUNS: usize = 200;

#[derive(Debug, Deserialize)]
pub struct RecentQuery {
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    20
}

/// POST /api/pricing/run - price a batch of raw rows
///
/// Partial matches still return 200; only an empty batch is rejected.
pub async fn run(
    State(state): State<ServerState>,
    Json(request): Json<PricingRunRequest>,
) -> AppResult<Json<PricingRunResult>> {
    let snapshot = state.snapshot().await;

    let result = tokio::task::spawn_blocking(move || {
        let rows = map_rows(
            &request.rows,
            &request.mapping,
            snapshot.config.estimated_cost_percent,
        );
        run_pricing_batch(rows, &snapshot)
    })
    .await
    .map_err(|e| AppError::internal(format!("Pricing task failed: {}", e)))??;

    let summary = RunSummary::from(&result);
    if let Err(e) = state.run_history.record(&summary).await {
        tracing::warn!(run_id = %result.run_id, error = %e, "Failed to record pricing run");
    }

    audit_log!(
        "pricing_run",
        result.run_id,
        format!(
            "rows={} priced={} matched={} priceless={} unmatched={} errors={} config={:?}",
            result.total_rows,
            result.priced_products,
            result.matched,
            result.priceless,
            result.unmatched,
            result.error_rows,
            result.config_source
        )
    );

    Ok(Json(result))
}

/// POST /api/pricing/product - price one raw row, not recorded in history
pub async fn price_product(
    State(state): State<ServerState>,
    Json(request): Json<ProductPricingRequest>,
) -> AppResult<Json<ProductPricingResult>> {
    let snapshot = state.snapshot().await;
    let cost_percent = snapshot.config.estimated_cost_percent;
    let row = map_row(0, &request.row, &request.mapping, cost_percent);

    let product = price_single_row(row, &snapshot)
        .map_err(|e| AppError::row_malformed(e.row_index, e.reason))?;
    Ok(Json(product))
}

/// GET /api/pricing/runs - recent run summaries, newest first
pub async fn recent(
    State(state): State<ServerState>,
    Query(query): Query<RecentQuery>,
) -> AppResult<Json<Vec<RunSummary>>> {
    let limit = query.limit.clamp(1, MAX_RECENT_RUNS);
    let runs = state.run_history.recent(limit).await?;
    Ok(Json(runs))
}
