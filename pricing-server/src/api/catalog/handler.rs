//! Reference Catalog API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use shared::error::{AppError, AppResult};
use shared::models::{CatalogStats, ReferenceProduct};

use crate::core::ServerState;

const MAX_SEARCH_RESULTS: usize = 100;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    20
}

/// GET /api/pricing/catalog - every reference product
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<ReferenceProduct>>> {
    Ok(Json(state.catalog.all().to_vec()))
}

/// GET /api/pricing/catalog/stats
pub async fn stats(State(state): State<ServerState>) -> AppResult<Json<CatalogStats>> {
    Ok(Json(state.catalog.stats()))
}

/// GET /api/pricing/catalog/search?q=&limit=
pub async fn search(
    State(state): State<ServerState>,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<Vec<ReferenceProduct>>> {
    let limit = query.limit.clamp(1, MAX_SEARCH_RESULTS);
    let hits = state
        .catalog
        .search(&query.q, limit)
        .into_iter()
        .cloned()
        .collect();
    Ok(Json(hits))
}

/// GET /api/pricing/catalog/{code} - codes containing '/' must be percent-encoded
pub async fn get_by_code(
    State(state): State<ServerState>,
    Path(code): Path<String>,
) -> AppResult<Json<ReferenceProduct>> {
    let product = state
        .catalog
        .lookup(&code)
        .cloned()
        .ok_or_else(|| AppError::catalog_entry_not_found(&code))?;
    Ok(Json(product))
}
