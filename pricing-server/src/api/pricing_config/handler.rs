//! Pricing Configuration API Handlers

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use shared::error::AppResult;
use shared::models::{ConfigSource, PricingConfig};

use crate::audit_log;
use crate::core::ServerState;
use crate::db::load_effective_config;

/// Configuration plus where it came from
#[derive(Debug, Serialize, Deserialize)]
pub struct ConfigResponse {
    pub source: ConfigSource,
    pub config: PricingConfig,
}

/// GET /api/pricing/config - configuration the next run will use
pub async fn get(State(state): State<ServerState>) -> AppResult<Json<ConfigResponse>> {
    let (config, source) = load_effective_config(state.config_store.as_ref()).await;
    Ok(Json(ConfigResponse { source, config }))
}

/// PUT /api/pricing/config - replace the whole configuration
pub async fn update(
    State(state): State<ServerState>,
    Json(payload): Json<PricingConfig>,
) -> AppResult<Json<ConfigResponse>> {
    payload.validate()?;
    let config = state.config_store.save(payload).await?;

    audit_log!(
        "pricing_config_update",
        "pricing_config",
        format!(
            "tax={} retail={} wholesale={} rounding={:?}/{}",
            config.tax_rate_percent,
            config.markups.retail_percent,
            config.markups.wholesale_percent,
            config.rounding.mode,
            config.rounding.granularity
        )
    );

    Ok(Json(ConfigResponse {
        source: ConfigSource::Stored,
        config,
    }))
}

/// DELETE /api/pricing/config - reset to defaults
pub async fn reset(State(state): State<ServerState>) -> AppResult<Json<ConfigResponse>> {
    let config = state.config_store.reset().await?;
    audit_log!("pricing_config_reset", "pricing_config");

    Ok(Json(ConfigResponse {
        source: ConfigSource::Stored,
        config,
    }))
}
