//! Pricing configuration storage
//!
//! A single row (`id = 1`) holds the whole configuration as JSONB. Saves are
//! full replacements via upsert.

use async_trait::async_trait;
use parking_lot::RwLock;
use shared::error::{AppError, AppResult};
use shared::models::{ConfigSource, PricingConfig};
use sqlx::PgPool;
use sqlx::types::Json;

const CONFIG_ROW_ID: i16 = 1;

#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Stored configuration, `None` when nothing was ever saved
    async fn load(&self) -> AppResult<Option<PricingConfig>>;

    /// Replace the stored configuration, returning it with `updated_at` set
    async fn save(&self, config: PricingConfig) -> AppResult<PricingConfig>;

    /// Overwrite the stored configuration with the defaults
    async fn reset(&self) -> AppResult<PricingConfig> {
        self.save(PricingConfig::default()).await
    }
}

/// Configuration for the next run: the stored one when valid, else the defaults
pub async fn load_effective_config(store: &dyn ConfigStore) -> (PricingConfig, ConfigSource) {
    match store.load().await {
        Ok(Some(config)) => match config.validate() {
            Ok(()) => (config, ConfigSource::Stored),
            Err(e) => {
                tracing::warn!(error = %e, "Stored pricing config is invalid, using defaults");
                (PricingConfig::default(), ConfigSource::Defaults)
            }
        },
        Ok(None) => {
            tracing::warn!("No pricing config stored, using defaults");
            (PricingConfig::default(), ConfigSource::Defaults)
        }
        Err(e) => {
            tracing::warn!(error = %e, "Pricing config store unavailable, using defaults");
            (PricingConfig::default(), ConfigSource::Defaults)
        }
    }
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

// ==================== PostgreSQL ====================

#[derive(Clone)]
pub struct PgConfigStore {
    pool: PgPool,
}

impl PgConfigStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ConfigStore for PgConfigStore {
    async fn load(&self) -> AppResult<Option<PricingConfig>> {
        let row: Option<(Json<PricingConfig>, i64)> =
            sqlx::query_as("SELECT config, updated_at FROM pricing_config WHERE id = $1")
                .bind(CONFIG_ROW_ID)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| AppError::database(e.to_string()))?;

        Ok(row.map(|(Json(mut config), updated_at)| {
            config.updated_at = Some(updated_at);
            config
        }))
    }

    async fn save(&self, mut config: PricingConfig) -> AppResult<PricingConfig> {
        let now = now_millis();
        config.updated_at = Some(now);

        sqlx::query(
            r#"
            INSERT INTO pricing_config (id, config, updated_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (id)
            DO UPDATE SET config = EXCLUDED.config, updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(CONFIG_ROW_ID)
        .bind(Json(&config))
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(e.to_string()))?;

        tracing::info!(updated_at = now, "Pricing config saved");
        Ok(config)
    }
}

// ==================== In-memory ====================

/// Process-local store used when no database is configured
#[derive(Default)]
pub struct MemoryConfigStore {
    config: RwLock<Option<PricingConfig>>,
}

impl MemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: PricingConfig) -> Self {
        Self {
            config: RwLock::new(Some(config)),
        }
    }
}

#[async_trait]
impl ConfigStore for MemoryConfigStore {
    async fn load(&self) -> AppResult<Option<PricingConfig>> {
        Ok(self.config.read().clone())
    }

    async fn save(&self, mut config: PricingConfig) -> AppResult<PricingConfig> {
        config.updated_at = Some(now_millis());
        *self.config.write() = Some(config.clone());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    struct UnavailableStore;

    #[async_trait]
    impl ConfigStore for UnavailableStore {
        async fn load(&self) -> AppResult<Option<PricingConfig>> {
            Err(AppError::database("connection refused"))
        }

        async fn save(&self, _config: PricingConfig) -> AppResult<PricingConfig> {
            Err(AppError::database("connection refused"))
        }
    }

    #[tokio::test]
    async fn test_empty_store_falls_back_to_defaults() {
        let store = MemoryConfigStore::new();
        let (config, source) = load_effective_config(&store).await;
        assert_eq!(config, PricingConfig::default());
        assert_eq!(source, ConfigSource::Defaults);
    }

    #[tokio::test]
    async fn test_unavailable_store_falls_back_to_defaults() {
        let (config, source) = load_effective_config(&UnavailableStore).await;
        assert_eq!(config, PricingConfig::default());
        assert_eq!(source, ConfigSource::Defaults);
    }

    #[tokio::test]
    async fn test_invalid_stored_config_falls_back_to_defaults() {
        let mut bad = PricingConfig::default();
        bad.rounding.granularity = 0;
        let store = MemoryConfigStore::with_config(bad);

        let (config, source) = load_effective_config(&store).await;
        assert_eq!(config.rounding.granularity, 10);
        assert_eq!(source, ConfigSource::Defaults);
    }

    #[tokio::test]
    async fn test_save_replaces_and_stamps() {
        let store = MemoryConfigStore::new();
        let mut config = PricingConfig::default();
        config.tax_rate_percent = dec!(10.5);

        let saved = store.save(config).await.unwrap();
        assert!(saved.updated_at.is_some());

        let (loaded, source) = load_effective_config(&store).await;
        assert_eq!(source, ConfigSource::Stored);
        assert_eq!(loaded.tax_rate_percent, dec!(10.5));
        assert_eq!(loaded.updated_at, saved.updated_at);
    }

    #[tokio::test]
    async fn test_reset_restores_defaults() {
        let mut config = PricingConfig::default();
        config.markups.retail_percent = dec!(70);
        let store = MemoryConfigStore::with_config(config);

        let reset = store.reset().await.unwrap();
        assert_eq!(reset.markups.retail_percent, dec!(100));

        let loaded = store.load().await.unwrap().unwrap();
        assert_eq!(loaded.markups, PricingConfig::default().markups);
    }
}
