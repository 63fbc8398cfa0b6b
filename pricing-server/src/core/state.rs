use std::sync::Arc;
use std::time::Instant;

use sqlx::PgPool;

use crate::core::Config;
use crate::db::{
    ConfigStore, MemoryConfigStore, MemoryRunHistoryStore, PgConfigStore, PgRunHistoryStore,
    RunHistoryStore, load_effective_config,
};
use crate::pricing::{PricingSnapshot, ReferenceCatalog};

/// Server state shared by every handler
///
/// Cheap to clone: every field is behind an `Arc`.
///
/// | Field | Description |
/// |-------|-------------|
/// | settings | Process configuration (immutable) |
/// | catalog | Reference catalog, fixed for the process lifetime |
/// | config_store | Pricing configuration singleton |
/// | run_history | Audit summaries of past runs |
#[derive(Clone)]
pub struct ServerState {
    pub settings: Arc<Config>,
    pub catalog: Arc<ReferenceCatalog>,
    pub config_store: Arc<dyn ConfigStore>,
    pub run_history: Arc<dyn RunHistoryStore>,
    pub started_at: Instant,
}

impl ServerState {
    pub fn new(
        settings: Config,
        catalog: ReferenceCatalog,
        config_store: Arc<dyn ConfigStore>,
        run_history: Arc<dyn RunHistoryStore>,
    ) -> Self {
        Self {
            settings: Arc::new(settings),
            catalog: Arc::new(catalog),
            config_store,
            run_history,
            started_at: Instant::now(),
        }
    }

    /// Build state from configuration
    ///
    /// Loads the reference catalog (built-in or `CATALOG_PATH`), then connects
    /// to PostgreSQL and runs migrations when `DATABASE_URL` is set.
    pub async fn initialize(config: &Config) -> anyhow::Result<Self> {
        let catalog = match &config.catalog_path {
            Some(path) => ReferenceCatalog::from_file(path)?,
            None => ReferenceCatalog::builtin()?,
        };
        tracing::info!(
            products = catalog.len(),
            source = config.catalog_path.as_deref().unwrap_or("builtin"),
            "Reference catalog loaded"
        );

        let (config_store, run_history): (Arc<dyn ConfigStore>, Arc<dyn RunHistoryStore>) =
            match &config.database_url {
                Some(url) => {
                    let pool = PgPool::connect(url).await?;
                    sqlx::migrate!("./migrations").run(&pool).await?;
                    tracing::info!("Connected to PostgreSQL, migrations applied");
                    (
                        Arc::new(PgConfigStore::new(pool.clone())),
                        Arc::new(PgRunHistoryStore::new(pool)),
                    )
                }
                None => {
                    tracing::warn!("DATABASE_URL not set, using in-memory stores");
                    (
                        Arc::new(MemoryConfigStore::new()),
                        Arc::new(MemoryRunHistoryStore::new()),
                    )
                }
            };

        Ok(Self::new(config.clone(), catalog, config_store, run_history))
    }

    /// State backed by in-memory stores
    pub fn in_memory(settings: Config, catalog: ReferenceCatalog) -> Self {
        Self::new(
            settings,
            catalog,
            Arc::new(MemoryConfigStore::new()),
            Arc::new(MemoryRunHistoryStore::new()),
        )
    }

    /// Immutable inputs for one pricing run
    pub async fn snapshot(&self) -> PricingSnapshot {
        let (config, source) = load_effective_config(self.config_store.as_ref()).await;
        PricingSnapshot::new(self.catalog.clone(), config, source)
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
