//! Database access layer
//!
//! Each store has a PostgreSQL implementation and an in-memory one used when
//! `DATABASE_URL` is not set.

pub mod config_store;
pub mod run_history;

pub use config_store::{ConfigStore, MemoryConfigStore, PgConfigStore, load_effective_config};
pub use run_history::{MemoryRunHistoryStore, PgRunHistoryStore, RunHistoryStore};
