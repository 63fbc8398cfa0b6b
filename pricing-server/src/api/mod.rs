//! API routes
//!
//! - [`health`] - liveness
//! - [`pricing_runs`] - batch pricing and run history
//! - [`pricing_config`] - pricing configuration singleton
//! - [`catalog`] - reference catalog lookup

pub mod catalog;
pub mod health;
pub mod pricing_config;
pub mod pricing_runs;

use axum::Router;

use crate::core::ServerState;

/// All routes, without middleware or state
pub fn build_router() -> Router<ServerState> {
    Router::new()
        .merge(health::router())
        .merge(pricing_runs::router())
        .merge(pricing_config::router())
        .merge(catalog::router())
}
