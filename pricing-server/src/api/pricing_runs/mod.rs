//! Pricing run API

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/pricing", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/run", post(handler::run))
        .route("/product", post(handler::price_product))
        .route("/runs", get(handler::recent))
}
