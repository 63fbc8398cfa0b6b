//! Shared types for the battery pricing service
//!
//! Error types, response structures and the pricing domain models used by
//! the server and its API clients.

pub mod error;
pub mod models;

// Re-exports
pub use axum::Json;
pub use http;
pub use serde::{Deserialize, Serialize};
