//! Battery price-list pricing server
//!
//! Matches supplier battery rows to reference-brand (Varta) equivalents and
//! prices them for the List, Retail and Wholesale channels.
//!
//! # Modules
//!
//! - [`pricing`] - pricing engine (pure, synchronous)
//! - [`db`] - configuration and run history stores
//! - [`api`] - HTTP routes
//! - [`core`] - configuration, state and server startup
//! - [`common`] - logging

pub mod api;
pub mod common;
pub mod core;
pub mod db;
pub mod pricing;

pub use core::{Config, Server, ServerState, build_app};
