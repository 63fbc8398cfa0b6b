//! Data models
//!
//! Shared between the pricing server and API clients.

pub mod channel;
pub mod pricing_config;
pub mod pricing_run;
pub mod product_row;
pub mod reference_product;

// Re-exports
pub use channel::*;
pub use pricing_config::*;
pub use pricing_run::*;
pub use product_row::*;
pub use reference_product::*;
