//! Pricing engine
//!
//! - [`catalog`] - reference-brand product table
//! - [`resolver`] - input descriptor -> reference equivalence
//! - [`calculator`] - per-channel net/final/rounded prices
//! - [`profitability`] - margin tiers
//! - [`mapper`] - raw rows -> descriptors
//! - [`batch`] - orchestration and aggregation

pub mod batch;
pub mod calculator;
pub mod catalog;
pub mod mapper;
pub mod profitability;
pub mod resolver;
pub mod rounding;

pub use batch::{PricingSnapshot, price_single_row, run_pricing_batch};
pub use calculator::{ChannelPrices, PriceOverflow, compute_channel_prices};
pub use catalog::{CatalogError, ReferenceCatalog};
pub use mapper::{map_row, map_rows};
pub use profitability::{Classification, TierBands, classify};
pub use resolver::{EquivalenceResolver, MatchStrategy, Resolution};
pub use rounding::round_price;
