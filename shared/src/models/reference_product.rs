//! Reference Catalog Model
//!
//! Entries of the reference brand (Varta) that anchor wholesale pricing.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub const REFERENCE_BRAND: &str = "Varta";

fn default_brand() -> String {
    REFERENCE_BRAND.to_string()
}

fn default_voltage() -> String {
    "12V".to_string()
}

/// Reference catalog entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceProduct {
    /// Unique reference-brand code (e.g. "VA45BD")
    pub code: String,
    #[serde(default = "default_brand")]
    pub brand: String,
    /// Nominal capacity in Ah, best effort when the datasheet is ambiguous
    #[serde(default)]
    pub nominal_capacity_ah: Option<u32>,
    #[serde(default = "default_voltage")]
    pub voltage: String,
    /// Net price excluding tax. Zero means no usable equivalence.
    #[serde(default)]
    pub net_price: Decimal,
    /// Capacity shorthands, supplier type codes and alternate codes
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ReferenceProduct {
    /// A zero or negative price never counts as a free product
    pub fn is_priced(&self) -> bool {
        self.net_price > Decimal::ZERO
    }
}

/// Min/max/average over priced catalog entries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: Decimal,
    pub max: Decimal,
    pub average: Decimal,
}

/// Catalog summary for dashboards
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogStats {
    pub total_products: usize,
    pub priced_products: usize,
    pub priceless_products: usize,
    pub total_aliases: usize,
    /// Distinct nominal capacities, ascending
    pub capacities: Vec<u32>,
    /// `None` when no entry carries a price
    pub price_range: Option<PriceRange>,
}
