//! Pricing run results

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::channel::Channel;
use super::pricing_config::ConfigSource;
use super::product_row::RowError;

/// Profitability outcome of one channel price
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Profitability {
    Excellent,
    Good,
    Acceptable,
    /// Below the minimum margin, the only non-profitable tier
    Critical,
    /// Non-positive cost or net price, no margin computed
    Undefined,
}

impl Profitability {
    pub const TIERS: [Profitability; 4] = [
        Profitability::Excellent,
        Profitability::Good,
        Profitability::Acceptable,
        Profitability::Critical,
    ];

    pub fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined)
    }
}

/// Resolver strategy that produced a catalog hit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStrategyKind {
    ExactCode,
    Capacity,
    Substring,
    Alias,
    PatternCapacity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    Matched,
    /// Catalog entry found but its price is not usable
    Priceless,
    Unmatched,
}

/// Serializable view of a resolver outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionSummary {
    pub status: MatchStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_net_price: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<MatchStrategyKind>,
}

/// Basis a channel's net price was derived from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceBasis {
    ListPrice,
    Cost,
    Reference,
}

/// Price of one product on one channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelPriceResult {
    pub channel: Channel,
    pub basis: PriceBasis,
    /// Basis after markup, before tax
    pub net_price: Decimal,
    pub final_price_unrounded: Decimal,
    /// Equal to the unrounded price on the List channel
    pub final_price_rounded: Decimal,
    /// Cost the margin was measured against
    pub margin_cost_basis: Decimal,
    pub margin_percent: Option<Decimal>,
    pub profitability: Profitability,
    /// Wholesale priced without reference-catalog data
    pub used_fallback_basis: bool,
}

/// Full pricing of one input row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductPricingResult {
    pub row_index: usize,
    pub brand: Option<String>,
    pub type_or_model: String,
    pub resolution: ResolutionSummary,
    pub cost_basis: Decimal,
    pub cost_estimated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list: Option<ChannelPriceResult>,
    pub retail: ChannelPriceResult,
    pub wholesale: ChannelPriceResult,
    /// At least one channel margin could not be computed
    pub margin_undefined: bool,
}

impl ProductPricingResult {
    pub fn channels(&self) -> impl Iterator<Item = &ChannelPriceResult> {
        self.list
            .iter()
            .chain(std::iter::once(&self.retail))
            .chain(std::iter::once(&self.wholesale))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierCounts {
    pub excellent: usize,
    pub good: usize,
    pub acceptable: usize,
    pub critical: usize,
    pub undefined: usize,
}

impl TierCounts {
    pub fn record(&mut self, profitability: Profitability) {
        match profitability {
            Profitability::Excellent => self.excellent += 1,
            Profitability::Good => self.good += 1,
            Profitability::Acceptable => self.acceptable += 1,
            Profitability::Critical => self.critical += 1,
            Profitability::Undefined => self.undefined += 1,
        }
    }

    pub fn get(&self, profitability: Profitability) -> usize {
        match profitability {
            Profitability::Excellent => self.excellent,
            Profitability::Good => self.good,
            Profitability::Acceptable => self.acceptable,
            Profitability::Critical => self.critical,
            Profitability::Undefined => self.undefined,
        }
    }

    pub fn add(&mut self, other: &TierCounts) {
        self.excellent += other.excellent;
        self.good += other.good;
        self.acceptable += other.acceptable;
        self.critical += other.critical;
        self.undefined += other.undefined;
    }
}

/// Per-channel aggregate, averages only over numeric margins
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelSummary {
    pub channel: Channel,
    pub display_name: String,
    /// Products with a price on this channel
    pub priced: usize,
    /// Products with a numeric margin on this channel
    pub rated: usize,
    pub tiers: TierCounts,
    pub average_margin_percent: Option<Decimal>,
    pub average_final_price: Option<Decimal>,
    /// Wholesale prices computed without a reference match
    pub fallback_count: usize,
}

/// Per-brand aggregate; the retail average skips undefined margins
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrandSummary {
    pub brand: String,
    pub products: usize,
    pub matched: usize,
    pub average_retail_price: Option<Decimal>,
}

/// Aggregated result of one batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingRunResult {
    pub run_id: Uuid,
    /// Unix millis
    pub started_at: i64,
    pub config_source: ConfigSource,
    pub total_rows: usize,
    pub priced_products: usize,
    pub matched: usize,
    pub priceless: usize,
    pub unmatched: usize,
    pub undefined_margins: usize,
    pub error_rows: usize,
    /// Tier counts summed over every channel classification
    pub tier_counts: TierCounts,
    pub channels: Vec<ChannelSummary>,
    pub brands: Vec<BrandSummary>,
    pub products: Vec<ProductPricingResult>,
    pub errors: Vec<RowError>,
}

impl PricingRunResult {
    pub fn channel(&self, channel: Channel) -> Option<&ChannelSummary> {
        self.channels.iter().find(|c| c.channel == channel)
    }
}

/// Audit record kept by the run history store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub started_at: i64,
    pub config_source: ConfigSource,
    pub total_rows: usize,
    pub priced_products: usize,
    pub matched: usize,
    pub priceless: usize,
    pub unmatched: usize,
    pub undefined_margins: usize,
    pub error_rows: usize,
    pub tier_counts: TierCounts,
}

impl From<&PricingRunResult> for RunSummary {
    fn from(run: &PricingRunResult) -> Self {
        Self {
            run_id: run.run_id,
            started_at: run.started_at,
            config_source: run.config_source,
            total_rows: run.total_rows,
            priced_products: run.priced_products,
            matched: run.matched,
            priceless: run.priceless,
            unmatched: run.unmatched,
            undefined_margins: run.undefined_margins,
            error_rows: run.error_rows,
            tier_counts: run.tier_counts,
        }
    }
}
