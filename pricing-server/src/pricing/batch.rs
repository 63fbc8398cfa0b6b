//! Batch Orchestrator
//!
//! Runs resolver, calculator and classifier over every row of a batch and
//! aggregates the outcome. Pure and synchronous: all I/O happens before
//! (config snapshot) and after (history) in the HTTP layer.

use std::collections::BTreeMap;
use std::sync::Arc;

use rust_decimal::prelude::*;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{
    BrandSummary, Channel, ChannelPriceResult, ChannelSummary, ConfigSource,
    InputProductDescriptor, MatchStatus, PricingConfig, PricingRunResult, ProductPricingResult,
    RowError, TierCounts,
};
use uuid::Uuid;

use super::calculator::compute_channel_prices;
use super::catalog::ReferenceCatalog;
use super::mapper::fill_estimated_cost;
use super::resolver::EquivalenceResolver;

const UNKNOWN_BRAND: &str = "Unknown";

/// Immutable inputs of one run, captured before computing
#[derive(Debug, Clone)]
pub struct PricingSnapshot {
    pub catalog: Arc<ReferenceCatalog>,
    pub config: PricingConfig,
    pub source: ConfigSource,
}

impl PricingSnapshot {
    pub fn new(
        catalog: Arc<ReferenceCatalog>,
        config: PricingConfig,
        source: ConfigSource,
    ) -> Self {
        Self {
            catalog,
            config,
            source,
        }
    }
}

/// Mean rounded to 2 dp; gives up instead of overflowing the sum
#[derive(Default)]
struct RunningMean {
    sum: Decimal,
    count: usize,
    overflowed: bool,
}

impl RunningMean {
    fn push(&mut self, value: Decimal) {
        self.count += 1;
        match self.sum.checked_add(value) {
            Some(sum) => self.sum = sum,
            None => self.overflowed = true,
        }
    }

    fn mean(&self) -> Option<Decimal> {
        if self.overflowed || self.count == 0 {
            return None;
        }
        let mean = self.sum / Decimal::from(self.count);
        Some(mean.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
    }
}

/// Rows that reached pricing, checked again in case they bypassed the mapper
fn validate(
    descriptor: InputProductDescriptor,
    config: &PricingConfig,
) -> Result<InputProductDescriptor, RowError> {
    if descriptor.model_text().is_none() {
        return Err(RowError::new(descriptor.row_index, "missing type/model"));
    }
    fill_estimated_cost(descriptor, config.estimated_cost_percent)
}

/// Resolve, price and classify one validated row
fn price_product(
    descriptor: &InputProductDescriptor,
    resolver: &EquivalenceResolver<'_>,
    config: &PricingConfig,
) -> Result<ProductPricingResult, RowError> {
    let resolution = resolver.resolve(descriptor);
    let cost_basis = descriptor.cost_basis.unwrap_or_default();
    let prices = compute_channel_prices(cost_basis, descriptor.list_price, &resolution, config)
        .map_err(|e| RowError::new(descriptor.row_index, e.to_string()))?;

    Ok(ProductPricingResult {
        row_index: descriptor.row_index,
        brand: descriptor.brand.clone(),
        type_or_model: descriptor.type_or_model.trim().to_string(),
        resolution: resolution.summary(),
        cost_basis,
        cost_estimated: descriptor.cost_estimated,
        margin_undefined: prices.margin_undefined(),
        list: prices.list,
        retail: prices.retail,
        wholesale: prices.wholesale,
    })
}

fn price_row(
    row: Result<InputProductDescriptor, RowError>,
    resolver: &EquivalenceResolver<'_>,
    config: &PricingConfig,
) -> Result<ProductPricingResult, RowError> {
    row.and_then(|d| validate(d, config))
        .and_then(|d| price_product(&d, resolver, config))
}

/// Price a single mapped row against a snapshot
pub fn price_single_row(
    row: Result<InputProductDescriptor, RowError>,
    snapshot: &PricingSnapshot,
) -> Result<ProductPricingResult, RowError> {
    let resolver = EquivalenceResolver::new(&snapshot.catalog);
    price_row(row, &resolver, &snapshot.config)
}

/// Averages only see prices with a numeric margin
#[derive(Default)]
struct ChannelAccumulator {
    priced: usize,
    tiers: TierCounts,
    margin: RunningMean,
    final_price: RunningMean,
    fallback_count: usize,
}

impl ChannelAccumulator {
    fn add(&mut self, price: &ChannelPriceResult) {
        self.priced += 1;
        self.tiers.record(price.profitability);
        if let Some(margin) = price.margin_percent {
            self.margin.push(margin);
            self.final_price.push(price.final_price_rounded);
        }
        if price.used_fallback_basis {
            self.fallback_count += 1;
        }
    }

    fn finish(self, channel: Channel) -> ChannelSummary {
        ChannelSummary {
            channel,
            display_name: channel.display_name().to_string(),
            priced: self.priced,
            rated: self.margin.count,
            tiers: self.tiers,
            average_margin_percent: self.margin.mean(),
            average_final_price: self.final_price.mean(),
            fallback_count: self.fallback_count,
        }
    }
}

#[derive(Default)]
struct BrandAccumulator {
    products: usize,
    matched: usize,
    retail_price: RunningMean,
}

/// Price a batch of mapped rows
///
/// Malformed rows are recorded in `errors` and skipped. Only an empty batch
/// is an error.
pub fn run_pricing_batch(
    rows: Vec<Result<InputProductDescriptor, RowError>>,
    snapshot: &PricingSnapshot,
) -> AppResult<PricingRunResult> {
    if rows.is_empty() {
        return Err(AppError::new(ErrorCode::PricingEmptyBatch));
    }

    let run_id = Uuid::new_v4();
    let started_at = chrono::Utc::now().timestamp_millis();
    let total_rows = rows.len();
    let config = &snapshot.config;
    let resolver = EquivalenceResolver::new(&snapshot.catalog);

    let mut products = Vec::with_capacity(total_rows);
    let mut errors = Vec::new();
    for row in rows {
        match price_row(row, &resolver, config) {
            Ok(product) => products.push(product),
            Err(e) => {
                tracing::debug!(row = e.row_index, reason = %e.reason, "Row skipped");
                errors.push(e);
            }
        }
    }

    let mut channels: BTreeMap<Channel, ChannelAccumulator> = BTreeMap::new();
    let mut brands: BTreeMap<String, BrandAccumulator> = BTreeMap::new();
    let (mut matched, mut priceless, mut unmatched, mut undefined_margins) = (0, 0, 0, 0);

    for product in &products {
        match product.resolution.status {
            MatchStatus::Matched => matched += 1,
            MatchStatus::Priceless => priceless += 1,
            MatchStatus::Unmatched => unmatched += 1,
        }
        if product.margin_undefined {
            undefined_margins += 1;
        }
        for price in product.channels() {
            channels.entry(price.channel).or_default().add(price);
        }

        let brand = product
            .brand
            .as_deref()
            .map(str::trim)
            .filter(|b| !b.is_empty())
            .unwrap_or(UNKNOWN_BRAND);
        let entry = brands.entry(brand.to_string()).or_default();
        entry.products += 1;
        if product.retail.margin_percent.is_some() {
            entry.retail_price.push(product.retail.final_price_rounded);
        }
        if product.resolution.status == MatchStatus::Matched {
            entry.matched += 1;
        }
    }

    let channels: Vec<ChannelSummary> = Channel::ALL
        .into_iter()
        .map(|c| channels.remove(&c).unwrap_or_default().finish(c))
        .collect();

    let mut tier_counts = TierCounts::default();
    for summary in &channels {
        tier_counts.add(&summary.tiers);
    }

    let brands = brands
        .into_iter()
        .map(|(brand, acc)| BrandSummary {
            average_retail_price: acc.retail_price.mean(),
            brand,
            products: acc.products,
            matched: acc.matched,
        })
        .collect();

    let result = PricingRunResult {
        run_id,
        started_at,
        config_source: snapshot.source,
        total_rows,
        priced_products: products.len(),
        matched,
        priceless,
        unmatched,
        undefined_margins,
        error_rows: errors.len(),
        tier_counts,
        channels,
        brands,
        products,
        errors,
    };

    tracing::info!(
        run_id = %result.run_id,
        total_rows = result.total_rows,
        priced = result.priced_products,
        matched = result.matched,
        priceless = result.priceless,
        unmatched = result.unmatched,
        errors = result.error_rows,
        config_source = ?result.config_source,
        "Pricing run completed"
    );

    Ok(result)
}
