//! Channel Price Calculator
//!
//! Derives net, tax-inclusive and rounded prices for the List, Retail and
//! Wholesale channels. Business edge cases (no match, no cost) never fail:
//! they show up as fields on the result.

use rust_decimal::prelude::*;
use shared::models::{Channel, ChannelPriceResult, PriceBasis, PricingConfig};

use super::profitability::{TierBands, classify};
use super::resolver::Resolution;
use super::rounding::round_price;

/// Prices for the three channels; List is absent when there is no basis for it
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelPrices {
    pub list: Option<ChannelPriceResult>,
    pub retail: ChannelPriceResult,
    pub wholesale: ChannelPriceResult,
}

impl ChannelPrices {
    /// True when any present channel has an undefined margin
    pub fn margin_undefined(&self) -> bool {
        self.list
            .iter()
            .chain([&self.retail, &self.wholesale])
            .any(|c| c.profitability.is_undefined())
    }
}

/// A channel price left the decimal range
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("{channel} price out of range")]
pub struct PriceOverflow {
    pub channel: Channel,
}

#[inline]
fn apply_percent(value: Decimal, percent: Decimal) -> Option<Decimal> {
    let factor = Decimal::ONE.checked_add(percent.checked_div(Decimal::ONE_HUNDRED)?)?;
    value.checked_mul(factor)
}

struct ChannelInput {
    channel: Channel,
    basis: PriceBasis,
    /// `None` when applying the markup overflowed
    net_price: Option<Decimal>,
    margin_cost_basis: Decimal,
    used_fallback_basis: bool,
}

fn price_channel(
    input: ChannelInput,
    config: &PricingConfig,
) -> Result<ChannelPriceResult, PriceOverflow> {
    let overflow = PriceOverflow {
        channel: input.channel,
    };
    let net_price = input.net_price.ok_or(overflow)?;
    let final_price_unrounded = apply_percent(net_price, config.tax_rate_percent).ok_or(overflow)?;
    let final_price_rounded = if input.channel.is_rounded() {
        round_price(final_price_unrounded, &config.rounding).ok_or(overflow)?
    } else {
        final_price_unrounded
    };

    let bands = TierBands::for_channel(&config.thresholds, input.channel);
    let classification = classify(net_price, input.margin_cost_basis, &bands);

    Ok(ChannelPriceResult {
        channel: input.channel,
        basis: input.basis,
        net_price,
        final_price_unrounded,
        final_price_rounded,
        margin_cost_basis: input.margin_cost_basis,
        margin_percent: classification.margin_percent,
        profitability: classification.profitability,
        used_fallback_basis: input.used_fallback_basis,
    })
}

/// Compute every channel price for one product
///
/// - List: supplier list price (or the reference price when matched) plus tax, never rounded.
/// - Retail: cost plus retail markup, plus tax, rounded. Independent of the resolver.
/// - Wholesale: reference price plus wholesale markup when the match is usable, otherwise
///   the cost (or list price when cost is not positive) with `used_fallback_basis` set.
///
/// Fails only when an amount leaves the decimal range; the caller reports the row.
pub fn compute_channel_prices(
    cost_basis: Decimal,
    list_price: Option<Decimal>,
    resolution: &Resolution<'_>,
    config: &PricingConfig,
) -> Result<ChannelPrices, PriceOverflow> {
    let reference = resolution.usable();

    let list_basis = match (list_price, reference) {
        (Some(price), _) => Some((price, PriceBasis::ListPrice)),
        (None, Some(product)) => Some((product.net_price, PriceBasis::Reference)),
        (None, None) => None,
    };
    let list = list_basis
        .map(|(net_price, basis)| {
            price_channel(
                ChannelInput {
                    channel: Channel::List,
                    basis,
                    net_price: Some(net_price),
                    margin_cost_basis: cost_basis,
                    used_fallback_basis: false,
                },
                config,
            )
        })
        .transpose()?;

    let retail = price_channel(
        ChannelInput {
            channel: Channel::Retail,
            basis: PriceBasis::Cost,
            net_price: apply_percent(cost_basis, config.markups.retail_percent),
            margin_cost_basis: cost_basis,
            used_fallback_basis: false,
        },
        config,
    )?;

    let wholesale_markup = config.markups.wholesale_percent;
    let wholesale_input = match reference {
        Some(product) => ChannelInput {
            channel: Channel::Wholesale,
            basis: PriceBasis::Reference,
            net_price: apply_percent(product.net_price, wholesale_markup),
            margin_cost_basis: product.net_price,
            used_fallback_basis: false,
        },
        None => {
            let (fallback, basis) = match list_price {
                Some(price) if cost_basis <= Decimal::ZERO => (price, PriceBasis::ListPrice),
                _ => (cost_basis, PriceBasis::Cost),
            };
            ChannelInput {
                channel: Channel::Wholesale,
                basis,
                net_price: apply_percent(fallback, wholesale_markup),
                margin_cost_basis: fallback,
                used_fallback_basis: true,
            }
        }
    };
    let wholesale = price_channel(wholesale_input, config)?;

    Ok(ChannelPrices {
        list,
        retail,
        wholesale,
    })
}
