//! Profitability Classifier
//!
//! Margin is measured against the net (sale) price:
//! `margin = (net - cost) / net * 100`. A markup of +100% over cost is a
//! 50% margin, not 100%.

use rust_decimal::prelude::*;
use shared::models::{Channel, Profitability, ProfitabilityThresholds};

/// Tier boundaries for one channel, all inclusive lower bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierBands {
    pub excellent: Decimal,
    pub good: Decimal,
    pub minimum: Decimal,
}

impl TierBands {
    pub fn for_channel(thresholds: &ProfitabilityThresholds, channel: Channel) -> Self {
        Self {
            excellent: thresholds.excellent_percent,
            good: thresholds.good_percent,
            minimum: thresholds.minimum_for(channel),
        }
    }

    fn tier(&self, margin: Decimal) -> Profitability {
        if margin >= self.excellent {
            Profitability::Excellent
        } else if margin >= self.good {
            Profitability::Good
        } else if margin >= self.minimum {
            Profitability::Acceptable
        } else {
            Profitability::Critical
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    /// `None` exactly when the classification is Undefined
    pub margin_percent: Option<Decimal>,
    pub profitability: Profitability,
}

impl Classification {
    pub fn undefined() -> Self {
        Self {
            margin_percent: None,
            profitability: Profitability::Undefined,
        }
    }
}

/// Margin on net price, or `None` for degenerate inputs
///
/// A margin outside the decimal range (a tiny net price against a huge cost)
/// is also `None`.
pub fn margin_percent(net_price: Decimal, cost_basis: Decimal) -> Option<Decimal> {
    if net_price <= Decimal::ZERO || cost_basis <= Decimal::ZERO {
        return None;
    }
    (net_price - cost_basis)
        .checked_div(net_price)?
        .checked_mul(Decimal::ONE_HUNDRED)
}

pub fn classify(net_price: Decimal, cost_basis: Decimal, bands: &TierBands) -> Classification {
    match margin_percent(net_price, cost_basis) {
        Some(margin) => Classification {
            margin_percent: Some(margin),
            profitability: bands.tier(margin),
        },
        None => Classification::undefined(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn bands_with_minimum(minimum: Decimal) -> TierBands {
        TierBands {
            excellent: dec!(25),
            good: dec!(15),
            minimum,
        }
    }

    fn bands() -> TierBands {
        bands_with_minimum(dec!(10))
    }

    #[test]
    fn test_margin_uses_net_price_denominator() {
        let c = classify(dec!(200), dec!(100), &bands_with_minimum(dec!(0)));
        assert_eq!(c.margin_percent, Some(dec!(50)));

        let cost_denominator = (dec!(200) - dec!(100)) / dec!(100) * dec!(100);
        assert_eq!(cost_denominator, dec!(100));
        assert_ne!(c.margin_percent, Some(cost_denominator));
    }

    #[test]
    fn test_margin_formula_holds_across_inputs() {
        for (net, cost) in [
            (dec!(64.2), dec!(42.8)),
            (dec!(163908), dec!(81954)),
            (dec!(1000), dec!(999)),
            (dec!(3), dec!(1)),
        ] {
            let c = classify(net, cost, &bands_with_minimum(dec!(0)));
            assert_eq!(c.margin_percent, Some((net - cost) / net * dec!(100)));
        }
    }

    #[test]
    fn test_boundaries_are_inclusive() {
        let b = bands();
        // net 100: margin equals 100 - cost
        let tier = |cost| classify(dec!(100), cost, &b).profitability;
        assert_eq!(tier(dec!(75)), Profitability::Excellent);
        assert_eq!(tier(dec!(85)), Profitability::Good);
        assert_eq!(tier(dec!(90)), Profitability::Acceptable);
        assert_eq!(tier(dec!(90.01)), Profitability::Critical);
    }

    #[test]
    fn test_just_below_boundaries() {
        let tier = |cost| classify(dec!(100), cost, &bands()).profitability;
        assert_eq!(tier(dec!(75.01)), Profitability::Good);
        assert_eq!(tier(dec!(85.01)), Profitability::Acceptable);
    }

    #[test]
    fn test_negative_margin_is_critical() {
        let c = classify(dec!(80), dec!(100), &bands());
        assert_eq!(c.margin_percent, Some(dec!(-25)));
        assert_eq!(c.profitability, Profitability::Critical);
    }

    #[test]
    fn test_degenerate_inputs_are_undefined() {
        for (net, cost) in [
            (dec!(100), dec!(0)),
            (dec!(100), dec!(-5)),
            (dec!(0), dec!(10)),
            (dec!(-1), dec!(10)),
        ] {
            let c = classify(net, cost, &bands());
            assert_eq!(c, Classification::undefined());
        }
    }

    #[test]
    fn test_channel_floor_override() {
        let mut thresholds = shared::models::DEFAULT_PRICING_CONFIG.thresholds;
        thresholds.channel_minimums.wholesale = Some(dec!(12));

        let wholesale = TierBands::for_channel(&thresholds, Channel::Wholesale);
        let retail = TierBands::for_channel(&thresholds, Channel::Retail);

        // 11% margin
        let wholesale = classify(dec!(100), dec!(89), &wholesale);
        let retail = classify(dec!(100), dec!(89), &retail);
        assert_eq!(wholesale.profitability, Profitability::Critical);
        assert_eq!(retail.profitability, Profitability::Acceptable);
    }

    #[test]
    fn test_margin_out_of_range_is_undefined() {
        let huge_cost = "100000000000000000000".parse::<Decimal>().unwrap();
        let c = classify(dec!(0.0000001), huge_cost, &bands());
        assert_eq!(c, Classification::undefined());
    }
}
