//! Pricing Configuration Model
//!
//! Singleton configuration consumed by every pricing run. All defaults live in
//! [`DEFAULT_PRICING_CONFIG`]; both the "nothing stored" fallback and the reset
//! operation read from it.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::channel::Channel;
use crate::error::{AppError, AppResult};

const fn whole(n: u32) -> Decimal {
    Decimal::from_parts(n, 0, 0, false, 0)
}

const MAX_MARKUP_PERCENT: Decimal = whole(1000);

/// Single source of truth for pricing defaults
pub const DEFAULT_PRICING_CONFIG: PricingConfig = PricingConfig {
    tax_rate_percent: whole(21),
    markups: ChannelMarkups {
        retail_percent: whole(100),
        wholesale_percent: whole(50),
    },
    rounding: RoundingPolicy {
        mode: RoundingMode::Nearest,
        granularity: 10,
        psychological_ending: 99,
    },
    thresholds: ProfitabilityThresholds {
        excellent_percent: whole(25),
        good_percent: whole(15),
        minimum_margin_percent: whole(10),
        channel_minimums: ChannelMinimums {
            list: None,
            retail: None,
            wholesale: None,
        },
    },
    estimated_cost_percent: whole(60),
    updated_at: None,
};

/// Rounding mode applied to rounded channels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundingMode {
    /// Half-up to the nearest multiple of the granularity
    #[serde(alias = "nearest_10")]
    Nearest,
    #[serde(alias = "ceil_10", alias = "ceil")]
    Ceiling,
    #[serde(alias = "floor_10")]
    Floor,
    /// Floor to the enclosing hundred, then add the configured ending (e.g. 199, 299)
    #[serde(alias = "psych_9")]
    Psychological,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundingPolicy {
    pub mode: RoundingMode,
    /// Multiple that rounded prices land on (e.g. 10)
    pub granularity: u32,
    /// Terminal digits used by the psychological mode, below 100
    #[serde(default = "default_psychological_ending")]
    pub psychological_ending: u32,
}

fn default_psychological_ending() -> u32 {
    DEFAULT_PRICING_CONFIG.rounding.psychological_ending
}

/// Markup percentages added to each channel's basis
///
/// The List channel has no markup: it mirrors the supplier price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelMarkups {
    /// Applied to the cost basis (100 = cost doubled)
    pub retail_percent: Decimal,
    /// Applied to the reference net price, or the fallback basis when unmatched
    pub wholesale_percent: Decimal,
}

/// Optional per-channel overrides of the global minimum margin
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelMinimums {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retail: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wholesale: Option<Decimal>,
}

impl ChannelMinimums {
    pub fn get(&self, channel: Channel) -> Option<Decimal> {
        match channel {
            Channel::List => self.list,
            Channel::Retail => self.retail,
            Channel::Wholesale => self.wholesale,
        }
    }
}

/// Margin thresholds, all inclusive lower bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfitabilityThresholds {
    pub excellent_percent: Decimal,
    pub good_percent: Decimal,
    /// Global floor; below it a price is Critical
    pub minimum_margin_percent: Decimal,
    #[serde(default)]
    pub channel_minimums: ChannelMinimums,
}

impl ProfitabilityThresholds {
    /// Effective floor for a channel
    pub fn minimum_for(&self, channel: Channel) -> Decimal {
        self.channel_minimums
            .get(channel)
            .unwrap_or(self.minimum_margin_percent)
    }
}

/// Pricing configuration singleton
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingConfig {
    pub tax_rate_percent: Decimal,
    pub markups: ChannelMarkups,
    pub rounding: RoundingPolicy,
    pub thresholds: ProfitabilityThresholds,
    /// Cost estimate as a share of the list price when a row has no cost
    #[serde(default = "default_estimated_cost_percent")]
    pub estimated_cost_percent: Decimal,
    /// Last save time (Unix millis), set by the store
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<i64>,
}

fn default_estimated_cost_percent() -> Decimal {
    DEFAULT_PRICING_CONFIG.estimated_cost_percent
}

impl Default for PricingConfig {
    fn default() -> Self {
        DEFAULT_PRICING_CONFIG
    }
}

impl PricingConfig {
    /// Check every invariant, reporting the first offending field
    pub fn validate(&self) -> AppResult<()> {
        let hundred = Decimal::ONE_HUNDRED;

        check_range("tax_rate_percent", self.tax_rate_percent, Decimal::ZERO, hundred)?;
        check_range(
            "markups.retail_percent",
            self.markups.retail_percent,
            Decimal::ZERO,
            MAX_MARKUP_PERCENT,
        )?;
        check_range(
            "markups.wholesale_percent",
            self.markups.wholesale_percent,
            Decimal::ZERO,
            MAX_MARKUP_PERCENT,
        )?;

        if self.rounding.granularity == 0 {
            return Err(AppError::config_invalid(
                "rounding.granularity",
                "Rounding granularity must be a positive integer",
            ));
        }
        if self.rounding.psychological_ending >= 100 {
            return Err(AppError::config_invalid(
                "rounding.psychological_ending",
                "Psychological ending must be below 100",
            )
            .with_detail("value", self.rounding.psychological_ending));
        }

        let t = &self.thresholds;
        check_range("thresholds.excellent_percent", t.excellent_percent, Decimal::ZERO, hundred)?;
        check_range("thresholds.good_percent", t.good_percent, Decimal::ZERO, t.excellent_percent)?;
        check_range(
            "thresholds.minimum_margin_percent",
            t.minimum_margin_percent,
            Decimal::ZERO,
            t.good_percent,
        )?;
        for channel in Channel::ALL {
            if let Some(minimum) = t.channel_minimums.get(channel) {
                let field = format!("thresholds.channel_minimums.{}", channel);
                check_range(&field, minimum, Decimal::ZERO, t.good_percent)?;
            }
        }

        if self.estimated_cost_percent <= Decimal::ZERO || self.estimated_cost_percent > hundred {
            return Err(AppError::config_invalid(
                "estimated_cost_percent",
                "Estimated cost percent must be in (0, 100]",
            )
            .with_detail("value", self.estimated_cost_percent.to_string()));
        }

        Ok(())
    }
}

fn check_range(field: &str, value: Decimal, min: Decimal, max: Decimal) -> AppResult<()> {
    if value < min || value > max {
        return Err(AppError::config_invalid(
            field,
            format!("{} must be between {} and {}", field, min, max),
        )
        .with_detail("value", value.to_string()));
    }
    Ok(())
}

/// Where the configuration of a run came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigSource {
    Stored,
    /// Store empty or unreachable, built-in defaults used
    Defaults,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use rust_decimal_macros::dec;

    #[test]
    fn test_defaults() {
        let cfg = PricingConfig::default();
        assert_eq!(cfg.tax_rate_percent, dec!(21));
        assert_eq!(cfg.markups.retail_percent, dec!(100));
        assert_eq!(cfg.markups.wholesale_percent, dec!(50));
        assert_eq!(cfg.rounding.mode, RoundingMode::Nearest);
        assert_eq!(cfg.rounding.granularity, 10);
        assert_eq!(cfg.thresholds.excellent_percent, dec!(25));
        assert_eq!(cfg.thresholds.good_percent, dec!(15));
        assert_eq!(cfg.thresholds.minimum_margin_percent, dec!(10));
        assert_eq!(cfg.estimated_cost_percent, dec!(60));
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_channel_minimum_override() {
        let mut cfg = PricingConfig::default();
        cfg.thresholds.channel_minimums.wholesale = Some(dec!(12));
        assert_eq!(cfg.thresholds.minimum_for(Channel::Wholesale), dec!(12));
        assert_eq!(cfg.thresholds.minimum_for(Channel::Retail), dec!(10));
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_granularity() {
        let mut cfg = PricingConfig::default();
        cfg.rounding.granularity = 0;
        let err = cfg.validate().unwrap_err();
        assert_eq!(err.code, ErrorCode::PricingConfigInvalid);
        assert_eq!(
            err.details.unwrap().get("field").unwrap(),
            "rounding.granularity"
        );
    }

    #[test]
    fn test_validate_rejects_negative_tax_and_markup() {
        let mut cfg = PricingConfig::default();
        cfg.tax_rate_percent = dec!(-1);
        assert!(cfg.validate().is_err());

        let mut cfg = PricingConfig::default();
        cfg.markups.wholesale_percent = dec!(-5);
        let err = cfg.validate().unwrap_err();
        assert_eq!(
            err.details.unwrap().get("field").unwrap(),
            "markups.wholesale_percent"
        );
    }

    #[test]
    fn test_validate_rejects_unordered_thresholds() {
        let mut cfg = PricingConfig::default();
        cfg.thresholds.good_percent = dec!(30);
        assert!(cfg.validate().is_err());

        let mut cfg = PricingConfig::default();
        cfg.thresholds.channel_minimums.retail = Some(dec!(20));
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_psychological_ending_overflow() {
        let mut cfg = PricingConfig::default();
        cfg.rounding.psychological_ending = 100;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_deserialize_legacy_rounding_names() {
        let mode: RoundingMode = serde_json::from_str("\"psych_9\"").unwrap();
        assert_eq!(mode, RoundingMode::Psychological);
        let mode: RoundingMode = serde_json::from_str("\"ceil_10\"").unwrap();
        assert_eq!(mode, RoundingMode::Ceiling);
    }

    #[test]
    fn test_full_replace_payload_without_optional_fields() {
        let json = r#"{
            "tax_rate_percent": 10.5,
            "markups": {"retail_percent": 70, "wholesale_percent": 40},
            "rounding": {"mode": "floor", "granularity": 50},
            "thresholds": {"excellent_percent": 30, "good_percent": 20, "minimum_margin_percent": 5}
        }"#;
        let cfg: PricingConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.tax_rate_percent, dec!(10.5));
        assert_eq!(cfg.rounding.psychological_ending, 99);
        assert_eq!(cfg.estimated_cost_percent, dec!(60));
        assert_eq!(cfg.thresholds.channel_minimums, ChannelMinimums::default());
        assert!(cfg.validate().is_ok());
    }
}
