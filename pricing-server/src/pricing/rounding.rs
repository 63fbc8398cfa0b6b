//! Price rounding policies
//!
//! Every function returns `None` when the rounded value leaves the decimal range.

use rust_decimal::prelude::*;
use shared::models::{RoundingMode, RoundingPolicy};

/// Round half-up to the nearest multiple of `granularity`
pub fn round_to_nearest(value: Decimal, granularity: u32) -> Option<Decimal> {
    let n = Decimal::from(granularity.max(1));
    (value / n)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .checked_mul(n)
}

/// Apply a rounding policy to a tax-inclusive price
pub fn round_price(value: Decimal, policy: &RoundingPolicy) -> Option<Decimal> {
    let n = Decimal::from(policy.granularity.max(1));
    match policy.mode {
        RoundingMode::Nearest => round_to_nearest(value, policy.granularity),
        RoundingMode::Ceiling => (value / n).ceil().checked_mul(n),
        RoundingMode::Floor => (value / n).floor().checked_mul(n),
        RoundingMode::Psychological => (value / Decimal::ONE_HUNDRED)
            .floor()
            .checked_mul(Decimal::ONE_HUNDRED)?
            .checked_add(Decimal::from(policy.psychological_ending)),
    }
}
