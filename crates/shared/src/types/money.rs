//! Money rounding helpers.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! Every monetary result is finalized exactly once through [`round_money`];
//! intermediate ratios (periodic rates, proration factors) keep full
//! `Decimal` precision until they are multiplied into an amount.

use rust_decimal::{Decimal, RoundingStrategy};

/// Number of decimal places carried by finalized monetary amounts.
pub const MONEY_SCALE: u32 = 2;

/// Smallest representable monetary amount (one cent).
pub const MONEY_UNIT: Decimal = Decimal::from_parts(1, 0, 0, false, MONEY_SCALE);

/// Rounds an amount to two decimal places, half away from zero.
///
/// This is the single rounding policy of the engine: `0.005` becomes `0.01`
/// and `-0.005` becomes `-0.01`.
#[must_use]
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Returns true if `amount` already sits on a cent boundary.
#[must_use]
pub fn is_money_scaled(amount: Decimal) -> bool {
    round_money(amount) == amount
}

/// Returns true if two amounts differ by at most one rounding unit.
#[must_use]
pub fn within_rounding_unit(left: Decimal, right: Decimal) -> bool {
    (left - right).abs() <= MONEY_UNIT
}
