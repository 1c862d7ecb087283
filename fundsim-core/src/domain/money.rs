//! Monetary helpers.
//!
//! Every amount in the engine is expressed in minor units (pence) and carried
//! as a `Decimal`. Derived amounts are rounded to two decimal places of a
//! penny, the same step the cost model applies at each observable boundary.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// Decimal places kept on every derived monetary amount.
pub const MONEY_DP: u32 = 2;

/// Round a monetary amount to `MONEY_DP` places (banker's rounding).
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp(MONEY_DP)
}

/// Value of `share_volume` whole shares at `price`, rounded.
pub fn holding_value(share_volume: u64, price: Decimal) -> Decimal {
    round_money(Decimal::from(share_volume) * price)
}

/// Lossy conversion for ratio analytics (ROI, means).
pub fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}
