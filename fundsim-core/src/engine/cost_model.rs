//! Cost model — spread-adjusted execution prices and transaction costs.
//!
//! The spread is applied symmetrically: buyers pay the ask (above the
//! reference price), sellers receive the bid (below it). Stamp duty is a
//! fraction of trade value with separate buy and sell rates. A fixed fee is
//! charged per trade. Every result is rounded with `round_money`.

use crate::domain::money::round_money;
use crate::domain::TradeDirection;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::error::{EngineError, EngineResult};

/// Transaction cost parameters, fixed for a simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostParameters {
    /// Fractional spread in `[0, 1]`.
    pub spread: Decimal,
    /// Fee per trade, in pence.
    pub fixed_trade_cost: Decimal,
    pub buy_stamp_duty_rate: Decimal,
    pub sell_stamp_duty_rate: Decimal,
    /// Whether the funds allotted to a buy must also cover the fixed fee.
    pub value_includes_trade_cost: bool,
}

impl Default for CostParameters {
    fn default() -> Self {
        Self {
            spread: dec!(0.01),
            fixed_trade_cost: dec!(250),
            buy_stamp_duty_rate: dec!(0.005),
            sell_stamp_duty_rate: Decimal::ZERO,
            value_includes_trade_cost: true,
        }
    }
}

impl CostParameters {
    pub fn frictionless() -> Self {
        Self {
            spread: Decimal::ZERO,
            fixed_trade_cost: Decimal::ZERO,
            buy_stamp_duty_rate: Decimal::ZERO,
            sell_stamp_duty_rate: Decimal::ZERO,
            value_includes_trade_cost: true,
        }
    }

    pub fn validate(&self) -> EngineResult<()> {
        check_spread(self.spread)?;
        if self.fixed_trade_cost < Decimal::ZERO {
            return Err(EngineError::invalid("fixed_trade_cost", self.fixed_trade_cost));
        }
        if self.buy_stamp_duty_rate < Decimal::ZERO {
            return Err(EngineError::invalid(
                "buy_stamp_duty_rate",
                self.buy_stamp_duty_rate,
            ));
        }
        if self.sell_stamp_duty_rate < Decimal::ZERO {
            return Err(EngineError::invalid(
                "sell_stamp_duty_rate",
                self.sell_stamp_duty_rate,
            ));
        }
        Ok(())
    }

    pub fn stamp_duty_rate(&self, direction: TradeDirection) -> Decimal {
        match direction {
            TradeDirection::Buy => self.buy_stamp_duty_rate,
            TradeDirection::Sell => self.sell_stamp_duty_rate,
        }
    }
}

pub fn check_spread(spread: Decimal) -> EngineResult<()> {
    if spread < Decimal::ZERO || spread > Decimal::ONE {
        return Err(EngineError::invalid("spread", spread));
    }
    Ok(())
}

pub fn check_price(price: Decimal) -> EngineResult<()> {
    if price < Decimal::ZERO {
        return Err(EngineError::invalid("price", price));
    }
    Ok(())
}

/// `round(price × (1 + spread), 2)`
pub fn ask(price: Decimal, spread: Decimal) -> EngineResult<Decimal> {
    check_spread(spread)?;
    check_price(price)?;
    Ok(round_money(price * (Decimal::ONE + spread)))
}

/// `round(price × (1 − spread), 2)`
pub fn bid(price: Decimal, spread: Decimal) -> EngineResult<Decimal> {
    check_spread(spread)?;
    check_price(price)?;
    Ok(round_money(price * (Decimal::ONE - spread)))
}

/// `round(trade_value × rate, 2)`
pub fn stamp_duty(trade_value: Decimal, rate: Decimal) -> Decimal {
    round_money(trade_value * rate)
}

/// `round(share_volume × reference_price × spread, 2)`
pub fn spread_cost(share_volume: u64, reference_price: Decimal, spread: Decimal) -> Decimal {
    round_money(Decimal::from(share_volume) * reference_price * spread)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ask_and_bid_straddle_reference() {
        assert_eq!(ask(dec!(100.0), dec!(0.01)).unwrap(), dec!(101.00));
        assert_eq!(bid(dec!(100.0), dec!(0.01)).unwrap(), dec!(99.00));
    }

    #[test]
    fn ask_rounds_to_two_places() {
        // 123.456 * 1.01 = 124.69056
        assert_eq!(ask(dec!(123.456), dec!(0.01)).unwrap(), dec!(124.69));
        // 123.456 * 0.99 = 122.22144
        assert_eq!(bid(dec!(123.456), dec!(0.01)).unwrap(), dec!(122.22));
    }

    #[test]
    fn zero_spread_is_reference_price() {
        assert_eq!(ask(dec!(55.55), Decimal::ZERO).unwrap(), dec!(55.55));
        assert_eq!(bid(dec!(55.55), Decimal::ZERO).unwrap(), dec!(55.55));
    }

    #[test]
    fn spread_outside_unit_interval_is_rejected() {
        assert!(matches!(
            ask(dec!(100), dec!(1.01)),
            Err(EngineError::InvalidParameter { .. })
        ));
        assert!(matches!(
            bid(dec!(100), dec!(-0.01)),
            Err(EngineError::InvalidParameter { .. })
        ));
        assert!(ask(dec!(100), Decimal::ONE).is_ok());
    }

    #[test]
    fn negative_price_is_rejected() {
        let err = ask(dec!(-1), dec!(0.01)).unwrap_err();
        assert_eq!(err, EngineError::invalid("price", dec!(-1)));
    }

    #[test]
    fn stamp_duty_on_trade_value() {
        assert_eq!(stamp_duty(dec!(99182.00), dec!(0.005)), dec!(495.91));
        assert_eq!(stamp_duty(dec!(99182.00), Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn spread_cost_on_reference_value() {
        assert_eq!(spread_cost(982, dec!(100.0), dec!(0.01)), dec!(982.00));
        assert_eq!(spread_cost(7, dec!(12.345), dec!(0.01)), dec!(0.86));
    }

    #[test]
    fn default_parameters_validate() {
        assert!(CostParameters::default().validate().is_ok());
        assert!(CostParameters::frictionless().validate().is_ok());
    }

    #[test]
    fn negative_costs_fail_validation() {
        let mut costs = CostParameters::default();
        costs.fixed_trade_cost = dec!(-1);
        assert!(costs.validate().is_err());

        let mut costs = CostParameters::default();
        costs.sell_stamp_duty_rate = dec!(-0.001);
        assert!(costs.validate().is_err());
    }

    #[test]
    fn stamp_duty_rate_per_direction() {
        let costs = CostParameters::default();
        assert_eq!(costs.stamp_duty_rate(TradeDirection::Buy), dec!(0.005));
        assert_eq!(costs.stamp_duty_rate(TradeDirection::Sell), Decimal::ZERO);
    }
}
