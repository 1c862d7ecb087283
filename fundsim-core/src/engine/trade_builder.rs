//! Trade builder — turns a trade intent into a fully priced trade.
//!
//! Pure functions: intent + spread + funds (or shares) + cost parameters →
//! `PricedTrade`. Booking into a fund (ids, balances) is the ledger's job.

use crate::domain::money::{holding_value, round_money};
use crate::domain::{PricedTrade, TradeDirection, TradeIntent};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use super::cost_model::{ask, bid, spread_cost, stamp_duty, CostParameters};
use super::error::{EngineError, EngineResult};

/// Price a buy of as many whole shares as `funds_to_invest` covers.
///
/// The share count leaves room for stamp duty and, when
/// `value_includes_trade_cost` is set, for the fixed fee as well.
pub fn build_buy(
    intent: &TradeIntent,
    spread: Decimal,
    funds_to_invest: Decimal,
    costs: &CostParameters,
) -> EngineResult<PricedTrade> {
    let ask_price = ask(intent.reference_price, spread)?;
    let bid_price = bid(intent.reference_price, spread)?;
    if ask_price.is_zero() {
        return Err(EngineError::invalid("ask_price", ask_price));
    }

    let investable = if costs.value_includes_trade_cost {
        funds_to_invest - costs.fixed_trade_cost
    } else {
        funds_to_invest
    };
    let rate = costs.buy_stamp_duty_rate;
    let share_volume = ((investable / (Decimal::ONE + rate)) / ask_price)
        .floor()
        .to_u64()
        .unwrap_or(0);
    if share_volume == 0 {
        return Err(EngineError::InsufficientFunds {
            required: ask_price * (Decimal::ONE + rate) + costs.fixed_trade_cost,
            available: funds_to_invest,
        });
    }

    let trade_value = holding_value(share_volume, ask_price);
    let stamp_duty = stamp_duty(trade_value, rate);
    let ledger_value = -round_money(trade_value + costs.fixed_trade_cost + stamp_duty);

    Ok(PricedTrade {
        direction: TradeDirection::Buy,
        instrument_id: intent.instrument_id.clone(),
        date: intent.date,
        confidence: intent.confidence,
        reference_price: intent.reference_price,
        spread,
        ask_price,
        bid_price,
        share_volume,
        trade_value,
        stamp_duty,
        fixed_trade_cost: costs.fixed_trade_cost,
        spread_cost: spread_cost(share_volume, intent.reference_price, spread),
        ledger_value,
        holding_mark_value: holding_value(share_volume, intent.reference_price),
    })
}

/// Price a sell of exactly `share_volume` shares at the bid.
///
/// The resulting ledger value may be negative when fees exceed proceeds.
pub fn build_sell(
    intent: &TradeIntent,
    spread: Decimal,
    share_volume: u64,
    costs: &CostParameters,
) -> EngineResult<PricedTrade> {
    let ask_price = ask(intent.reference_price, spread)?;
    let bid_price = bid(intent.reference_price, spread)?;

    let rate = costs.sell_stamp_duty_rate;
    let trade_value = holding_value(share_volume, bid_price);
    let stamp_duty = stamp_duty(trade_value, rate);
    let ledger_value = round_money(trade_value - costs.fixed_trade_cost - stamp_duty);

    Ok(PricedTrade {
        direction: TradeDirection::Sell,
        instrument_id: intent.instrument_id.clone(),
        date: intent.date,
        confidence: intent.confidence,
        reference_price: intent.reference_price,
        spread,
        ask_price,
        bid_price,
        share_volume,
        trade_value,
        stamp_duty,
        fixed_trade_cost: costs.fixed_trade_cost,
        spread_cost: spread_cost(share_volume, intent.reference_price, spread),
        ledger_value,
        holding_mark_value: holding_value(share_volume, intent.reference_price),
    })
}
