//! Trade extraction — pairs ledger buys with the sells that closed them.
//!
//! Post-processes the ledger after the replay completes. Pure function:
//! ledger + final positions → completed trades. A sell is linked to its buy
//! through `opening_trade_id`, never by comparing share volumes.

use crate::domain::money::to_f64;
use crate::domain::{CompletedTrade, InstrumentId, Position, TradeId, TradeRecord};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};

/// Extract one `CompletedTrade` per buy in the ledger.
///
/// Output is grouped by instrument (in order of first appearance in the
/// ledger), chronological within each instrument. Trades still open take
/// their `holding_value` from `positions`; `period_days` converts holding
/// time into signal periods (7 for weekly signals).
pub fn extract_trades(
    ledger: &[TradeRecord],
    positions: &BTreeMap<InstrumentId, Position>,
    period_days: u32,
) -> Vec<CompletedTrade> {
    let mut trades: Vec<CompletedTrade> = Vec::new();
    let mut by_buy_id: HashMap<TradeId, usize> = HashMap::new();
    let mut first_seen: HashMap<&str, usize> = HashMap::new();

    for record in ledger {
        let next_rank = first_seen.len();
        first_seen
            .entry(record.instrument_id.as_str())
            .or_insert(next_rank);

        if record.is_buy() {
            by_buy_id.insert(record.trade_id, trades.len());
            trades.push(open_trade(record));
            continue;
        }

        let index = record
            .opening_trade_id
            .and_then(|id| by_buy_id.get(&id).copied())
            .or_else(|| {
                trades
                    .iter()
                    .position(|t| t.is_open() && t.instrument_id == record.instrument_id)
            });
        if let Some(index) = index {
            close_trade(&mut trades[index], record, period_days);
        }
    }

    for trade in trades.iter_mut().filter(|t| t.is_open()) {
        if let Some(position) = positions.get(&trade.instrument_id) {
            trade.holding_value = position.mark_value;
        }
        trade.roi = roi(trade.holding_value, trade.buy_spend);
    }

    trades.sort_by_key(|t| {
        first_seen
            .get(t.instrument_id.as_str())
            .copied()
            .unwrap_or(usize::MAX)
    });
    trades
}

fn open_trade(buy: &TradeRecord) -> CompletedTrade {
    let buy_spend = -buy.ledger_value;
    CompletedTrade {
        instrument_id: buy.instrument_id.clone(),
        share_volume: buy.share_volume,
        buy_price: buy.reference_price,
        buy_spend,
        buy_confidence: buy.confidence,
        buy_date: buy.date,
        sell_price: None,
        sell_spend: None,
        sell_confidence: None,
        sell_date: None,
        holding_periods: None,
        profit_loss: None,
        holding_value: buy.holding_mark_value,
        roi: roi(buy.holding_mark_value, buy_spend),
    }
}

fn close_trade(trade: &mut CompletedTrade, sell: &TradeRecord, period_days: u32) {
    let sell_spend = sell.ledger_value;
    let days = (sell.date - trade.buy_date).num_days();

    trade.sell_price = Some(sell.reference_price);
    trade.sell_spend = Some(sell_spend);
    trade.sell_confidence = Some(sell.confidence);
    trade.sell_date = Some(sell.date);
    trade.holding_periods = Some(days as f64 / f64::from(period_days.max(1)));
    trade.profit_loss = Some(sell_spend - trade.buy_spend);
    trade.holding_value = sell_spend;
    trade.roi = roi(sell_spend, trade.buy_spend);
}

/// `holding_value / buy_spend − 1`
fn roi(holding_value: Decimal, buy_spend: Decimal) -> f64 {
    if buy_spend.is_zero() {
        return 0.0;
    }
    to_f64(holding_value / buy_spend) - 1.0
}
