//! Trades — intents, priced trades and the immutable ledger record.

use super::ids::TradeId;
use super::InstrumentId;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of an executed trade. Long-only: a sell always closes a holding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeDirection {
    Buy,
    Sell,
}

impl TradeDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeDirection::Buy => "buy",
            TradeDirection::Sell => "sell",
        }
    }
}

impl fmt::Display for TradeDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the caller wants to trade, before any pricing.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeIntent {
    pub instrument_id: InstrumentId,
    pub date: NaiveDate,
    /// Execution reference price (the next period's open).
    pub reference_price: Decimal,
    pub confidence: f64,
}

impl TradeIntent {
    pub fn new(
        instrument_id: impl Into<InstrumentId>,
        date: NaiveDate,
        reference_price: Decimal,
        confidence: f64,
    ) -> Self {
        Self {
            instrument_id: instrument_id.into(),
            date,
            reference_price,
            confidence,
        }
    }
}

/// A trade with every derived monetary field, not yet booked to a ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricedTrade {
    pub direction: TradeDirection,
    pub instrument_id: InstrumentId,
    pub date: NaiveDate,
    pub confidence: f64,
    pub reference_price: Decimal,
    pub spread: Decimal,
    pub ask_price: Decimal,
    pub bid_price: Decimal,
    pub share_volume: u64,
    pub trade_value: Decimal,
    pub stamp_duty: Decimal,
    pub fixed_trade_cost: Decimal,
    pub spread_cost: Decimal,
    /// Signed cash impact: negative for a buy, normally positive for a sell.
    pub ledger_value: Decimal,
    /// `share_volume × reference_price`, the mark value of the shares traded.
    pub holding_mark_value: Decimal,
}

impl PricedTrade {
    /// Fixed fee + spread cost + stamp duty.
    pub fn cost_of_doing_business(&self) -> Decimal {
        self.fixed_trade_cost + self.spread_cost + self.stamp_duty
    }
}

/// Fund balances immediately before and after a trade was booked.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BalanceChange {
    pub invested_value_pre: Decimal,
    pub invested_value_post: Decimal,
    pub cash_available_pre: Decimal,
    pub cash_available_post: Decimal,
}

/// One executed trade as booked in the fund ledger. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    // ── Identification ──
    pub trade_id: TradeId,
    pub direction: TradeDirection,
    pub instrument_id: InstrumentId,
    pub date: NaiveDate,
    pub confidence: f64,

    // ── Pricing ──
    pub reference_price: Decimal,
    pub spread: Decimal,
    pub ask_price: Decimal,
    pub bid_price: Decimal,

    // ── Size and costs ──
    pub share_volume: u64,
    pub trade_value: Decimal,
    pub stamp_duty: Decimal,
    pub fixed_trade_cost: Decimal,
    pub spread_cost: Decimal,
    pub ledger_value: Decimal,
    pub holding_mark_value: Decimal,

    // ── Fund balances ──
    pub invested_value_pre: Decimal,
    pub invested_value_post: Decimal,
    pub cash_available_pre: Decimal,
    pub cash_available_post: Decimal,

    /// For sells: the buy this sell closes.
    pub opening_trade_id: Option<TradeId>,
}

impl TradeRecord {
    pub fn from_priced(
        trade_id: TradeId,
        priced: PricedTrade,
        balances: BalanceChange,
        opening_trade_id: Option<TradeId>,
    ) -> Self {
        Self {
            trade_id,
            direction: priced.direction,
            instrument_id: priced.instrument_id,
            date: priced.date,
            confidence: priced.confidence,
            reference_price: priced.reference_price,
            spread: priced.spread,
            ask_price: priced.ask_price,
            bid_price: priced.bid_price,
            share_volume: priced.share_volume,
            trade_value: priced.trade_value,
            stamp_duty: priced.stamp_duty,
            fixed_trade_cost: priced.fixed_trade_cost,
            spread_cost: priced.spread_cost,
            ledger_value: priced.ledger_value,
            holding_mark_value: priced.holding_mark_value,
            invested_value_pre: balances.invested_value_pre,
            invested_value_post: balances.invested_value_post,
            cash_available_pre: balances.cash_available_pre,
            cash_available_post: balances.cash_available_post,
            opening_trade_id,
        }
    }

    pub fn is_buy(&self) -> bool {
        self.direction == TradeDirection::Buy
    }

    /// Execution price: ask for buys, bid for sells.
    pub fn execution_price(&self) -> Decimal {
        match self.direction {
            TradeDirection::Buy => self.ask_price,
            TradeDirection::Sell => self.bid_price,
        }
    }

    pub fn cost_of_doing_business(&self) -> Decimal {
        self.fixed_trade_cost + self.spread_cost + self.stamp_duty
    }
}
