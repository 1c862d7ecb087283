//! Fund ledger — the fund's state machine.
//!
//! Three operations mutate a `FundState`: `buy`, `sell` and `mark_to_market`.
//! Each either books exactly one change or leaves the fund untouched:
//! - a buy for an instrument already held is a no-op (no averaging in)
//! - a sell always liquidates the whole position (no partial sells)
//! - any trade that would drive cash below zero is rejected
//!
//! The ledger is append-only and its dates never decrease.

use crate::domain::{BalanceChange, FundState, Position, TradeId, TradeIntent, TradeRecord};
use rust_decimal::Decimal;
use tracing::debug;

use super::cost_model::{check_price, CostParameters};
use super::error::{EngineError, EngineResult};
use super::trade_builder::{build_buy, build_sell};

/// Result of a ledger operation that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerOutcome {
    /// A trade was booked.
    Executed(TradeId),
    /// A held position was revalued.
    Marked,
    /// Buy skipped: the instrument is already held.
    PositionAlreadyOpen,
    /// Sell skipped: nothing held to sell.
    NoOpenPosition,
    /// Mark skipped: nothing held to revalue.
    NotHeld,
}

/// Owns one fund's state and the cost parameters its trades are priced with.
#[derive(Debug, Clone)]
pub struct FundLedger {
    state: FundState,
    costs: CostParameters,
}

impl FundLedger {
    pub fn new(starting_value: Decimal, costs: CostParameters) -> EngineResult<Self> {
        if starting_value < Decimal::ZERO {
            return Err(EngineError::invalid("starting_value", starting_value));
        }
        costs.validate()?;
        Ok(Self {
            state: FundState::new(starting_value),
            costs,
        })
    }

    pub fn state(&self) -> &FundState {
        &self.state
    }

    pub fn into_state(self) -> FundState {
        self.state
    }

    pub fn costs(&self) -> &CostParameters {
        &self.costs
    }

    /// Buy as many shares of `intent.instrument_id` as `funds_to_invest` allows.
    pub fn buy(
        &mut self,
        intent: &TradeIntent,
        spread: Decimal,
        funds_to_invest: Decimal,
    ) -> EngineResult<LedgerOutcome> {
        if self.state.holds(&intent.instrument_id) {
            debug!(
                instrument = %intent.instrument_id,
                date = %intent.date,
                "already held, buy skipped"
            );
            return Ok(LedgerOutcome::PositionAlreadyOpen);
        }
        self.check_date(intent)?;

        let priced = build_buy(intent, spread, funds_to_invest, &self.costs)?;
        let required = priced.ledger_value.abs();
        if required > self.state.cash_available {
            return Err(EngineError::InsufficientFunds {
                required,
                available: self.state.cash_available,
            });
        }

        let trade_id = self.next_trade_id();
        let balances = BalanceChange {
            invested_value_pre: self.state.invested_mark_value,
            invested_value_post: self.state.invested_mark_value + priced.holding_mark_value,
            cash_available_pre: self.state.cash_available,
            cash_available_post: self.state.cash_available + priced.ledger_value,
        };

        self.state.cash_available = balances.cash_available_post;
        self.state.invested_mark_value = balances.invested_value_post;
        self.state.cost_of_doing_business += priced.cost_of_doing_business();
        self.state.positions.insert(
            priced.instrument_id.clone(),
            Position::open(
                priced.instrument_id.clone(),
                priced.share_volume,
                priced.reference_price,
                trade_id,
            ),
        );
        debug!(
            trade_id = %trade_id,
            instrument = %priced.instrument_id,
            shares = priced.share_volume,
            ledger_value = %priced.ledger_value,
            "buy booked"
        );
        self.state
            .ledger
            .push(TradeRecord::from_priced(trade_id, priced, balances, None));

        Ok(LedgerOutcome::Executed(trade_id))
    }

    /// Sell the entire holding of `intent.instrument_id`.
    ///
    /// The position is revalued at the execution reference price first, so
    /// invested value falls by exactly the mark value of the shares sold.
    pub fn sell(&mut self, intent: &TradeIntent, spread: Decimal) -> EngineResult<LedgerOutcome> {
        let Some(position) = self.state.positions.get(&intent.instrument_id) else {
            debug!(
                instrument = %intent.instrument_id,
                date = %intent.date,
                "not held, sell skipped"
            );
            return Ok(LedgerOutcome::NoOpenPosition);
        };
        let share_volume = position.share_volume;
        let opening_trade_id = position.open_trade_id;
        self.check_date(intent)?;

        let priced = build_sell(intent, spread, share_volume, &self.costs)?;
        if self.state.cash_available + priced.ledger_value < Decimal::ZERO {
            return Err(EngineError::InsufficientFunds {
                required: -priced.ledger_value,
                available: self.state.cash_available,
            });
        }

        self.revalue(&intent.instrument_id, intent.reference_price);

        let trade_id = self.next_trade_id();
        let balances = BalanceChange {
            invested_value_pre: self.state.invested_mark_value,
            invested_value_post: self.state.invested_mark_value - priced.holding_mark_value,
            cash_available_pre: self.state.cash_available,
            cash_available_post: self.state.cash_available + priced.ledger_value,
        };

        self.state.cash_available = balances.cash_available_post;
        self.state.invested_mark_value = balances.invested_value_post;
        self.state.cost_of_doing_business += priced.cost_of_doing_business();
        self.state.positions.remove(&intent.instrument_id);
        debug!(
            trade_id = %trade_id,
            instrument = %priced.instrument_id,
            shares = priced.share_volume,
            ledger_value = %priced.ledger_value,
            "sell booked"
        );
        self.state.ledger.push(TradeRecord::from_priced(
            trade_id,
            priced,
            balances,
            Some(opening_trade_id),
        ));

        Ok(LedgerOutcome::Executed(trade_id))
    }

    /// Revalue a held position at `price` without trading.
    pub fn mark_to_market(
        &mut self,
        instrument_id: &str,
        price: Decimal,
    ) -> EngineResult<LedgerOutcome> {
        check_price(price)?;
        if !self.state.holds(instrument_id) {
            return Ok(LedgerOutcome::NotHeld);
        }
        self.revalue(instrument_id, price);
        Ok(LedgerOutcome::Marked)
    }

    fn revalue(&mut self, instrument_id: &str, price: Decimal) {
        if let Some(position) = self.state.positions.get_mut(instrument_id) {
            let delta = position.revalue(price);
            self.state.invested_mark_value += delta;
        }
    }

    fn next_trade_id(&self) -> TradeId {
        TradeId::from(self.state.ledger.len())
    }

    fn check_date(&self, intent: &TradeIntent) -> EngineResult<()> {
        match self.state.ledger.last() {
            Some(last) if intent.date < last.date => Err(EngineError::OutOfOrder {
                date: intent.date,
                previous: last.date,
            }),
            _ => Ok(()),
        }
    }
}
