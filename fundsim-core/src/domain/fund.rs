//! FundState — cash, invested value, open positions and the trade ledger.

use super::position::Position;
use super::trade::TradeRecord;
use super::InstrumentId;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// Aggregate state of one simulated fund.
///
/// Mutated only through `FundLedger`. Invariants that hold after every
/// operation:
/// - `cash_available >= 0`
/// - `invested_mark_value == sum(position.mark_value)`
/// - at most one position per instrument
///
/// Positions live in a `BTreeMap` so every iteration is ordered and replays
/// stay byte-identical.
#[derive(Debug, Clone, PartialEq)]
pub struct FundState {
    pub(crate) starting_value: Decimal,
    pub(crate) cash_available: Decimal,
    pub(crate) invested_mark_value: Decimal,
    pub(crate) cost_of_doing_business: Decimal,
    pub(crate) positions: BTreeMap<InstrumentId, Position>,
    pub(crate) ledger: Vec<TradeRecord>,
}

impl FundState {
    pub fn new(starting_value: Decimal) -> Self {
        Self {
            starting_value,
            cash_available: starting_value,
            invested_mark_value: Decimal::ZERO,
            cost_of_doing_business: Decimal::ZERO,
            positions: BTreeMap::new(),
            ledger: Vec::new(),
        }
    }

    pub fn starting_value(&self) -> Decimal {
        self.starting_value
    }

    pub fn cash_available(&self) -> Decimal {
        self.cash_available
    }

    pub fn invested_mark_value(&self) -> Decimal {
        self.invested_mark_value
    }

    /// Cumulative fixed fees, spread cost and stamp duty.
    pub fn cost_of_doing_business(&self) -> Decimal {
        self.cost_of_doing_business
    }

    /// The sole solvency metric: cash + invested mark value.
    pub fn fund_value(&self) -> Decimal {
        self.cash_available + self.invested_mark_value
    }

    pub fn holds(&self, instrument_id: &str) -> bool {
        self.positions.contains_key(instrument_id)
    }

    pub fn position(&self, instrument_id: &str) -> Option<&Position> {
        self.positions.get(instrument_id)
    }

    pub fn positions(&self) -> &BTreeMap<InstrumentId, Position> {
        &self.positions
    }

    pub fn ledger(&self) -> &[TradeRecord] {
        &self.ledger
    }

    /// Sum of open position mark values, recomputed from the positions.
    pub fn positions_mark_value(&self) -> Decimal {
        self.positions.values().map(|p| p.mark_value).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TradeId;
    use rust_decimal_macros::dec;

    #[test]
    fn new_fund_is_all_cash() {
        let fund = FundState::new(dec!(1000000));
        assert_eq!(fund.cash_available(), dec!(1000000));
        assert_eq!(fund.invested_mark_value(), Decimal::ZERO);
        assert_eq!(fund.fund_value(), dec!(1000000));
        assert!(fund.ledger().is_empty());
    }

    #[test]
    fn fund_value_includes_invested() {
        let mut fund = FundState::new(dec!(1000));
        fund.cash_available = dec!(400);
        fund.invested_mark_value = dec!(650);
        fund.positions
            .insert("AAA".into(), Position::open("AAA", 13, dec!(50), TradeId(0)));
        assert_eq!(fund.fund_value(), dec!(1050));
        assert!(fund.holds("AAA"));
        assert!(!fund.holds("BBB"));
        assert_eq!(fund.positions_mark_value(), dec!(650));
    }
}
