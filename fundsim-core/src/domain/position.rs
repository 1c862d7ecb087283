use super::ids::TradeId;
use super::money::holding_value;
use super::InstrumentId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A currently-held instrument. One per instrument; exists only while held.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub instrument_id: InstrumentId,
    pub share_volume: u64,
    pub last_mark_price: Decimal,
    pub mark_value: Decimal,
    /// The buy that opened this position.
    pub open_trade_id: TradeId,
}

impl Position {
    pub fn open(
        instrument_id: impl Into<InstrumentId>,
        share_volume: u64,
        price: Decimal,
        open_trade_id: TradeId,
    ) -> Self {
        Self {
            instrument_id: instrument_id.into(),
            share_volume,
            last_mark_price: price,
            mark_value: holding_value(share_volume, price),
            open_trade_id,
        }
    }

    /// Revalue at `price`. Returns the change in mark value.
    pub fn revalue(&mut self, price: Decimal) -> Decimal {
        let new_value = holding_value(self.share_volume, price);
        let delta = new_value - self.mark_value;
        self.mark_value = new_value;
        self.last_mark_price = price;
        delta
    }
}
