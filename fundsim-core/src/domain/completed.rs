//! CompletedTrade — a buy matched with the sell that closed it (or still open).

use super::InstrumentId;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Derived, read-only view of one position's life.
///
/// Sell fields are `None` while the position is still open; `holding_value`
/// is then the position's current mark value rather than realized proceeds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletedTrade {
    pub instrument_id: InstrumentId,
    pub share_volume: u64,

    // ── Entry ──
    pub buy_price: Decimal,
    /// Cash paid including costs (`-ledger_value` of the buy).
    pub buy_spend: Decimal,
    pub buy_confidence: f64,
    pub buy_date: NaiveDate,

    // ── Exit ──
    pub sell_price: Option<Decimal>,
    /// Cash received net of costs (`ledger_value` of the sell).
    pub sell_spend: Option<Decimal>,
    pub sell_confidence: Option<f64>,
    pub sell_date: Option<NaiveDate>,

    // ── Outcome ──
    pub holding_periods: Option<f64>,
    pub profit_loss: Option<Decimal>,
    pub holding_value: Decimal,
    pub roi: f64,
}

impl CompletedTrade {
    pub fn is_open(&self) -> bool {
        self.sell_date.is_none()
    }

    pub fn is_closed(&self) -> bool {
        self.sell_date.is_some()
    }

    pub fn is_winner(&self) -> bool {
        self.roi > 0.0
    }
}
