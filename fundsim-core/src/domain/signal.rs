//! SignalRow — one already-decided trading signal for one instrument on one date.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::InstrumentId;

/// What the upstream classifier decided for an instrument on a date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalKind {
    Buy,
    Sell,
    Hold,
}

impl SignalKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalKind::Buy => "buy",
            SignalKind::Sell => "sell",
            SignalKind::Hold => "hold",
        }
    }
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SignalKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "buy" => Ok(SignalKind::Buy),
            "sell" => Ok(SignalKind::Sell),
            "hold" => Ok(SignalKind::Hold),
            other => Err(format!("unknown signal '{other}' (expected buy, sell or hold)")),
        }
    }
}

/// One row of the signal stream.
///
/// Buys and sells execute at `next_open_price`: the signal is only known once
/// the period has closed, so the earliest realistic fill is the next open.
/// Holds revalue the position at `close_price`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalRow {
    pub instrument_id: InstrumentId,
    pub date: NaiveDate,
    /// Price that generated the signal. Informational only.
    pub reference_price: Decimal,
    /// Absent for the last period of a series.
    pub next_open_price: Option<Decimal>,
    pub close_price: Decimal,
    pub signal: SignalKind,
    pub confidence: f64,
}

impl SignalRow {
    /// Row whose reference price is its close.
    pub fn new(
        instrument_id: impl Into<InstrumentId>,
        date: NaiveDate,
        signal: SignalKind,
        close_price: Decimal,
        next_open_price: Option<Decimal>,
        confidence: f64,
    ) -> Self {
        Self {
            instrument_id: instrument_id.into(),
            date,
            reference_price: close_price,
            next_open_price,
            close_price,
            signal,
            confidence,
        }
    }

    pub fn with_reference_price(mut self, reference_price: Decimal) -> Self {
        self.reference_price = reference_price;
        self
    }
}

/// Order rows for replay: date ascending, then confidence descending so that
/// higher-confidence buys are considered first when capital is constrained.
/// Instrument id breaks remaining ties so the order is total.
pub fn sort_for_replay(rows: &mut [SignalRow]) {
    rows.sort_by(|a, b| {
        a.date
            .cmp(&b.date)
            .then_with(|| b.confidence.total_cmp(&a.confidence))
            .then_with(|| a.instrument_id.cmp(&b.instrument_id))
    });
}
