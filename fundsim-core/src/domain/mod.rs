//! Domain types for FundSim

pub mod completed;
pub mod fund;
pub mod ids;
pub mod money;
pub mod position;
pub mod signal;
pub mod trade;

pub use completed::CompletedTrade;
pub use fund::FundState;
pub use ids::TradeId;
pub use money::{holding_value, round_money, MONEY_DP};
pub use position::Position;
pub use signal::{sort_for_replay, SignalKind, SignalRow};
pub use trade::{BalanceChange, PricedTrade, TradeDirection, TradeIntent, TradeRecord};

/// Instrument identifier (ticker).
pub type InstrumentId = String;
