//! Fund simulation engine — cost model, fund ledger and signal replay loop.
//!
//! The engine consumes an ordered signal stream and replays one fund through
//! it. Per row:
//!
//! 1. Buy: size from available cash, price at the next open, book if affordable
//! 2. Sell: liquidate the whole holding at the next open
//! 3. Hold: mark the holding to the close
//!
//! After the replay, `summary` turns the ledger into completed trades and
//! aggregate statistics.

pub mod cost_model;
pub mod error;
pub mod ledger;
pub mod loop_runner;
pub mod state;
pub mod summary;
pub mod trade_builder;
pub mod trade_extraction;

pub use cost_model::{ask, bid, spread_cost, stamp_duty, CostParameters};
pub use error::{EngineError, EngineResult};
pub use ledger::{FundLedger, LedgerOutcome};
pub use loop_runner::{replay, run_simulation};
pub use state::{ReplayReport, RowError, RunResult, RunStats, SimulationConfig, SizingPolicy};
pub use summary::{build_report, FundReport, ReportOptions, ReportSummary};
pub use trade_builder::{build_buy, build_sell};
pub use trade_extraction::extract_trades;
