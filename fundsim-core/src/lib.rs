//! FundSim Core — domain types, cost model, fund ledger and signal replay.
//!
//! This crate contains the heart of the fund simulator:
//! - Domain types (signals, trades, positions, fund state, completed trades)
//! - Pricing and cost model (ask/bid, stamp duty, spread cost)
//! - Fund ledger state machine with buy, sell and mark-to-market
//! - Sequential signal replay loop with position sizing
//! - Trade matching and summary reporting
//! - Deterministic ledger digests

pub mod domain;
pub mod engine;
pub mod fingerprint;
