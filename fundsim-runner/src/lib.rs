//! FundSim Runner — fund configuration, signal loading, run orchestration.
//!
//! This crate builds on `fundsim-core` to provide:
//! - TOML fund configuration with validation and content-addressed run ids
//! - CSV signal loading with upstream column aliases
//! - Single-fund runner bundling ledger, completed trades and summary
//! - Parallel sweeps over independent fund configurations
//! - JSON, CSV and Markdown export

pub mod config;
pub mod data_loader;
pub mod export;
pub mod runner;
pub mod sweep;

pub use config::{ConfigError, FundConfig, FundSection, RunId};
pub use data_loader::{
    load_signals, read_signals, LoadError, LoadOptions, RejectedSignal, SignalFile,
};
pub use export::{
    export_errors_csv, export_json, export_ledger_csv, export_rejected_csv, export_trades_csv,
    generate_report, import_json, load_artifacts, save_artifacts,
};
pub use runner::{run_from_files, run_fund, RunError, SimulationReport, SCHEMA_VERSION};
pub use sweep::{FundSweep, SweepResults};
