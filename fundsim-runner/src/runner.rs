//! Fund runner — wires together configuration, signals, engine and reporting.
//!
//! Two entry points:
//! - `run_fund()`: takes a validated config and pre-loaded signals. Used by sweeps.
//! - `run_from_files()`: loads config and signals from disk, then runs. Used by the CLI.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use fundsim_core::domain::{CompletedTrade, Position, SignalRow, TradeRecord};
use fundsim_core::engine::{
    build_report, run_simulation, EngineError, ReportSummary, RowError, RunStats,
};
use fundsim_core::fingerprint::{ledger_digest, prefix, Digest};

use crate::config::{ConfigError, FundConfig, RunId};
use crate::data_loader::{load_signals, LoadError, LoadOptions, RejectedSignal};

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("data error: {0}")]
    Data(#[from] LoadError),
    #[error("engine error: {0}")]
    Engine(#[from] EngineError),
    #[error("cannot fingerprint run: {0}")]
    Fingerprint(#[from] serde_json::Error),
}

/// Current schema version for persisted artifacts.
pub const SCHEMA_VERSION: u32 = 1;

/// Complete result of a single fund run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationReport {
    /// Schema version for forward-compatible deserialization.
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub run_id: RunId,
    pub name: String,
    pub config: FundConfig,
    pub signal_count: usize,
    pub stats: RunStats,
    /// Rows that could not be applied. The ledger is still valid.
    pub errors: Vec<RowError>,
    /// Source lines never replayed because their signal label was unknown.
    #[serde(default)]
    pub rejected: Vec<RejectedSignal>,
    pub ledger: Vec<TradeRecord>,
    /// Positions still held at the end of the stream.
    pub positions: Vec<Position>,
    pub trades: Vec<CompletedTrade>,
    pub summary: ReportSummary,
    pub ledger_digest: Digest,
}

/// Default schema version for serde deserialization of older JSON without the field.
fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

impl SimulationReport {
    /// Short run id prefix for directory names and tables.
    pub fn short_id(&self) -> &str {
        prefix(&self.run_id, 12)
    }

    /// Attach the lines the loader set aside before replay.
    pub fn with_rejected(mut self, rejected: Vec<RejectedSignal>) -> Self {
        self.rejected = rejected;
        self
    }

    /// Row errors plus rejected source lines.
    pub fn error_count(&self) -> usize {
        self.errors.len() + self.rejected.len()
    }
}

/// Replay `signals` through the fund described by `config`.
pub fn run_fund(config: &FundConfig, signals: &[SignalRow]) -> Result<SimulationReport, RunError> {
    config.validate()?;
    let run_id = config.run_id()?;
    let name = config.label().to_string();

    let result = run_simulation(signals, &config.to_simulation_config())?;
    let report = build_report(&result.fund, &config.report);
    let digest = ledger_digest(result.fund.ledger())?;

    info!(
        fund = %name,
        run_id = %prefix(&run_id, 12),
        trades = result.fund.ledger().len(),
        errors = result.errors.len(),
        fund_value = %report.summary.fund_value,
        "fund run complete"
    );

    Ok(SimulationReport {
        schema_version: SCHEMA_VERSION,
        run_id,
        name,
        config: config.clone(),
        signal_count: signals.len(),
        stats: result.stats,
        errors: result.errors,
        rejected: Vec::new(),
        ledger: result.fund.ledger().to_vec(),
        positions: result.fund.positions().values().cloned().collect(),
        trades: report.trades,
        summary: report.summary,
        ledger_digest: digest,
    })
}

/// Load a config and a signal file, then run.
///
/// Lines with an unknown signal label do not stop the run; they come back in
/// `SimulationReport::rejected`.
pub fn run_from_files(
    config_path: &Path,
    signals_path: &Path,
    options: &LoadOptions,
) -> Result<SimulationReport, RunError> {
    let config = FundConfig::from_file(config_path)?;
    let signals = load_signals(signals_path, options)?;
    Ok(run_fund(&config, &signals.rows)?.with_rejected(signals.rejected))
}
