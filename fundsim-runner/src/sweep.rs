//! Fund sweeps — many independent fund configurations over one signal stream.
//!
//! Each fund owns its own ledger, so funds run in parallel with rayon. A fund
//! is never split across threads; its rows are always replayed in order.

use rayon::prelude::*;
use tracing::info;

use fundsim_core::domain::SignalRow;
use fundsim_core::fingerprint::prefix;

use crate::config::FundConfig;
use crate::runner::{run_fund, RunError, SimulationReport};

/// Runs a set of fund configurations against the same signals.
#[derive(Debug, Clone)]
pub struct FundSweep {
    parallel: bool,
}

impl Default for FundSweep {
    fn default() -> Self {
        Self { parallel: true }
    }
}

impl FundSweep {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables or disables parallel execution across funds.
    pub fn with_parallelism(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Runs every configuration. Results keep the order of `configs`.
    ///
    /// Fails on the first configuration error; row errors inside a fund are
    /// part of that fund's report.
    pub fn sweep(
        &self,
        configs: &[FundConfig],
        signals: &[SignalRow],
    ) -> Result<SweepResults, RunError> {
        info!(
            funds = configs.len(),
            rows = signals.len(),
            parallel = self.parallel,
            "sweep started"
        );
        let results: Vec<SimulationReport> = if self.parallel {
            configs
                .par_iter()
                .map(|config| run_fund(config, signals))
                .collect::<Result<Vec<_>, _>>()?
        } else {
            configs
                .iter()
                .map(|config| run_fund(config, signals))
                .collect::<Result<Vec<_>, _>>()?
        };
        Ok(SweepResults { results })
    }
}

/// Reports from a sweep, in configuration order.
#[derive(Debug, Clone)]
pub struct SweepResults {
    results: Vec<SimulationReport>,
}

impl SweepResults {
    pub fn all(&self) -> &[SimulationReport] {
        &self.results
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn get(&self, run_id: &str) -> Option<&SimulationReport> {
        self.results.iter().find(|r| r.run_id == run_id)
    }

    /// Reports ranked by final fund value, highest first.
    ///
    /// Ties keep configuration order.
    pub fn ranked(&self) -> Vec<&SimulationReport> {
        let mut ranked: Vec<&SimulationReport> = self.results.iter().collect();
        ranked.sort_by(|a, b| b.summary.fund_value.cmp(&a.summary.fund_value));
        ranked
    }

    pub fn top_n(&self, n: usize) -> Vec<&SimulationReport> {
        self.ranked().into_iter().take(n).collect()
    }

    pub fn best(&self) -> Option<&SimulationReport> {
        self.ranked().into_iter().next()
    }

    /// Plain-text ranking table for terminal output.
    pub fn ranking_table(&self) -> String {
        let mut out = format!(
            "{:<4} {:<20} {:<12} {:>16} {:>9} {:>7} {:>9} {:>7}\n",
            "#", "fund", "run", "fund value", "roi", "trades", "win rate", "errors"
        );
        for (rank, r) in self.ranked().iter().enumerate() {
            let s = &r.summary;
            let win_rate = s
                .win_rate
                .map(|w| format!("{:.1}%", w * 100.0))
                .unwrap_or_else(|| "n/a".into());
            out.push_str(&format!(
                "{:<4} {:<20} {:<12} {:>16} {:>8.2}% {:>7} {:>9} {:>7}\n",
                rank + 1,
                prefix(&r.name, 20),
                r.short_id(),
                s.fund_value.to_string(),
                s.overall_roi * 100.0,
                r.ledger.len(),
                win_rate,
                r.error_count(),
            ));
        }
        out
    }
}
