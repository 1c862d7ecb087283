//! Signal replay loop — the heart of the simulation.
//!
//! Rows are applied strictly in stream order; each later decision depends on
//! the cash and positions left by every earlier row. Per row:
//! 1. buy: size the trade from available cash, buy at the next open
//! 2. sell: liquidate at the next open
//! 3. hold: revalue at the close
//!
//! A failing row is recorded and skipped; the replay always runs to the end.

use crate::domain::{SignalKind, SignalRow, TradeIntent};
use chrono::NaiveDate;
use tracing::{info, warn};

use super::error::{EngineError, EngineResult};
use super::ledger::{FundLedger, LedgerOutcome};
use super::state::{ReplayReport, RowError, RunResult, RunStats, SimulationConfig, SizingPolicy};

/// Run a complete simulation: build a fund from `config` and replay `signals`.
///
/// Fails only when `config` itself is invalid.
pub fn run_simulation(
    signals: &[SignalRow],
    config: &SimulationConfig,
) -> EngineResult<RunResult> {
    config.validate()?;
    let mut ledger = FundLedger::new(config.starting_value, config.costs.clone())?;

    info!(
        rows = signals.len(),
        starting_value = %config.starting_value,
        "replay started"
    );
    let report = replay(&mut ledger, signals, &config.sizing);
    let fund = ledger.into_state();
    info!(
        trades = fund.ledger().len(),
        errors = report.errors.len(),
        fund_value = %fund.fund_value(),
        "replay finished"
    );

    Ok(RunResult {
        fund,
        costs: config.costs.clone(),
        errors: report.errors,
        stats: report.stats,
    })
}

/// Replay `signals` into a caller-owned ledger.
pub fn replay(
    ledger: &mut FundLedger,
    signals: &[SignalRow],
    sizing: &SizingPolicy,
) -> ReplayReport {
    let mut report = ReplayReport::default();
    let mut previous_date: Option<NaiveDate> = None;

    for (row_index, row) in signals.iter().enumerate() {
        report.stats.rows += 1;

        let result = check_row(row, previous_date)
            .and_then(|()| apply_row(ledger, row, sizing, &mut report.stats));
        match result {
            Ok(()) => previous_date = Some(row.date),
            Err(error) => {
                warn!(
                    row = row_index,
                    instrument = %row.instrument_id,
                    date = %row.date,
                    signal = %row.signal,
                    %error,
                    "row skipped"
                );
                if !matches!(error, EngineError::OutOfOrder { .. }) {
                    previous_date = Some(row.date);
                }
                report.stats.rejected_rows += 1;
                report.errors.push(RowError {
                    row_index,
                    instrument_id: row.instrument_id.clone(),
                    date: row.date,
                    signal: row.signal,
                    error,
                });
            }
        }
    }

    report
}

fn check_row(row: &SignalRow, previous_date: Option<NaiveDate>) -> EngineResult<()> {
    if let Some(previous) = previous_date {
        if row.date < previous {
            return Err(EngineError::OutOfOrder {
                date: row.date,
                previous,
            });
        }
    }
    if !row.confidence.is_finite() {
        return Err(EngineError::InvalidSignal(format!(
            "confidence must be finite, got {}",
            row.confidence
        )));
    }
    if row.instrument_id.trim().is_empty() {
        return Err(EngineError::InvalidSignal("empty instrument id".into()));
    }
    Ok(())
}

fn apply_row(
    ledger: &mut FundLedger,
    row: &SignalRow,
    sizing: &SizingPolicy,
    stats: &mut RunStats,
) -> EngineResult<()> {
    let spread = ledger.costs().spread;
    match row.signal {
        SignalKind::Buy => {
            let Some(funds) = sizing.funds_to_invest(ledger.state().cash_available()) else {
                stats.buys_skipped_low_cash += 1;
                return Ok(());
            };
            match ledger.buy(&execution_intent(row)?, spread, funds)? {
                LedgerOutcome::Executed(_) => stats.buys_executed += 1,
                _ => stats.buys_already_open += 1,
            }
        }
        SignalKind::Sell => match ledger.sell(&execution_intent(row)?, spread)? {
            LedgerOutcome::Executed(_) => stats.sells_executed += 1,
            _ => stats.sells_not_held += 1,
        },
        SignalKind::Hold => match ledger.mark_to_market(&row.instrument_id, row.close_price)? {
            LedgerOutcome::Marked => stats.marks += 1,
            _ => stats.holds_not_held += 1,
        },
    }
    Ok(())
}

/// Trades fill at the next period's open, not at the price that produced the signal.
fn execution_intent(row: &SignalRow) -> EngineResult<TradeIntent> {
    let price = row.next_open_price.ok_or_else(|| {
        EngineError::InvalidSignal(format!("{} signal has no next open price", row.signal))
    })?;
    Ok(TradeIntent::new(
        row.instrument_id.clone(),
        row.date,
        price,
        row.confidence,
    ))
}
