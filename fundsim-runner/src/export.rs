//! Reporting and export — JSON, CSV, and Markdown artifact generation.
//!
//! Provides three export formats for fund results:
//! - **JSON**: full round-trip serialization with schema versioning
//! - **CSV**: ledger, completed trades, row errors and rejected source lines
//! - **Markdown**: human-readable single-run summary
//!
//! All persisted artifacts include a `schema_version` field. Unknown versions
//! are rejected on load.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use fundsim_core::domain::{CompletedTrade, TradeRecord};
use fundsim_core::engine::{ReportSummary, RowError};

use crate::data_loader::RejectedSignal;
use crate::runner::{SimulationReport, SCHEMA_VERSION};

// ─── JSON export ────────────────────────────────────────────────────

/// Serialize a `SimulationReport` to pretty JSON.
pub fn export_json(report: &SimulationReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("failed to serialize SimulationReport to JSON")
}

/// Deserialize a `SimulationReport` from JSON, rejecting unknown schema versions.
pub fn import_json(json: &str) -> Result<SimulationReport> {
    let report: SimulationReport =
        serde_json::from_str(json).context("failed to deserialize SimulationReport from JSON")?;
    if report.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            report.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(report)
}

// ─── CSV export ─────────────────────────────────────────────────────

/// Export the ledger as CSV, one row per trade record.
pub fn export_ledger_csv(ledger: &[TradeRecord]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "trade_id",
        "direction",
        "instrument_id",
        "date",
        "confidence",
        "reference_price",
        "spread",
        "ask_price",
        "bid_price",
        "share_volume",
        "trade_value",
        "stamp_duty",
        "fixed_trade_cost",
        "spread_cost",
        "ledger_value",
        "holding_mark_value",
        "invested_value_pre",
        "invested_value_post",
        "cash_available_pre",
        "cash_available_post",
        "opening_trade_id",
    ])?;

    for t in ledger {
        wtr.write_record([
            &t.trade_id.to_string(),
            t.direction.as_str(),
            &t.instrument_id,
            &t.date.to_string(),
            &t.confidence.to_string(),
            &t.reference_price.to_string(),
            &t.spread.to_string(),
            &t.ask_price.to_string(),
            &t.bid_price.to_string(),
            &t.share_volume.to_string(),
            &t.trade_value.to_string(),
            &t.stamp_duty.to_string(),
            &t.fixed_trade_cost.to_string(),
            &t.spread_cost.to_string(),
            &t.ledger_value.to_string(),
            &t.holding_mark_value.to_string(),
            &t.invested_value_pre.to_string(),
            &t.invested_value_post.to_string(),
            &t.cash_available_pre.to_string(),
            &t.cash_available_post.to_string(),
            &opt(t.opening_trade_id),
        ])?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Export completed trades as CSV. Sell columns are empty for open trades.
pub fn export_trades_csv(trades: &[CompletedTrade]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "instrument_id",
        "share_volume",
        "buy_date",
        "buy_price",
        "buy_spend",
        "buy_confidence",
        "sell_date",
        "sell_price",
        "sell_spend",
        "sell_confidence",
        "holding_periods",
        "profit_loss",
        "holding_value",
        "roi",
    ])?;

    for t in trades {
        wtr.write_record([
            &t.instrument_id,
            &t.share_volume.to_string(),
            &t.buy_date.to_string(),
            &t.buy_price.to_string(),
            &t.buy_spend.to_string(),
            &t.buy_confidence.to_string(),
            &opt(t.sell_date),
            &opt(t.sell_price),
            &opt(t.sell_spend),
            &opt(t.sell_confidence),
            &t.holding_periods.map(|p| format!("{p:.2}")).unwrap_or_default(),
            &opt(t.profit_loss),
            &t.holding_value.to_string(),
            &format!("{:.6}", t.roi),
        ])?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Export rows the replay skipped, with the reason.
pub fn export_errors_csv(errors: &[RowError]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["row_index", "instrument_id", "date", "signal", "kind", "error"])?;
    for e in errors {
        wtr.write_record([
            &e.row_index.to_string(),
            &e.instrument_id,
            &e.date.to_string(),
            e.signal.as_str(),
            e.error.kind(),
            &e.error.to_string(),
        ])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Export source lines the loader set aside, keyed by file line.
pub fn export_rejected_csv(rejected: &[RejectedSignal]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["line", "instrument_id", "date", "label", "error"])?;
    for r in rejected {
        wtr.write_record([
            &r.line.to_string(),
            &r.instrument_id,
            &r.date.to_string(),
            &r.label,
            &r.error.to_string(),
        ])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

fn opt<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Directory name for a run: `{name}_{run id prefix}`.
pub fn artifact_dir_name(report: &SimulationReport) -> String {
    let name: String = report
        .name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("{}_{}", name, report.short_id())
}

/// Save the full artifact set for a single fund run.
///
/// Creates a directory named `{name}_{run id prefix}/` under `output_dir`
/// containing:
/// - `result.json` — the full `SimulationReport`
/// - `ledger.csv` — one row per trade record
/// - `trades.csv` — completed (and still open) trades
/// - `errors.csv` — skipped signal rows
/// - `rejected.csv` — source lines with an unknown signal label
/// - `report.md` — Markdown summary
///
/// Returns the path to the created directory.
pub fn save_artifacts(report: &SimulationReport, output_dir: &Path) -> Result<PathBuf> {
    let run_dir = output_dir.join(artifact_dir_name(report));
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create artifact dir: {}", run_dir.display()))?;

    let files = [
        ("result.json", export_json(report)?),
        ("ledger.csv", export_ledger_csv(&report.ledger)?),
        ("trades.csv", export_trades_csv(&report.trades)?),
        ("errors.csv", export_errors_csv(&report.errors)?),
        ("rejected.csv", export_rejected_csv(&report.rejected)?),
        ("report.md", generate_report(report)),
    ];
    for (file, contents) in files {
        let path = run_dir.join(file);
        std::fs::write(&path, contents)
            .with_context(|| format!("failed to write {}", path.display()))?;
    }

    Ok(run_dir)
}

/// Load a `SimulationReport` from an artifact directory's result.json.
///
/// Rejects unknown schema versions.
pub fn load_artifacts(dir: &Path) -> Result<SimulationReport> {
    let result_path = dir.join("result.json");
    let json = std::fs::read_to_string(&result_path)
        .with_context(|| format!("failed to read {}", result_path.display()))?;
    import_json(&json)
}

// ─── Markdown reports ───────────────────────────────────────────────

/// Generate a Markdown report for a single fund run.
pub fn generate_report(report: &SimulationReport) -> String {
    let mut md = String::with_capacity(2048);

    md.push_str(&format!("# Fund Report: {}\n\n", report.name));

    // Metadata
    let costs = &report.config.costs;
    let sizing = &report.config.sizing;
    md.push_str("## Metadata\n\n");
    md.push_str("| Field | Value |\n");
    md.push_str("| --- | --- |\n");
    md.push_str(&format!("| Run ID | {} |\n", report.short_id()));
    md.push_str(&format!("| Signals | {} |\n", report.signal_count));
    md.push_str(&format!("| Spread | {} |\n", costs.spread));
    md.push_str(&format!("| Fixed Trade Cost | {} |\n", costs.fixed_trade_cost));
    md.push_str(&format!(
        "| Stamp Duty (buy / sell) | {} / {} |\n",
        costs.buy_stamp_duty_rate, costs.sell_stamp_duty_rate
    ));
    md.push_str(&format!(
        "| Sizing | {} of cash, min {} |\n",
        sizing.max_investment_fraction, sizing.min_investment_value
    ));
    md.push_str(&format!("| Ledger Digest | {} |\n", report.ledger_digest.short(16)));
    md.push('\n');

    md.push_str(&format_summary(&report.summary));

    // Replay
    let st = &report.stats;
    md.push_str("## Replay\n\n");
    md.push_str("| Outcome | Rows |\n");
    md.push_str("| --- | ---: |\n");
    md.push_str(&format!("| Buys executed | {} |\n", st.buys_executed));
    md.push_str(&format!("| Sells executed | {} |\n", st.sells_executed));
    md.push_str(&format!("| Marks | {} |\n", st.marks));
    md.push_str(&format!("| Buy, already held | {} |\n", st.buys_already_open));
    md.push_str(&format!("| Sell, not held | {} |\n", st.sells_not_held));
    md.push_str(&format!("| Hold, not held | {} |\n", st.holds_not_held));
    md.push_str(&format!("| Buy, low cash | {} |\n", st.buys_skipped_low_cash));
    md.push_str(&format!("| Rejected | {} |\n", st.rejected_rows));
    md.push('\n');

    if !report.errors.is_empty() {
        md.push_str("## Row Errors\n\n");
        for e in report.errors.iter().take(20) {
            md.push_str(&format!(
                "- row {} {} {} {}: {}\n",
                e.row_index, e.date, e.instrument_id, e.signal, e.error
            ));
        }
        if report.errors.len() > 20 {
            md.push_str(&format!("- … {} more in errors.csv\n", report.errors.len() - 20));
        }
        md.push('\n');
    }

    if !report.rejected.is_empty() {
        md.push_str("## Rejected Lines\n\n");
        for r in report.rejected.iter().take(20) {
            md.push_str(&format!(
                "- line {} {} {} '{}': {}\n",
                r.line, r.date, r.instrument_id, r.label, r.error
            ));
        }
        if report.rejected.len() > 20 {
            md.push_str(&format!(
                "- … {} more in rejected.csv\n",
                report.rejected.len() - 20
            ));
        }
        md.push('\n');
    }

    md
}

fn format_summary(s: &ReportSummary) -> String {
    fn pct(v: Option<f64>) -> String {
        v.map(|v| format!("{:.2}%", v * 100.0))
            .unwrap_or_else(|| "n/a".into())
    }
    fn f2(v: Option<f64>) -> String {
        v.map(|v| format!("{v:.2}")).unwrap_or_else(|| "n/a".into())
    }

    let mut md = String::new();
    md.push_str("## Performance Summary\n\n");
    md.push_str("| Metric | Value |\n");
    md.push_str("| --- | --- |\n");
    md.push_str(&format!("| Starting Value | {} |\n", s.starting_value));
    md.push_str(&format!("| Cash Available | {} |\n", s.cash_available));
    md.push_str(&format!("| Invested (mark) | {} |\n", s.invested_mark_value));
    md.push_str(&format!("| Fund Value | {} |\n", s.fund_value));
    md.push_str(&format!("| Overall ROI | {} |\n", pct(Some(s.overall_roi))));
    md.push_str(&format!(
        "| Cost of Doing Business | {} |\n",
        s.cost_of_doing_business
    ));
    md.push_str(&format!(
        "| Closed Trades | {} (P/L {}) |\n",
        s.closed_trades, s.closed_profit_loss
    ));
    md.push_str(&format!(
        "| Open Trades | {} (value {}, cost {}) |\n",
        s.open_trades, s.open_value, s.open_cost
    ));
    md.push_str(&format!("| Total Value Gained | {} |\n", s.total_value_gained));
    md.push_str(&format!("| Win Rate | {} |\n", pct(s.win_rate)));
    md.push_str(&format!("| Mean ROI | {} |\n", pct(s.mean_roi)));
    md.push_str(&format!(
        "| Mean ROI, winners ({}) | {} |\n",
        s.positive_trades,
        pct(s.mean_positive_roi)
    ));
    md.push_str(&format!(
        "| Mean ROI, losers ({}) | {} |\n",
        s.non_positive_trades,
        pct(s.mean_non_positive_roi)
    ));
    md.push_str(&format!(
        "| Mean Holding Periods | {} |\n",
        f2(s.mean_holding_periods)
    ));
    md.push_str(&format!(
        "| Mean Holding Periods, winners | {} |\n",
        f2(s.mean_positive_holding_periods)
    ));
    md.push_str(&format!(
        "| Mean Holding Periods, losers | {} |\n",
        f2(s.mean_non_positive_holding_periods)
    ));
    md.push('\n');
    md
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FundConfig;
    use crate::runner::run_fund;
    use chrono::NaiveDate;
    use fundsim_core::domain::{SignalKind, SignalRow};
    use fundsim_core::engine::EngineError;
    use rust_decimal_macros::dec;

    fn sample_report() -> SimulationReport {
        let d1 = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let d2 = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let signals = vec![
            SignalRow::new("AAA", d1, SignalKind::Buy, dec!(99), Some(dec!(100)), 0.9),
            SignalRow::new("BBB", d1, SignalKind::Buy, dec!(49), None, 0.8),
            SignalRow::new("AAA", d2, SignalKind::Sell, dec!(111), Some(dec!(110)), 0.3),
            SignalRow::new("CCC", d2, SignalKind::Buy, dec!(20), Some(dec!(21)), 0.2),
        ];
        let config = FundConfig {
            name: Some("weekly fund".into()),
            ..FundConfig::default()
        };
        let rejected = vec![RejectedSignal {
            line: 6,
            instrument_id: "DDD".into(),
            date: d2,
            label: "buyy".into(),
            error: EngineError::InvalidSignal("unknown signal 'buyy'".into()),
        }];
        run_fund(&config, &signals).unwrap().with_rejected(rejected)
    }

    #[test]
    fn json_roundtrip_preserves_report() {
        let report = sample_report();
        let json = export_json(&report).unwrap();
        let back = import_json(&json).unwrap();
        assert_eq!(back.run_id, report.run_id);
        assert_eq!(back.ledger, report.ledger);
        assert_eq!(back.errors, report.errors);
        assert_eq!(back.rejected, report.rejected);
        assert_eq!(back.ledger_digest, report.ledger_digest);
    }

    #[test]
    fn import_rejects_future_schema() {
        let mut report = sample_report();
        report.schema_version = SCHEMA_VERSION + 1;
        let json = serde_json::to_string(&report).unwrap();
        assert!(import_json(&json).is_err());
    }

    #[test]
    fn ledger_csv_has_one_row_per_record() {
        let report = sample_report();
        let csv = export_ledger_csv(&report.ledger).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), report.ledger.len() + 1);
        assert!(lines[0].starts_with("trade_id,direction,instrument_id,date"));
        assert!(lines[0].ends_with("opening_trade_id"));
        assert!(lines[1].starts_with("0,buy,AAA,2024-01-01"));
        assert!(lines[1].contains("-99927.91"));
        // The sell closes trade 0.
        assert!(lines[2].starts_with("1,sell,AAA,2024-01-15"));
        assert!(lines[2].ends_with(",0"));
    }

    #[test]
    fn trades_csv_leaves_open_sell_columns_empty() {
        let report = sample_report();
        let csv = export_trades_csv(&report.trades).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("AAA,982,2024-01-01"));
        assert!(lines[2].starts_with("CCC,"));
        assert!(lines[2].contains(",,,,,,"));
    }

    #[test]
    fn errors_csv_lists_skipped_rows() {
        let report = sample_report();
        let csv = export_errors_csv(&report.errors).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].contains("BBB"));
        assert!(lines[1].contains("invalid_signal"));
    }

    #[test]
    fn rejected_csv_lists_source_lines() {
        let report = sample_report();
        let csv = export_rejected_csv(&report.rejected).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "line,instrument_id,date,label,error");
        assert!(lines[1].starts_with("6,DDD,2024-01-15,buyy,"));
    }

    #[test]
    fn report_from_hand_edited_json_renders() {
        let mut report = sample_report();
        report.run_id = "é".repeat(8);
        report.ledger_digest = fundsim_core::fingerprint::Digest("ü".repeat(20));
        let back = import_json(&export_json(&report).unwrap()).unwrap();
        let md = generate_report(&back);
        assert!(md.contains(&format!("| Run ID | {} |", "é".repeat(8))));
        assert!(md.contains(&format!("| Ledger Digest | {} |", "ü".repeat(16))));
    }

    #[test]
    fn report_markdown_has_sections() {
        let md = generate_report(&sample_report());
        assert!(md.starts_with("# Fund Report: weekly fund"));
        assert!(md.contains("## Performance Summary"));
        assert!(md.contains("## Replay"));
        assert!(md.contains("## Row Errors"));
        assert!(md.contains("## Rejected Lines"));
        assert!(md.contains("| Win Rate |"));
    }

    #[test]
    fn artifact_dir_name_is_sanitized() {
        let report = sample_report();
        let name = artifact_dir_name(&report);
        assert!(name.starts_with("weekly_fund_"));
        assert!(name.ends_with(report.short_id()));
    }

    #[test]
    fn save_and_load_artifacts() {
        let report = sample_report();
        let dir = tempfile::tempdir().unwrap();
        let run_dir = save_artifacts(&report, dir.path()).unwrap();
        for file in [
            "result.json",
            "ledger.csv",
            "trades.csv",
            "errors.csv",
            "rejected.csv",
            "report.md",
        ] {
            assert!(run_dir.join(file).exists(), "missing {file}");
        }
        let loaded = load_artifacts(&run_dir).unwrap();
        assert_eq!(loaded.run_id, report.run_id);
        assert_eq!(loaded.ledger, report.ledger);
    }
}
