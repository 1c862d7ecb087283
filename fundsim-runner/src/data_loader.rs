//! Signal loading for the runner.
//!
//! Reads a CSV signal stream into `SignalRow`s. Column names from the
//! upstream signal pipeline are accepted as aliases:
//!
//! | column            | alias            |
//! |-------------------|------------------|
//! | `instrument_id`   | `ticker`         |
//! | `next_open_price` | `open_shift_neg1`|
//! | `close_price`     | `close`          |
//! | `confidence`      | `signal_prob`    |
//! | `reference_price` | `open`           |
//!
//! Extra columns are ignored. Only a structurally unreadable file fails the
//! load: a bad header, or a date or number that does not parse. A line whose
//! signal label is not buy, sell or hold is set aside as a `RejectedSignal`
//! and the rest of the file still loads. Everything else that parses, such as
//! negative prices or an empty instrument id, is replayed and left for the
//! replay loop to record as a row error.

use std::io;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use fundsim_core::domain::{sort_for_replay, InstrumentId, SignalKind, SignalRow};
use fundsim_core::engine::EngineError;

/// Errors from the signal loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot open signals {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("line {line}: {source}")]
    Csv {
        line: u64,
        #[source]
        source: csv::Error,
    },
}

/// A CSV line that parsed but carries a signal label the fund cannot act on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectedSignal {
    /// One-based line in the source file; the header is line 1.
    pub line: u64,
    pub instrument_id: InstrumentId,
    pub date: NaiveDate,
    pub label: String,
    pub error: EngineError,
}

/// Rows ready for replay, plus the lines set aside while reading them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SignalFile {
    pub rows: Vec<SignalRow>,
    pub rejected: Vec<RejectedSignal>,
}

/// Options controlling how signals are loaded.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Sort into replay order (date ascending, confidence descending).
    /// Disable only for streams that are already in the intended order.
    pub sort: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self { sort: true }
    }
}

/// One CSV record, before its signal label is interpreted.
#[derive(Debug, Deserialize)]
struct CsvSignal {
    #[serde(alias = "ticker")]
    instrument_id: String,
    date: NaiveDate,
    #[serde(alias = "close", with = "rust_decimal::serde::str")]
    close_price: Decimal,
    #[serde(
        alias = "open_shift_neg1",
        default,
        with = "rust_decimal::serde::str_option"
    )]
    next_open_price: Option<Decimal>,
    #[serde(alias = "open", default, with = "rust_decimal::serde::str_option")]
    reference_price: Option<Decimal>,
    signal: String,
    #[serde(alias = "signal_prob")]
    confidence: f64,
}

impl CsvSignal {
    fn into_row(self, line: u64) -> Result<SignalRow, RejectedSignal> {
        let instrument_id = self.instrument_id.trim().to_string();
        let signal: SignalKind = match self.signal.parse() {
            Ok(signal) => signal,
            Err(message) => {
                return Err(RejectedSignal {
                    line,
                    instrument_id,
                    date: self.date,
                    label: self.signal,
                    error: EngineError::InvalidSignal(message),
                })
            }
        };

        let row = SignalRow::new(
            instrument_id,
            self.date,
            signal,
            self.close_price,
            self.next_open_price,
            self.confidence,
        );
        Ok(match self.reference_price {
            Some(price) => row.with_reference_price(price),
            None => row,
        })
    }
}

/// Load signals from a CSV file.
pub fn load_signals(path: &Path, options: &LoadOptions) -> Result<SignalFile, LoadError> {
    let file = std::fs::File::open(path).map_err(|source| LoadError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let signals = read_signals(file, options)?;
    info!(
        path = %path.display(),
        rows = signals.rows.len(),
        rejected = signals.rejected.len(),
        "signals loaded"
    );
    Ok(signals)
}

/// Read signals from any CSV source with a header row.
pub fn read_signals<R: io::Read>(
    reader: R,
    options: &LoadOptions,
) -> Result<SignalFile, LoadError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = rdr
        .headers()
        .map_err(|source| LoadError::Csv { line: 1, source })?
        .clone();

    let mut signals = SignalFile::default();
    for result in rdr.records() {
        let record = result.map_err(|source| LoadError::Csv {
            line: error_line(&source),
            source,
        })?;
        let line = record.position().map_or(0, |p| p.line());
        let parsed: CsvSignal = record
            .deserialize(Some(&headers))
            .map_err(|source| LoadError::Csv { line, source })?;
        match parsed.into_row(line) {
            Ok(row) => signals.rows.push(row),
            Err(rejected) => {
                warn!(
                    line,
                    instrument = %rejected.instrument_id,
                    label = %rejected.label,
                    "signal line rejected"
                );
                signals.rejected.push(rejected);
            }
        }
    }

    if options.sort {
        sort_for_replay(&mut signals.rows);
    }
    Ok(signals)
}

fn error_line(error: &csv::Error) -> u64 {
    error.position().map_or(0, |p| p.line())
}
