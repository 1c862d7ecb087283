//! Engine errors.
//!
//! Failures are fatal to the single operation that raised them, never to a
//! replay. "Nothing to do" outcomes (position already open, nothing to sell)
//! are not errors; see `LedgerOutcome`.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
pub enum EngineError {
    #[error("invalid parameter {name}: {value}")]
    InvalidParameter { name: String, value: String },

    #[error("insufficient funds: trade needs {required}, {available} available")]
    InsufficientFunds {
        required: Decimal,
        available: Decimal,
    },

    #[error("row dated {date} is earlier than the previous row ({previous})")]
    OutOfOrder { date: NaiveDate, previous: NaiveDate },

    #[error("invalid signal row: {0}")]
    InvalidSignal(String),
}

impl EngineError {
    pub fn invalid(name: &str, value: impl ToString) -> Self {
        EngineError::InvalidParameter {
            name: name.to_string(),
            value: value.to_string(),
        }
    }

    /// Stable snake_case tag for tabular export.
    pub fn kind(&self) -> &'static str {
        match self {
            EngineError::InvalidParameter { .. } => "invalid_parameter",
            EngineError::InsufficientFunds { .. } => "insufficient_funds",
            EngineError::OutOfOrder { .. } => "out_of_order",
            EngineError::InvalidSignal(_) => "invalid_signal",
        }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
