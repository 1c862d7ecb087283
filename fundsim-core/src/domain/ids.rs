use serde::{Deserialize, Serialize};
use std::fmt;

/// Ledger-assigned trade identifier: the record's position in the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TradeId(pub u64);

impl TradeId {
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl From<usize> for TradeId {
    fn from(index: usize) -> Self {
        Self(index as u64)
    }
}

impl fmt::Display for TradeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
