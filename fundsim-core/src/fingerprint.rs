//! Run fingerprinting — deterministic identification of ledgers and configurations.
//!
//! - `Digest`: BLAKE3 hex digest of a value's canonical JSON.
//! - `ledger_digest`: identity of a replayed ledger. Two runs over the same
//!   signals and configuration must produce the same digest, serial or parallel.

use crate::domain::TradeRecord;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Hex-encoded BLAKE3 digest.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Digest(pub String);

impl Digest {
    /// Digest the JSON serialization of `value`.
    ///
    /// Only types with deterministic serialization belong here: structs,
    /// `Vec`s and `BTreeMap`s, never `HashMap`s.
    pub fn of<T: Serialize + ?Sized>(value: &T) -> Result<Self, serde_json::Error> {
        let mut hasher = blake3::Hasher::new();
        serde_json::to_writer(&mut hasher, value)?;
        Ok(Self(hasher.finalize().to_hex().to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self(blake3::hash(bytes).to_hex().to_string())
    }

    /// First `len` characters, for directory names and tables.
    pub fn short(&self, len: usize) -> &str {
        prefix(&self.0, len)
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// First `max` characters of `s`.
///
/// Ids read back from disk are not guaranteed to be hex, so never slice them
/// by byte offset.
pub fn prefix(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Digest of a complete ledger, in ledger order.
pub fn ledger_digest(ledger: &[TradeRecord]) -> Result<Digest, serde_json::Error> {
    Digest::of(ledger)
}
