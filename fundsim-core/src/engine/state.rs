//! Simulation configuration, sizing policy and run result types.

use crate::domain::{FundState, InstrumentId, SignalKind};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::cost_model::CostParameters;
use super::error::{EngineError, EngineResult};
use crate::domain::money::round_money;

/// How much of the fund a single buy signal may commit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SizingPolicy {
    /// Buys are skipped once cash falls below this, and no buy is smaller.
    pub min_investment_value: Decimal,
    /// Fraction of available cash allotted per buy, in `(0, 1]`.
    pub max_investment_fraction: Decimal,
}

impl Default for SizingPolicy {
    fn default() -> Self {
        Self {
            min_investment_value: dec!(100000),
            max_investment_fraction: dec!(0.1),
        }
    }
}

impl SizingPolicy {
    pub fn validate(&self) -> EngineResult<()> {
        if self.min_investment_value < Decimal::ZERO {
            return Err(EngineError::invalid(
                "min_investment_value",
                self.min_investment_value,
            ));
        }
        if self.max_investment_fraction <= Decimal::ZERO
            || self.max_investment_fraction > Decimal::ONE
        {
            return Err(EngineError::invalid(
                "max_investment_fraction",
                self.max_investment_fraction,
            ));
        }
        Ok(())
    }

    /// Funds to commit to a buy given `cash_available`, or `None` when cash
    /// is below the minimum investment.
    ///
    /// `min(max(cash × fraction, minimum), cash)`
    pub fn funds_to_invest(&self, cash_available: Decimal) -> Option<Decimal> {
        if cash_available < self.min_investment_value {
            return None;
        }
        let proportional = round_money(cash_available * self.max_investment_fraction);
        Some(proportional.max(self.min_investment_value).min(cash_available))
    }
}

/// Everything needed to replay one fund.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub starting_value: Decimal,
    pub costs: CostParameters,
    pub sizing: SizingPolicy,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            starting_value: dec!(1000000),
            costs: CostParameters::default(),
            sizing: SizingPolicy::default(),
        }
    }
}

impl SimulationConfig {
    pub fn new(starting_value: Decimal, costs: CostParameters, sizing: SizingPolicy) -> Self {
        Self {
            starting_value,
            costs,
            sizing,
        }
    }

    pub fn validate(&self) -> EngineResult<()> {
        if self.starting_value < Decimal::ZERO {
            return Err(EngineError::invalid("starting_value", self.starting_value));
        }
        self.costs.validate()?;
        self.sizing.validate()
    }
}

/// A signal row that could not be applied, with enough context to find it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowError {
    /// Zero-based index into the replayed stream.
    pub row_index: usize,
    pub instrument_id: InstrumentId,
    pub date: NaiveDate,
    pub signal: SignalKind,
    pub error: EngineError,
}

/// Per-outcome counters for one replay.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    pub rows: usize,
    pub buys_executed: usize,
    pub sells_executed: usize,
    pub marks: usize,
    /// Buy signals for an instrument already held.
    pub buys_already_open: usize,
    /// Sell signals for an instrument not held.
    pub sells_not_held: usize,
    /// Hold signals for an instrument not held.
    pub holds_not_held: usize,
    /// Buy signals skipped because cash was below the minimum investment.
    pub buys_skipped_low_cash: usize,
    pub rejected_rows: usize,
}

impl RunStats {
    pub fn trades_executed(&self) -> usize {
        self.buys_executed + self.sells_executed
    }
}

/// Errors and counters from replaying a stream into a ledger.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReplayReport {
    pub errors: Vec<RowError>,
    pub stats: RunStats,
}

/// Result of a complete simulation run.
///
/// A non-empty `errors` list means some rows were skipped; the fund is still
/// consistent and usable.
#[derive(Debug, Clone)]
pub struct RunResult {
    pub fund: FundState,
    pub costs: CostParameters,
    pub errors: Vec<RowError>,
    pub stats: RunStats,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizing_takes_fraction_above_minimum() {
        let sizing = SizingPolicy::default();
        assert_eq!(sizing.funds_to_invest(dec!(1000000)), Some(dec!(100000)));
        assert_eq!(sizing.funds_to_invest(dec!(2500000)), Some(dec!(250000)));
    }

    #[test]
    fn sizing_falls_back_to_minimum() {
        let sizing = SizingPolicy::default();
        assert_eq!(sizing.funds_to_invest(dec!(900072.09)), Some(dec!(100000)));
        assert_eq!(sizing.funds_to_invest(dec!(100000)), Some(dec!(100000)));
    }

    #[test]
    fn sizing_skips_below_minimum() {
        let sizing = SizingPolicy::default();
        assert_eq!(sizing.funds_to_invest(dec!(99999.99)), None);
    }

    #[test]
    fn sizing_is_capped_at_cash() {
        let sizing = SizingPolicy {
            min_investment_value: Decimal::ZERO,
            max_investment_fraction: Decimal::ONE,
        };
        assert_eq!(sizing.funds_to_invest(dec!(1234.56)), Some(dec!(1234.56)));
    }

    #[test]
    fn sizing_validation() {
        assert!(SizingPolicy::default().validate().is_ok());
        let zero_fraction = SizingPolicy {
            max_investment_fraction: Decimal::ZERO,
            ..SizingPolicy::default()
        };
        assert!(zero_fraction.validate().is_err());
        let over_one = SizingPolicy {
            max_investment_fraction: dec!(1.5),
            ..SizingPolicy::default()
        };
        assert!(over_one.validate().is_err());
    }

    #[test]
    fn default_config_validates() {
        let config = SimulationConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.starting_value, dec!(1000000));
    }
}
