//! Fund configuration loaded from TOML.
//!
//! ```toml
//! name = "baseline"
//!
//! [fund]
//! starting_value = 1000000
//!
//! [costs]
//! spread = 0.01
//! fixed_trade_cost = 250
//! buy_stamp_duty_rate = 0.005
//! sell_stamp_duty_rate = 0.0
//! value_includes_trade_cost = true
//!
//! [sizing]
//! min_investment_value = 100000
//! max_investment_fraction = 0.1
//!
//! [report]
//! period_days = 7
//! ```
//!
//! Every section and key is optional and defaults to the values above.

use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use fundsim_core::engine::{
    CostParameters, EngineError, ReportOptions, SimulationConfig, SizingPolicy,
};
use fundsim_core::fingerprint::Digest;

/// Unique identifier for a fund run (content-addressable hash of the config).
pub type RunId = String;

/// Errors from loading or validating a fund configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(#[from] EngineError),
    #[error("invalid config: report.period_days must be at least 1")]
    PeriodDays,
}

/// `[fund]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FundSection {
    /// Opening cash, in pence.
    pub starting_value: Decimal,
}

impl Default for FundSection {
    fn default() -> Self {
        Self {
            starting_value: SimulationConfig::default().starting_value,
        }
    }
}

/// Complete, serializable configuration for one fund run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct FundConfig {
    /// Label for the run; used in artifact directory names.
    pub name: Option<String>,
    pub fund: FundSection,
    pub costs: CostParameters,
    pub sizing: SizingPolicy,
    pub report: ReportOptions,
}

impl FundConfig {
    /// Load and validate a configuration file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate a configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.to_simulation_config().validate()?;
        if self.report.period_days == 0 {
            return Err(ConfigError::PeriodDays);
        }
        Ok(())
    }

    pub fn to_simulation_config(&self) -> SimulationConfig {
        SimulationConfig::new(
            self.fund.starting_value,
            self.costs.clone(),
            self.sizing.clone(),
        )
    }

    /// Computes a deterministic hash ID for this configuration.
    ///
    /// The name is excluded: two identically parameterized funds share a
    /// run id whatever they are called.
    pub fn run_id(&self) -> Result<RunId, serde_json::Error> {
        let unnamed = Self {
            name: None,
            ..self.clone()
        };
        Ok(Digest::of(&unnamed)?.0)
    }

    /// Display label: the configured name, or `fund`.
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or("fund")
    }
}
