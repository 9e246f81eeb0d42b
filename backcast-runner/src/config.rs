//! Serializable run configuration.

use backcast_core::engine::MissingPricePolicy;
use backcast_core::metrics::Frequency;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration for a single replay run, loadable from TOML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    pub initial_cash_balance: f64,

    #[serde(default)]
    pub commission_rate: f64,

    /// Granularity of the run's period returns, used for annualization.
    pub frequency: Frequency,

    /// Backtest start date (inclusive).
    pub start_date: NaiveDate,

    /// Backtest end date (inclusive).
    pub end_date: NaiveDate,

    /// Symbol → OHLCV CSV path.
    pub data_paths: HashMap<String, PathBuf>,

    /// How to value held symbols with no bar on a cash-flow boundary day.
    #[serde(default)]
    pub missing_price: MissingPricePolicy,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

impl RunConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    pub fn from_toml_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }
}
