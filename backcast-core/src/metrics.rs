//! Performance metrics — pure functions over snapshot and return history.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Sampling granularity of a bar or return series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Frequency {
    Second,
    Minute,
    Hour,
    Day,
    Week,
    Month,
}

impl Frequency {
    /// Calendar periods per year, for annualization. Only day, week, and
    /// month granularities are supported.
    fn periods_per_year(self) -> Option<f64> {
        match self {
            Frequency::Day => Some(365.0),
            Frequency::Week => Some(52.1429),
            Frequency::Month => Some(12.0),
            Frequency::Second | Frequency::Minute | Frequency::Hour => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("unsupported frequency {0:?} for return annualization")]
    UnsupportedFrequency(Frequency),
}

/// Fractional change from `start` to `end`.
pub fn simple_return(start: f64, end: f64) -> f64 {
    end / start - 1.0
}

/// Annualized time-weighted return: geometric linking of per-period returns,
/// raised to one over the number of years they span.
///
/// Returns 0.0 for an empty series.
pub fn time_weighted_return(returns: &[f64], frequency: Frequency) -> Result<f64, MetricsError> {
    let periods_per_year = frequency
        .periods_per_year()
        .ok_or(MetricsError::UnsupportedFrequency(frequency))?;
    if returns.is_empty() {
        return Ok(0.0);
    }
    let compounded: f64 = returns.iter().map(|r| 1.0 + r).product();
    let years = returns.len() as f64 / periods_per_year;
    Ok(compounded.powf(1.0 / years) - 1.0)
}

/// Maximum peak-to-trough decline over an ordered value series, as a
/// non-positive fraction (e.g. -0.15 for a 15% drawdown).
pub fn max_drawdown(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let mut peak = values[0];
    let mut max_dd = 0.0_f64;

    for &value in values {
        if value > peak {
            peak = value;
        }
        if peak > 0.0 {
            let dd = (value - peak) / peak;
            if dd < max_dd {
                max_dd = dd;
            }
        }
    }
    max_dd
}
