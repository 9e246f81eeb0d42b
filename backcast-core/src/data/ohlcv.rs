//! Price series — sorted bars with range and point queries.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// OHLCV bar for a single symbol at a single timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub ts: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

/// Lookup misses are a distinct condition, not a generic failure, so callers
/// can skip a symbol or period instead of aborting.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("no bar for '{symbol}' in the requested range")]
    NoData { symbol: String },
}

/// Time-sorted price history for one symbol. All timestamps are UTC.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceSeries {
    symbol: String,
    bars: Vec<Bar>,
}

impl PriceSeries {
    /// Bars are sorted on construction; every query relies on the ordering.
    pub fn new(symbol: impl Into<String>, mut bars: Vec<Bar>) -> Self {
        bars.sort_by_key(|b| b.ts);
        Self {
            symbol: symbol.into(),
            bars,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    /// All bars in `[start, end)`.
    pub fn range(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> &[Bar] {
        let lo = self.bars.partition_point(|b| b.ts < start);
        let hi = self.bars.partition_point(|b| b.ts < end);
        &self.bars[lo..hi]
    }

    /// Earliest bar at or after `ts`.
    pub fn at_or_after(&self, ts: DateTime<Utc>) -> Result<&Bar, DataError> {
        let idx = self.bars.partition_point(|b| b.ts < ts);
        self.bars.get(idx).ok_or_else(|| DataError::NoData {
            symbol: self.symbol.clone(),
        })
    }

    /// Latest bar at or before `ts`.
    pub fn last_at_or_before(&self, ts: DateTime<Utc>) -> Result<&Bar, DataError> {
        let idx = self.bars.partition_point(|b| b.ts <= ts);
        if idx == 0 {
            return Err(DataError::NoData {
                symbol: self.symbol.clone(),
            });
        }
        Ok(&self.bars[idx - 1])
    }

    /// Closing price of the last bar within the given trading day
    /// (inclusive day start, exclusive next day).
    pub fn close_on_day(&self, day: NaiveDate) -> Result<f64, DataError> {
        let start = day.and_time(NaiveTime::MIN).and_utc();
        let end = start + Duration::days(1);
        self.range(start, end)
            .last()
            .map(|b| b.close)
            .ok_or_else(|| DataError::NoData {
                symbol: self.symbol.clone(),
            })
    }
}
