//! CSV ingest and resampling for OHLCV data.

use super::ohlcv::Bar;
use chrono::{DateTime, NaiveDate, NaiveTime, Timelike, Utc};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to read '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: csv::Error,
    },

    #[error("bad timestamp '{value}': {source}")]
    Timestamp {
        value: String,
        #[source]
        source: chrono::ParseError,
    },
}

/// One row of an OHLCV CSV. `ts_event` is RFC 3339.
#[derive(Debug, Deserialize)]
struct OhlcvRow {
    ts_event: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: u64,
}

/// Read an OHLCV CSV into bars, in file order.
pub fn read_ohlcv_csv(path: &Path) -> Result<Vec<Bar>, IngestError> {
    let read_err = |source| IngestError::Read {
        path: path.display().to_string(),
        source,
    };
    let mut reader = csv::Reader::from_path(path).map_err(read_err)?;
    let mut bars = Vec::new();
    for row in reader.deserialize::<OhlcvRow>() {
        let row = row.map_err(read_err)?;
        let ts = row
            .ts_event
            .parse::<DateTime<Utc>>()
            .map_err(|source| IngestError::Timestamp {
                value: row.ts_event.clone(),
                source,
            })?;
        bars.push(Bar {
            ts,
            open: row.open,
            high: row.high,
            low: row.low,
            close: row.close,
            volume: row.volume,
        });
    }
    Ok(bars)
}

/// Keep only regular-trading-hour bars (13:00–20:00 UTC) from an hourly
/// series.
pub fn filter_regular_hours(bars: Vec<Bar>) -> Vec<Bar> {
    bars.into_iter()
        .filter(|b| (13..=20).contains(&b.ts.hour()))
        .collect()
}

/// Resample intraday bars to one bar per calendar day: first open, max high,
/// min low, last close, summed volume. The daily bar is stamped at midnight
/// UTC of its day.
pub fn resample_to_daily(bars: &[Bar]) -> Vec<Bar> {
    let mut days: BTreeMap<NaiveDate, Vec<&Bar>> = BTreeMap::new();
    for bar in bars {
        days.entry(bar.ts.date_naive()).or_default().push(bar);
    }
    days.into_iter()
        .map(|(day, mut group)| {
            group.sort_by_key(|b| b.ts);
            Bar {
                ts: day.and_time(NaiveTime::MIN).and_utc(),
                open: group[0].open,
                high: group.iter().map(|b| b.high).fold(f64::MIN, f64::max),
                low: group.iter().map(|b| b.low).fold(f64::MAX, f64::min),
                close: group[group.len() - 1].close,
                volume: group.iter().map(|b| b.volume).sum(),
            }
        })
        .collect()
}
