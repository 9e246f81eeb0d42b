//! Loads configured symbols into price series.

use crate::config::RunConfig;
use backcast_core::data::{read_ohlcv_csv, resample_to_daily, IngestError, PriceSeries};
use backcast_core::metrics::Frequency;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("symbol '{symbol}': {source}")]
    Ingest {
        symbol: String,
        #[source]
        source: IngestError,
    },

    #[error("symbol '{symbol}': no bars inside the configured date range")]
    Empty { symbol: String },
}

/// Load every configured symbol's CSV, restricted to the run's date range
/// and collapsed to daily bars for daily-frequency runs.
pub fn load_price_data(config: &RunConfig) -> Result<HashMap<String, PriceSeries>, LoadError> {
    let mut series = HashMap::new();
    for (symbol, path) in &config.data_paths {
        let mut bars = read_ohlcv_csv(path).map_err(|source| LoadError::Ingest {
            symbol: symbol.clone(),
            source,
        })?;
        bars.retain(|bar| {
            let day = bar.ts.date_naive();
            day >= config.start_date && day <= config.end_date
        });
        if config.frequency == Frequency::Day {
            bars = resample_to_daily(&bars);
        }
        if bars.is_empty() {
            return Err(LoadError::Empty {
                symbol: symbol.clone(),
            });
        }
        series.insert(symbol.clone(), PriceSeries::new(symbol.clone(), bars));
    }
    Ok(series)
}
