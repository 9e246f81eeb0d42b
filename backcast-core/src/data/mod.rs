//! Market-data boundary: in-process contracts over already-loaded data.
//!
//! The engine consumes only closing prices; everything here exists so that
//! lookup misses surface as skippable conditions instead of aborts.

pub mod ingest;
pub mod ohlcv;
pub mod option_chain;

pub use ingest::{filter_regular_hours, read_ohlcv_csv, resample_to_daily, IngestError};
pub use ohlcv::{Bar, DataError, PriceSeries};
pub use option_chain::{ContractQuote, OptionChain, OptionQuote};
