//! Backcast Core — event-driven accounting engine for historical replay.
//!
//! This crate contains the heart of the backtester:
//! - Domain types (instruments, events, orders, positions, portfolio)
//! - Single-pass replay loop over a time-ordered event stream
//! - Performance metrics (simple return, time-weighted return, drawdown)
//! - Market-data boundary (price series, option chains, CSV ingest)

pub mod data;
pub mod domain;
pub mod engine;
pub mod metrics;
