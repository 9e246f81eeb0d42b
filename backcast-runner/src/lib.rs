//! Backcast Runner — orchestration on top of `backcast-core`.
//!
//! This crate builds on the core engine to provide:
//! - TOML run configuration
//! - CSV data loading into price series
//! - DCA event-schedule generation
//! - Single-run reporting (total return, annualized TWR, max drawdown)
//! - Rolling-window sampling for model evaluation

pub mod config;
pub mod data_loader;
pub mod dca;
pub mod runner;
pub mod sampling;

pub use config::{ConfigError, RunConfig};
pub use data_loader::{load_price_data, LoadError};
pub use dca::{DcaPlan, ScheduleError};
pub use runner::{run_events, summarize, BacktestReport, PerformanceSummary, RunError};
pub use sampling::{
    evaluate_windows, exponential_weight, rolling_windows, weighted_sample_indices, WindowPlan,
    WindowSplit,
};
