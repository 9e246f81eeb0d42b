//! Single-run orchestration and reporting.

use crate::config::RunConfig;
use crate::data_loader::{load_price_data, LoadError};
use backcast_core::domain::Event;
use backcast_core::engine::{Engine, EngineConfig, EngineError, RunResult};
use backcast_core::metrics::{
    max_drawdown, simple_return, time_weighted_return, Frequency, MetricsError,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Metrics(#[from] MetricsError),
}

/// Headline statistics over a completed run.
#[derive(Debug, Clone, Serialize)]
pub struct PerformanceSummary {
    /// Simple return from the first snapshot to the final portfolio value.
    /// Not cash-flow adjusted; `annualized_return` is.
    pub total_return: f64,
    /// Annualized time-weighted return over the recorded period returns.
    pub annualized_return: f64,
    /// Maximum peak-to-trough decline across snapshot values.
    pub max_drawdown: f64,
}

/// A completed replay plus its summary.
#[derive(Debug)]
pub struct BacktestReport {
    pub result: RunResult,
    pub summary: PerformanceSummary,
}

/// Load the configured data, replay the event stream, and summarize.
pub fn run_events(config: &RunConfig, events: Vec<Event>) -> Result<BacktestReport, RunError> {
    let price_data = load_price_data(config)?;
    let engine_config =
        EngineConfig::new(config.initial_cash_balance).with_missing_price(config.missing_price);
    let result = Engine::new(engine_config, price_data).replay(events)?;
    let summary = summarize(&result, config.frequency)?;
    Ok(BacktestReport { result, summary })
}

/// Compute the summary for an existing result.
pub fn summarize(
    result: &RunResult,
    frequency: Frequency,
) -> Result<PerformanceSummary, MetricsError> {
    let values = result.snapshot_values();
    let total_return = match values.first() {
        Some(&first) if first != 0.0 => simple_return(first, result.portfolio.portfolio_value),
        _ => 0.0,
    };
    Ok(PerformanceSummary {
        total_return,
        annualized_return: time_weighted_return(result.period_returns(), frequency)?,
        max_drawdown: max_drawdown(&values),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use backcast_core::domain::{EventFactory, FilledOrder, Instrument, OrderSide};
    use backcast_core::engine::{Engine, EngineConfig};
    use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
    use std::collections::HashMap;

    fn ts(day: u32) -> DateTime<Utc> {
        NaiveDate::from_ymd_opt(2024, 1, day)
            .unwrap()
            .and_time(NaiveTime::MIN)
            .and_utc()
    }

    fn run_with_marks(marks: &[f64]) -> RunResult {
        let mut factory = EventFactory::new();
        let mut events = vec![factory.filled_order(
            ts(2),
            FilledOrder::new(
                Instrument::stock("SPY"),
                OrderSide::Buy,
                100.0,
                100.0,
                ts(2),
                0.0,
            ),
        )];
        for (i, mark) in marks.iter().enumerate() {
            let day = 3 + i as u32;
            events.push(
                factory.price_update(ts(day), HashMap::from([("SPY".to_string(), *mark)])),
            );
            // A second tiny fill per mark so each mark lands in a snapshot.
            events.push(factory.filled_order(
                ts(day),
                FilledOrder::new(
                    Instrument::stock("SPY"),
                    OrderSide::Buy,
                    0.0,
                    *mark,
                    ts(day),
                    0.0,
                ),
            ));
        }
        Engine::new(EngineConfig::new(10_000.0), HashMap::new())
            .replay(events)
            .unwrap()
    }

    #[test]
    fn summary_total_return_and_drawdown() {
        let result = run_with_marks(&[120.0, 90.0, 130.0]);
        let summary = summarize(&result, Frequency::Day).unwrap();

        // First snapshot: 10_000. Final: cash 0 + 100 * 130.
        assert!((summary.total_return - 0.30).abs() < 1e-12);
        // Snapshot values: 10_000, 12_000, 9_000, 13_000 → trough 9k off a 12k peak.
        let expected_dd = (9_000.0 - 12_000.0) / 12_000.0;
        assert!((summary.max_drawdown - expected_dd).abs() < 1e-12);
        // No cash-flow boundaries → no period returns → flat annualized.
        assert_eq!(summary.annualized_return, 0.0);
    }

    #[test]
    fn summary_of_an_empty_run() {
        let result = Engine::new(EngineConfig::new(1_000.0), HashMap::new())
            .replay(Vec::new())
            .unwrap();
        let summary = summarize(&result, Frequency::Day).unwrap();
        assert_eq!(summary.total_return, 0.0);
        assert_eq!(summary.max_drawdown, 0.0);
        assert_eq!(summary.annualized_return, 0.0);
    }
}
