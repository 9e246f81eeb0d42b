//! Replay loop — single-pass dispatch of a time-ordered event stream.

use crate::data::PriceSeries;
use crate::domain::{
    Event, EventId, EventKind, LedgerError, OrderId, OrderStatus, Portfolio, PortfolioSnapshot,
    RestingOrder,
};
use crate::metrics::simple_return;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use thiserror::Error;
use tracing::warn;

use super::state::{EngineConfig, MissingPricePolicy, RunResult};

/// Fatal replay failures. Each carries the triggering event so the caller
/// can report exactly where the run broke.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("event {id} at {ts}: {source}")]
    Ledger {
        id: EventId,
        ts: DateTime<Utc>,
        #[source]
        source: LedgerError,
    },

    #[error("event {id} at {ts}: unsupported event: {detail}")]
    UnsupportedEvent {
        id: EventId,
        ts: DateTime<Utc>,
        detail: String,
    },
}

/// Replays a chronologically ordered event stream against a simulated
/// account.
///
/// Strictly sequential, single pass, no backtracking. The engine is the sole
/// owner of the portfolio for the duration of the run; nothing else may
/// mutate it.
pub struct Engine {
    config: EngineConfig,
    portfolio: Portfolio,
    price_data: HashMap<String, PriceSeries>,
    open_orders: HashMap<OrderId, RestingOrder>,
    last_portfolio_value: Option<f64>,
    snapshots: Vec<PortfolioSnapshot>,
}

impl Engine {
    pub fn new(config: EngineConfig, price_data: HashMap<String, PriceSeries>) -> Self {
        let portfolio = Portfolio::new(config.initial_cash_balance);
        Self {
            config,
            portfolio,
            price_data,
            open_orders: HashMap::new(),
            last_portfolio_value: None,
            snapshots: Vec::new(),
        }
    }

    /// Replay the whole stream and return the final state.
    ///
    /// Events are stable-ordered by `(ts, id)` first, so equal timestamps
    /// keep their arrival order.
    pub fn replay(mut self, mut events: Vec<Event>) -> Result<RunResult, EngineError> {
        events.sort_by_key(|e| e.sort_key());
        for event in &events {
            self.apply(event)?;
        }
        Ok(RunResult {
            portfolio: self.portfolio,
            snapshots: self.snapshots,
        })
    }

    fn apply(&mut self, event: &Event) -> Result<(), EngineError> {
        match &event.kind {
            EventKind::FilledOrder(order) => {
                self.portfolio
                    .fill_order(order)
                    .map_err(|source| EngineError::Ledger {
                        id: event.id,
                        ts: event.ts,
                        source,
                    })?;
                let prices = HashMap::from([(order.symbol(), order.filled_price)]);
                self.portfolio.update_portfolio(Some(&prices));
                self.snapshots.push(self.portfolio.snapshot());
            }
            EventKind::RestingOrder(order) => {
                if order.status != OrderStatus::Open {
                    return Err(EngineError::UnsupportedEvent {
                        id: event.id,
                        ts: event.ts,
                        detail: format!(
                            "resting order {} arrived with status {:?}",
                            order.order_id, order.status
                        ),
                    });
                }
                self.open_orders.insert(order.order_id, order.clone());
            }
            EventKind::CanceledOrder { order_id, .. } => {
                if self.open_orders.remove(order_id).is_none() {
                    warn!(%order_id, "cancel for an order that is not open");
                }
            }
            EventKind::CashFlowChange { amount } => {
                if let Some(last_value) = self.last_portfolio_value {
                    let prices = self.boundary_prices(event.ts);
                    self.portfolio.update_portfolio(Some(&prices));
                    let period_return = simple_return(last_value, self.portfolio.portfolio_value);
                    self.portfolio.period_returns.push(period_return);
                }
                self.portfolio.add_cash_flow(*amount);
                self.last_portfolio_value = Some(self.portfolio.portfolio_value);
            }
            EventKind::PriceUpdate { prices } => {
                self.portfolio.update_portfolio(Some(prices));
            }
            EventKind::OptionExpired { instrument } => {
                self.portfolio.option_expired(instrument);
            }
            EventKind::OptionAssigned { instrument } => {
                self.portfolio
                    .option_assigned(instrument, event.ts)
                    .map_err(|source| EngineError::Ledger {
                        id: event.id,
                        ts: event.ts,
                        source,
                    })?;
            }
        }
        Ok(())
    }

    /// Closing prices for every held symbol on the boundary's trading day.
    ///
    /// A symbol with no usable price is skipped, or marked at the last known
    /// close, depending on the configured policy. Neither case aborts.
    fn boundary_prices(&self, ts: DateTime<Utc>) -> HashMap<String, f64> {
        let day = ts.date_naive();
        let mut prices = HashMap::new();
        for symbol in self.portfolio.positions.keys() {
            let Some(series) = self.price_data.get(symbol) else {
                warn!(%symbol, "no price series for held symbol");
                continue;
            };
            match series.close_on_day(day) {
                Ok(close) => {
                    prices.insert(symbol.clone(), close);
                }
                Err(_) => match self.config.missing_price {
                    MissingPricePolicy::Skip => {
                        warn!(%symbol, %day, "no bar on cash-flow boundary, keeping previous mark");
                    }
                    MissingPricePolicy::LastKnown => match series.last_at_or_before(ts) {
                        Ok(bar) => {
                            prices.insert(symbol.clone(), bar.close);
                        }
                        Err(_) => {
                            warn!(%symbol, %day, "no price at or before cash-flow boundary");
                        }
                    },
                },
            }
        }
        prices
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EventFactory, FilledOrder, Instrument, OrderSide};
    use chrono::{NaiveDate, NaiveTime};

    fn ts(day: u32) -> DateTime<Utc> {
        NaiveDate::from_ymd_opt(2024, 1, day)
            .unwrap()
            .and_time(NaiveTime::MIN)
            .and_utc()
    }

    #[test]
    fn resting_and_cancel_events_replay_cleanly() {
        let mut factory = EventFactory::new();
        let resting = factory.resting_order(
            ts(2),
            Instrument::stock("SPY"),
            OrderSide::Buy,
            10.0,
            99.0,
            0.0,
        );
        let EventKind::RestingOrder(order) = &resting.kind else {
            panic!("expected a resting order");
        };
        let cancel = factory.canceled_order(ts(3), order.order_id);

        let engine = Engine::new(EngineConfig::new(1_000.0), HashMap::new());
        let result = engine.replay(vec![resting, cancel]).unwrap();
        assert_eq!(result.portfolio.cash_balance, 1_000.0);
        assert!(result.snapshots.is_empty());
    }

    #[test]
    fn cancel_of_unknown_order_is_not_fatal() {
        let mut factory = EventFactory::new();
        let cancel = factory.canceled_order(ts(2), OrderId(99));
        let engine = Engine::new(EngineConfig::new(0.0), HashMap::new());
        assert!(engine.replay(vec![cancel]).is_ok());
    }

    #[test]
    fn non_open_resting_order_is_unsupported() {
        let mut factory = EventFactory::new();
        let mut event = factory.resting_order(
            ts(2),
            Instrument::stock("SPY"),
            OrderSide::Buy,
            10.0,
            99.0,
            0.0,
        );
        if let EventKind::RestingOrder(order) = &mut event.kind {
            order.fill(ts(2), 98.0);
        }

        let engine = Engine::new(EngineConfig::new(1_000.0), HashMap::new());
        let err = engine.replay(vec![event]).unwrap_err();
        assert!(matches!(err, EngineError::UnsupportedEvent { .. }));
    }

    #[test]
    fn out_of_order_input_is_sorted_before_replay() {
        let mut factory = EventFactory::new();
        // Deposit created second but timestamped first; without it the buy
        // would drive cash negative.
        let buy = factory.filled_order(
            ts(3),
            FilledOrder::new(Instrument::stock("SPY"), OrderSide::Buy, 10.0, 100.0, ts(3), 0.0),
        );
        let deposit = factory.cash_flow_change(ts(2), 2_000.0);

        let engine = Engine::new(EngineConfig::new(0.0), HashMap::new());
        let result = engine.replay(vec![buy, deposit]).unwrap();
        assert_eq!(result.portfolio.cash_balance, 1_000.0);
    }
}
