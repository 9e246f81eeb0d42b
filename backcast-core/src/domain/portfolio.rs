//! Portfolio — cash plus the map of open positions.

use super::instrument::{Instrument, OptionType};
use super::order::{FilledOrder, OrderSide};
use super::position::{LedgerError, Position};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{info, warn};

/// Simulated brokerage account. Exclusively owned and mutated by the engine
/// for the duration of a run.
///
/// The accounting identity `portfolio_value == cash_balance + Σ position_value`
/// holds after every update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Portfolio {
    pub cash_balance: f64,
    pub positions: HashMap<String, Position>,
    pub portfolio_value: f64,
    /// Cumulative external deposits and withdrawals.
    pub net_cash_flow: f64,
    /// One simple return per cash-flow boundary.
    pub period_returns: Vec<f64>,
}

/// Immutable copy of the account taken after every fill.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioSnapshot {
    pub portfolio_value: f64,
    pub cash_balance: f64,
    pub positions: HashMap<String, Position>,
}

impl Portfolio {
    pub fn new(initial_cash_balance: f64) -> Self {
        Self {
            cash_balance: initial_cash_balance,
            positions: HashMap::new(),
            portfolio_value: initial_cash_balance,
            net_cash_flow: 0.0,
            period_returns: Vec::new(),
        }
    }

    /// Settle a filled order against cash, then against the instrument's
    /// position (created lazily on first fill).
    ///
    /// Buys charge cash, sells credit it; commission always charges. A
    /// negative cash balance has no margin model behind it and is fatal.
    pub fn fill_order(&mut self, order: &FilledOrder) -> Result<(), LedgerError> {
        let order_value = order.order_value();
        let commission = order.commission();
        self.cash_balance -= order_value + commission;
        if self.cash_balance < 0.0 {
            return Err(LedgerError::NegativeCashBalance {
                symbol: order.symbol(),
                balance: self.cash_balance,
            });
        }
        info!(
            symbol = %order.symbol(),
            side = ?order.side,
            quantity = order.quantity,
            price = order.filled_price,
            multiplier = order.instrument.multiplier(),
            ts = %order.filled_ts,
            "order filled"
        );

        let symbol = order.instrument.symbol();
        let position = self
            .positions
            .entry(symbol)
            .or_insert_with(|| Position::new(order.instrument.clone()));
        position.fill_order(order)
    }

    /// Apply an external deposit or withdrawal and refresh the total value.
    pub fn add_cash_flow(&mut self, amount: f64) -> f64 {
        self.cash_balance += amount;
        self.net_cash_flow += amount;
        self.update_portfolio(None);
        self.cash_balance
    }

    /// Re-mark any held symbols covered by `prices`, then recompute
    /// `portfolio_value = cash_balance + Σ position_value`.
    pub fn update_portfolio(&mut self, prices: Option<&HashMap<String, f64>>) {
        if let Some(prices) = prices {
            for (symbol, price) in prices {
                if let Some(position) = self.positions.get_mut(symbol) {
                    position.update_mark(*price);
                }
            }
        }
        self.portfolio_value = self.cash_balance
            + self.positions.values().map(|p| p.position_value).sum::<f64>();
    }

    /// Drop the position for an expired option. Worthless by construction of
    /// the event, so nothing settles.
    pub fn option_expired(&mut self, instrument: &Instrument) {
        let symbol = instrument.symbol();
        if self.positions.remove(&symbol).is_none() {
            warn!(%symbol, "expiry for a position that is not held");
        }
        self.update_portfolio(None);
    }

    /// Settle an assignment: the full remaining option position converts into
    /// a synthetic fill on the underlying at the strike, then the option
    /// position is removed. No partial assignment.
    pub fn option_assigned(
        &mut self,
        instrument: &Instrument,
        ts: DateTime<Utc>,
    ) -> Result<(), LedgerError> {
        let symbol = instrument.symbol();
        let Instrument::Option(contract) = instrument else {
            return Err(LedgerError::NotAnOption { symbol });
        };
        let held = self
            .positions
            .get(&symbol)
            .ok_or_else(|| LedgerError::PositionNotFound {
                symbol: symbol.clone(),
            })?
            .amount;
        if held == 0.0 {
            // Nothing left to settle.
            self.positions.remove(&symbol);
            self.update_portfolio(None);
            return Ok(());
        }

        let stock_side = match (held > 0.0, contract.option_type) {
            (true, OptionType::Call) => OrderSide::Buy,
            (true, OptionType::Put) => OrderSide::Sell,
            (false, OptionType::Call) => OrderSide::Sell,
            (false, OptionType::Put) => OrderSide::Buy,
        };
        let quantity = held.abs() * instrument.multiplier();
        let settlement = FilledOrder::new(
            contract.underlying(),
            stock_side,
            quantity,
            contract.strike_price,
            ts,
            0.0,
        );
        self.fill_order(&settlement)?;
        self.positions.remove(&symbol);
        self.update_portfolio(None);
        Ok(())
    }

    /// Snapshot for historical reporting.
    pub fn snapshot(&self) -> PortfolioSnapshot {
        PortfolioSnapshot {
            portfolio_value: self.portfolio_value,
            cash_balance: self.cash_balance,
            positions: self.positions.clone(),
        }
    }
}
