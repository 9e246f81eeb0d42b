//! Resting and filled orders.

use super::instrument::Instrument;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Trade direction. Quantity is always non-negative; the side carries the
/// sign of the position change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderSide {
    Buy,
    Sell,
}

/// Order lifecycle states. No partial fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    Open,
    Filled,
    Canceled,
}

/// Order id. Equal to the id of the event that created the resting order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderId(pub u64);

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Error)]
pub enum OrderError {
    #[error("order {order_id} is {status:?}, expected Filled")]
    NotFilled {
        order_id: OrderId,
        status: OrderStatus,
    },
}

/// A limit order resting on the book until filled or canceled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestingOrder {
    pub order_id: OrderId,
    pub instrument: Instrument,
    pub side: OrderSide,
    pub quantity: f64,
    pub limit_price: f64,
    pub status: OrderStatus,
    pub ts: DateTime<Utc>,
    pub commission_rate: f64,
    pub filled_price: Option<f64>,
    pub filled_ts: Option<DateTime<Utc>>,
}

impl RestingOrder {
    pub fn new(
        order_id: OrderId,
        instrument: Instrument,
        ts: DateTime<Utc>,
        side: OrderSide,
        quantity: f64,
        limit_price: f64,
        commission_rate: f64,
    ) -> Self {
        Self {
            order_id,
            instrument,
            side,
            quantity,
            limit_price,
            status: OrderStatus::Open,
            ts,
            commission_rate,
            filled_price: None,
            filled_ts: None,
        }
    }

    /// Mark the order filled in full and record where and when.
    pub fn fill(&mut self, filled_ts: DateTime<Utc>, filled_price: f64) {
        self.status = OrderStatus::Filled;
        self.filled_ts = Some(filled_ts);
        self.filled_price = Some(filled_price);
    }
}

/// An executed trade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilledOrder {
    pub instrument: Instrument,
    pub side: OrderSide,
    pub quantity: f64,
    pub filled_price: f64,
    pub filled_ts: DateTime<Utc>,
    pub commission_rate: f64,
    /// Present only when derived from a resting order.
    pub order_id: Option<OrderId>,
}

impl FilledOrder {
    pub fn new(
        instrument: Instrument,
        side: OrderSide,
        quantity: f64,
        filled_price: f64,
        filled_ts: DateTime<Utc>,
        commission_rate: f64,
    ) -> Self {
        Self {
            instrument,
            side,
            quantity,
            filled_price,
            filled_ts,
            commission_rate,
            order_id: None,
        }
    }

    /// Convert a filled resting order, inheriting its id. The order must
    /// already be `Filled`.
    pub fn from_order(order: &RestingOrder) -> Result<Self, OrderError> {
        let (OrderStatus::Filled, Some(filled_price), Some(filled_ts)) =
            (order.status, order.filled_price, order.filled_ts)
        else {
            return Err(OrderError::NotFilled {
                order_id: order.order_id,
                status: order.status,
            });
        };
        Ok(Self {
            instrument: order.instrument.clone(),
            side: order.side,
            quantity: order.quantity,
            filled_price,
            filled_ts,
            commission_rate: order.commission_rate,
            order_id: Some(order.order_id),
        })
    }

    pub fn symbol(&self) -> String {
        self.instrument.symbol()
    }

    /// Signed cash impact before commission. Buys are positive and charged
    /// against cash; sells are negative and credit cash. The convention is
    /// applied uniformly across the ledger.
    pub fn order_value(&self) -> f64 {
        let base = self.filled_price * self.quantity * self.instrument.multiplier();
        match self.side {
            OrderSide::Buy => base,
            OrderSide::Sell => -base,
        }
    }

    /// Commission charged on the trade's absolute notional.
    pub fn commission(&self) -> f64 {
        self.order_value().abs() * self.commission_rate
    }

    /// Position delta: `+quantity` for buys, `-quantity` for sells.
    pub fn signed_quantity(&self) -> f64 {
        match self.side {
            OrderSide::Buy => self.quantity,
            OrderSide::Sell => -self.quantity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    fn ts(day: u32) -> DateTime<Utc> {
        NaiveDate::from_ymd_opt(2024, 1, day)
            .unwrap()
            .and_time(NaiveTime::MIN)
            .and_utc()
    }

    #[test]
    fn order_value_sign_convention() {
        let buy = FilledOrder::new(Instrument::stock("SPY"), OrderSide::Buy, 10.0, 100.0, ts(2), 0.0);
        assert_eq!(buy.order_value(), 1000.0);

        let sell =
            FilledOrder::new(Instrument::stock("SPY"), OrderSide::Sell, 10.0, 100.0, ts(2), 0.0);
        assert_eq!(sell.order_value(), -1000.0);
    }

    #[test]
    fn commission_on_absolute_notional() {
        let sell =
            FilledOrder::new(Instrument::stock("SPY"), OrderSide::Sell, 10.0, 100.0, ts(2), 0.001);
        assert_eq!(sell.commission(), 1.0);
    }

    #[test]
    fn direct_fill_has_no_order_id() {
        let fill = FilledOrder::new(Instrument::stock("SPY"), OrderSide::Buy, 1.0, 50.0, ts(2), 0.0);
        assert_eq!(fill.order_id, None);
    }

    #[test]
    fn from_order_inherits_id() {
        let mut resting = RestingOrder::new(
            OrderId(7),
            Instrument::stock("SPY"),
            ts(2),
            OrderSide::Buy,
            5.0,
            99.0,
            0.0,
        );
        resting.fill(ts(3), 98.5);

        let fill = FilledOrder::from_order(&resting).unwrap();
        assert_eq!(fill.order_id, Some(OrderId(7)));
        assert_eq!(fill.filled_price, 98.5);
        assert_eq!(fill.filled_ts, ts(3));
        assert_eq!(fill.quantity, 5.0);
    }

    #[test]
    fn from_order_rejects_open_order() {
        let resting = RestingOrder::new(
            OrderId(7),
            Instrument::stock("SPY"),
            ts(2),
            OrderSide::Buy,
            5.0,
            99.0,
            0.0,
        );
        assert!(FilledOrder::from_order(&resting).is_err());
    }
}
