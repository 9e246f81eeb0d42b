//! Event taxonomy — everything that flows through the replay engine.

use super::instrument::Instrument;
use super::order::{FilledOrder, OrderId, OrderSide, RestingOrder};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Monotonic sequence id, unique per event within a run. Ties on timestamp
/// are broken by id, which preserves arrival order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct EventId(pub u64);

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A timestamped event. The payload is a closed sum the engine matches
/// exhaustively, so adding a variant breaks the build until it is handled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub ts: DateTime<Utc>,
    pub kind: EventKind,
}

impl Event {
    /// Total order over events: timestamp, then arrival.
    pub fn sort_key(&self) -> (DateTime<Utc>, EventId) {
        (self.ts, self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EventKind {
    /// Mark-to-market prices for any subset of symbols.
    PriceUpdate { prices: HashMap<String, f64> },
    /// External deposit (positive) or withdrawal (negative).
    CashFlowChange { amount: f64 },
    RestingOrder(RestingOrder),
    CanceledOrder {
        order_id: OrderId,
        canceled_ts: DateTime<Utc>,
    },
    FilledOrder(FilledOrder),
    OptionExpired { instrument: Instrument },
    OptionAssigned { instrument: Instrument },
}

/// Issues event ids. Owned by whichever component constructs the stream;
/// there is no process-global counter.
#[derive(Debug, Default)]
pub struct EventFactory {
    next_id: u64,
}

impl EventFactory {
    pub fn new() -> Self {
        Self::default()
    }

    fn next(&mut self) -> EventId {
        self.next_id += 1;
        EventId(self.next_id)
    }

    pub fn price_update(&mut self, ts: DateTime<Utc>, prices: HashMap<String, f64>) -> Event {
        Event {
            id: self.next(),
            ts,
            kind: EventKind::PriceUpdate { prices },
        }
    }

    pub fn cash_flow_change(&mut self, ts: DateTime<Utc>, amount: f64) -> Event {
        Event {
            id: self.next(),
            ts,
            kind: EventKind::CashFlowChange { amount },
        }
    }

    /// A new open limit order. The order id equals the event id.
    pub fn resting_order(
        &mut self,
        ts: DateTime<Utc>,
        instrument: Instrument,
        side: OrderSide,
        quantity: f64,
        limit_price: f64,
        commission_rate: f64,
    ) -> Event {
        let id = self.next();
        let order = RestingOrder::new(
            OrderId(id.0),
            instrument,
            ts,
            side,
            quantity,
            limit_price,
            commission_rate,
        );
        Event {
            id,
            ts,
            kind: EventKind::RestingOrder(order),
        }
    }

    pub fn canceled_order(&mut self, ts: DateTime<Utc>, order_id: OrderId) -> Event {
        Event {
            id: self.next(),
            ts,
            kind: EventKind::CanceledOrder {
                order_id,
                canceled_ts: ts,
            },
        }
    }

    pub fn filled_order(&mut self, ts: DateTime<Utc>, order: FilledOrder) -> Event {
        Event {
            id: self.next(),
            ts,
            kind: EventKind::FilledOrder(order),
        }
    }

    pub fn option_expired(&mut self, ts: DateTime<Utc>, instrument: Instrument) -> Event {
        Event {
            id: self.next(),
            ts,
            kind: EventKind::OptionExpired { instrument },
        }
    }

    pub fn option_assigned(&mut self, ts: DateTime<Utc>, instrument: Instrument) -> Event {
        Event {
            id: self.next(),
            ts,
            kind: EventKind::OptionAssigned { instrument },
        }
    }
}
