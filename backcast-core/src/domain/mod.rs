//! Domain types for the accounting engine.

pub mod event;
pub mod instrument;
pub mod order;
pub mod portfolio;
pub mod position;

pub use event::{Event, EventFactory, EventId, EventKind};
pub use instrument::{Instrument, InstrumentKind, OptionContract, OptionType};
pub use order::{FilledOrder, OrderError, OrderId, OrderSide, OrderStatus, RestingOrder};
pub use portfolio::{Portfolio, PortfolioSnapshot};
pub use position::{LedgerError, Position};
