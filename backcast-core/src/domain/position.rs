//! Position — per-instrument holdings and cost basis.

use super::instrument::{Instrument, InstrumentKind};
use super::order::FilledOrder;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Broken accounting invariants. Every variant aborts a replay.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("order instrument '{order}' does not match position instrument '{position}'")]
    InstrumentMismatch { order: String, position: String },

    #[error("shorting stock '{symbol}' is not supported")]
    ShortingNotSupported { symbol: String },

    #[error("negative cash balance {balance:.2} after filling '{symbol}'")]
    NegativeCashBalance { symbol: String, balance: f64 },

    #[error("no position held for '{symbol}'")]
    PositionNotFound { symbol: String },

    #[error("'{symbol}' is not an option contract")]
    NotAnOption { symbol: String },
}

/// Holdings in a single instrument, mutated only through fills and marks.
///
/// `amount` is shares for stocks and contracts for options; negative means
/// short, which only options may be. A flat position has every monetary
/// field at zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub instrument: Instrument,
    pub amount: f64,
    pub average_entry_price: f64,
    pub unrealized_pnl: f64,
    pub position_value: f64,
}

impl Position {
    pub fn new(instrument: Instrument) -> Self {
        Self {
            instrument,
            amount: 0.0,
            average_entry_price: 0.0,
            unrealized_pnl: 0.0,
            position_value: 0.0,
        }
    }

    pub fn symbol(&self) -> String {
        self.instrument.symbol()
    }

    pub fn is_flat(&self) -> bool {
        self.amount == 0.0
    }

    /// Apply a filled order.
    ///
    /// Validation happens before any field is touched, so a rejected fill
    /// leaves the position exactly as it was.
    ///
    /// Opening fills (exposure grows in the current direction) blend the
    /// entry price by quantity; flips through zero restart the basis at the
    /// fill price; closing fills leave it untouched. Realized P&L on the
    /// closed portion is not tracked separately.
    pub fn fill_order(&mut self, order: &FilledOrder) -> Result<(), LedgerError> {
        if order.instrument.symbol() != self.instrument.symbol() {
            return Err(LedgerError::InstrumentMismatch {
                order: order.instrument.symbol(),
                position: self.instrument.symbol(),
            });
        }

        let old_amount = self.amount;
        let new_amount = old_amount + order.signed_quantity();
        if self.instrument.kind() == InstrumentKind::Stock && new_amount < 0.0 {
            return Err(LedgerError::ShortingNotSupported {
                symbol: self.instrument.symbol(),
            });
        }
        self.amount = new_amount;

        let flipped =
            old_amount != 0.0 && new_amount != 0.0 && new_amount.signum() != old_amount.signum();
        if flipped {
            // The surviving exposure comes entirely from this fill.
            self.average_entry_price = order.filled_price;
        } else if new_amount.abs() > old_amount.abs() {
            if old_amount == 0.0 {
                self.average_entry_price = order.filled_price;
            } else {
                let old_total = self.average_entry_price * old_amount.abs();
                let added = order.filled_price * order.quantity;
                self.average_entry_price = (old_total + added) / new_amount.abs();
            }
        }

        if new_amount == 0.0 {
            self.average_entry_price = 0.0;
            self.unrealized_pnl = 0.0;
            self.position_value = 0.0;
        }
        self.update_mark(order.filled_price);
        Ok(())
    }

    /// Mark to market. No-op on a flat position.
    pub fn update_mark(&mut self, price: f64) {
        if self.amount == 0.0 {
            return;
        }
        let multiplier = self.instrument.multiplier();
        self.unrealized_pnl = (price - self.average_entry_price) * self.amount * multiplier;
        self.position_value = self.amount * price * multiplier;
    }
}
