//! Instrument — immutable description of a tradable asset.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Instrument category tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InstrumentKind {
    Stock,
    Option,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OptionType {
    Call,
    Put,
}

impl OptionType {
    /// Single-letter code used in the OCC symbol.
    pub fn occ_code(self) -> char {
        match self {
            OptionType::Call => 'C',
            OptionType::Put => 'P',
        }
    }
}

/// An equity option contract. Standard US contracts control 100 shares.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionContract {
    pub underlying_symbol: String,
    pub expiration_date: NaiveDate,
    pub strike_price: f64,
    pub option_type: OptionType,
}

impl OptionContract {
    /// OCC-style symbol: underlying left-justified to 6 characters, expiry as
    /// `yymmdd`, `C`/`P`, strike price times 1000 zero-padded to 8 digits.
    pub fn occ_symbol(&self) -> String {
        format!(
            "{:<6}{}{}{:08}",
            self.underlying_symbol,
            self.expiration_date.format("%y%m%d"),
            self.option_type.occ_code(),
            (self.strike_price * 1000.0).round() as i64
        )
    }

    /// The underlying stock instrument.
    pub fn underlying(&self) -> Instrument {
        Instrument::Stock {
            ticker: self.underlying_symbol.clone(),
        }
    }
}

/// A tradable asset. Closed two-case hierarchy: shared accessors are methods,
/// variant payloads carry the rest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Instrument {
    Stock { ticker: String },
    Option(OptionContract),
}

impl Instrument {
    pub fn stock(ticker: impl Into<String>) -> Self {
        Instrument::Stock {
            ticker: ticker.into(),
        }
    }

    pub fn option(
        underlying_symbol: impl Into<String>,
        expiration_date: NaiveDate,
        strike_price: f64,
        option_type: OptionType,
    ) -> Self {
        Instrument::Option(OptionContract {
            underlying_symbol: underlying_symbol.into(),
            expiration_date,
            strike_price,
            option_type,
        })
    }

    /// Unique trading symbol.
    pub fn symbol(&self) -> String {
        match self {
            Instrument::Stock { ticker } => ticker.clone(),
            Instrument::Option(contract) => contract.occ_symbol(),
        }
    }

    pub fn kind(&self) -> InstrumentKind {
        match self {
            Instrument::Stock { .. } => InstrumentKind::Stock,
            Instrument::Option(_) => InstrumentKind::Option,
        }
    }

    /// Contract multiplier: 1 for stock, 100 for standard equity options.
    pub fn multiplier(&self) -> f64 {
        match self {
            Instrument::Stock { .. } => 1.0,
            Instrument::Option(_) => 100.0,
        }
    }
}
