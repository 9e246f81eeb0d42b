//! Option chain — per-day contract snapshots and end-of-day quotes.

use crate::domain::instrument::{OptionContract, OptionType};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// End-of-day quote for one contract on one trading day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionQuote {
    pub quote_date: NaiveDate,
    pub expiration_date: NaiveDate,
    pub strike_price: f64,
    pub option_type: OptionType,
    pub bid: f64,
    pub ask: f64,
}

impl OptionQuote {
    pub fn mid(&self) -> f64 {
        (self.bid + self.ask) / 2.0
    }
}

/// Price of a specific contract on a specific day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ContractQuote {
    /// Mid of the end-of-day bid/ask.
    Mid(f64),
    /// Past expiration: worth zero by definition.
    Expired,
    /// Absent from the chain that day; callers skip, never abort.
    Missing,
}

impl ContractQuote {
    pub fn price(self) -> Option<f64> {
        match self {
            ContractQuote::Mid(mid) => Some(mid),
            ContractQuote::Expired => Some(0.0),
            ContractQuote::Missing => None,
        }
    }
}

/// Option-chain history for a single underlying.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionChain {
    underlying_symbol: String,
    quotes: Vec<OptionQuote>,
}

impl OptionChain {
    pub fn new(underlying_symbol: impl Into<String>, quotes: Vec<OptionQuote>) -> Self {
        Self {
            underlying_symbol: underlying_symbol.into(),
            quotes,
        }
    }

    pub fn underlying_symbol(&self) -> &str {
        &self.underlying_symbol
    }

    /// Full chain snapshot for one trading day. Empty on non-trading days.
    pub fn chain_on(&self, date: NaiveDate) -> Vec<&OptionQuote> {
        let chain: Vec<&OptionQuote> = self
            .quotes
            .iter()
            .filter(|q| q.quote_date == date)
            .collect();
        if chain.is_empty() {
            warn!(
                underlying = %self.underlying_symbol,
                %date,
                "no chain data; check that it is a trading day"
            );
        }
        chain
    }

    /// End-of-day mid for a specific contract.
    pub fn eod_mid(&self, contract: &OptionContract, date: NaiveDate) -> ContractQuote {
        if date > contract.expiration_date {
            return ContractQuote::Expired;
        }
        self.quotes
            .iter()
            .find(|q| {
                q.quote_date == date
                    && q.expiration_date == contract.expiration_date
                    && q.option_type == contract.option_type
                    && (q.strike_price - contract.strike_price).abs() < 1e-9
            })
            .map(|q| ContractQuote::Mid(q.mid()))
            .unwrap_or(ContractQuote::Missing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, day).unwrap()
    }

    fn quote(day: u32, strike: f64, option_type: OptionType, bid: f64, ask: f64) -> OptionQuote {
        OptionQuote {
            quote_date: date(day),
            expiration_date: date(21),
            strike_price: strike,
            option_type,
            bid,
            ask,
        }
    }

    fn contract(strike: f64, option_type: OptionType) -> OptionContract {
        OptionContract {
            underlying_symbol: "SPY".into(),
            expiration_date: date(21),
            strike_price: strike,
            option_type,
        }
    }

    fn chain() -> OptionChain {
        OptionChain::new(
            "SPY",
            vec![
                quote(3, 450.0, OptionType::Call, 2.0, 2.2),
                quote(3, 450.0, OptionType::Put, 1.4, 1.6),
                quote(4, 450.0, OptionType::Call, 2.5, 2.7),
            ],
        )
    }

    #[test]
    fn chain_snapshot_for_a_day() {
        let chain = chain();
        assert_eq!(chain.chain_on(date(3)).len(), 2);
        assert!(chain.chain_on(date(5)).is_empty());
    }

    #[test]
    fn eod_mid_of_a_quoted_contract() {
        let chain = chain();
        let q = chain.eod_mid(&contract(450.0, OptionType::Call), date(3));
        assert_eq!(q, ContractQuote::Mid(2.1));
        assert_eq!(q.price(), Some(2.1));
    }

    #[test]
    fn missing_contract_is_a_sentinel_not_a_crash() {
        let chain = chain();
        let q = chain.eod_mid(&contract(455.0, OptionType::Call), date(3));
        assert_eq!(q, ContractQuote::Missing);
        assert_eq!(q.price(), None);
    }

    #[test]
    fn expired_contract_is_worth_zero() {
        let chain = chain();
        let q = chain.eod_mid(&contract(450.0, OptionType::Call), date(25));
        assert_eq!(q, ContractQuote::Expired);
        assert_eq!(q.price(), Some(0.0));
    }
}
