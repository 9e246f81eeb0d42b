//! Engine configuration and run result types.

use crate::domain::{Portfolio, PortfolioSnapshot};
use serde::{Deserialize, Serialize};

/// How to value a held symbol when its price series has no bar on a
/// cash-flow boundary day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MissingPricePolicy {
    /// Leave the previous mark standing and log a warning.
    #[default]
    Skip,
    /// Mark at the last close at or before the boundary.
    LastKnown,
}

/// Configuration for a single replay.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub initial_cash_balance: f64,
    pub missing_price: MissingPricePolicy,
}

impl EngineConfig {
    pub fn new(initial_cash_balance: f64) -> Self {
        Self {
            initial_cash_balance,
            missing_price: MissingPricePolicy::Skip,
        }
    }

    pub fn with_missing_price(mut self, policy: MissingPricePolicy) -> Self {
        self.missing_price = policy;
        self
    }
}

/// Result of a complete replay.
#[derive(Debug, Clone)]
pub struct RunResult {
    /// Final account state, including net cash flow and period returns.
    pub portfolio: Portfolio,
    /// One snapshot per fill, in order.
    pub snapshots: Vec<PortfolioSnapshot>,
}

impl RunResult {
    pub fn period_returns(&self) -> &[f64] {
        &self.portfolio.period_returns
    }

    /// Portfolio value at each snapshot, for drawdown-style metrics.
    pub fn snapshot_values(&self) -> Vec<f64> {
        self.snapshots.iter().map(|s| s.portfolio_value).collect()
    }
}
