//! Replay engine — single-pass event dispatch over a time-ordered stream.

pub mod replay;
pub mod state;

pub use replay::{Engine, EngineError};
pub use state::{EngineConfig, MissingPricePolicy, RunResult};
