//! Arbitrage detection and stake-allocation engine

pub mod arbitrage;
pub mod error;
pub mod hedge;
pub mod model;
pub mod odds;
pub mod slip;

pub use arbitrage::{validate_stake, ArbitrageEngine, MIN_OUTCOMES};
pub use error::EngineError;
pub use hedge::{two_way_split, HedgeCalculator, HedgeResult};
pub use model::*;
pub use odds::{american_to_decimal, decimal_to_american, format_american, implied_probability, OddsFormat};
pub use slip::{BetSlip, BetSlipLeg};
