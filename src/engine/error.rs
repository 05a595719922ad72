//! Arbitrage engine errors

use thiserror::Error;

/// Reasons the engine refuses to evaluate a market
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// Quote is not a legitimate decimal price (must be finite and above 1.0)
    #[error("invalid price {price} for '{outcome}' at {bookmaker}")]
    InvalidPrice {
        /// Outcome the quote was for
        outcome: String,
        /// Bookmaker that offered it
        bookmaker: String,
        /// Offending price
        price: f64,
    },

    /// Not enough distinct, validly priced outcomes to compare
    #[error("insufficient market: {valid_outcomes} valid outcome(s), at least 2 required")]
    InsufficientMarket {
        /// Distinct outcome names left after excluding invalid quotes
        valid_outcomes: usize,
    },

    /// Total stake must be finite and strictly positive
    #[error("invalid stake {stake}: must be greater than zero")]
    InvalidStake {
        /// Offending stake
        stake: f64,
    },
}

impl EngineError {
    /// Short machine-readable code for output and metrics labels
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::InvalidPrice { .. } => "invalid_price",
            EngineError::InsufficientMarket { .. } => "insufficient_market",
            EngineError::InvalidStake { .. } => "invalid_stake",
        }
    }
}
