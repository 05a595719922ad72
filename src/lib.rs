//! Sports-Betting Arbitrage Scanner
//!
//! Pulls decimal odds from upstream odds providers, finds the best price per outcome
//! across bookmakers and computes the stake split that locks in an equal payout
//! whichever outcome wins.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod connectors;
pub mod engine;
pub mod scanner;
pub mod utils;

// Re-export commonly used types
pub use config::ScannerConfig;
pub use connectors::{OddsProvider, Provider, SportingEvent};
pub use engine::{ArbitrageEngine, EngineError, Evaluation, Market, Opportunity, Outcome};
pub use scanner::{LogNotifier, Notifier, Scanner};

/// Result type used throughout the application
pub type Result<T> = anyhow::Result<T>;

/// Common error types for the arbitrage system
#[derive(thiserror::Error, Debug)]
pub enum ArbitrageError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Data parsing error
    #[error("Data parsing error: {0}")]
    DataParsing(String),

    /// Upstream rejected the request for exceeding its quota
    #[error("Rate limited by {0}")]
    RateLimited(String),

    /// Arbitrage engine rejected its input
    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
