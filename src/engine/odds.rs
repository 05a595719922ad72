//! Odds format conversion

use crate::{ArbitrageError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported odds formats for input and display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OddsFormat {
    /// Decimal odds (2.50)
    Decimal,
    /// American moneyline odds (+150 / -200)
    American,
}

impl fmt::Display for OddsFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OddsFormat::Decimal => write!(f, "decimal"),
            OddsFormat::American => write!(f, "american"),
        }
    }
}

impl std::str::FromStr for OddsFormat {
    type Err = ArbitrageError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "decimal" => Ok(OddsFormat::Decimal),
            "american" => Ok(OddsFormat::American),
            _ => Err(ArbitrageError::Config(format!("Unknown odds format: {}", s))),
        }
    }
}

impl OddsFormat {
    /// Convert a price quoted in this format to decimal odds
    pub fn to_decimal(self, price: f64) -> Result<f64> {
        match self {
            OddsFormat::Decimal => Ok(price),
            OddsFormat::American => american_to_decimal(price),
        }
    }
}

/// Convert American odds to decimal.
///
/// Values inside (-100, 100) are not valid moneylines.
pub fn american_to_decimal(american: f64) -> Result<f64> {
    if !american.is_finite() || american.abs() < 100.0 {
        return Err(ArbitrageError::DataParsing(format!(
            "Invalid American odds: {}",
            american
        ))
        .into());
    }

    if american > 0.0 {
        Ok(1.0 + american / 100.0)
    } else {
        Ok(1.0 + 100.0 / american.abs())
    }
}

/// Convert decimal odds to American
pub fn decimal_to_american(decimal: f64) -> Result<f64> {
    if !decimal.is_finite() || decimal <= 1.0 {
        return Err(ArbitrageError::DataParsing(format!("Invalid decimal odds: {}", decimal)).into());
    }

    if decimal >= 2.0 {
        Ok((decimal - 1.0) * 100.0)
    } else {
        Ok(-100.0 / (decimal - 1.0))
    }
}

/// Implied probability of a decimal price
pub fn implied_probability(decimal: f64) -> f64 {
    1.0 / decimal
}

/// Format a decimal price as an American moneyline string ("+150", "-200")
pub fn format_american(decimal: f64) -> String {
    match decimal_to_american(decimal) {
        Ok(american) if american > 0.0 => format!("+{:.0}", american),
        Ok(american) => format!("{:.0}", american),
        Err(_) => "n/a".to_string(),
    }
}
