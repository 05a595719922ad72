//! Market data and evaluation result types

use super::EngineError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One possible result of an event as priced by one bookmaker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    /// Outcome identifier, compared by exact equality across bookmakers
    pub name: String,
    /// Decimal odds
    pub price: f64,
    /// Bookmaker offering the price
    pub bookmaker: String,
}

impl Outcome {
    /// Create a new outcome quote
    pub fn new(name: impl Into<String>, price: f64, bookmaker: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            price,
            bookmaker: bookmaker.into(),
        }
    }

    /// Check that the price is a usable decimal price
    pub fn validate(&self) -> Result<(), EngineError> {
        if !self.price.is_finite() || self.price <= 1.0 {
            return Err(EngineError::InvalidPrice {
                outcome: self.name.clone(),
                bookmaker: self.bookmaker.clone(),
                price: self.price,
            });
        }
        Ok(())
    }
}

/// All quotes for one event, across one or more bookmakers
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Market {
    /// Quotes in input order
    pub outcomes: Vec<Outcome>,
}

impl Market {
    /// Create a market from quotes
    pub fn new(outcomes: Vec<Outcome>) -> Self {
        Self { outcomes }
    }

    /// Append a quote
    pub fn push(&mut self, outcome: Outcome) {
        self.outcomes.push(outcome);
    }

    /// Number of quotes
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    /// Whether the market has no quotes
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}

impl FromIterator<Outcome> for Market {
    fn from_iter<I: IntoIterator<Item = Outcome>>(iter: I) -> Self {
        Self {
            outcomes: iter.into_iter().collect(),
        }
    }
}

/// Highest price found for one outcome name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestQuote {
    /// Outcome name
    pub outcome_name: String,
    /// Best decimal price
    pub price: f64,
    /// Bookmaker that offered it first
    pub bookmaker: String,
}

/// Best quotes per outcome name, in first-seen order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BestQuotes {
    /// Outcome name to best quote
    pub quotes: IndexMap<String, BestQuote>,
    /// Quotes excluded for carrying an invalid price
    pub rejected: Vec<EngineError>,
}

impl BestQuotes {
    /// Number of distinct outcome names
    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    /// Whether no outcome has a valid quote
    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }

    /// Best quote for an outcome name
    pub fn get(&self, name: &str) -> Option<&BestQuote> {
        self.quotes.get(name)
    }

    /// Iterate best quotes in first-seen order
    pub fn iter(&self) -> impl Iterator<Item = &BestQuote> {
        self.quotes.values()
    }

    /// Sum of implied probabilities over the best quotes
    pub fn implied_margin(&self) -> f64 {
        self.quotes.values().map(|q| 1.0 / q.price).sum()
    }
}

/// Stake placed on one outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Allocation {
    /// Outcome name
    pub outcome_name: String,
    /// Bookmaker to place the bet with
    pub bookmaker: String,
    /// Decimal price taken
    pub price: f64,
    /// Amount to stake
    pub stake: f64,
}

impl Allocation {
    /// Payout if this outcome wins
    pub fn payout(&self) -> f64 {
        self.stake * self.price
    }
}

/// Risk-free opportunity found by the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Opportunity {
    /// Stake spread across all outcomes
    pub total_stake: f64,
    /// Sum of 1/price over the best quotes, below 1.0
    pub implied_margin: f64,
    /// One allocation per distinct outcome, in first-seen order
    pub allocations: Vec<Allocation>,
    /// Payout whichever outcome wins
    pub guaranteed_return: f64,
    /// Guaranteed return minus total stake
    pub profit: f64,
    /// Profit as a percentage of total stake
    pub roi_percent: f64,
}

impl Opportunity {
    /// Sum of allocated stakes
    pub fn allocated_stake(&self) -> f64 {
        self.allocations.iter().map(|a| a.stake).sum()
    }

    /// Distinct bookmakers involved, in allocation order
    pub fn bookmakers(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for allocation in &self.allocations {
            if !seen.contains(&allocation.bookmaker.as_str()) {
                seen.push(&allocation.bookmaker);
            }
        }
        seen
    }
}

/// Why a market yielded no opportunity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoArbitrageReason {
    /// Best prices imply a combined probability of 100% or more
    NoEdge,
}

impl fmt::Display for NoArbitrageReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoArbitrageReason::NoEdge => write!(f, "no edge"),
        }
    }
}

/// Expected outcome when best prices leave no edge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoArbitrage {
    /// Reason no opportunity exists
    pub reason: NoArbitrageReason,
    /// Sum of 1/price over the best quotes
    pub implied_margin: f64,
}

/// Result of evaluating a market
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Evaluation {
    /// Arbitrage exists at the best prices
    Opportunity(Opportunity),
    /// No arbitrage at the best prices
    NoArbitrage(NoArbitrage),
}

impl Evaluation {
    /// The opportunity, if any
    pub fn opportunity(&self) -> Option<&Opportunity> {
        match self {
            Evaluation::Opportunity(opportunity) => Some(opportunity),
            Evaluation::NoArbitrage(_) => None,
        }
    }

    /// Consume into the opportunity, if any
    pub fn into_opportunity(self) -> Option<Opportunity> {
        match self {
            Evaluation::Opportunity(opportunity) => Some(opportunity),
            Evaluation::NoArbitrage(_) => None,
        }
    }

    /// Implied margin at the best prices
    pub fn implied_margin(&self) -> f64 {
        match self {
            Evaluation::Opportunity(opportunity) => opportunity.implied_margin,
            Evaluation::NoArbitrage(no_arb) => no_arb.implied_margin,
        }
    }
}
