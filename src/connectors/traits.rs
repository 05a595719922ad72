//! Odds provider traits and normalized event types

use super::Provider;
use crate::{
    engine::{Market, Outcome},
    Result,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Source of normalized sporting events
#[async_trait]
pub trait OddsProvider: Send + Sync {
    /// Which upstream this provider talks to
    fn provider(&self) -> Provider;

    /// Fetch the current odds snapshot as normalized events
    async fn fetch_events(&self) -> Result<Vec<SportingEvent>>;
}

/// One outcome price quoted by a bookmaker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricedOutcome {
    /// Outcome name, usually a team or "Draw"
    pub name: String,
    /// Decimal price
    pub price: f64,
}

/// A bookmaker's head-to-head prices for one event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookmakerOdds {
    /// Upstream bookmaker key
    pub key: String,
    /// Display title, used as the bookmaker identity in markets
    pub title: String,
    /// When the bookmaker last updated these prices
    pub last_update: Option<DateTime<Utc>>,
    /// Quoted outcomes in upstream order
    pub outcomes: Vec<PricedOutcome>,
}

/// Normalized event from any provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SportingEvent {
    /// Provider-prefixed event id
    pub id: String,
    /// Provider the event came from
    pub source: Provider,
    /// Sport key or title
    pub sport: String,
    /// Home team
    pub home_team: String,
    /// Away team
    pub away_team: String,
    /// Scheduled start
    pub commence_time: DateTime<Utc>,
    /// Bookmaker prices in upstream order
    pub bookmakers: Vec<BookmakerOdds>,
}

impl SportingEvent {
    /// Flatten bookmaker prices into an engine market, preserving upstream order
    pub fn to_market(&self) -> Market {
        self.bookmakers
            .iter()
            .flat_map(|bookmaker| {
                bookmaker
                    .outcomes
                    .iter()
                    .map(move |o| Outcome::new(o.name.clone(), o.price, bookmaker.title.clone()))
            })
            .collect()
    }

    /// Human-readable matchup
    pub fn matchup(&self) -> String {
        format!("{} vs {}", self.home_team, self.away_team)
    }
}

/// Sport listing entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sport {
    /// Sport key used in odds requests
    pub key: String,
    /// Sport group, e.g. "Basketball"
    #[serde(default)]
    pub group: String,
    /// Display title
    pub title: String,
    /// Whether the sport currently has events
    #[serde(default)]
    pub active: bool,
    /// Whether the sport has outright markets
    #[serde(default)]
    pub has_outrights: bool,
}
