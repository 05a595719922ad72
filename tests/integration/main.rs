//! Integration tests for the sports arbitrage scanner

mod test_engine_properties;
mod test_providers;
mod test_scanner;

use chrono::{TimeZone, Utc};
use sports_arbitrage::{
    config::ScannerConfig,
    connectors::{BookmakerOdds, PricedOutcome, Provider, SportingEvent},
};

/// Test utilities for integration tests
pub struct TestUtils;

impl TestUtils {
    /// Configuration with fast retries and no rate limiting
    pub fn create_test_config() -> ScannerConfig {
        let mut config = ScannerConfig::default();
        config.scan.max_retry_attempts = 1;
        config.scan.retry_delay_secs = 0;
        config.providers.the_odds_api.min_request_interval_ms = 0;
        config.providers.rapid_api.min_request_interval_ms = 0;
        config
    }

    /// Event with one bookmaker per `(bookmaker, outcome, price)` triple
    pub fn create_event(
        id: &str,
        source: Provider,
        quotes: &[(&str, &str, f64)],
    ) -> SportingEvent {
        let mut bookmakers: Vec<BookmakerOdds> = Vec::new();
        for (bookmaker, outcome, price) in quotes {
            let odds = match bookmakers.iter_mut().find(|b| b.title == *bookmaker) {
                Some(existing) => existing,
                None => {
                    bookmakers.push(BookmakerOdds {
                        key: bookmaker.to_lowercase(),
                        title: bookmaker.to_string(),
                        last_update: None,
                        outcomes: Vec::new(),
                    });
                    bookmakers.last_mut().expect("just pushed")
                }
            };
            odds.outcomes.push(PricedOutcome {
                name: outcome.to_string(),
                price: *price,
            });
        }

        SportingEvent {
            id: id.to_string(),
            source,
            sport: "basketball_nba".to_string(),
            home_team: "Los Angeles Lakers".to_string(),
            away_team: "Boston Celtics".to_string(),
            commence_time: Utc.with_ymd_and_hms(2024, 3, 1, 0, 30, 0).unwrap(),
            bookmakers,
        }
    }

    /// Two-way market with an arbitrage of roughly 3.7% ROI
    pub fn create_arbitrage_event(id: &str, source: Provider) -> SportingEvent {
        Self::create_event(
            id,
            source,
            &[
                ("FanDuel", "Los Angeles Lakers", 2.10),
                ("FanDuel", "Boston Celtics", 1.80),
                ("DraftKings", "Los Angeles Lakers", 1.90),
                ("DraftKings", "Boston Celtics", 2.05),
            ],
        )
    }

    /// Two-way market with a bookmaker margin and no arbitrage
    pub fn create_flat_event(id: &str, source: Provider) -> SportingEvent {
        Self::create_event(
            id,
            source,
            &[
                ("FanDuel", "Los Angeles Lakers", 1.91),
                ("FanDuel", "Boston Celtics", 1.91),
                ("DraftKings", "Los Angeles Lakers", 1.87),
                ("DraftKings", "Boston Celtics", 1.95),
            ],
        )
    }
}
