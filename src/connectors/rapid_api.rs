//! RapidAPI sportsbook-api2 connector

use crate::{
    config::{ConfigDefaults, ProviderConfig},
    connectors::{build_http_client, read_json, traits::*, Provider, RateLimiter},
    ArbitrageError, Result,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

const MONEYLINE: &str = "MONEYLINE";
const FULL_MATCH: &str = "FULL_MATCH";

/// RapidAPI sportsbook-api2 connector.
///
/// Odds are gathered in three steps: competitions, their events, then odds for
/// the collected event keys in batches.
pub struct RapidApiProvider {
    base_url: String,
    api_key: String,
    host: String,
    batch_size: usize,
    client: reqwest::Client,
    limiter: RateLimiter,
}

impl RapidApiProvider {
    /// Create a new RapidAPI connector
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        if config.api_key.is_empty() {
            return Err(ArbitrageError::Config("RapidAPI key is not set".to_string()).into());
        }

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            host: config
                .host
                .clone()
                .unwrap_or_else(|| ConfigDefaults::RAPID_API_HOST.to_string()),
            batch_size: config.batch_size.max(1),
            client: build_http_client(config)?,
            limiter: RateLimiter::new(Duration::from_millis(config.min_request_interval_ms)),
        })
    }

    async fn competitions(&self) -> Result<Vec<RapidCompetition>> {
        let url = self.url("/v0/competitions")?;
        let response: CompetitionsResponse = self.get(url).await?;
        Ok(response.competitions)
    }

    async fn events(&self, competition_key: &str) -> Result<Vec<RapidEvent>> {
        let url = self.url(&format!("/v0/competitions/{}/events", competition_key))?;
        let response: EventsResponse<RapidEvent> = self.get(url).await?;
        Ok(response.events)
    }

    async fn events_with_odds(&self, event_keys: &[String]) -> Result<Vec<RapidEventWithOdds>> {
        let mut url = self.url("/v0/events")?;
        {
            let mut query = url.query_pairs_mut();
            for key in event_keys {
                query.append_pair("eventKeys", key);
            }
        }
        let response: EventsResponse<RapidEventWithOdds> = self.get(url).await?;
        Ok(response.events)
    }

    /// Parse a raw `/v0/events` odds response body
    pub fn parse_events(body: &str) -> Result<Vec<SportingEvent>> {
        let response: EventsResponse<RapidEventWithOdds> = serde_json::from_str(body)
            .map_err(|e| ArbitrageError::DataParsing(format!("Failed to parse RapidAPI events: {}", e)))?;
        Ok(Self::normalize(response.events))
    }

    /// Keep events with a full-match moneyline market and flatten their sources into bookmakers
    fn normalize(events: Vec<RapidEventWithOdds>) -> Vec<SportingEvent> {
        events.into_iter().filter_map(RapidEventWithOdds::normalize).collect()
    }

    fn url(&self, path: &str) -> Result<Url> {
        Url::parse(&format!("{}{}", self.base_url, path))
            .map_err(|e| ArbitrageError::Config(format!("Invalid RapidAPI URL: {}", e)).into())
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, url: Url) -> Result<T> {
        self.limiter.acquire().await;
        debug!("Fetching {}", url.path());

        let response = self
            .client
            .get(url)
            .header("X-RapidAPI-Key", &self.api_key)
            .header("X-RapidAPI-Host", &self.host)
            .send()
            .await
            .map_err(|e| ArbitrageError::Connection(format!("RapidAPI request failed: {}", e)))?;

        read_json(Provider::RapidApi, response).await
    }
}

#[async_trait]
impl OddsProvider for RapidApiProvider {
    fn provider(&self) -> Provider {
        Provider::RapidApi
    }

    async fn fetch_events(&self) -> Result<Vec<SportingEvent>> {
        let competitions = self.competitions().await?;
        debug!("Found {} competitions", competitions.len());

        let mut event_keys = Vec::new();
        for competition in &competitions {
            let events = self.events(&competition.key).await?;
            event_keys.extend(events.into_iter().map(|e| e.key));
        }
        debug!("Found {} events", event_keys.len());

        let mut odds = Vec::with_capacity(event_keys.len());
        for batch in event_keys.chunks(self.batch_size) {
            odds.extend(self.events_with_odds(batch).await?);
        }

        let events = Self::normalize(odds);
        info!("Fetched {} events from RapidAPI", events.len());
        Ok(events)
    }
}

// RapidAPI response types
#[derive(Debug, Deserialize)]
struct CompetitionsResponse {
    #[serde(default)]
    competitions: Vec<RapidCompetition>,
}

#[derive(Debug, Deserialize)]
struct RapidCompetition {
    key: String,
}

#[derive(Debug, Deserialize)]
struct EventsResponse<T> {
    #[serde(default = "Vec::new")]
    events: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct RapidEvent {
    key: String,
}

#[derive(Debug, Clone, Deserialize)]
struct RapidParticipant {
    key: String,
    name: String,
    #[serde(default)]
    sport: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RapidEventWithOdds {
    key: String,
    start_time: DateTime<Utc>,
    #[serde(default)]
    home_participant_key: Option<String>,
    #[serde(default)]
    participants: Vec<RapidParticipant>,
    #[serde(default)]
    markets: Vec<RapidMarket>,
}

#[derive(Debug, Deserialize)]
struct RapidMarket {
    #[serde(rename = "type")]
    market_type: String,
    #[serde(default)]
    segment: Option<String>,
    #[serde(default)]
    outcomes: IndexMap<String, Vec<RapidMarketOutcome>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RapidMarketOutcome {
    payout: f64,
    #[serde(default)]
    last_found_at: Option<DateTime<Utc>>,
    #[serde(default)]
    participant: Option<RapidParticipant>,
}

impl RapidEventWithOdds {
    fn normalize(self) -> Option<SportingEvent> {
        let market = self.markets.into_iter().find(|m| {
            m.market_type == MONEYLINE && m.segment.as_deref() == Some(FULL_MATCH)
        })?;

        let home_key = self.home_participant_key.as_deref();
        let home = self
            .participants
            .iter()
            .find(|p| Some(p.key.as_str()) == home_key);
        let away = self
            .participants
            .iter()
            .find(|p| Some(p.key.as_str()) != home_key);

        let (home, away) = match (home, away) {
            (Some(home), Some(away)) => (home.clone(), away.clone()),
            _ => {
                warn!("Skipping RapidAPI event {} without home and away participants", self.key);
                return None;
            }
        };

        let bookmakers = market
            .outcomes
            .into_iter()
            .map(|(source, outcomes)| BookmakerOdds {
                key: source.clone(),
                title: source,
                last_update: outcomes.iter().filter_map(|o| o.last_found_at).max(),
                outcomes: outcomes
                    .into_iter()
                    .filter_map(|o| {
                        let participant = o.participant?;
                        Some(PricedOutcome {
                            name: participant.name,
                            price: o.payout,
                        })
                    })
                    .collect(),
            })
            .collect();

        Some(SportingEvent {
            id: format!("{}_{}", Provider::RapidApi.id_prefix(), self.key),
            source: Provider::RapidApi,
            sport: home.sport.unwrap_or_else(|| "unknown".to_string()),
            home_team: home.name,
            away_team: away.name,
            commence_time: self.start_time,
            bookmakers,
        })
    }
}
