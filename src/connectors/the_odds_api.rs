//! The Odds API connector

use crate::{
    config::{ProviderConfig, ScanConfig},
    connectors::{
        build_http_client, read_json, traits::*, Provider, RateLimiter,
    },
    ArbitrageError, Result,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, error, info};
use url::Url;

/// Market key for head-to-head (moneyline) prices
const H2H_MARKET: &str = "h2h";

/// The Odds API v4 connector
pub struct TheOddsApiProvider {
    base_url: String,
    api_key: String,
    sports: Vec<String>,
    regions: String,
    client: reqwest::Client,
    limiter: RateLimiter,
}

impl TheOddsApiProvider {
    /// Create a connector for the configured sports
    pub fn new(config: &ProviderConfig, scan: &ScanConfig) -> Result<Self> {
        if config.api_key.is_empty() {
            return Err(ArbitrageError::Config("The Odds API key is not set".to_string()).into());
        }

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            sports: scan.sports.clone(),
            regions: scan.regions.clone(),
            client: build_http_client(config)?,
            limiter: RateLimiter::new(Duration::from_millis(config.min_request_interval_ms)),
        })
    }

    /// List sports known to the API
    pub async fn list_sports(&self) -> Result<Vec<Sport>> {
        let url = self.url("/v4/sports", &[])?;
        self.get(url).await
    }

    /// Fetch head-to-head odds for one sport
    pub async fn fetch_sport(&self, sport: &str) -> Result<Vec<SportingEvent>> {
        let url = self.url(
            &format!("/v4/sports/{}/odds", sport),
            &[
                ("regions", self.regions.as_str()),
                ("markets", H2H_MARKET),
                ("oddsFormat", "decimal"),
            ],
        )?;

        let events: Vec<OddsApiEvent> = self.get(url).await?;
        debug!("The Odds API returned {} events for {}", events.len(), sport);

        Ok(events.into_iter().map(OddsApiEvent::normalize).collect())
    }

    /// Parse a raw `/odds` response body
    pub fn parse_events(body: &str) -> Result<Vec<SportingEvent>> {
        let events: Vec<OddsApiEvent> = serde_json::from_str(body).map_err(|e| {
            ArbitrageError::DataParsing(format!("Failed to parse The Odds API events: {}", e))
        })?;
        Ok(events.into_iter().map(OddsApiEvent::normalize).collect())
    }

    fn url(&self, path: &str, params: &[(&str, &str)]) -> Result<Url> {
        let mut url = Url::parse(&format!("{}{}", self.base_url, path))
            .map_err(|e| ArbitrageError::Config(format!("Invalid The Odds API URL: {}", e)))?;

        {
            let mut query = url.query_pairs_mut();
            query.append_pair("apiKey", &self.api_key);
            for (key, value) in params {
                query.append_pair(key, value);
            }
        }

        Ok(url)
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, url: Url) -> Result<T> {
        self.limiter.acquire().await;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ArbitrageError::Connection(format!("The Odds API request failed: {}", e)))?;

        read_json(Provider::TheOddsApi, response).await
    }
}

#[async_trait]
impl OddsProvider for TheOddsApiProvider {
    fn provider(&self) -> Provider {
        Provider::TheOddsApi
    }

    async fn fetch_events(&self) -> Result<Vec<SportingEvent>> {
        let mut events = Vec::new();
        let mut last_error = None;

        for sport in &self.sports {
            match self.fetch_sport(sport).await {
                Ok(mut batch) => events.append(&mut batch),
                Err(e) => {
                    error!("Error fetching odds for {}: {}", sport, e);
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(e) if events.is_empty() => Err(e),
            _ => {
                info!("Fetched {} events from The Odds API", events.len());
                Ok(events)
            }
        }
    }
}

// The Odds API response types
#[derive(Debug, Deserialize)]
struct OddsApiEvent {
    id: String,
    sport_key: String,
    commence_time: DateTime<Utc>,
    home_team: String,
    away_team: String,
    #[serde(default)]
    bookmakers: Vec<OddsApiBookmaker>,
}

#[derive(Debug, Deserialize)]
struct OddsApiBookmaker {
    key: String,
    title: String,
    #[serde(default)]
    last_update: Option<DateTime<Utc>>,
    #[serde(default)]
    markets: Vec<OddsApiMarket>,
}

#[derive(Debug, Deserialize)]
struct OddsApiMarket {
    key: String,
    #[serde(default)]
    outcomes: Vec<OddsApiOutcome>,
}

#[derive(Debug, Deserialize)]
struct OddsApiOutcome {
    name: String,
    price: f64,
}

impl OddsApiEvent {
    fn normalize(self) -> SportingEvent {
        let bookmakers = self
            .bookmakers
            .into_iter()
            .filter_map(|bookmaker| {
                let market = bookmaker.markets.into_iter().find(|m| m.key == H2H_MARKET)?;
                Some(BookmakerOdds {
                    key: bookmaker.key,
                    title: bookmaker.title,
                    last_update: bookmaker.last_update,
                    outcomes: market
                        .outcomes
                        .into_iter()
                        .map(|o| PricedOutcome { name: o.name, price: o.price })
                        .collect(),
                })
            })
            .collect();

        SportingEvent {
            id: format!("{}_{}", Provider::TheOddsApi.id_prefix(), self.id),
            source: Provider::TheOddsApi,
            sport: self.sport_key,
            home_team: self.home_team,
            away_team: self.away_team,
            commence_time: self.commence_time,
            bookmakers,
        }
    }
}
