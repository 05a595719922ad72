//! Odds provider connector implementations

pub mod traits;
pub mod rate_limit;
pub mod the_odds_api;
pub mod rapid_api;

pub use traits::*;
pub use rate_limit::RateLimiter;
pub use the_odds_api::TheOddsApiProvider;
pub use rapid_api::RapidApiProvider;

use crate::{
    config::{ProviderConfig, ScannerConfig},
    ArbitrageError, Result,
};
use reqwest::StatusCode;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::{fmt, sync::Arc, time::Duration};
use tracing::{info, warn};

/// Supported odds providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provider {
    /// The Odds API (api.the-odds-api.com)
    TheOddsApi,
    /// RapidAPI sportsbook-api2
    RapidApi,
}

impl Provider {
    /// Prefix applied to event ids from this provider
    pub fn id_prefix(&self) -> &'static str {
        match self {
            Provider::TheOddsApi => "odds",
            Provider::RapidApi => "rapid",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provider::TheOddsApi => write!(f, "the_odds_api"),
            Provider::RapidApi => write!(f, "rapid_api"),
        }
    }
}

impl std::str::FromStr for Provider {
    type Err = ArbitrageError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "the_odds_api" | "odds" => Ok(Provider::TheOddsApi),
            "rapid_api" | "rapid" => Ok(Provider::RapidApi),
            _ => Err(ArbitrageError::Config(format!("Unknown provider: {}", s))),
        }
    }
}

/// Build the HTTP client shared by a provider's requests
pub(crate) fn build_http_client(config: &ProviderConfig) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| ArbitrageError::Connection(format!("Failed to build HTTP client: {}", e)).into())
}

/// Check the response status and decode a JSON body
pub(crate) async fn read_json<T: DeserializeOwned>(
    provider: Provider,
    response: reqwest::Response,
) -> Result<T> {
    let status = response.status();

    if status == StatusCode::TOO_MANY_REQUESTS {
        warn!("{} rejected request: quota exceeded", provider);
        return Err(ArbitrageError::RateLimited(provider.to_string()).into());
    }

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ArbitrageError::Connection(format!(
            "{} returned {}: {}",
            provider, status, body
        ))
        .into());
    }

    response.json::<T>().await.map_err(|e| {
        ArbitrageError::DataParsing(format!("Failed to decode {} response: {}", provider, e)).into()
    })
}

/// Factory for the configured odds providers
pub struct ProviderFactory;

impl ProviderFactory {
    /// Create a provider from its configuration
    pub fn create_provider(
        provider: Provider,
        config: &ScannerConfig,
    ) -> Result<Arc<dyn OddsProvider>> {
        match provider {
            Provider::TheOddsApi => Ok(Arc::new(TheOddsApiProvider::new(
                &config.providers.the_odds_api,
                &config.scan,
            )?)),
            Provider::RapidApi => Ok(Arc::new(RapidApiProvider::new(&config.providers.rapid_api)?)),
        }
    }

    /// Create every enabled provider, skipping those that fail to initialize
    pub fn create_enabled(config: &ScannerConfig) -> Result<Vec<Arc<dyn OddsProvider>>> {
        let mut providers = Vec::new();

        for (name, provider_config) in config.providers.iter() {
            if !provider_config.enabled {
                continue;
            }

            let provider: Provider = name.parse()?;
            match Self::create_provider(provider, config) {
                Ok(p) => {
                    info!("Initialized provider {}", provider);
                    providers.push(p);
                }
                Err(e) => warn!("Skipping provider {}: {}", provider, e),
            }
        }

        if providers.is_empty() {
            return Err(ArbitrageError::Config(
                "No odds provider could be initialized, check API keys".to_string(),
            )
            .into());
        }

        Ok(providers)
    }
}
