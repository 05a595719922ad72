//! Configuration management module

pub mod settings;

pub use settings::*;

use crate::{scanner::Confidence, ArbitrageError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure for the scanner
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScannerConfig {
    /// Engine and opportunity filtering configuration
    pub engine: EngineConfig,
    /// Scan loop configuration
    pub scan: ScanConfig,
    /// Odds provider configuration
    pub providers: ProvidersConfig,
    /// Notification configuration
    pub notifications: NotificationConfig,
    /// Monitoring configuration
    pub monitoring: MonitoringConfig,
}

/// Engine-facing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Total stake spread across each evaluated market
    pub default_stake: f64,
    /// Opportunities below this ROI are dropped
    pub min_roi_percent: f64,
    /// Decimal places used when rounding bet slips
    #[serde(default = "default_stake_decimal_places")]
    pub stake_decimal_places: u32,
}

/// Scan loop configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Sport keys to request from The Odds API
    pub sports: Vec<String>,
    /// Bookmaker regions to request from The Odds API
    pub regions: String,
    /// Seconds between scans in watch mode
    pub poll_interval_secs: u64,
    /// Retries per provider fetch
    pub max_retry_attempts: u32,
    /// Seconds between retries
    pub retry_delay_secs: u64,
}

/// Configuration for every supported provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvidersConfig {
    /// The Odds API
    pub the_odds_api: ProviderConfig,
    /// RapidAPI sportsbook-api2
    pub rapid_api: ProviderConfig,
}

/// Individual provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Whether the provider is polled
    pub enabled: bool,
    /// REST API base URL
    pub base_url: String,
    /// API key, `${VAR}` references are expanded on load
    pub api_key: String,
    /// Host header value, if the provider needs one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    /// HTTP timeout in seconds
    pub request_timeout_secs: u64,
    /// Minimum spacing between requests in milliseconds
    pub min_request_interval_ms: u64,
    /// Items per batched request
    pub batch_size: usize,
}

/// Notification configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// Enable notifications in watch mode
    pub enabled: bool,
    /// Lowest confidence that triggers a notification
    pub min_confidence: Confidence,
}

/// Monitoring configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    /// Enable the Prometheus exporter
    pub enable_metrics: bool,
    /// Listen address for the exporter
    pub metrics_listen_addr: String,
}

fn default_stake_decimal_places() -> u32 {
    ConfigDefaults::STAKE_DECIMAL_PLACES
}

impl ScannerConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)
            .map_err(|e| ArbitrageError::Config(format!("Failed to read config file: {}", e)))?;

        let mut config: ScannerConfig = toml::from_str(&content)
            .map_err(|e| ArbitrageError::Config(format!("Failed to parse config: {}", e)))?;

        config.expand_env_vars()?;

        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        ConfigValidator::validate_positive(self.engine.default_stake, "Default stake")?;
        ConfigValidator::validate_non_negative(self.engine.min_roi_percent, "Minimum ROI")?;

        if self.scan.poll_interval_secs == 0 {
            return Err(
                ArbitrageError::Config("Poll interval must be greater than 0".to_string()).into(),
            );
        }

        for sport in &self.scan.sports {
            ConfigValidator::validate_sport_key(sport)?;
        }

        let enabled: Vec<(&str, &ProviderConfig)> = self.providers.iter().filter(|(_, p)| p.enabled).collect();
        if enabled.is_empty() {
            return Err(
                ArbitrageError::Config("At least one provider must be enabled".to_string()).into(),
            );
        }

        for (name, provider) in enabled {
            ConfigValidator::validate_url(&provider.base_url, &format!("{} base_url", name))?;

            if provider.batch_size == 0 {
                return Err(ArbitrageError::Config(format!(
                    "{} batch_size must be greater than 0",
                    name
                ))
                .into());
            }

            if provider.request_timeout_secs == 0 {
                return Err(ArbitrageError::Config(format!(
                    "{} request timeout must be greater than 0",
                    name
                ))
                .into());
            }
        }

        if self.providers.the_odds_api.enabled && self.scan.sports.is_empty() {
            return Err(ArbitrageError::Config(
                "The Odds API needs at least one sport".to_string(),
            )
            .into());
        }

        Ok(())
    }

    /// Expand environment variables in enabled providers' credentials and URLs
    fn expand_env_vars(&mut self) -> Result<()> {
        for provider in [&mut self.providers.the_odds_api, &mut self.providers.rapid_api] {
            if !provider.enabled {
                continue;
            }
            EnvExpander::expand_in_place(&mut provider.api_key)?;
            EnvExpander::expand_in_place(&mut provider.base_url)?;
        }
        Ok(())
    }
}

impl EngineConfig {
    /// Load only the `[engine]` table of a config file.
    ///
    /// Provider credentials are not expanded, so offline commands work without
    /// API keys in the environment.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        #[derive(Deserialize)]
        struct EngineSection {
            engine: EngineConfig,
        }

        let content = std::fs::read_to_string(&path)
            .map_err(|e| ArbitrageError::Config(format!("Failed to read config file: {}", e)))?;

        let section: EngineSection = toml::from_str(&content)
            .map_err(|e| ArbitrageError::Config(format!("Failed to parse config: {}", e)))?;

        Ok(section.engine)
    }
}

impl ProvidersConfig {
    /// Provider configs with their config-file names
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &ProviderConfig)> {
        [("the_odds_api", &self.the_odds_api), ("rapid_api", &self.rapid_api)].into_iter()
    }
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig {
                default_stake: ConfigDefaults::DEFAULT_STAKE,
                min_roi_percent: 0.0,
                stake_decimal_places: ConfigDefaults::STAKE_DECIMAL_PLACES,
            },
            scan: ScanConfig {
                sports: vec!["basketball_nba".to_string()],
                regions: "us".to_string(),
                poll_interval_secs: ConfigDefaults::POLL_INTERVAL_SECS,
                max_retry_attempts: ConfigDefaults::MAX_RETRY_ATTEMPTS,
                retry_delay_secs: ConfigDefaults::RETRY_DELAY_SECS,
            },
            providers: ProvidersConfig {
                the_odds_api: ProviderConfig {
                    enabled: true,
                    base_url: ConfigDefaults::THE_ODDS_API_URL.to_string(),
                    api_key: String::new(),
                    host: None,
                    request_timeout_secs: ConfigDefaults::REQUEST_TIMEOUT_SECS,
                    min_request_interval_ms: ConfigDefaults::MIN_REQUEST_INTERVAL_MS,
                    batch_size: 1,
                },
                rapid_api: ProviderConfig {
                    enabled: true,
                    base_url: format!("https://{}", ConfigDefaults::RAPID_API_HOST),
                    api_key: String::new(),
                    host: Some(ConfigDefaults::RAPID_API_HOST.to_string()),
                    request_timeout_secs: ConfigDefaults::REQUEST_TIMEOUT_SECS,
                    min_request_interval_ms: 0,
                    batch_size: ConfigDefaults::BATCH_SIZE,
                },
            },
            notifications: NotificationConfig {
                enabled: true,
                min_confidence: Confidence::Low,
            },
            monitoring: MonitoringConfig {
                enable_metrics: false,
                metrics_listen_addr: "127.0.0.1:9000".to_string(),
            },
        }
    }
}
