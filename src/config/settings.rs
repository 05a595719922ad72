//! Settings management utilities

use crate::{ArbitrageError, Result};
use std::env;

/// Environment variable expansion utility
pub struct EnvExpander;

impl EnvExpander {
    /// Expand `${VAR_NAME}` references in a string
    pub fn expand(input: &str) -> Result<String> {
        let mut result = input.to_string();

        while let Some(start) = result.find("${") {
            if let Some(end) = result[start..].find('}') {
                let var_name = &result[start + 2..start + end];
                let var_value = env::var(var_name).map_err(|_| {
                    ArbitrageError::Config(format!("Environment variable '{}' not found", var_name))
                })?;

                result.replace_range(start..start + end + 1, &var_value);
            } else {
                return Err(ArbitrageError::Config(
                    "Unclosed environment variable reference".to_string(),
                )
                .into());
            }
        }

        Ok(result)
    }

    /// Expand a field in place
    pub fn expand_in_place(value: &mut String) -> Result<()> {
        *value = Self::expand(value)?;
        Ok(())
    }
}

/// Configuration validation utilities
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate an odds-provider sport key such as `basketball_nba`
    pub fn validate_sport_key(sport: &str) -> Result<()> {
        if sport.is_empty() {
            return Err(ArbitrageError::Config("Sport key cannot be empty".to_string()).into());
        }

        if !sport
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
        {
            return Err(ArbitrageError::Config(format!(
                "Sport key '{}' must contain only lowercase letters, digits and underscores",
                sport
            ))
            .into());
        }

        Ok(())
    }

    /// Validate a positive value
    pub fn validate_positive(value: f64, name: &str) -> Result<()> {
        if !value.is_finite() || value <= 0.0 {
            return Err(ArbitrageError::Config(format!("{} must be positive", name)).into());
        }
        Ok(())
    }

    /// Validate a non-negative value
    pub fn validate_non_negative(value: f64, name: &str) -> Result<()> {
        if !value.is_finite() || value < 0.0 {
            return Err(ArbitrageError::Config(format!("{} must not be negative", name)).into());
        }
        Ok(())
    }

    /// Validate an HTTP(S) URL
    pub fn validate_url(url: &str, name: &str) -> Result<()> {
        if url.is_empty() {
            return Err(ArbitrageError::Config(format!("{} cannot be empty", name)).into());
        }

        let parsed = url::Url::parse(url)
            .map_err(|e| ArbitrageError::Config(format!("{} must be a valid URL: {}", name, e)))?;

        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(ArbitrageError::Config(format!("{} must use http or https", name)).into());
        }

        Ok(())
    }
}

/// Configuration defaults
pub struct ConfigDefaults;

impl ConfigDefaults {
    /// Default total stake spread across an opportunity
    pub const DEFAULT_STAKE: f64 = 1000.0;

    /// Default decimal places for bet slips
    pub const STAKE_DECIMAL_PLACES: u32 = 2;

    /// Default polling interval in seconds
    pub const POLL_INTERVAL_SECS: u64 = 60;

    /// Default retry attempts per provider fetch
    pub const MAX_RETRY_ATTEMPTS: u32 = 3;

    /// Default delay between retries in seconds
    pub const RETRY_DELAY_SECS: u64 = 5;

    /// Default HTTP request timeout in seconds
    pub const REQUEST_TIMEOUT_SECS: u64 = 10;

    /// Default minimum spacing between requests to one provider
    pub const MIN_REQUEST_INTERVAL_MS: u64 = 1000;

    /// Default number of event keys per RapidAPI odds request
    pub const BATCH_SIZE: usize = 50;

    /// The Odds API base URL
    pub const THE_ODDS_API_URL: &'static str = "https://api.the-odds-api.com";

    /// RapidAPI sportsbook host
    pub const RAPID_API_HOST: &'static str = "sportsbook-api2.p.rapidapi.com";
}
