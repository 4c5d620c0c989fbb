//! Configuration for market-data operations

use crate::error::{MarketError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for market-data adapters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketConfig {
    /// Lookback window attached to every batch quote record, in days
    pub lookback_days: i64,

    /// Cache TTL for quote data
    pub cache_ttl_quotes: Duration,

    /// Request timeout for every upstream call
    pub request_timeout: Duration,

    /// Scrape requests allowed per minute against the exchange site
    pub scrape_rate_per_minute: u32,

    /// Exchange site base URL
    pub exchange_base_url: String,

    /// Screening site base URL
    pub screener_base_url: String,

    /// Coin-ranking API base URL
    pub coin_ranking_base_url: String,

    /// Screening site credentials (required only by credential-gated screens)
    pub screener_email: Option<String>,
    pub screener_password: Option<String>,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            lookback_days: 15,
            cache_ttl_quotes: Duration::from_secs(60),
            request_timeout: Duration::from_secs(15),
            scrape_rate_per_minute: 30,
            exchange_base_url: "https://www.nseindia.com".to_string(),
            screener_base_url: "https://www.screener.in".to_string(),
            coin_ranking_base_url: "https://api.coingecko.com/api/v3".to_string(),
            screener_email: None,
            screener_password: None,
        }
    }
}

impl MarketConfig {
    /// Create a new configuration builder
    pub fn builder() -> MarketConfigBuilder {
        MarketConfigBuilder::default()
    }

    /// Load screener credentials from the environment
    ///
    /// Reads `SCREENER_EMAIL` and `SCREENER_PASSWORD` when set; absent
    /// variables leave the credential-gated screens unavailable rather than
    /// failing startup.
    pub fn with_env_credentials(mut self) -> Self {
        if let Ok(email) = std::env::var("SCREENER_EMAIL") {
            self.screener_email = Some(email);
        }
        if let Ok(password) = std::env::var("SCREENER_PASSWORD") {
            self.screener_password = Some(password);
        }
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.lookback_days <= 0 {
            return Err(MarketError::Config(
                "lookback_days must be positive".to_string(),
            ));
        }
        if self.scrape_rate_per_minute == 0 {
            return Err(MarketError::Config(
                "scrape_rate_per_minute must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for `MarketConfig`
#[derive(Debug, Default)]
pub struct MarketConfigBuilder {
    lookback_days: Option<i64>,
    cache_ttl_quotes: Option<Duration>,
    request_timeout: Option<Duration>,
    scrape_rate_per_minute: Option<u32>,
    exchange_base_url: Option<String>,
    screener_base_url: Option<String>,
    coin_ranking_base_url: Option<String>,
    screener_email: Option<String>,
    screener_password: Option<String>,
}

impl MarketConfigBuilder {
    /// Set the history lookback window in days
    pub fn lookback_days(mut self, days: i64) -> Self {
        self.lookback_days = Some(days);
        self
    }

    /// Set the quote cache TTL
    pub fn cache_ttl_quotes(mut self, ttl: Duration) -> Self {
        self.cache_ttl_quotes = Some(ttl);
        self
    }

    /// Set the upstream request timeout
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Set the scrape rate limit (requests per minute)
    pub fn scrape_rate_per_minute(mut self, rate: u32) -> Self {
        self.scrape_rate_per_minute = Some(rate);
        self
    }

    /// Set the exchange site base URL
    pub fn exchange_base_url(mut self, url: impl Into<String>) -> Self {
        self.exchange_base_url = Some(url.into());
        self
    }

    /// Set the screening site base URL
    pub fn screener_base_url(mut self, url: impl Into<String>) -> Self {
        self.screener_base_url = Some(url.into());
        self
    }

    /// Set the coin-ranking API base URL
    pub fn coin_ranking_base_url(mut self, url: impl Into<String>) -> Self {
        self.coin_ranking_base_url = Some(url.into());
        self
    }

    /// Set screener credentials
    pub fn screener_credentials(
        mut self,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.screener_email = Some(email.into());
        self.screener_password = Some(password.into());
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<MarketConfig> {
        let defaults = MarketConfig::default();

        let config = MarketConfig {
            lookback_days: self.lookback_days.unwrap_or(defaults.lookback_days),
            cache_ttl_quotes: self.cache_ttl_quotes.unwrap_or(defaults.cache_ttl_quotes),
            request_timeout: self.request_timeout.unwrap_or(defaults.request_timeout),
            scrape_rate_per_minute: self
                .scrape_rate_per_minute
                .unwrap_or(defaults.scrape_rate_per_minute),
            exchange_base_url: self.exchange_base_url.unwrap_or(defaults.exchange_base_url),
            screener_base_url: self.screener_base_url.unwrap_or(defaults.screener_base_url),
            coin_ranking_base_url: self
                .coin_ranking_base_url
                .unwrap_or(defaults.coin_ranking_base_url),
            screener_email: self.screener_email,
            screener_password: self.screener_password,
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MarketConfig::default();
        assert_eq!(config.lookback_days, 15);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = MarketConfig::builder()
            .lookback_days(30)
            .scrape_rate_per_minute(10)
            .screener_credentials("dev@example.com", "hunter2")
            .build()
            .expect("valid config");

        assert_eq!(config.lookback_days, 30);
        assert_eq!(config.scrape_rate_per_minute, 10);
        assert_eq!(config.screener_email.as_deref(), Some("dev@example.com"));
    }

    #[test]
    fn test_invalid_lookback_rejected() {
        let result = MarketConfig::builder().lookback_days(0).build();
        assert!(result.is_err());
    }
}
