//! Shared adapter context
//!
//! One `MarketContext` is constructed at process startup and injected into
//! every capability handler. It owns the long-lived clients: the quote
//! client, the cookie-jar scrape sessions and the coin-ranking client.

use crate::cache::MarketCache;
use crate::config::MarketConfig;
use crate::error::Result;
use crate::exchange::{NseClient, ScrapeSession, ScreenerClient, SessionStrategy};
use crate::quote::{BatchFetcher, QuoteClient};
use crate::rankings::CoinRankingClient;
use std::sync::Arc;
use tracing::info;

/// Long-lived adapter bundle shared by all capability handlers
pub struct MarketContext {
    /// Adapter configuration
    pub config: MarketConfig,
    /// Quote provider client
    pub quotes: QuoteClient,
    /// Multi-symbol batch fetcher
    pub fetcher: BatchFetcher,
    /// Exchange JSON-endpoint client
    pub nse: NseClient,
    /// Screening-site client; `None` without credentials
    pub screener: Option<ScreenerClient>,
    /// Coin-ranking client
    pub rankings: CoinRankingClient,
    /// Shared quote cache
    pub cache: MarketCache,
}

impl MarketContext {
    /// Build the context from configuration
    pub fn new(config: MarketConfig) -> Result<Arc<Self>> {
        config.validate()?;

        let cache = MarketCache::new(config.cache_ttl_quotes);
        let quotes = QuoteClient::with_timeout(config.request_timeout);
        let fetcher = BatchFetcher::new(quotes.clone(), cache.clone(), config.lookback_days);

        let exchange_session = Arc::new(ScrapeSession::new(
            SessionStrategy::CookieBootstrap {
                warmup_url: config.exchange_base_url.clone(),
            },
            config.request_timeout,
            config.scrape_rate_per_minute,
        )?);
        let nse = NseClient::new(exchange_session, config.exchange_base_url.clone());

        let screener = match (&config.screener_email, &config.screener_password) {
            (Some(email), Some(password)) => {
                let session = Arc::new(ScrapeSession::new(
                    SessionStrategy::CredentialLogin {
                        login_url: format!("{}/login/", config.screener_base_url),
                        username: email.clone(),
                        password: password.clone(),
                    },
                    config.request_timeout,
                    config.scrape_rate_per_minute,
                )?);
                Some(ScreenerClient::new(session, config.screener_base_url.clone())?)
            }
            _ => {
                info!("screener credentials absent, credential-gated screens disabled");
                None
            }
        };

        let rankings =
            CoinRankingClient::new(config.coin_ranking_base_url.clone(), config.request_timeout)?;

        Ok(Arc::new(Self {
            config,
            quotes,
            fetcher,
            nse,
            screener,
            rankings,
            cache,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_without_credentials_has_no_screener() {
        let ctx = MarketContext::new(MarketConfig::default()).expect("context");
        assert!(ctx.screener.is_none());
    }

    #[test]
    fn test_context_with_credentials_has_screener() {
        let config = MarketConfig::builder()
            .screener_credentials("dev@example.com", "hunter2")
            .build()
            .expect("config");
        let ctx = MarketContext::new(config).expect("context");
        assert!(ctx.screener.is_some());
    }
}
