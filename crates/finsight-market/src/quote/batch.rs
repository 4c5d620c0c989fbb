//! Multi-symbol fetch with partial-failure semantics
//!
//! One record per input symbol, in input order. A failed quote fetch turns
//! that symbol's record into `{symbol, error}`; profile and news failures
//! degrade the record without failing it.

use super::{AssetQuote, QuoteClient};
use crate::cache::{CacheKey, MarketCache};
use crate::symbols;
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

/// Quote currency for crypto batches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    /// US dollar (default)
    #[default]
    Usd,
    /// Indian rupee, converted via a per-batch spot rate
    Inr,
}

impl Currency {
    /// ISO code of the currency
    pub fn code(self) -> &'static str {
        match self {
            Self::Usd => "USD",
            Self::Inr => "INR",
        }
    }
}

/// How many news items each record carries
const NEWS_PER_RECORD: usize = 5;

/// Batch fetcher shared by every multi-symbol capability
pub struct BatchFetcher {
    client: QuoteClient,
    cache: MarketCache,
    lookback_days: i64,
}

impl BatchFetcher {
    /// Create a new batch fetcher
    pub fn new(client: QuoteClient, cache: MarketCache, lookback_days: i64) -> Self {
        Self {
            client,
            cache,
            lookback_days,
        }
    }

    /// Fetch one record per equity symbol, preserving input order
    pub async fn fetch_equities(&self, raw_symbols: &[String]) -> Vec<AssetQuote> {
        let normalized: Vec<String> = raw_symbols
            .iter()
            .map(|s| symbols::normalize_equity(s))
            .collect();
        self.fetch_all(&normalized, 1.0, "USD").await
    }

    /// Fetch one record per crypto symbol, preserving input order
    ///
    /// For INR the USD→INR spot rate is fetched once for the whole batch;
    /// a rate-fetch failure degrades to rate 1.0 and the batch proceeds.
    pub async fn fetch_cryptos(&self, raw_symbols: &[String], currency: Currency) -> Vec<AssetQuote> {
        let rate = match currency {
            Currency::Usd => 1.0,
            Currency::Inr => match self.client.fx_rate("USD", "INR").await {
                Ok(rate) => rate,
                Err(err) => {
                    warn!(error = %err, "USD→INR rate unavailable, proceeding unconverted");
                    1.0
                }
            },
        };

        let normalized: Vec<String> = raw_symbols
            .iter()
            .map(|s| symbols::normalize_crypto(s))
            .collect();
        self.fetch_all(&normalized, rate, currency.code()).await
    }

    /// Fetch all symbols concurrently; `join_all` keeps input order
    async fn fetch_all(&self, normalized: &[String], rate: f64, currency: &str) -> Vec<AssetQuote> {
        let tasks = normalized
            .iter()
            .map(|symbol| self.fetch_one(symbol.clone(), rate, currency));
        futures::future::join_all(tasks).await
    }

    /// Fetch one asset record: quote + lookback history + profile + news
    async fn fetch_one(&self, symbol: String, rate: f64, currency: &str) -> AssetQuote {
        let cache_key = CacheKey::new(&symbol, "asset", json!({ "currency": currency }));
        if let Some(cached) = self.cache.get(&cache_key).await {
            if let Ok(record) = serde_json::from_value::<AssetQuote>(cached) {
                return record;
            }
        }

        let spot = match self.client.latest_price(&symbol).await {
            Ok(spot) => spot,
            Err(err) => return AssetQuote::failed(symbol, err.to_string()),
        };

        let mut history = match self.client.lookback_series(&symbol, self.lookback_days).await {
            Ok(history) => history,
            Err(err) => {
                warn!(symbol = %symbol, error = %err, "history unavailable");
                Vec::new()
            }
        };

        let profile = match self.client.detailed_profile(&symbol).await {
            Ok(profile) => Some(profile),
            Err(err) => {
                warn!(symbol = %symbol, error = %err, "profile unavailable");
                None
            }
        };

        let news = match self.client.recent_news(&symbol, NEWS_PER_RECORD).await {
            Ok(news) => news,
            Err(err) => {
                warn!(symbol = %symbol, error = %err, "news unavailable");
                Vec::new()
            }
        };

        for point in &mut history {
            point.price *= rate;
        }

        let current_price = spot.price * rate;
        // The last history point is today's close; the one before is the
        // previous session.
        let previous_close = history.len().checked_sub(2).map(|i| history[i].price);

        let (change_absolute, change_percent) = match previous_close {
            Some(prev) if prev != 0.0 => {
                let abs = current_price - prev;
                (Some(abs), Some(abs / prev * 100.0))
            }
            _ => (None, None),
        };

        let display_name = profile
            .as_ref()
            .and_then(|p| p.name.clone())
            .unwrap_or_else(|| symbols::display_symbol(&symbol).to_string());

        let record = AssetQuote {
            symbol,
            display_name,
            current_price: Some(current_price),
            change_absolute,
            change_percent,
            market_cap: None,
            history,
            profile,
            news,
            error: None,
        };

        if let Ok(value) = serde_json::to_value(&record) {
            self.cache.insert(cache_key, value).await;
        }

        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_currency_parsing() {
        let parsed: Currency = serde_json::from_str("\"INR\"").expect("parse");
        assert_eq!(parsed, Currency::Inr);
        assert_eq!(Currency::default(), Currency::Usd);
        assert_eq!(Currency::Inr.code(), "INR");
    }

    #[tokio::test]
    #[ignore] // Requires network access
    async fn test_batch_order_matches_input() {
        let fetcher = BatchFetcher::new(
            QuoteClient::new(),
            MarketCache::new(Duration::from_secs(60)),
            15,
        );

        let symbols = vec!["INFY".to_string(), "TCS".to_string()];
        let records = fetcher.fetch_equities(&symbols).await;

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].symbol, "INFY.NS");
        assert_eq!(records[1].symbol, "TCS.NS");
    }

    #[tokio::test]
    #[ignore] // Requires network access
    async fn test_bad_symbol_is_partial_failure() {
        let fetcher = BatchFetcher::new(
            QuoteClient::new(),
            MarketCache::new(Duration::from_secs(60)),
            15,
        );

        let symbols = vec!["TCS".to_string(), "DOESNOTEXIST123".to_string()];
        let records = fetcher.fetch_equities(&symbols).await;

        assert_eq!(records.len(), 2);
        assert!(!records[0].is_error());
        assert!(records[1].is_error());
    }
}
