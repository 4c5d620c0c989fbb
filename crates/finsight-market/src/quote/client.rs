//! Market-quote provider client
//!
//! Thin wrapper over the Yahoo Finance API. Each operation is independently
//! fallible and bounded by a timeout, so one slow upstream cannot stall a
//! whole batch. Callers decide which failures are fatal for a record.

use super::{AssetProfile, HistoryPoint, NewsItem};
use crate::error::{MarketError, Result};
use chrono::{DateTime, Duration, Utc};
use std::future::Future;
use time::OffsetDateTime;
use yahoo_finance_api as yahoo;

const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Point-in-time quote for a symbol
#[derive(Debug, Clone)]
pub struct SpotQuote {
    /// Normalized symbol
    pub symbol: String,
    /// Latest traded price
    pub price: f64,
    /// Traded volume at the quote timestamp
    pub volume: Option<u64>,
    /// Quote timestamp
    pub timestamp: DateTime<Utc>,
}

/// Quote provider client
#[derive(Debug, Clone)]
pub struct QuoteClient {
    timeout: std::time::Duration,
}

impl QuoteClient {
    /// Create a client with the default timeout
    pub fn new() -> Self {
        Self {
            timeout: std::time::Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Create a client with a custom per-call timeout
    pub fn with_timeout(timeout: std::time::Duration) -> Self {
        Self { timeout }
    }

    fn connector() -> Result<yahoo::YahooConnector> {
        yahoo::YahooConnector::new().map_err(|e| MarketError::Quote(e.to_string()))
    }

    /// Run one provider call under the client timeout
    async fn bounded<T, E, F>(&self, what: &str, fut: F) -> Result<T>
    where
        E: std::fmt::Display,
        F: Future<Output = std::result::Result<T, E>>,
    {
        tokio::time::timeout(self.timeout, fut)
            .await
            .map_err(|_| MarketError::Quote(format!("{what} timed out")))?
            .map_err(|e| MarketError::Quote(e.to_string()))
    }

    /// Get the latest quote for a symbol
    pub async fn latest_price(&self, symbol: &str) -> Result<SpotQuote> {
        let provider = Self::connector()?;

        let response = self
            .bounded(
                &format!("quote for {symbol}"),
                provider.get_latest_quotes(symbol, "1d"),
            )
            .await?;

        let quote = response
            .last_quote()
            .map_err(|e| MarketError::Quote(e.to_string()))?;

        Ok(SpotQuote {
            symbol: symbol.to_string(),
            price: quote.close,
            volume: Some(quote.volume),
            timestamp: DateTime::from_timestamp(quote.timestamp as i64, 0)
                .unwrap_or_else(Utc::now),
        })
    }

    /// Get a historical series between two instants
    pub async fn historical_series(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        interval: &str,
    ) -> Result<Vec<HistoryPoint>> {
        let provider = Self::connector()?;

        let start_odt = OffsetDateTime::from_unix_timestamp(start.timestamp())
            .map_err(|e| MarketError::Quote(format!("Invalid start timestamp: {e}")))?;
        let end_odt = OffsetDateTime::from_unix_timestamp(end.timestamp())
            .map_err(|e| MarketError::Quote(format!("Invalid end timestamp: {e}")))?;

        let response = self
            .bounded(
                &format!("history for {symbol}"),
                provider.get_quote_history_interval(symbol, start_odt, end_odt, interval),
            )
            .await?;

        let quotes = response
            .quotes()
            .map_err(|e| MarketError::Quote(e.to_string()))?;

        Ok(quotes
            .iter()
            .map(|q| HistoryPoint {
                date: DateTime::from_timestamp(q.timestamp as i64, 0)
                    .unwrap_or_else(Utc::now)
                    .format("%Y-%m-%d")
                    .to_string(),
                price: q.close,
                volume: Some(q.volume),
            })
            .collect())
    }

    /// Get the fixed lookback window of daily history ending now
    pub async fn lookback_series(&self, symbol: &str, days: i64) -> Result<Vec<HistoryPoint>> {
        let end = Utc::now();
        let start = end - Duration::days(days);
        self.historical_series(symbol, start, end, "1d").await
    }

    /// Get profile details for a symbol
    ///
    /// The provider has no dedicated profile endpoint; the ticker search
    /// result carries name, exchange and instrument type.
    pub async fn detailed_profile(&self, symbol: &str) -> Result<AssetProfile> {
        let provider = Self::connector()?;

        let result = self
            .bounded(
                &format!("profile search for {symbol}"),
                provider.search_ticker(symbol),
            )
            .await?;

        let item = result
            .quotes
            .iter()
            .find(|q| q.symbol.eq_ignore_ascii_case(symbol))
            .or_else(|| result.quotes.first())
            .ok_or_else(|| MarketError::DataUnavailable {
                symbol: symbol.to_string(),
                reason: "no profile match".to_string(),
            })?;

        Ok(AssetProfile {
            symbol: symbol.to_string(),
            name: non_empty(&item.long_name).or_else(|| non_empty(&item.short_name)),
            exchange: non_empty(&item.exchange),
            quote_type: non_empty(&item.quote_type),
        })
    }

    /// Get recent news for a symbol
    pub async fn recent_news(&self, symbol: &str, limit: usize) -> Result<Vec<NewsItem>> {
        let provider = Self::connector()?;

        let result = self
            .bounded(
                &format!("news search for {symbol}"),
                provider.search_ticker(symbol),
            )
            .await?;

        Ok(result
            .news
            .into_iter()
            .take(limit)
            .map(|n| NewsItem {
                title: n.title,
                publisher: n.publisher,
                link: n.link,
                published_at: DateTime::from_timestamp(n.provider_publish_time as i64, 0)
                    .map(|t| t.to_rfc3339()),
            })
            .collect())
    }

    /// Get a spot FX conversion rate (e.g. USD → INR)
    pub async fn fx_rate(&self, from: &str, to: &str) -> Result<f64> {
        let pair = format!(
            "{}{}=X",
            from.trim().to_uppercase(),
            to.trim().to_uppercase()
        );
        let quote = self.latest_price(&pair).await?;
        Ok(quote.price)
    }
}

impl Default for QuoteClient {
    fn default() -> Self {
        Self::new()
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty("  "), None);
        assert_eq!(non_empty("NSI"), Some("NSI".to_string()));
    }

    #[tokio::test]
    #[ignore] // Requires network access
    async fn test_latest_price() {
        let client = QuoteClient::new();
        let quote = client.latest_price("TCS.NS").await.expect("quote");
        assert_eq!(quote.symbol, "TCS.NS");
        assert!(quote.price > 0.0);
    }

    #[tokio::test]
    #[ignore] // Requires network access
    async fn test_lookback_series() {
        let client = QuoteClient::new();
        let series = client.lookback_series("TCS.NS", 15).await.expect("series");
        assert!(!series.is_empty());
        // Ascending by date
        for pair in series.windows(2) {
            assert!(pair[0].date <= pair[1].date);
        }
    }

    #[tokio::test]
    #[ignore] // Requires network access
    async fn test_fx_rate() {
        let client = QuoteClient::new();
        let rate = client.fx_rate("USD", "INR").await.expect("rate");
        assert!(rate > 0.0);
    }
}
