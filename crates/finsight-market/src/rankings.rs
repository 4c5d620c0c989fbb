//! Coin-ranking REST client
//!
//! Supplies the market-cap-ordered coin list that `get_top_cryptos` uses to
//! discover symbols before reusing the per-symbol quote path.

use crate::error::{MarketError, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One coin of the ranked list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedCoin {
    /// Provider-side coin id
    pub id: String,
    /// Ticker symbol (lowercase on the wire)
    pub symbol: String,
    /// Display name
    pub name: String,
    /// Market capitalization in USD
    #[serde(default)]
    pub market_cap: Option<f64>,
}

/// Client for the coin-ranking API
#[derive(Debug, Clone)]
pub struct CoinRankingClient {
    client: Client,
    base_url: String,
}

impl CoinRankingClient {
    /// Create a new client
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(MarketError::Network)?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// Top coins by market capitalization, descending
    ///
    /// Any failure here fails the whole top-N call: there is no meaningful
    /// partial list without a valid ranking.
    pub async fn top_by_market_cap(&self, limit: u64) -> Result<Vec<RankedCoin>> {
        let url = format!(
            "{}/coins/markets?vs_currency=usd&order=market_cap_desc&per_page={limit}&page=1",
            self.base_url
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| MarketError::RankingUnavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(MarketError::RankingUnavailable(format!(
                "HTTP {} from coin ranking",
                response.status()
            )));
        }

        let coins: Vec<RankedCoin> = response
            .json()
            .await
            .map_err(|e| MarketError::RankingUnavailable(e.to_string()))?;

        if coins.is_empty() {
            return Err(MarketError::RankingUnavailable(
                "coin ranking returned an empty list".to_string(),
            ));
        }

        Ok(coins)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ranked_coin_parsing() {
        let raw = r#"[{"id": "bitcoin", "symbol": "btc", "name": "Bitcoin", "market_cap": 1.0e12}]"#;
        let coins: Vec<RankedCoin> = serde_json::from_str(raw).expect("parse");
        assert_eq!(coins[0].symbol, "btc");
        assert_eq!(coins[0].market_cap, Some(1.0e12));
    }

    #[tokio::test]
    #[ignore] // Requires network access
    async fn test_top_by_market_cap() {
        let client = CoinRankingClient::new(
            "https://api.coingecko.com/api/v3",
            Duration::from_secs(15),
        )
        .expect("client");
        let coins = client.top_by_market_cap(3).await.expect("ranking");
        assert_eq!(coins.len(), 3);
    }
}
