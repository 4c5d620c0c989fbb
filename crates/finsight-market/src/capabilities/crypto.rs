//! Crypto quote, history and top-N capabilities

use crate::context::MarketContext;
use crate::error::MarketError;
use crate::quote::Currency;
use crate::symbols;
use async_trait::async_trait;
use finsight_capabilities::{Capability, args, schema};
use finsight_core::Result as CoreResult;
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;

/// Fetch live prices for one or more cryptocurrencies
pub struct GetCryptoPrice {
    ctx: Arc<MarketContext>,
}

#[derive(Debug, Deserialize)]
struct CryptoPriceParams {
    symbols: Vec<String>,
    #[serde(default)]
    currency: Currency,
}

impl GetCryptoPrice {
    /// Create the handler
    pub fn new(ctx: &Arc<MarketContext>) -> Self {
        Self { ctx: Arc::clone(ctx) }
    }
}

#[async_trait]
impl Capability for GetCryptoPrice {
    async fn execute(&self, raw: Value) -> CoreResult<Value> {
        let params: CryptoPriceParams = args::parse_args(raw)?;
        if params.symbols.is_empty() {
            return Err(MarketError::Validation("symbols must not be empty".to_string()).into());
        }

        let records = self
            .ctx
            .fetcher
            .fetch_cryptos(&params.symbols, params.currency)
            .await;
        Ok(serde_json::to_value(records)
            .map_err(MarketError::Json)
            .map_err(finsight_core::Error::from)?)
    }

    fn name(&self) -> &str {
        "get_crypto_price"
    }

    fn description(&self) -> &str {
        "Fetch the live price, day change and recent history for one or more cryptocurrencies. \
         Bare tickers are priced in USD; pass currency INR for rupee conversion."
    }

    fn parameters(&self) -> Value {
        schema::object(
            json!({
                "symbols": schema::string_array("Crypto ticker symbols, e.g. [\"BTC\", \"ETH\"]"),
                "currency": schema::enumeration("Quote currency (default USD)", &["USD", "INR"]),
            }),
            vec!["symbols"],
        )
    }
}

/// Fetch a historical price series for a cryptocurrency
pub struct GetCryptoHistory {
    ctx: Arc<MarketContext>,
}

#[derive(Debug, Deserialize)]
struct CryptoHistoryParams {
    symbol: String,
    #[serde(default = "default_days")]
    days: i64,
}

fn default_days() -> i64 {
    30
}

impl GetCryptoHistory {
    /// Create the handler
    pub fn new(ctx: &Arc<MarketContext>) -> Self {
        Self { ctx: Arc::clone(ctx) }
    }
}

#[async_trait]
impl Capability for GetCryptoHistory {
    async fn execute(&self, raw: Value) -> CoreResult<Value> {
        let params: CryptoHistoryParams = args::parse_args(raw)?;
        if params.days <= 0 || params.days > 365 {
            return Err(
                MarketError::Validation("days must be between 1 and 365".to_string()).into(),
            );
        }

        let symbol = symbols::normalize_crypto(&params.symbol);
        let history = self
            .ctx
            .quotes
            .lookback_series(&symbol, params.days)
            .await
            .map_err(finsight_core::Error::from)?;

        Ok(json!({
            "symbol": symbol,
            "days": params.days,
            "points": history.len(),
            "history": history,
        }))
    }

    fn name(&self) -> &str {
        "get_crypto_history"
    }

    fn description(&self) -> &str {
        "Fetch a daily closing-price series for a cryptocurrency over a lookback window."
    }

    fn parameters(&self) -> Value {
        schema::object(
            json!({
                "symbol": schema::string("Crypto ticker symbol"),
                "days": schema::integer("Lookback window in days (default 30)"),
            }),
            vec!["symbol"],
        )
    }
}

/// Fetch the top cryptocurrencies by market capitalization
pub struct GetTopCryptos {
    ctx: Arc<MarketContext>,
}

#[derive(Debug, Deserialize)]
struct TopParams {
    #[serde(default = "default_limit")]
    limit: u64,
    #[serde(default)]
    currency: Currency,
}

fn default_limit() -> u64 {
    2
}

impl GetTopCryptos {
    /// Create the handler
    pub fn new(ctx: &Arc<MarketContext>) -> Self {
        Self { ctx: Arc::clone(ctx) }
    }
}

#[async_trait]
impl Capability for GetTopCryptos {
    async fn execute(&self, raw: Value) -> CoreResult<Value> {
        let params: TopParams = args::parse_args(raw)?;

        // Ranking failure fails the whole call: no partial top-N list.
        let ranked = self
            .ctx
            .rankings
            .top_by_market_cap(params.limit)
            .await
            .map_err(finsight_core::Error::from)?;

        let tickers: Vec<String> = ranked.iter().map(|c| c.symbol.to_uppercase()).collect();
        let mut records = self
            .ctx
            .fetcher
            .fetch_cryptos(&tickers, params.currency)
            .await;

        // The ranking source knows market cap; the quote provider does not.
        for (record, coin) in records.iter_mut().zip(ranked.iter()) {
            if !record.is_error() {
                record.market_cap = coin.market_cap;
                if record.display_name.is_empty() {
                    record.display_name.clone_from(&coin.name);
                }
            }
        }

        Ok(serde_json::to_value(records)
            .map_err(MarketError::Json)
            .map_err(finsight_core::Error::from)?)
    }

    fn name(&self) -> &str {
        "get_top_cryptos"
    }

    fn description(&self) -> &str {
        "Discover the top cryptocurrencies by market capitalization and fetch live quotes \
         for each."
    }

    fn parameters(&self) -> Value {
        schema::object(
            json!({
                "limit": schema::integer("How many coins to return (default 2)"),
                "currency": schema::enumeration("Quote currency (default USD)", &["USD", "INR"]),
            }),
            vec![],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MarketConfig;

    fn ctx() -> Arc<MarketContext> {
        MarketContext::new(MarketConfig::default()).expect("context")
    }

    #[test]
    fn test_metadata() {
        let ctx = ctx();
        let tool = GetTopCryptos::new(&ctx);
        assert_eq!(tool.name(), "get_top_cryptos");
        // All-optional parameters: an empty invocation must parse.
        let params: TopParams = args::parse_args(json!({})).expect("defaults");
        assert_eq!(params.limit, 2);
        assert_eq!(params.currency, Currency::Usd);
    }

    #[test]
    fn test_crypto_history_bounds() {
        let tool = GetCryptoHistory::new(&ctx());
        let result = tokio_test::block_on(tool.execute(json!({"symbol": "BTC", "days": 0})));
        assert!(result.is_err());

        let result = tokio_test::block_on(tool.execute(json!({"symbol": "BTC", "days": 9999})));
        assert!(result.is_err());
    }

    #[test]
    fn test_currency_default_usd() {
        let params: CryptoPriceParams =
            args::parse_args(json!({"symbols": ["BTC"]})).expect("parse");
        assert_eq!(params.currency, Currency::Usd);

        let params: CryptoPriceParams =
            args::parse_args(json!({"symbols": ["BTC"], "currency": "INR"})).expect("parse");
        assert_eq!(params.currency, Currency::Inr);
    }
}
