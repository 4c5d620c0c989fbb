//! Discovery capabilities backed by the exchange scrape adapter

use crate::context::MarketContext;
use crate::error::MarketError;
use crate::exchange::{MoveDirection, Week52Band};
use async_trait::async_trait;
use finsight_capabilities::{Capability, args, schema};
use finsight_core::Result as CoreResult;
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;

fn default_limit() -> usize {
    2
}

fn default_list_limit() -> usize {
    5
}

/// Discover today's top stocks from the exchange gainers feed and fetch a
/// full quote record for each
pub struct GetTopStocks {
    ctx: Arc<MarketContext>,
}

#[derive(Debug, Deserialize)]
struct TopStocksParams {
    #[serde(default = "default_limit")]
    limit: usize,
}

impl GetTopStocks {
    /// Create the handler
    pub fn new(ctx: &Arc<MarketContext>) -> Self {
        Self { ctx: Arc::clone(ctx) }
    }
}

#[async_trait]
impl Capability for GetTopStocks {
    async fn execute(&self, raw: Value) -> CoreResult<Value> {
        let params: TopStocksParams = args::parse_args(raw)?;

        // Ranking failure fails the whole call: no partial top-N list.
        let movers = self
            .ctx
            .nse
            .trending(MoveDirection::Gainers, params.limit)
            .await
            .map_err(|e| MarketError::RankingUnavailable(e.to_string()))
            .map_err(finsight_core::Error::from)?;

        let tickers: Vec<String> = movers.iter().map(|m| m.symbol.clone()).collect();
        let records = self.ctx.fetcher.fetch_equities(&tickers).await;

        Ok(serde_json::to_value(records)
            .map_err(MarketError::Json)
            .map_err(finsight_core::Error::from)?)
    }

    fn name(&self) -> &str {
        "get_top_stocks"
    }

    fn description(&self) -> &str {
        "Discover today's top-gaining stocks on the exchange and fetch live quotes, history \
         and news for each."
    }

    fn parameters(&self) -> Value {
        schema::object(
            json!({
                "limit": schema::integer("How many stocks to return (default 2)"),
            }),
            vec![],
        )
    }
}

/// List today's trending movers (gainers or losers)
pub struct GetTrendingStocks {
    ctx: Arc<MarketContext>,
}

#[derive(Debug, Deserialize)]
struct TrendingParams {
    #[serde(default)]
    direction: MoveDirection,
    #[serde(default = "default_list_limit")]
    limit: usize,
}

impl GetTrendingStocks {
    /// Create the handler
    pub fn new(ctx: &Arc<MarketContext>) -> Self {
        Self { ctx: Arc::clone(ctx) }
    }
}

#[async_trait]
impl Capability for GetTrendingStocks {
    async fn execute(&self, raw: Value) -> CoreResult<Value> {
        let params: TrendingParams = args::parse_args(raw)?;
        let movers = self
            .ctx
            .nse
            .trending(params.direction, params.limit)
            .await
            .map_err(finsight_core::Error::from)?;

        Ok(json!({
            "direction": match params.direction {
                MoveDirection::Gainers => "gainers",
                MoveDirection::Losers => "losers",
            },
            "movers": movers,
        }))
    }

    fn name(&self) -> &str {
        "get_trending_stocks"
    }

    fn description(&self) -> &str {
        "List today's trending movers on the exchange, biggest gainers or biggest losers."
    }

    fn parameters(&self) -> Value {
        schema::object(
            json!({
                "direction": schema::enumeration(
                    "Which end of the tape (default gainers)",
                    &["gainers", "losers"],
                ),
                "limit": schema::integer("How many movers to return (default 5)"),
            }),
            vec![],
        )
    }
}

/// List the most actively traded stocks by volume
pub struct GetMostActiveStocks {
    ctx: Arc<MarketContext>,
}

#[derive(Debug, Deserialize)]
struct MostActiveParams {
    #[serde(default = "default_list_limit")]
    limit: usize,
}

impl GetMostActiveStocks {
    /// Create the handler
    pub fn new(ctx: &Arc<MarketContext>) -> Self {
        Self { ctx: Arc::clone(ctx) }
    }
}

#[async_trait]
impl Capability for GetMostActiveStocks {
    async fn execute(&self, raw: Value) -> CoreResult<Value> {
        let params: MostActiveParams = args::parse_args(raw)?;
        let movers = self
            .ctx
            .nse
            .most_active(params.limit)
            .await
            .map_err(finsight_core::Error::from)?;

        Ok(json!({ "most_active": movers }))
    }

    fn name(&self) -> &str {
        "get_most_active_stocks"
    }

    fn description(&self) -> &str {
        "List the most actively traded stocks on the exchange by volume."
    }

    fn parameters(&self) -> Value {
        schema::object(
            json!({
                "limit": schema::integer("How many stocks to return (default 5)"),
            }),
            vec![],
        )
    }
}

/// List stocks printing fresh 52-week highs or lows
pub struct Get52WeekExtremes {
    ctx: Arc<MarketContext>,
}

#[derive(Debug, Deserialize)]
struct Week52Params {
    #[serde(default)]
    band: Week52Band,
    #[serde(default = "default_list_limit")]
    limit: usize,
}

impl Get52WeekExtremes {
    /// Create the handler
    pub fn new(ctx: &Arc<MarketContext>) -> Self {
        Self { ctx: Arc::clone(ctx) }
    }
}

#[async_trait]
impl Capability for Get52WeekExtremes {
    async fn execute(&self, raw: Value) -> CoreResult<Value> {
        let params: Week52Params = args::parse_args(raw)?;
        let stocks = self
            .ctx
            .nse
            .week_52(params.band, params.limit)
            .await
            .map_err(finsight_core::Error::from)?;

        Ok(json!({
            "band": match params.band {
                Week52Band::High => "high",
                Week52Band::Low => "low",
            },
            "stocks": stocks,
        }))
    }

    fn name(&self) -> &str {
        "get_52_week_extremes"
    }

    fn description(&self) -> &str {
        "List stocks printing fresh 52-week highs or lows on the exchange."
    }

    fn parameters(&self) -> Value {
        schema::object(
            json!({
                "band": schema::enumeration("Which extreme (default high)", &["high", "low"]),
                "limit": schema::integer("How many stocks to return (default 5)"),
            }),
            vec![],
        )
    }
}

/// Fetch a snapshot of a market index
pub struct GetIndexData {
    ctx: Arc<MarketContext>,
}

#[derive(Debug, Deserialize)]
struct IndexParams {
    index: String,
}

impl GetIndexData {
    /// Create the handler
    pub fn new(ctx: &Arc<MarketContext>) -> Self {
        Self { ctx: Arc::clone(ctx) }
    }
}

#[async_trait]
impl Capability for GetIndexData {
    async fn execute(&self, raw: Value) -> CoreResult<Value> {
        let params: IndexParams = args::parse_args(raw)?;
        if params.index.trim().is_empty() {
            return Err(MarketError::Validation("index must not be empty".to_string()).into());
        }

        let snapshot = self
            .ctx
            .nse
            .index_snapshot(&params.index)
            .await
            .map_err(finsight_core::Error::from)?;

        Ok(serde_json::to_value(snapshot)
            .map_err(MarketError::Json)
            .map_err(finsight_core::Error::from)?)
    }

    fn name(&self) -> &str {
        "get_index_data"
    }

    fn description(&self) -> &str {
        "Fetch the current value, day change and session range of a market index \
         (e.g. NIFTY 50)."
    }

    fn parameters(&self) -> Value {
        schema::object(
            json!({
                "index": schema::string("Index name, e.g. \"NIFTY 50\""),
            }),
            vec!["index"],
        )
    }
}

/// Report whether the market is open
pub struct GetMarketStatus {
    ctx: Arc<MarketContext>,
}

impl GetMarketStatus {
    /// Create the handler
    pub fn new(ctx: &Arc<MarketContext>) -> Self {
        Self { ctx: Arc::clone(ctx) }
    }
}

#[async_trait]
impl Capability for GetMarketStatus {
    async fn execute(&self, _raw: Value) -> CoreResult<Value> {
        let states = self
            .ctx
            .nse
            .market_status()
            .await
            .map_err(finsight_core::Error::from)?;

        Ok(json!({ "markets": states }))
    }

    fn name(&self) -> &str {
        "get_market_status"
    }

    fn description(&self) -> &str {
        "Report whether the exchange's market segments are currently open or closed."
    }

    fn parameters(&self) -> Value {
        schema::object(json!({}), vec![])
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
    fn test_limit_defaults() {
        let params: TopStocksParams = args::parse_args(json!({})).expect("defaults");
        assert_eq!(params.limit, 2);

        let params: TrendingParams = args::parse_args(json!({})).expect("defaults");
        assert_eq!(params.limit, 5);
        assert_eq!(params.direction, MoveDirection::Gainers);
    }

    #[test]
    fn test_empty_index_rejected() {
        let tool = GetIndexData::new(&ctx());
        let result = tokio_test::block_on(tool.execute(json!({"index": "  "})));
        assert!(result.is_err());
    }

    #[test]
    fn test_metadata() {
        let ctx = ctx();
        assert_eq!(GetTopStocks::new(&ctx).name(), "get_top_stocks");
        assert_eq!(GetMarketStatus::new(&ctx).name(), "get_market_status");
        assert_eq!(
            Get52WeekExtremes::new(&ctx).parameters()["properties"]["band"]["enum"][0],
            "high"
        );
    }
}
