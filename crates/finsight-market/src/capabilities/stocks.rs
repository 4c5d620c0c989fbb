//! Stock quote, history, profile and news capabilities

use crate::context::MarketContext;
use crate::error::MarketError;
use crate::symbols;
use async_trait::async_trait;
use chrono::{Duration, Utc};
use finsight_capabilities::{Capability, args, schema};
use finsight_core::Result as CoreResult;
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;

/// Fetch live quotes (with lookback history, profile and news) for one or
/// more stock symbols
pub struct GetStockPrice {
    ctx: Arc<MarketContext>,
}

#[derive(Debug, Deserialize)]
struct SymbolsParams {
    symbols: Vec<String>,
}

impl GetStockPrice {
    /// Create the handler
    pub fn new(ctx: &Arc<MarketContext>) -> Self {
        Self { ctx: Arc::clone(ctx) }
    }
}

#[async_trait]
impl Capability for GetStockPrice {
    async fn execute(&self, raw: Value) -> CoreResult<Value> {
        let params: SymbolsParams = args::parse_args(raw)?;
        if params.symbols.is_empty() {
            return Err(MarketError::Validation("symbols must not be empty".to_string()).into());
        }

        let records = self.ctx.fetcher.fetch_equities(&params.symbols).await;
        Ok(serde_json::to_value(records)
            .map_err(MarketError::Json)
            .map_err(finsight_core::Error::from)?)
    }

    fn name(&self) -> &str {
        "get_stock_price"
    }

    fn description(&self) -> &str {
        "Fetch the live price, day change, recent history, profile and news for one or more \
         stock symbols. Bare tickers are treated as NSE-listed Indian equities."
    }

    fn parameters(&self) -> Value {
        schema::object(
            json!({
                "symbols": schema::string_array("Stock ticker symbols, e.g. [\"TCS\", \"INFY\"]"),
            }),
            vec!["symbols"],
        )
    }
}

/// Compare live quotes and recent performance across stocks
pub struct CompareStocks {
    ctx: Arc<MarketContext>,
}

impl CompareStocks {
    /// Create the handler
    pub fn new(ctx: &Arc<MarketContext>) -> Self {
        Self { ctx: Arc::clone(ctx) }
    }
}

#[async_trait]
impl Capability for CompareStocks {
    async fn execute(&self, raw: Value) -> CoreResult<Value> {
        let params: SymbolsParams = args::parse_args(raw)?;
        if params.symbols.len() < 2 {
            return Err(
                MarketError::Validation("comparison needs at least two symbols".to_string()).into(),
            );
        }

        let records = self.ctx.fetcher.fetch_equities(&params.symbols).await;
        Ok(serde_json::to_value(records)
            .map_err(MarketError::Json)
            .map_err(finsight_core::Error::from)?)
    }

    fn name(&self) -> &str {
        "compare_stocks"
    }

    fn description(&self) -> &str {
        "Compare two or more stocks side by side: price, day change and recent trend."
    }

    fn parameters(&self) -> Value {
        schema::object(
            json!({
                "symbols": schema::string_array("Two or more stock ticker symbols"),
            }),
            vec!["symbols"],
        )
    }
}

/// Fetch a historical price series over a named range
pub struct GetStockHistory {
    ctx: Arc<MarketContext>,
}

#[derive(Debug, Deserialize)]
struct HistoryParams {
    symbol: String,
    #[serde(default = "default_range")]
    range: String,
    #[serde(default = "default_interval")]
    interval: String,
}

fn default_range() -> String {
    "1mo".to_string()
}

fn default_interval() -> String {
    "1d".to_string()
}

fn range_to_days(range: &str) -> Option<i64> {
    match range {
        "5d" => Some(5),
        "1mo" => Some(30),
        "3mo" => Some(90),
        "6mo" => Some(180),
        "1y" => Some(365),
        _ => None,
    }
}

impl GetStockHistory {
    /// Create the handler
    pub fn new(ctx: &Arc<MarketContext>) -> Self {
        Self { ctx: Arc::clone(ctx) }
    }
}

#[async_trait]
impl Capability for GetStockHistory {
    async fn execute(&self, raw: Value) -> CoreResult<Value> {
        let params: HistoryParams = args::parse_args(raw)?;
        let symbol = symbols::normalize_equity(&params.symbol);

        let days = range_to_days(&params.range).ok_or_else(|| {
            finsight_core::Error::from(MarketError::Validation(format!(
                "range must be one of 5d, 1mo, 3mo, 6mo, 1y (got {})",
                params.range
            )))
        })?;

        let end = Utc::now();
        let start = end - Duration::days(days);
        let history = self
            .ctx
            .quotes
            .historical_series(&symbol, start, end, &params.interval)
            .await
            .map_err(finsight_core::Error::from)?;

        Ok(json!({
            "symbol": symbol,
            "range": params.range,
            "interval": params.interval,
            "points": history.len(),
            "history": history,
        }))
    }

    fn name(&self) -> &str {
        "get_stock_history"
    }

    fn description(&self) -> &str {
        "Fetch a historical closing-price series for a stock over a named range."
    }

    fn parameters(&self) -> Value {
        schema::object(
            json!({
                "symbol": schema::string("Stock ticker symbol"),
                "range": schema::enumeration(
                    "Time range for the series",
                    &["5d", "1mo", "3mo", "6mo", "1y"],
                ),
                "interval": schema::string_with_default("Sampling interval", "1d"),
            }),
            vec!["symbol"],
        )
    }
}

/// Fetch profile details for a stock
pub struct GetCompanyProfile {
    ctx: Arc<MarketContext>,
}

#[derive(Debug, Deserialize)]
struct SymbolParam {
    symbol: String,
}

impl GetCompanyProfile {
    /// Create the handler
    pub fn new(ctx: &Arc<MarketContext>) -> Self {
        Self { ctx: Arc::clone(ctx) }
    }
}

#[async_trait]
impl Capability for GetCompanyProfile {
    async fn execute(&self, raw: Value) -> CoreResult<Value> {
        let params: SymbolParam = args::parse_args(raw)?;
        let symbol = symbols::normalize_equity(&params.symbol);

        let profile = self
            .ctx
            .quotes
            .detailed_profile(&symbol)
            .await
            .map_err(finsight_core::Error::from)?;

        // The quote is best-effort context here, not the point of the call.
        let current_price = self
            .ctx
            .quotes
            .latest_price(&symbol)
            .await
            .ok()
            .map(|q| q.price);

        Ok(json!({
            "symbol": symbol,
            "profile": profile,
            "current_price": current_price,
        }))
    }

    fn name(&self) -> &str {
        "get_company_profile"
    }

    fn description(&self) -> &str {
        "Fetch profile details (name, exchange, instrument type) for a stock symbol."
    }

    fn parameters(&self) -> Value {
        schema::object(
            json!({
                "symbol": schema::string("Stock ticker symbol"),
            }),
            vec!["symbol"],
        )
    }
}

/// Fetch recent news for a stock
pub struct GetStockNews {
    ctx: Arc<MarketContext>,
}

#[derive(Debug, Deserialize)]
struct NewsParams {
    symbol: String,
    #[serde(default = "default_news_limit")]
    limit: usize,
}

fn default_news_limit() -> usize {
    5
}

impl GetStockNews {
    /// Create the handler
    pub fn new(ctx: &Arc<MarketContext>) -> Self {
        Self { ctx: Arc::clone(ctx) }
    }
}

#[async_trait]
impl Capability for GetStockNews {
    async fn execute(&self, raw: Value) -> CoreResult<Value> {
        let params: NewsParams = args::parse_args(raw)?;
        let symbol = symbols::normalize_equity(&params.symbol);

        let news = self
            .ctx
            .quotes
            .recent_news(&symbol, params.limit)
            .await
            .map_err(finsight_core::Error::from)?;

        Ok(json!({
            "symbol": symbol,
            "news": news,
        }))
    }

    fn name(&self) -> &str {
        "get_stock_news"
    }

    fn description(&self) -> &str {
        "Fetch recent news headlines for a stock symbol."
    }

    fn parameters(&self) -> Value {
        schema::object(
            json!({
                "symbol": schema::string("Stock ticker symbol"),
                "limit": schema::integer("Maximum headlines to return (default 5)"),
            }),
            vec!["symbol"],
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
        let tool = GetStockPrice::new(&ctx);
        assert_eq!(tool.name(), "get_stock_price");
        assert!(!tool.description().is_empty());
        assert_eq!(tool.parameters()["required"][0], "symbols");
    }

    #[test]
    fn test_empty_symbols_rejected() {
        let tool = GetStockPrice::new(&ctx());
        let result = tokio_test::block_on(tool.execute(json!({"symbols": []})));
        assert!(result.is_err());
    }

    #[test]
    fn test_compare_needs_two_symbols() {
        let tool = CompareStocks::new(&ctx());
        let result = tokio_test::block_on(tool.execute(json!({"symbols": ["TCS"]})));
        assert!(result.is_err());
    }

    #[test]
    fn test_history_invalid_range_rejected() {
        let tool = GetStockHistory::new(&ctx());
        let result =
            tokio_test::block_on(tool.execute(json!({"symbol": "TCS", "range": "2week"})));
        assert!(matches!(
            result,
            Err(finsight_core::Error::InvalidArguments(_))
        ));
    }

    #[test]
    fn test_range_mapping() {
        assert_eq!(range_to_days("5d"), Some(5));
        assert_eq!(range_to_days("1y"), Some(365));
        assert_eq!(range_to_days("max"), None);
    }
}
