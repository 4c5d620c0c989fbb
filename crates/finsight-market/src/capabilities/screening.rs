//! Fundamental-screen capabilities (credential-gated)

use crate::context::MarketContext;
use crate::error::MarketError;
use crate::exchange::{ReturnPeriod, ScreenFilters};
use async_trait::async_trait;
use finsight_capabilities::{Capability, args, schema};
use finsight_core::Result as CoreResult;
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;

fn missing_credentials() -> finsight_core::Error {
    MarketError::AuthRequired(
        "the screening site requires credentials; set SCREENER_EMAIL and SCREENER_PASSWORD"
            .to_string(),
    )
    .into()
}

/// Screen for fundamentally sound stocks under a price ceiling
pub struct GetBestStocksUnderPrice {
    ctx: Arc<MarketContext>,
}

#[derive(Debug, Deserialize)]
struct ScreenParams {
    #[serde(rename = "maxPrice")]
    max_price: f64,
    #[serde(rename = "minGrowth", default)]
    min_growth: Option<f64>,
    #[serde(rename = "maxDebtToEquity", default)]
    max_debt_to_equity: Option<f64>,
    #[serde(rename = "minMarketCap", default)]
    min_market_cap: Option<f64>,
}

impl GetBestStocksUnderPrice {
    /// Create the handler
    pub fn new(ctx: &Arc<MarketContext>) -> Self {
        Self { ctx: Arc::clone(ctx) }
    }
}

#[async_trait]
impl Capability for GetBestStocksUnderPrice {
    async fn execute(&self, raw: Value) -> CoreResult<Value> {
        let params: ScreenParams = args::parse_args(raw)?;
        if params.max_price <= 0.0 {
            return Err(MarketError::Validation("maxPrice must be positive".to_string()).into());
        }

        let screener = self.ctx.screener.as_ref().ok_or_else(missing_credentials)?;

        let filters = ScreenFilters {
            max_price: params.max_price,
            min_growth: params.min_growth,
            max_debt_to_equity: params.max_debt_to_equity,
            min_market_cap: params.min_market_cap,
        };

        let rows = screener
            .screen(&filters)
            .await
            .map_err(finsight_core::Error::from)?;

        Ok(json!({
            "query": filters.to_query(),
            "matches": rows.len(),
            "stocks": rows,
        }))
    }

    fn name(&self) -> &str {
        "get_best_stocks_under_price"
    }

    fn description(&self) -> &str {
        "Screen for stocks under a price ceiling with optional growth, debt and market-cap \
         constraints."
    }

    fn parameters(&self) -> Value {
        schema::object(
            json!({
                "maxPrice": schema::number("Maximum share price"),
                "minGrowth": schema::number("Minimum profit growth, percent"),
                "maxDebtToEquity": schema::number("Maximum debt-to-equity ratio"),
                "minMarketCap": schema::number("Minimum market capitalization, crores"),
            }),
            vec!["maxPrice"],
        )
    }
}

/// Leaderboard of the highest trailing returns
pub struct GetHighestReturnStocks {
    ctx: Arc<MarketContext>,
}

#[derive(Debug, Deserialize)]
struct ReturnParams {
    period: ReturnPeriod,
    #[serde(default = "default_limit")]
    limit: usize,
}

fn default_limit() -> usize {
    5
}

impl GetHighestReturnStocks {
    /// Create the handler
    pub fn new(ctx: &Arc<MarketContext>) -> Self {
        Self { ctx: Arc::clone(ctx) }
    }
}

#[async_trait]
impl Capability for GetHighestReturnStocks {
    async fn execute(&self, raw: Value) -> CoreResult<Value> {
        let params: ReturnParams = args::parse_args(raw)?;
        let screener = self.ctx.screener.as_ref().ok_or_else(missing_credentials)?;

        let rows = screener
            .highest_return(params.period, params.limit)
            .await
            .map_err(finsight_core::Error::from)?;

        Ok(json!({
            "period": params.period.label(),
            "stocks": rows,
        }))
    }

    fn name(&self) -> &str {
        "get_highest_return_stocks"
    }

    fn description(&self) -> &str {
        "List the stocks with the highest trailing returns over a period."
    }

    fn parameters(&self) -> Value {
        schema::object(
            json!({
                "period": schema::enumeration(
                    "Trailing period",
                    &["1month", "3month", "6month", "1year"],
                ),
                "limit": schema::integer("How many stocks to return (default 5)"),
            }),
            vec!["period"],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MarketConfig;

    fn ctx_without_credentials() -> Arc<MarketContext> {
        MarketContext::new(MarketConfig::default()).expect("context")
    }

    #[test]
    fn test_screen_without_credentials_is_full_failure() {
        let tool = GetBestStocksUnderPrice::new(&ctx_without_credentials());
        let result = tokio_test::block_on(tool.execute(json!({"maxPrice": 100})));
        let err = result.expect_err("must fail without credentials");
        assert!(err.to_string().contains("SCREENER_EMAIL"));
    }

    #[test]
    fn test_invalid_period_is_validation_error() {
        let result: finsight_core::Result<ReturnParams> =
            args::parse_args(json!({"period": "2week"}));
        assert!(matches!(
            result,
            Err(finsight_core::Error::InvalidArguments(_))
        ));
    }

    #[test]
    fn test_period_is_required() {
        let result: finsight_core::Result<ReturnParams> = args::parse_args(json!({}));
        assert!(result.is_err());
    }

    #[test]
    fn test_metadata() {
        let ctx = ctx_without_credentials();
        let tool = GetHighestReturnStocks::new(&ctx);
        assert_eq!(tool.name(), "get_highest_return_stocks");
        assert_eq!(tool.parameters()["properties"]["period"]["enum"][3], "1year");
    }
}
