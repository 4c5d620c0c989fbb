//! Analysis capabilities: ROI, buy/hold signal, currency conversion
//!
//! These produce capability-specific result objects that are passed through
//! to the narration turn verbatim, never normalized into chart form.

use crate::chart::moving_average;
use crate::context::MarketContext;
use crate::error::MarketError;
use crate::exchange::ReturnPeriod;
use crate::symbols;
use async_trait::async_trait;
use finsight_capabilities::{Capability, args, schema};
use finsight_core::Result as CoreResult;
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;

/// Short moving-average window for the buy/hold signal, periods
const SIGNAL_SHORT_WINDOW: usize = 15;

/// Long moving-average window for the buy/hold signal, periods
const SIGNAL_LONG_WINDOW: usize = 50;

/// Band around the long average treated as "hold", fraction
const SIGNAL_HOLD_BAND: f64 = 0.02;

/// Compute the return an investment in a stock would have produced
pub struct CalculateRoi {
    ctx: Arc<MarketContext>,
}

#[derive(Debug, Deserialize)]
struct RoiParams {
    symbol: String,
    #[serde(default = "default_amount")]
    amount: f64,
    // Strict enum: an invalid period is a hard validation error, never
    // coerced to a default.
    period: ReturnPeriod,
}

fn default_amount() -> f64 {
    10_000.0
}

impl CalculateRoi {
    /// Create the handler
    pub fn new(ctx: &Arc<MarketContext>) -> Self {
        Self { ctx: Arc::clone(ctx) }
    }
}

#[async_trait]
impl Capability for CalculateRoi {
    async fn execute(&self, raw: Value) -> CoreResult<Value> {
        let params: RoiParams = args::parse_args(raw)?;
        if params.amount <= 0.0 {
            return Err(MarketError::Validation("amount must be positive".to_string()).into());
        }

        let symbol = symbols::normalize_equity(&params.symbol);
        let history = self
            .ctx
            .quotes
            .lookback_series(&symbol, params.period.days())
            .await
            .map_err(finsight_core::Error::from)?;

        let (start_price, end_price) = match (history.first(), history.last()) {
            (Some(first), Some(last)) if first.price > 0.0 => (first.price, last.price),
            _ => {
                return Err(finsight_core::Error::from(MarketError::DataUnavailable {
                    symbol,
                    reason: "not enough history for the requested period".to_string(),
                }));
            }
        };

        let growth = end_price / start_price;
        let current_value = params.amount * growth;

        Ok(json!({
            "symbol": symbol,
            "period": params.period.label(),
            "amount_invested": params.amount,
            "start_price": start_price,
            "end_price": end_price,
            "current_value": current_value,
            "absolute_gain": current_value - params.amount,
            "roi_percent": (growth - 1.0) * 100.0,
        }))
    }

    fn name(&self) -> &str {
        "calculate_roi"
    }

    fn description(&self) -> &str {
        "Compute the return an amount invested in a stock over a past period would have \
         produced."
    }

    fn parameters(&self) -> Value {
        schema::object(
            json!({
                "symbol": schema::string("Stock ticker symbol"),
                "amount": schema::number("Amount invested (default 10000)"),
                "period": schema::enumeration(
                    "Investment period",
                    &["1month", "3month", "6month", "1year"],
                ),
            }),
            vec!["symbol", "period"],
        )
    }
}

/// Rule-based buy/hold/sell signal from moving-average positioning
pub struct GetStockRecommendation {
    ctx: Arc<MarketContext>,
}

#[derive(Debug, Deserialize)]
struct RecommendationParams {
    symbol: String,
}

impl GetStockRecommendation {
    /// Create the handler
    pub fn new(ctx: &Arc<MarketContext>) -> Self {
        Self { ctx: Arc::clone(ctx) }
    }

    fn signal(short_ma: f64, long_ma: f64) -> (&'static str, String) {
        let spread = (short_ma - long_ma) / long_ma;
        if spread > SIGNAL_HOLD_BAND {
            (
                "buy",
                format!(
                    "the {SIGNAL_SHORT_WINDOW}-day average sits {:.1}% above the \
                     {SIGNAL_LONG_WINDOW}-day average, an uptrend",
                    spread * 100.0
                ),
            )
        } else if spread < -SIGNAL_HOLD_BAND {
            (
                "sell",
                format!(
                    "the {SIGNAL_SHORT_WINDOW}-day average sits {:.1}% below the \
                     {SIGNAL_LONG_WINDOW}-day average, a downtrend",
                    spread.abs() * 100.0
                ),
            )
        } else {
            (
                "hold",
                "the short and long averages are within 2% of each other; no clear trend"
                    .to_string(),
            )
        }
    }
}

#[async_trait]
impl Capability for GetStockRecommendation {
    async fn execute(&self, raw: Value) -> CoreResult<Value> {
        let params: RecommendationParams = args::parse_args(raw)?;
        let symbol = symbols::normalize_equity(&params.symbol);

        let history = self
            .ctx
            .quotes
            .lookback_series(&symbol, 180)
            .await
            .map_err(finsight_core::Error::from)?;

        if history.len() < SIGNAL_LONG_WINDOW {
            return Err(finsight_core::Error::from(MarketError::DataUnavailable {
                symbol,
                reason: format!("need at least {SIGNAL_LONG_WINDOW} sessions of history"),
            }));
        }

        let prices: Vec<f64> = history.iter().map(|p| p.price).collect();
        let short_ma = moving_average(&prices, SIGNAL_SHORT_WINDOW)
            .last()
            .copied()
            .unwrap_or(0.0);
        let long_ma = moving_average(&prices, SIGNAL_LONG_WINDOW)
            .last()
            .copied()
            .unwrap_or(0.0);
        let last_price = prices.last().copied().unwrap_or(0.0);

        let (signal, rationale) = Self::signal(short_ma, long_ma);

        Ok(json!({
            "symbol": symbol,
            "signal": signal,
            "rationale": rationale,
            "last_price": last_price,
            "short_ma": short_ma,
            "long_ma": long_ma,
        }))
    }

    fn name(&self) -> &str {
        "get_stock_recommendation"
    }

    fn description(&self) -> &str {
        "Produce a rule-based buy/hold/sell signal for a stock from its moving-average \
         positioning."
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

/// Convert an amount between currencies at the spot rate
pub struct ConvertCurrency {
    ctx: Arc<MarketContext>,
}

#[derive(Debug, Deserialize)]
struct ConvertParams {
    amount: f64,
    from: String,
    to: String,
}

impl ConvertCurrency {
    /// Create the handler
    pub fn new(ctx: &Arc<MarketContext>) -> Self {
        Self { ctx: Arc::clone(ctx) }
    }
}

#[async_trait]
impl Capability for ConvertCurrency {
    async fn execute(&self, raw: Value) -> CoreResult<Value> {
        let params: ConvertParams = args::parse_args(raw)?;
        if params.amount <= 0.0 {
            return Err(MarketError::Validation("amount must be positive".to_string()).into());
        }

        let from = params.from.trim().to_uppercase();
        let to = params.to.trim().to_uppercase();
        if from.len() != 3 || to.len() != 3 {
            return Err(MarketError::Validation(
                "currencies must be 3-letter ISO codes".to_string(),
            )
            .into());
        }

        let rate = if from == to {
            1.0
        } else {
            self.ctx
                .quotes
                .fx_rate(&from, &to)
                .await
                .map_err(finsight_core::Error::from)?
        };

        Ok(json!({
            "amount": params.amount,
            "from": from,
            "to": to,
            "rate": rate,
            "converted": params.amount * rate,
        }))
    }

    fn name(&self) -> &str {
        "convert_currency"
    }

    fn description(&self) -> &str {
        "Convert an amount between two currencies at the current spot rate."
    }

    fn parameters(&self) -> Value {
        schema::object(
            json!({
                "amount": schema::number("Amount to convert"),
                "from": schema::string("Source currency ISO code, e.g. \"USD\""),
                "to": schema::string("Target currency ISO code, e.g. \"INR\""),
            }),
            vec!["amount", "from", "to"],
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
    fn test_roi_period_is_strict() {
        let result: finsight_core::Result<RoiParams> =
            args::parse_args(json!({"symbol": "TCS", "period": "2week"}));
        assert!(matches!(
            result,
            Err(finsight_core::Error::InvalidArguments(_))
        ));

        let result: finsight_core::Result<RoiParams> = args::parse_args(json!({"symbol": "TCS"}));
        assert!(result.is_err(), "period has no fallback");
    }

    #[test]
    fn test_roi_amount_default() {
        let params: RoiParams =
            args::parse_args(json!({"symbol": "TCS", "period": "6month"})).expect("parse");
        assert_eq!(params.amount, 10_000.0);
    }

    #[test]
    fn test_signal_bands() {
        assert_eq!(GetStockRecommendation::signal(110.0, 100.0).0, "buy");
        assert_eq!(GetStockRecommendation::signal(90.0, 100.0).0, "sell");
        assert_eq!(GetStockRecommendation::signal(101.0, 100.0).0, "hold");
        assert_eq!(GetStockRecommendation::signal(100.0, 100.0).0, "hold");
    }

    #[test]
    fn test_convert_validation() {
        let tool = ConvertCurrency::new(&ctx());

        let result = tokio_test::block_on(tool.execute(json!({
            "amount": -5, "from": "USD", "to": "INR"
        })));
        assert!(result.is_err());

        let result = tokio_test::block_on(tool.execute(json!({
            "amount": 10, "from": "DOLLARS", "to": "INR"
        })));
        assert!(result.is_err());
    }

    #[test]
    fn test_convert_same_currency_short_circuits() {
        let tool = ConvertCurrency::new(&ctx());
        let result = tokio_test::block_on(tool.execute(json!({
            "amount": 42.0, "from": "USD", "to": "usd"
        })))
        .expect("identity conversion");
        assert_eq!(result["rate"], 1.0);
        assert_eq!(result["converted"], 42.0);
    }
}
