//! Options-chain capability

use crate::context::MarketContext;
use crate::error::MarketError;
use crate::exchange::OptionKind;
use crate::exchange::options::resolve_contract;
use async_trait::async_trait;
use chrono::Utc;
use finsight_capabilities::{Capability, args, schema};
use finsight_core::Result as CoreResult;
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;

/// Resolve one option contract from the live chain and assess it
pub struct GetOptionChainData {
    ctx: Arc<MarketContext>,
}

#[derive(Debug, Deserialize)]
struct OptionParams {
    symbol: String,
    #[serde(rename = "strikePrice")]
    strike_price: f64,
    #[serde(rename = "optionType")]
    option_type: OptionKind,
    #[serde(rename = "expiryDate", default)]
    expiry_date: Option<String>,
}

impl GetOptionChainData {
    /// Create the handler
    pub fn new(ctx: &Arc<MarketContext>) -> Self {
        Self { ctx: Arc::clone(ctx) }
    }
}

#[async_trait]
impl Capability for GetOptionChainData {
    async fn execute(&self, raw: Value) -> CoreResult<Value> {
        let params: OptionParams = args::parse_args(raw)?;
        if params.strike_price <= 0.0 {
            return Err(MarketError::Validation("strikePrice must be positive".to_string()).into());
        }

        let chain = self
            .ctx
            .nse
            .option_chain(&params.symbol)
            .await
            .map_err(finsight_core::Error::from)?;

        let contract = resolve_contract(
            &chain,
            params.strike_price,
            params.option_type,
            params.expiry_date.as_deref(),
            Utc::now().date_naive(),
        )
        .map_err(finsight_core::Error::from)?;

        Ok(serde_json::to_value(contract)
            .map_err(MarketError::Json)
            .map_err(finsight_core::Error::from)?)
    }

    fn name(&self) -> &str {
        "get_option_chain_data"
    }

    fn description(&self) -> &str {
        "Look up one option contract (nearest listed strike and expiry) from the exchange \
         chain: open interest, last price, implied volatility, moneyness and a rule-based \
         assessment."
    }

    fn parameters(&self) -> Value {
        schema::object(
            json!({
                "symbol": schema::string("Underlying symbol, e.g. \"NIFTY\" or \"RELIANCE\""),
                "strikePrice": schema::number("Desired strike price"),
                "optionType": schema::enumeration("Option side", &["CE", "PE"]),
                "expiryDate": schema::string(
                    "Optional expiry: a full date, a month, or month and year",
                ),
            }),
            vec!["symbol", "strikePrice", "optionType"],
        )
    }
}
