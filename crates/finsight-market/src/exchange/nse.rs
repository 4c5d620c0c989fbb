//! Exchange JSON endpoints (NSE)
//!
//! Cookie-gated endpoints for movers, indices, market status, 52-week bands
//! and options chains. Responses drift; every parser navigates defensively
//! and reports a missing structure as `ScrapeDrift`, never a panic.

use super::session::ScrapeSession;
use crate::error::{MarketError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// Index symbols served by the index option-chain endpoint
const INDEX_SYMBOLS: &[&str] = &["NIFTY", "BANKNIFTY", "FINNIFTY", "MIDCPNIFTY", "NIFTYNXT50"];

/// Benchmark index whose constituents back the mover lists
const BENCHMARK_INDEX: &str = "NIFTY 50";

/// Direction of a trending-mover query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveDirection {
    /// Best performers first (default)
    #[default]
    Gainers,
    /// Worst performers first
    Losers,
}

/// 52-week band selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Week52Band {
    /// Stocks printing new 52-week highs (default)
    #[default]
    High,
    /// Stocks printing new 52-week lows
    Low,
}

/// One row of a mover/most-active list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mover {
    /// Exchange symbol (no suffix)
    pub symbol: String,
    /// Last traded price
    pub last_price: f64,
    /// Percent change on the day
    pub percent_change: f64,
    /// Traded volume, where the endpoint reports it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,
}

/// Snapshot of one index
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexSnapshot {
    /// Index name
    pub index: String,
    /// Last value
    pub last: f64,
    /// Absolute change on the day
    pub change: f64,
    /// Percent change on the day
    pub percent_change: f64,
    /// Session open
    pub open: f64,
    /// Session high
    pub high: f64,
    /// Session low
    pub low: f64,
}

/// State of one market segment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketState {
    /// Segment name (e.g. "Capital Market")
    pub market: String,
    /// Reported status (e.g. "Open", "Closed")
    pub status: String,
}

/// One side (call or put) of an option-chain row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionSide {
    /// Open interest
    pub open_interest: f64,
    /// Change in open interest
    pub change_in_open_interest: f64,
    /// Last traded premium
    pub last_price: f64,
    /// Implied volatility, percent
    pub implied_volatility: f64,
}

/// One strike/expiry row of an options chain
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionRow {
    /// Strike price
    pub strike: f64,
    /// Expiry date as listed (`dd-Mon-YYYY`)
    pub expiry: String,
    /// Call side, when listed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call: Option<OptionSide>,
    /// Put side, when listed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub put: Option<OptionSide>,
}

/// Full options chain for a symbol
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionChain {
    /// Underlying symbol
    pub symbol: String,
    /// Current underlying value
    pub underlying_value: f64,
    /// Expiry dates as listed
    pub expiry_dates: Vec<String>,
    /// All strike/expiry rows
    pub rows: Vec<OptionRow>,
}

/// Client for the exchange's JSON endpoints
pub struct NseClient {
    session: Arc<ScrapeSession>,
    base_url: String,
}

impl NseClient {
    /// Create a new client over an established-on-demand session
    pub fn new(session: Arc<ScrapeSession>, base_url: impl Into<String>) -> Self {
        Self {
            session,
            base_url: base_url.into(),
        }
    }

    /// Current state of the market segments
    pub async fn market_status(&self) -> Result<Vec<MarketState>> {
        let url = format!("{}/api/marketStatus", self.base_url);
        let body = self.session.get_json(&url, &self.base_url).await?;
        parse_market_status(&body)
    }

    /// Snapshot of one index by (partial) name
    pub async fn index_snapshot(&self, name: &str) -> Result<IndexSnapshot> {
        let url = format!("{}/api/allIndices", self.base_url);
        let body = self.session.get_json(&url, &self.base_url).await?;
        parse_index_snapshot(&body, name)
    }

    /// Trending movers among benchmark constituents
    pub async fn trending(&self, direction: MoveDirection, limit: usize) -> Result<Vec<Mover>> {
        let body = self.fetch_benchmark().await?;
        parse_movers(&body, direction, limit)
    }

    /// Most-active benchmark constituents by traded volume
    pub async fn most_active(&self, limit: usize) -> Result<Vec<Mover>> {
        let body = self.fetch_benchmark().await?;
        parse_most_active(&body, limit)
    }

    /// Stocks printing fresh 52-week extremes
    pub async fn week_52(&self, band: Week52Band, limit: usize) -> Result<Vec<Mover>> {
        let endpoint = match band {
            Week52Band::High => "live-analysis-data-52weekhighstock",
            Week52Band::Low => "live-analysis-data-52weeklowstock",
        };
        let url = format!("{}/api/{endpoint}", self.base_url);
        let body = self.session.get_json(&url, &self.base_url).await?;
        parse_week_52(&body, limit)
    }

    /// Full options chain for an index or equity symbol
    pub async fn option_chain(&self, symbol: &str) -> Result<OptionChain> {
        let symbol = symbol.trim().to_uppercase();
        let endpoint = if INDEX_SYMBOLS.contains(&symbol.as_str()) {
            "option-chain-indices"
        } else {
            "option-chain-equities"
        };
        let url = format!("{}/api/{endpoint}?symbol={symbol}", self.base_url);
        let referer = format!("{}/option-chain", self.base_url);
        let body = self.session.get_json(&url, &referer).await?;
        parse_option_chain(&symbol, &body)
    }

    async fn fetch_benchmark(&self) -> Result<Value> {
        let index = BENCHMARK_INDEX.replace(' ', "%20");
        let url = format!("{}/api/equity-stockIndices?index={index}", self.base_url);
        let referer = format!("{}/market-data/live-equity-market", self.base_url);
        self.session.get_json(&url, &referer).await
    }
}

// ============================================================================
// Parsers (pure; the drift surface lives here)
// ============================================================================

fn drift(endpoint: &str, reason: &str) -> MarketError {
    MarketError::ScrapeDrift {
        endpoint: endpoint.to_string(),
        reason: reason.to_string(),
    }
}

/// Read a numeric field that may arrive as a number or a "1,234.56" string
fn num_field(item: &Value, key: &str) -> Option<f64> {
    match item.get(key) {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.replace(',', "").trim().parse().ok(),
        _ => None,
    }
}

fn str_field(item: &Value, key: &str) -> Option<String> {
    item.get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn parse_market_status(body: &Value) -> Result<Vec<MarketState>> {
    let states = body
        .get("marketState")
        .and_then(Value::as_array)
        .ok_or_else(|| drift("marketStatus", "missing marketState array"))?;

    Ok(states
        .iter()
        .filter_map(|item| {
            Some(MarketState {
                market: str_field(item, "market")?,
                status: str_field(item, "marketStatus")?,
            })
        })
        .collect())
}

fn parse_index_snapshot(body: &Value, name: &str) -> Result<IndexSnapshot> {
    let rows = body
        .get("data")
        .and_then(Value::as_array)
        .ok_or_else(|| drift("allIndices", "missing data array"))?;

    let wanted = name.trim().to_uppercase();
    let row = rows
        .iter()
        .find(|item| {
            str_field(item, "index")
                .or_else(|| str_field(item, "indexSymbol"))
                .is_some_and(|n| n.to_uppercase().contains(&wanted))
        })
        .ok_or_else(|| drift("allIndices", "requested index not listed"))?;

    Ok(IndexSnapshot {
        index: str_field(row, "index")
            .or_else(|| str_field(row, "indexSymbol"))
            .unwrap_or_else(|| wanted.clone()),
        last: num_field(row, "last").ok_or_else(|| drift("allIndices", "missing last"))?,
        change: num_field(row, "variation").unwrap_or(0.0),
        percent_change: num_field(row, "percentChange").unwrap_or(0.0),
        open: num_field(row, "open").unwrap_or(0.0),
        high: num_field(row, "high").unwrap_or(0.0),
        low: num_field(row, "low").unwrap_or(0.0),
    })
}

fn constituent_rows(body: &Value) -> Result<Vec<&Value>> {
    let rows = body
        .get("data")
        .and_then(Value::as_array)
        .ok_or_else(|| drift("equity-stockIndices", "missing data array"))?;

    // The first row is the index itself, not a constituent.
    Ok(rows
        .iter()
        .filter(|item| {
            str_field(item, "symbol").is_some_and(|s| s != BENCHMARK_INDEX)
                && num_field(item, "pChange").is_some()
        })
        .collect())
}

fn parse_movers(body: &Value, direction: MoveDirection, limit: usize) -> Result<Vec<Mover>> {
    let mut movers: Vec<Mover> = constituent_rows(body)?
        .into_iter()
        .filter_map(|item| {
            Some(Mover {
                symbol: str_field(item, "symbol")?,
                last_price: num_field(item, "lastPrice")?,
                percent_change: num_field(item, "pChange")?,
                volume: num_field(item, "totalTradedVolume"),
            })
        })
        .collect();

    if movers.is_empty() {
        return Err(drift("equity-stockIndices", "no constituent rows"));
    }

    movers.sort_by(|a, b| {
        let ord = a
            .percent_change
            .partial_cmp(&b.percent_change)
            .unwrap_or(std::cmp::Ordering::Equal);
        match direction {
            MoveDirection::Gainers => ord.reverse(),
            MoveDirection::Losers => ord,
        }
    });
    movers.truncate(limit);
    Ok(movers)
}

fn parse_most_active(body: &Value, limit: usize) -> Result<Vec<Mover>> {
    let mut movers: Vec<Mover> = constituent_rows(body)?
        .into_iter()
        .filter_map(|item| {
            Some(Mover {
                symbol: str_field(item, "symbol")?,
                last_price: num_field(item, "lastPrice")?,
                percent_change: num_field(item, "pChange")?,
                volume: Some(num_field(item, "totalTradedVolume")?),
            })
        })
        .collect();

    if movers.is_empty() {
        return Err(drift("equity-stockIndices", "no rows carried volume"));
    }

    movers.sort_by(|a, b| {
        b.volume
            .partial_cmp(&a.volume)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    movers.truncate(limit);
    Ok(movers)
}

fn parse_week_52(body: &Value, limit: usize) -> Result<Vec<Mover>> {
    let rows = body
        .get("data")
        .and_then(Value::as_array)
        .ok_or_else(|| drift("52week", "missing data array"))?;

    let movers: Vec<Mover> = rows
        .iter()
        .filter_map(|item| {
            Some(Mover {
                symbol: str_field(item, "symbol")?,
                last_price: num_field(item, "ltp").or_else(|| num_field(item, "lastPrice"))?,
                percent_change: num_field(item, "pChange").unwrap_or(0.0),
                volume: None,
            })
        })
        .take(limit)
        .collect();

    if movers.is_empty() {
        return Err(drift("52week", "empty result set"));
    }
    Ok(movers)
}

fn parse_option_side(item: &Value, side: &str) -> Option<OptionSide> {
    let side = item.get(side)?;
    Some(OptionSide {
        open_interest: num_field(side, "openInterest")?,
        change_in_open_interest: num_field(side, "changeinOpenInterest").unwrap_or(0.0),
        last_price: num_field(side, "lastPrice").unwrap_or(0.0),
        implied_volatility: num_field(side, "impliedVolatility").unwrap_or(0.0),
    })
}

fn parse_option_chain(symbol: &str, body: &Value) -> Result<OptionChain> {
    let records = body
        .get("records")
        .ok_or_else(|| drift("option-chain", "missing records"))?;

    let expiry_dates: Vec<String> = records
        .get("expiryDates")
        .and_then(Value::as_array)
        .ok_or_else(|| drift("option-chain", "missing expiryDates"))?
        .iter()
        .filter_map(|v| v.as_str().map(str::to_string))
        .collect();

    let underlying_value = num_field(records, "underlyingValue")
        .ok_or_else(|| drift("option-chain", "missing underlyingValue"))?;

    let rows: Vec<OptionRow> = records
        .get("data")
        .and_then(Value::as_array)
        .ok_or_else(|| drift("option-chain", "missing data"))?
        .iter()
        .filter_map(|item| {
            Some(OptionRow {
                strike: num_field(item, "strikePrice")?,
                expiry: str_field(item, "expiryDate")?,
                call: parse_option_side(item, "CE"),
                put: parse_option_side(item, "PE"),
            })
        })
        .collect();

    if rows.is_empty() {
        return Err(drift("option-chain", "no strike rows"));
    }

    Ok(OptionChain {
        symbol: symbol.to_string(),
        underlying_value,
        expiry_dates,
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn benchmark_fixture() -> Value {
        json!({
            "data": [
                { "symbol": "NIFTY 50", "lastPrice": 22000.0, "pChange": 0.4 },
                { "symbol": "TCS", "lastPrice": 3900.0, "pChange": 1.2, "totalTradedVolume": 100.0 },
                { "symbol": "INFY", "lastPrice": 1500.0, "pChange": -2.1, "totalTradedVolume": 300.0 },
                { "symbol": "SBIN", "lastPrice": 760.0, "pChange": 3.4, "totalTradedVolume": 200.0 }
            ]
        })
    }

    #[test]
    fn test_parse_gainers_sorted_desc() {
        let movers = parse_movers(&benchmark_fixture(), MoveDirection::Gainers, 2).expect("movers");
        assert_eq!(movers.len(), 2);
        assert_eq!(movers[0].symbol, "SBIN");
        assert_eq!(movers[1].symbol, "TCS");
    }

    #[test]
    fn test_parse_losers_sorted_asc() {
        let movers = parse_movers(&benchmark_fixture(), MoveDirection::Losers, 1).expect("movers");
        assert_eq!(movers[0].symbol, "INFY");
    }

    #[test]
    fn test_index_row_excluded() {
        let movers = parse_movers(&benchmark_fixture(), MoveDirection::Gainers, 10).expect("movers");
        assert!(movers.iter().all(|m| m.symbol != "NIFTY 50"));
    }

    #[test]
    fn test_parse_most_active_by_volume() {
        let movers = parse_most_active(&benchmark_fixture(), 2).expect("movers");
        assert_eq!(movers[0].symbol, "INFY");
        assert_eq!(movers[1].symbol, "SBIN");
    }

    #[test]
    fn test_missing_data_is_drift_error() {
        let result = parse_movers(&json!({}), MoveDirection::Gainers, 5);
        assert!(matches!(result, Err(MarketError::ScrapeDrift { .. })));
    }

    #[test]
    fn test_parse_index_snapshot_with_string_numbers() {
        let body = json!({
            "data": [
                { "index": "NIFTY 50", "last": "22,124.50", "variation": 88.2,
                  "percentChange": 0.4, "open": 22050.0, "high": 22150.0, "low": 22010.0 }
            ]
        });
        let snap = parse_index_snapshot(&body, "nifty 50").expect("snapshot");
        assert!((snap.last - 22124.50).abs() < 1e-9);
    }

    #[test]
    fn test_parse_market_status() {
        let body = json!({
            "marketState": [
                { "market": "Capital Market", "marketStatus": "Closed" }
            ]
        });
        let states = parse_market_status(&body).expect("states");
        assert_eq!(states[0].status, "Closed");
    }

    #[test]
    fn test_parse_option_chain() {
        let body = json!({
            "records": {
                "expiryDates": ["29-Aug-2026", "26-Sep-2026"],
                "underlyingValue": 19950.0,
                "data": [
                    {
                        "strikePrice": 20000.0,
                        "expiryDate": "29-Aug-2026",
                        "CE": { "openInterest": 5000.0, "changeinOpenInterest": 150.0,
                                "lastPrice": 42.5, "impliedVolatility": 18.2 },
                        "PE": { "openInterest": 7000.0, "changeinOpenInterest": -90.0,
                                "lastPrice": 120.0, "impliedVolatility": 22.0 }
                    }
                ]
            }
        });

        let chain = parse_option_chain("NIFTY", &body).expect("chain");
        assert_eq!(chain.underlying_value, 19950.0);
        assert_eq!(chain.expiry_dates.len(), 2);
        let row = &chain.rows[0];
        assert_eq!(row.strike, 20000.0);
        assert!(row.call.as_ref().is_some_and(|c| c.open_interest == 5000.0));
        assert!(row.put.as_ref().is_some_and(|p| p.last_price == 120.0));
    }

    #[test]
    fn test_option_chain_missing_records_is_drift() {
        let result = parse_option_chain("NIFTY", &json!({"foo": 1}));
        assert!(matches!(result, Err(MarketError::ScrapeDrift { .. })));
    }
}
