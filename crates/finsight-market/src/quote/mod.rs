//! Quote Source Adapter
//!
//! Wraps the market-quote provider: point-in-time quotes, historical series,
//! profile lookups and news. The batch fetcher layers the partial-failure
//! semantics every multi-symbol capability shares.

pub mod batch;
pub mod client;

pub use batch::{BatchFetcher, Currency};
pub use client::{QuoteClient, SpotQuote};

use serde::{Deserialize, Serialize};

/// One point of a historical series, ordered ascending by date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryPoint {
    /// Calendar date, `YYYY-MM-DD`
    pub date: String,
    /// Closing price
    pub price: f64,
    /// Traded volume, when the source provides it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<u64>,
}

/// Detailed profile of an asset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetProfile {
    /// Normalized symbol
    pub symbol: String,
    /// Long name when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Listing exchange
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exchange: Option<String>,
    /// Instrument type reported by the provider
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quote_type: Option<String>,
}

/// A news item attached to an asset record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsItem {
    /// Headline
    pub title: String,
    /// Publisher name
    pub publisher: String,
    /// Article link
    pub link: String,
    /// Publication time, RFC 3339
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<String>,
}

/// One asset record of a batch result
///
/// A failed symbol serializes as `{ "symbol": ..., "error": ... }`: every
/// data field is skipped when absent, so downstream consumers (the
/// normalizer, the narration turn) see exactly the partial-failure shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetQuote {
    /// Normalized symbol
    pub symbol: String,

    /// Human-readable name (falls back to the display symbol)
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub display_name: String,

    /// Latest traded price
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_price: Option<f64>,

    /// Absolute change vs. the previous close
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change_absolute: Option<f64>,

    /// Percent change vs. the previous close
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change_percent: Option<f64>,

    /// Market capitalization, when the source provides it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market_cap: Option<f64>,

    /// Lookback price history (chart source)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub history: Vec<HistoryPoint>,

    /// Profile details; `None` when the profile lookup failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<AssetProfile>,

    /// Recent news; empty when the news lookup failed
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub news: Vec<NewsItem>,

    /// Set when the quote fetch for this symbol failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AssetQuote {
    /// Build the error record for a symbol whose quote fetch failed
    pub fn failed(symbol: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            display_name: String::new(),
            current_price: None,
            change_absolute: None,
            change_percent: None,
            market_cap: None,
            history: Vec::new(),
            profile: None,
            news: Vec::new(),
            error: Some(error.into()),
        }
    }

    /// Whether this record is an error placeholder
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}
