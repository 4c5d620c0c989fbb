//! Error types for market-data operations

use thiserror::Error;

/// Market-data specific errors
#[derive(Debug, Error)]
pub enum MarketError {
    /// Upstream API request failed
    #[error("API error: {0}")]
    Api(String),

    /// Invalid symbol provided
    #[error("Invalid symbol: {0}")]
    InvalidSymbol(String),

    /// Data not available for the requested symbol
    #[error("Data not available for {symbol}: {reason}")]
    DataUnavailable { symbol: String, reason: String },

    /// The ranking source for a top-N discovery call failed
    ///
    /// There is no meaningful partial top-N list without a valid ranking,
    /// so this fails the whole call.
    #[error("Ranking source unavailable: {0}")]
    RankingUnavailable(String),

    /// A scraped page or response no longer has the expected structure
    #[error("Unexpected response from {endpoint}: {reason}")]
    ScrapeDrift { endpoint: String, reason: String },

    /// The target site requires credentials that are missing or rejected
    #[error("Authentication required for {0}")]
    AuthRequired(String),

    /// Capability argument validation failed
    #[error("{0}")]
    Validation(String),

    /// Network or HTTP error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Quote provider error
    #[error("Quote provider error: {0}")]
    Quote(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for market operations
pub type Result<T> = std::result::Result<T, MarketError>;

impl From<MarketError> for finsight_core::Error {
    fn from(err: MarketError) -> Self {
        match err {
            MarketError::Validation(msg) => finsight_core::Error::InvalidArguments(msg),
            other => finsight_core::Error::UpstreamUnavailable(other.to_string()),
        }
    }
}
