//! Market-data adapters and capabilities for the finsight assistant
//!
//! This crate owns everything between the dispatcher and the outside world:
//!
//! - Quote Source Adapter: live quotes, historical series, profiles and
//!   news from the quote provider, with per-symbol partial-failure batch
//!   semantics
//! - Exchange Scrape Adapter: cookie-bootstrapped and credential-gated
//!   sessions against the exchange and screening sites (movers, indices,
//!   options chains, fundamental screens)
//! - Coin-ranking client for top-N crypto discovery
//! - Series Normalizer: the canonical chart payload with derived
//!   moving-average series and deterministic colors
//! - The twenty capability handlers the routing model selects from

pub mod cache;
pub mod capabilities;
pub mod chart;
pub mod config;
pub mod context;
pub mod error;
pub mod exchange;
pub mod quote;
pub mod rankings;
pub mod symbols;

// Re-export main types for convenience
pub use cache::{CacheKey, MarketCache};
pub use chart::{ChartPayload, ChartSeries, SeriesKind};
pub use config::MarketConfig;
pub use context::MarketContext;
pub use error::{MarketError, Result};
pub use quote::{AssetQuote, BatchFetcher, Currency, HistoryPoint, QuoteClient};
