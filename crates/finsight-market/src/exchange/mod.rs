//! Exchange Scrape Adapter
//!
//! Obtains data only available from session-gated web endpoints: trending
//! movers, options chains, index snapshots, fundamental screens. The session
//! technique (cookie bootstrap vs. credentialed login) is per-site and lives
//! behind `SessionStrategy`, so swapping it never touches dispatch or
//! normalization.

pub mod nse;
pub mod options;
pub mod screener;
pub mod session;

pub use nse::{
    IndexSnapshot, MarketState, MoveDirection, Mover, NseClient, OptionChain, OptionRow,
    OptionSide, Week52Band,
};
pub use options::{Moneyness, OptionKind, ResolvedContract};
pub use screener::{ReturnPeriod, ScreenFilters, ScreenRow, ScreenerClient};
pub use session::{ScrapeSession, SessionStrategy};
