//! Capability handlers for market data
//!
//! One file per family. Every handler follows the same shape: a params
//! struct parsed once at the dispatch boundary (defaults via serde), the
//! adapter call, and a JSON result. `install` wires all of them into a
//! registry; adding a capability is one `register` line here plus its
//! handler.

pub mod analysis;
pub mod crypto;
pub mod derivatives;
pub mod discovery;
pub mod screening;
pub mod stocks;

use crate::context::MarketContext;
use finsight_capabilities::CapabilityRegistry;
use std::sync::Arc;

/// Register every market capability
pub fn install(registry: &CapabilityRegistry, ctx: &Arc<MarketContext>) {
    registry.register(Arc::new(stocks::GetStockPrice::new(ctx)));
    registry.register(Arc::new(stocks::GetStockHistory::new(ctx)));
    registry.register(Arc::new(stocks::GetCompanyProfile::new(ctx)));
    registry.register(Arc::new(stocks::GetStockNews::new(ctx)));
    registry.register(Arc::new(stocks::CompareStocks::new(ctx)));
    registry.register(Arc::new(crypto::GetCryptoPrice::new(ctx)));
    registry.register(Arc::new(crypto::GetCryptoHistory::new(ctx)));
    registry.register(Arc::new(crypto::GetTopCryptos::new(ctx)));
    registry.register(Arc::new(discovery::GetTopStocks::new(ctx)));
    registry.register(Arc::new(discovery::GetTrendingStocks::new(ctx)));
    registry.register(Arc::new(discovery::GetMostActiveStocks::new(ctx)));
    registry.register(Arc::new(discovery::Get52WeekExtremes::new(ctx)));
    registry.register(Arc::new(discovery::GetIndexData::new(ctx)));
    registry.register(Arc::new(discovery::GetMarketStatus::new(ctx)));
    registry.register(Arc::new(derivatives::GetOptionChainData::new(ctx)));
    registry.register(Arc::new(screening::GetBestStocksUnderPrice::new(ctx)));
    registry.register(Arc::new(screening::GetHighestReturnStocks::new(ctx)));
    registry.register(Arc::new(analysis::CalculateRoi::new(ctx)));
    registry.register(Arc::new(analysis::GetStockRecommendation::new(ctx)));
    registry.register(Arc::new(analysis::ConvertCurrency::new(ctx)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MarketConfig;

    #[test]
    fn test_install_registers_all_capabilities() {
        let ctx = MarketContext::new(MarketConfig::default()).expect("context");
        let registry = CapabilityRegistry::new();
        install(&registry, &ctx);

        assert_eq!(registry.len(), 20);
        assert!(registry.get("get_stock_price").is_some());
        assert!(registry.get("get_option_chain_data").is_some());
        assert!(registry.get("get_best_stocks_under_price").is_some());
    }

    #[test]
    fn test_definitions_are_schema_complete() {
        let ctx = MarketContext::new(MarketConfig::default()).expect("context");
        let registry = CapabilityRegistry::new();
        install(&registry, &ctx);

        for def in registry.definitions() {
            assert!(!def.description.is_empty(), "{} lacks description", def.name);
            assert_eq!(def.parameters["type"], "object", "{} schema", def.name);
        }
    }
}
