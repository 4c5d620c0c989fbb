//! Symbol normalization rules
//!
//! Every handler that accepts symbols applies the same two rules: a bare
//! uppercase equity ticker with no exchange suffix is assumed to be an
//! Indian equity and gets the NSE suffix; a crypto ticker with no
//! quote-currency suffix is assumed priced in USD.

/// Suffix appended to bare equity tickers
pub const NSE_SUFFIX: &str = ".NS";

/// Quote currency appended to bare crypto tickers
pub const USD_SUFFIX: &str = "-USD";

/// Normalize an equity ticker
///
/// `TCS` → `TCS.NS`; `TCS.NS`, `AAPL.MX` and index symbols (`^NSEI`) pass
/// through unchanged apart from trimming and uppercasing.
pub fn normalize_equity(raw: &str) -> String {
    let symbol = raw.trim().to_uppercase();
    if symbol.is_empty() || symbol.contains('.') || symbol.starts_with('^') || symbol.contains('=')
    {
        return symbol;
    }
    format!("{symbol}{NSE_SUFFIX}")
}

/// Normalize a crypto ticker
///
/// `BTC` → `BTC-USD`; `BTC-INR` passes through unchanged.
pub fn normalize_crypto(raw: &str) -> String {
    let symbol = raw.trim().to_uppercase();
    if symbol.is_empty() || symbol.contains('-') {
        return symbol;
    }
    format!("{symbol}{USD_SUFFIX}")
}

/// Strip the normalization suffix for display
pub fn display_symbol(symbol: &str) -> &str {
    symbol
        .strip_suffix(NSE_SUFFIX)
        .or_else(|| symbol.strip_suffix(USD_SUFFIX))
        .unwrap_or(symbol)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_equity_gets_nse_suffix() {
        assert_eq!(normalize_equity("TCS"), "TCS.NS");
        assert_eq!(normalize_equity(" infy "), "INFY.NS");
    }

    #[test]
    fn test_suffixed_equity_unchanged() {
        assert_eq!(normalize_equity("TCS.NS"), "TCS.NS");
        assert_eq!(normalize_equity("AAPL.MX"), "AAPL.MX");
    }

    #[test]
    fn test_index_and_fx_symbols_unchanged() {
        assert_eq!(normalize_equity("^NSEI"), "^NSEI");
        assert_eq!(normalize_equity("USDINR=X"), "USDINR=X");
    }

    #[test]
    fn test_bare_crypto_gets_usd_suffix() {
        assert_eq!(normalize_crypto("BTC"), "BTC-USD");
        assert_eq!(normalize_crypto("eth"), "ETH-USD");
    }

    #[test]
    fn test_suffixed_crypto_unchanged() {
        assert_eq!(normalize_crypto("BTC-INR"), "BTC-INR");
    }

    #[test]
    fn test_display_symbol_strips_suffixes() {
        assert_eq!(display_symbol("TCS.NS"), "TCS");
        assert_eq!(display_symbol("BTC-USD"), "BTC");
        assert_eq!(display_symbol("^NSEI"), "^NSEI");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(normalize_equity(""), "");
        assert_eq!(normalize_crypto("  "), "");
    }
}
