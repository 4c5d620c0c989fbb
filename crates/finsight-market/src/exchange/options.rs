//! Options-chain resolution: expiry selection, strike selection, moneyness
//! and the rule-based recommendation text
//!
//! Everything here is deterministic. The IV threshold (40) and the
//! underlying/strike ratio cutoff (1) are contract values.

use super::nse::{OptionChain, OptionRow, OptionSide};
use crate::error::{MarketError, Result};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Implied volatility above this is flagged as elevated, percent
pub const ELEVATED_IV_THRESHOLD: f64 = 40.0;

/// Expiry format the exchange lists (`29-Aug-2026`)
const CHAIN_DATE_FORMAT: &str = "%d-%b-%Y";

/// Option side requested by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OptionKind {
    /// Call option
    #[serde(rename = "CE", alias = "call", alias = "CALL")]
    Call,
    /// Put option
    #[serde(rename = "PE", alias = "put", alias = "PUT")]
    Put,
}

impl OptionKind {
    /// Exchange-style side code
    pub fn code(self) -> &'static str {
        match self {
            Self::Call => "CE",
            Self::Put => "PE",
        }
    }
}

/// Whether a contract has intrinsic value at the current underlying
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Moneyness {
    /// The contract has intrinsic value
    InTheMoney,
    /// The contract has no intrinsic value
    OutOfTheMoney,
}

impl Moneyness {
    /// Human-readable label used in results and narration
    pub fn label(self) -> &'static str {
        match self {
            Self::InTheMoney => "In-the-money",
            Self::OutOfTheMoney => "Out-of-the-money",
        }
    }
}

/// The resolved contract a chain query settles on
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedContract {
    /// Underlying symbol
    pub symbol: String,
    /// Side requested
    pub option_type: &'static str,
    /// Selected strike
    pub strike: f64,
    /// Selected expiry as listed
    pub expiry: String,
    /// Current underlying value
    pub underlying_value: f64,
    /// Open interest
    pub open_interest: f64,
    /// Change in open interest
    pub change_in_open_interest: f64,
    /// Last traded premium
    pub last_price: f64,
    /// Implied volatility, percent
    pub implied_volatility: f64,
    /// Moneyness label
    pub moneyness: String,
    /// Rule-based recommendation text
    pub recommendation: String,
}

/// A put is in the money when strike ≥ underlying; a call when strike ≤
/// underlying. `strike == underlying` counts as in the money for both.
pub fn moneyness(kind: OptionKind, strike: f64, underlying: f64) -> Moneyness {
    let in_the_money = match kind {
        OptionKind::Put => strike >= underlying,
        OptionKind::Call => strike <= underlying,
    };
    if in_the_money {
        Moneyness::InTheMoney
    } else {
        Moneyness::OutOfTheMoney
    }
}

/// Parse a caller-supplied expiry specifier
///
/// Accepted forms: a full date (`29-Aug-2026`, `2026-08-29`, `29 August
/// 2026`), a bare month (`august`), or month + year (`august 2026`). A bare
/// month earlier than the current month rolls to next year.
pub fn parse_expiry_hint(hint: &str, today: NaiveDate) -> Option<NaiveDate> {
    let hint = hint.trim();
    if hint.is_empty() {
        return None;
    }

    for format in [CHAIN_DATE_FORMAT, "%Y-%m-%d", "%d %B %Y", "%d %b %Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(hint, format) {
            return Some(date);
        }
    }

    // Month + optional year ("august", "aug 2026", "august 2026")
    let mut parts = hint.split_whitespace();
    let month = parts.next().and_then(parse_month)?;
    let year = match parts.next() {
        Some(year) => year.parse::<i32>().ok()?,
        None => {
            if month < today.month() {
                today.year() + 1
            } else {
                today.year()
            }
        }
    };
    if parts.next().is_some() {
        return None;
    }

    NaiveDate::from_ymd_opt(year, month, 1)
}

fn parse_month(token: &str) -> Option<u32> {
    const MONTHS: &[&str] = &[
        "january",
        "february",
        "march",
        "april",
        "may",
        "june",
        "july",
        "august",
        "september",
        "october",
        "november",
        "december",
    ];

    let token = token.trim_matches(|c: char| !c.is_alphabetic()).to_lowercase();
    if token.len() < 3 {
        return None;
    }

    MONTHS
        .iter()
        .position(|m| m.starts_with(&token))
        .map(|i| i as u32 + 1)
}

/// Select the expiry a query resolves to
///
/// Expiries strictly before `today` are discarded. With a parseable hint the
/// earliest valid expiry on/after the target wins; without one (or when the
/// hint fails to parse) the nearest valid expiry wins.
pub fn resolve_expiry(expiries: &[String], hint: Option<&str>, today: NaiveDate) -> Result<String> {
    let mut valid: Vec<(NaiveDate, &String)> = expiries
        .iter()
        .filter_map(|raw| {
            NaiveDate::parse_from_str(raw, CHAIN_DATE_FORMAT)
                .ok()
                .filter(|date| *date >= today)
                .map(|date| (date, raw))
        })
        .collect();

    if valid.is_empty() {
        return Err(MarketError::DataUnavailable {
            symbol: String::new(),
            reason: "no expiry on or after today".to_string(),
        });
    }

    valid.sort_by_key(|(date, _)| *date);

    let target = hint.and_then(|h| parse_expiry_hint(h, today));
    let chosen = match target {
        Some(target) => valid
            .iter()
            .find(|(date, _)| *date >= target)
            .unwrap_or_else(|| &valid[0]),
        None => &valid[0],
    };

    Ok(chosen.1.clone())
}

/// Select the listed strike nearest the requested one
///
/// Ties are broken by first-encountered order in the source list.
pub fn nearest_strike(strikes: &[f64], requested: f64) -> Option<f64> {
    strikes
        .iter()
        .copied()
        .fold(None, |best: Option<f64>, candidate| match best {
            Some(current) if (current - requested).abs() <= (candidate - requested).abs() => {
                Some(current)
            }
            _ => Some(candidate),
        })
}

/// Produce the rule-based recommendation text for a resolved contract
pub fn recommendation_text(
    symbol: &str,
    kind: OptionKind,
    money: Moneyness,
    side: &OptionSide,
    strike: f64,
    underlying: f64,
) -> String {
    let side_name = match kind {
        OptionKind::Call => "call",
        OptionKind::Put => "put",
    };

    let oi_trend = if side.change_in_open_interest > 0.0 {
        "building up, suggesting fresh positions at this strike"
    } else if side.change_in_open_interest < 0.0 {
        "unwinding, suggesting positions are being closed"
    } else {
        "flat"
    };

    let iv_note = if side.implied_volatility > ELEVATED_IV_THRESHOLD {
        "elevated, so premiums are expensive"
    } else {
        "moderate"
    };

    let ratio = if strike != 0.0 { underlying / strike } else { 0.0 };
    let risk_note = if ratio > 1.0 {
        "the underlying already trades above this strike, which favours call holders and pressures put writers"
    } else {
        "the underlying trades at or below this strike, which favours put holders and pressures call writers"
    };

    format!(
        "The {symbol} {strike:.0} {side_name} is {}. Open interest is {oi_trend}. \
         Implied volatility at {:.1}% is {iv_note}. With the underlying at {underlying:.2} \
         the underlying/strike ratio is {ratio:.2}: {risk_note}.",
        money.label(),
        side.implied_volatility,
    )
}

/// Resolve a chain query to one contract
pub fn resolve_contract(
    chain: &OptionChain,
    requested_strike: f64,
    kind: OptionKind,
    expiry_hint: Option<&str>,
    today: NaiveDate,
) -> Result<ResolvedContract> {
    let expiry = resolve_expiry(&chain.expiry_dates, expiry_hint, today)?;

    let rows_for_expiry: Vec<&OptionRow> = chain
        .rows
        .iter()
        .filter(|row| row.expiry == expiry)
        .collect();

    let strikes: Vec<f64> = rows_for_expiry.iter().map(|row| row.strike).collect();
    let strike = nearest_strike(&strikes, requested_strike).ok_or_else(|| {
        MarketError::DataUnavailable {
            symbol: chain.symbol.clone(),
            reason: format!("no strikes listed for expiry {expiry}"),
        }
    })?;

    let row = rows_for_expiry
        .iter()
        .find(|row| row.strike == strike)
        .ok_or_else(|| MarketError::DataUnavailable {
            symbol: chain.symbol.clone(),
            reason: "selected strike vanished from the chain".to_string(),
        })?;

    let side = match kind {
        OptionKind::Call => row.call.as_ref(),
        OptionKind::Put => row.put.as_ref(),
    }
    .ok_or_else(|| MarketError::DataUnavailable {
        symbol: chain.symbol.clone(),
        reason: format!("{} side not listed at strike {strike}", kind.code()),
    })?;

    let money = moneyness(kind, strike, chain.underlying_value);
    let recommendation = recommendation_text(
        &chain.symbol,
        kind,
        money,
        side,
        strike,
        chain.underlying_value,
    );

    Ok(ResolvedContract {
        symbol: chain.symbol.clone(),
        option_type: kind.code(),
        strike,
        expiry,
        underlying_value: chain.underlying_value,
        open_interest: side.open_interest,
        change_in_open_interest: side.change_in_open_interest,
        last_price: side.last_price,
        implied_volatility: side.implied_volatility,
        moneyness: money.label().to_string(),
        recommendation,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn test_moneyness_put() {
        assert_eq!(moneyness(OptionKind::Put, 20000.0, 19950.0), Moneyness::InTheMoney);
        assert_eq!(moneyness(OptionKind::Put, 19900.0, 19950.0), Moneyness::OutOfTheMoney);
        // Strike == underlying counts as in the money
        assert_eq!(moneyness(OptionKind::Put, 19950.0, 19950.0), Moneyness::InTheMoney);
    }

    #[test]
    fn test_moneyness_call() {
        assert_eq!(moneyness(OptionKind::Call, 19900.0, 19950.0), Moneyness::InTheMoney);
        assert_eq!(moneyness(OptionKind::Call, 20000.0, 19950.0), Moneyness::OutOfTheMoney);
        assert_eq!(moneyness(OptionKind::Call, 19950.0, 19950.0), Moneyness::InTheMoney);
    }

    #[test]
    fn test_parse_expiry_hint_full_dates() {
        let today = date(2026, 8, 6);
        assert_eq!(parse_expiry_hint("29-Aug-2026", today), Some(date(2026, 8, 29)));
        assert_eq!(parse_expiry_hint("2026-08-29", today), Some(date(2026, 8, 29)));
        assert_eq!(parse_expiry_hint("29 August 2026", today), Some(date(2026, 8, 29)));
    }

    #[test]
    fn test_parse_expiry_hint_bare_month() {
        let today = date(2026, 8, 6);
        assert_eq!(parse_expiry_hint("september", today), Some(date(2026, 9, 1)));
        // Earlier month rolls to next year
        assert_eq!(parse_expiry_hint("march", today), Some(date(2027, 3, 1)));
    }

    #[test]
    fn test_parse_expiry_hint_month_and_year() {
        let today = date(2026, 8, 6);
        assert_eq!(parse_expiry_hint("august 2027", today), Some(date(2027, 8, 1)));
        assert_eq!(parse_expiry_hint("sep 2026", today), Some(date(2026, 9, 1)));
    }

    #[test]
    fn test_parse_expiry_hint_garbage() {
        let today = date(2026, 8, 6);
        assert_eq!(parse_expiry_hint("whenever", today), None);
        assert_eq!(parse_expiry_hint("", today), None);
    }

    fn expiries() -> Vec<String> {
        vec![
            "30-Jul-2026".to_string(),
            "27-Aug-2026".to_string(),
            "24-Sep-2026".to_string(),
        ]
    }

    #[test]
    fn test_resolve_expiry_discards_past() {
        let chosen = resolve_expiry(&expiries(), None, date(2026, 8, 6)).expect("expiry");
        assert_eq!(chosen, "27-Aug-2026");
    }

    #[test]
    fn test_resolve_expiry_with_hint() {
        let chosen =
            resolve_expiry(&expiries(), Some("september"), date(2026, 8, 6)).expect("expiry");
        assert_eq!(chosen, "24-Sep-2026");
    }

    #[test]
    fn test_resolve_expiry_unparseable_hint_falls_back_to_nearest() {
        let chosen =
            resolve_expiry(&expiries(), Some("whenever"), date(2026, 8, 6)).expect("expiry");
        assert_eq!(chosen, "27-Aug-2026");
    }

    #[test]
    fn test_resolve_expiry_none_valid() {
        let result = resolve_expiry(&expiries(), None, date(2027, 1, 1));
        assert!(result.is_err());
    }

    #[test]
    fn test_resolve_expiry_on_expiry_day() {
        // An expiry today is valid, not past.
        let chosen = resolve_expiry(&expiries(), None, date(2026, 7, 30)).expect("expiry");
        assert_eq!(chosen, "30-Jul-2026");
    }

    #[test]
    fn test_nearest_strike() {
        let strikes = [19800.0, 19900.0, 20000.0, 20100.0];
        assert_eq!(nearest_strike(&strikes, 19960.0), Some(20000.0));
        assert_eq!(nearest_strike(&strikes, 19800.0), Some(19800.0));
        assert_eq!(nearest_strike(&[], 19800.0), None);
    }

    #[test]
    fn test_nearest_strike_tie_takes_first() {
        let strikes = [19900.0, 20100.0];
        // 20000 is equidistant; the first-encountered strike wins.
        assert_eq!(nearest_strike(&strikes, 20000.0), Some(19900.0));
    }

    fn sample_chain() -> OptionChain {
        OptionChain {
            symbol: "NIFTY".to_string(),
            underlying_value: 19950.0,
            expiry_dates: expiries(),
            rows: vec![OptionRow {
                strike: 20000.0,
                expiry: "27-Aug-2026".to_string(),
                call: Some(OptionSide {
                    open_interest: 5000.0,
                    change_in_open_interest: 150.0,
                    last_price: 42.5,
                    implied_volatility: 18.2,
                }),
                put: Some(OptionSide {
                    open_interest: 7000.0,
                    change_in_open_interest: -90.0,
                    last_price: 120.0,
                    implied_volatility: 44.0,
                }),
            }],
        }
    }

    #[test]
    fn test_resolve_contract_call_out_of_the_money() {
        let contract = resolve_contract(
            &sample_chain(),
            20000.0,
            OptionKind::Call,
            None,
            date(2026, 8, 6),
        )
        .expect("contract");

        assert_eq!(contract.moneyness, "Out-of-the-money");
        assert_eq!(contract.option_type, "CE");
        assert_eq!(contract.strike, 20000.0);
        assert_eq!(contract.expiry, "27-Aug-2026");
    }

    #[test]
    fn test_recommendation_flags_elevated_iv() {
        let contract = resolve_contract(
            &sample_chain(),
            20000.0,
            OptionKind::Put,
            None,
            date(2026, 8, 6),
        )
        .expect("contract");

        // Put IV is 44 > 40
        assert!(contract.recommendation.contains("elevated"));
        assert!(contract.recommendation.contains("unwinding"));
        assert_eq!(contract.moneyness, "In-the-money");
    }

    #[test]
    fn test_option_kind_aliases() {
        let kind: OptionKind = serde_json::from_str("\"CE\"").expect("parse");
        assert_eq!(kind, OptionKind::Call);
        let kind: OptionKind = serde_json::from_str("\"put\"").expect("parse");
        assert_eq!(kind, OptionKind::Put);
    }
}
