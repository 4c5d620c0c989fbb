//! Credential-gated fundamental screen
//!
//! Compiles growth/debt/price/market-cap constraints into the screening
//! site's query language, submits it within a logged-in session, parses the
//! result table, and re-applies the same filters client-side. The backstop
//! defends against upstream query-string miscompilation: only rows passing
//! both sides are returned.

use super::session::ScrapeSession;
use crate::error::{MarketError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use url::form_urlencoded;

/// Return period for the leaderboard query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum ReturnPeriod {
    /// Trailing month
    #[serde(rename = "1month")]
    OneMonth,
    /// Trailing quarter
    #[serde(rename = "3month")]
    ThreeMonths,
    /// Trailing half year
    #[serde(rename = "6month")]
    SixMonths,
    /// Trailing year
    #[serde(rename = "1year")]
    OneYear,
}

impl ReturnPeriod {
    /// Screener column name for this period
    fn column(self) -> &'static str {
        match self {
            Self::OneMonth => "Return over 1month",
            Self::ThreeMonths => "Return over 3months",
            Self::SixMonths => "Return over 6months",
            Self::OneYear => "Return over 1year",
        }
    }

    /// Label used in results
    pub fn label(self) -> &'static str {
        match self {
            Self::OneMonth => "1month",
            Self::ThreeMonths => "3month",
            Self::SixMonths => "6month",
            Self::OneYear => "1year",
        }
    }

    /// Calendar length of the period in days
    pub fn days(self) -> i64 {
        match self {
            Self::OneMonth => 30,
            Self::ThreeMonths => 90,
            Self::SixMonths => 180,
            Self::OneYear => 365,
        }
    }
}

/// Constraints of a fundamental screen
#[derive(Debug, Clone, Default)]
pub struct ScreenFilters {
    /// Maximum share price
    pub max_price: f64,
    /// Minimum profit growth, percent
    pub min_growth: Option<f64>,
    /// Maximum debt-to-equity ratio
    pub max_debt_to_equity: Option<f64>,
    /// Minimum market capitalization, crores
    pub min_market_cap: Option<f64>,
}

impl ScreenFilters {
    /// Compile the server-side query string
    pub fn to_query(&self) -> String {
        let mut clauses = vec![format!("Current price < {}", self.max_price)];
        if let Some(growth) = self.min_growth {
            clauses.push(format!("Profit growth > {growth}"));
        }
        if let Some(debt) = self.max_debt_to_equity {
            clauses.push(format!("Debt to equity < {debt}"));
        }
        if let Some(cap) = self.min_market_cap {
            clauses.push(format!("Market Capitalization > {cap}"));
        }
        clauses.join(" AND ")
    }

    /// Client-side backstop: does a parsed row satisfy every constraint?
    pub fn matches(&self, row: &ScreenRow) -> bool {
        if row.price >= self.max_price {
            return false;
        }
        if let (Some(min), Some(growth)) = (self.min_growth, row.profit_growth) {
            if growth <= min {
                return false;
            }
        }
        if let (Some(max), Some(debt)) = (self.max_debt_to_equity, row.debt_to_equity) {
            if debt >= max {
                return false;
            }
        }
        if let (Some(min), Some(cap)) = (self.min_market_cap, row.market_cap) {
            if cap <= min {
                return false;
            }
        }
        true
    }
}

/// One row of a screen result table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreenRow {
    /// Company name
    pub name: String,
    /// Current share price
    pub price: f64,
    /// Market capitalization, crores
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market_cap: Option<f64>,
    /// Profit growth, percent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profit_growth: Option<f64>,
    /// Debt-to-equity ratio
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debt_to_equity: Option<f64>,
    /// Period return, percent (leaderboard queries only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period_return: Option<f64>,
}

/// Client for the credential-gated screening site
pub struct ScreenerClient {
    session: Arc<ScrapeSession>,
    base_url: String,
    row_pattern: Regex,
    cell_pattern: Regex,
    tag_pattern: Regex,
}

impl ScreenerClient {
    /// Create a new client over a credentialed session
    pub fn new(session: Arc<ScrapeSession>, base_url: impl Into<String>) -> Result<Self> {
        let compile = |pattern: &str| {
            Regex::new(pattern).map_err(|e| MarketError::Config(format!("screen pattern: {e}")))
        };

        Ok(Self {
            session,
            base_url: base_url.into(),
            row_pattern: compile(r"(?s)<tr[^>]*>(.*?)</tr>")?,
            cell_pattern: compile(r"(?s)<td[^>]*>(.*?)</td>")?,
            tag_pattern: compile(r"<[^>]+>")?,
        })
    }

    /// Run a fundamental screen and return rows passing both the server-side
    /// query and the client-side backstop
    pub async fn screen(&self, filters: &ScreenFilters) -> Result<Vec<ScreenRow>> {
        let rows = self.run_query(&filters.to_query(), "").await?;
        Ok(rows.into_iter().filter(|row| filters.matches(row)).collect())
    }

    /// Leaderboard of highest period returns under a price ceiling
    pub async fn highest_return(
        &self,
        period: ReturnPeriod,
        limit: usize,
    ) -> Result<Vec<ScreenRow>> {
        let query = format!("{} > 0", period.column());
        let sort = period.column();
        let mut rows = self.run_query(&query, sort).await?;
        rows.truncate(limit);
        Ok(rows)
    }

    async fn run_query(&self, query: &str, sort: &str) -> Result<Vec<ScreenRow>> {
        let encoded: String = form_urlencoded::Serializer::new(String::new())
            .append_pair("query", query)
            .append_pair("sort", sort)
            .append_pair("order", "desc")
            .finish();
        let url = format!("{}/screen/raw/?{encoded}", self.base_url);
        let referer = format!("{}/screen/", self.base_url);

        let page = self.session.get_text(&url, &referer).await?;
        self.parse_table(&page)
    }

    /// Parse the result table out of a screen page
    ///
    /// Expected cell order: serial, name, price, P/E, market cap, then
    /// query-dependent metric columns. Rows that fail to parse are skipped;
    /// a page with no parseable rows is reported as drift.
    fn parse_table(&self, page: &str) -> Result<Vec<ScreenRow>> {
        let mut rows = Vec::new();

        for row_match in self.row_pattern.captures_iter(page) {
            let row_html = match row_match.get(1) {
                Some(m) => m.as_str(),
                None => continue,
            };

            let cells: Vec<String> = self
                .cell_pattern
                .captures_iter(row_html)
                .filter_map(|c| c.get(1))
                .map(|m| self.tag_pattern.replace_all(m.as_str(), "").trim().to_string())
                .collect();

            if cells.len() < 3 {
                continue;
            }

            let name = cells[1].clone();
            let Some(price) = parse_number(&cells[2]) else {
                continue;
            };
            if name.is_empty() {
                continue;
            }

            rows.push(ScreenRow {
                name,
                price,
                market_cap: cells.get(4).and_then(|c| parse_number(c)),
                profit_growth: cells.get(5).and_then(|c| parse_number(c)),
                debt_to_equity: cells.get(6).and_then(|c| parse_number(c)),
                period_return: cells.get(7).and_then(|c| parse_number(c)),
            });
        }

        if rows.is_empty() {
            return Err(MarketError::ScrapeDrift {
                endpoint: "screen/raw".to_string(),
                reason: "no parseable result rows".to_string(),
            });
        }

        Ok(rows)
    }
}

fn parse_number(cell: &str) -> Option<f64> {
    let cleaned = cell.replace([',', '%'], "");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exchange::session::SessionStrategy;
    use std::time::Duration;

    fn client() -> ScreenerClient {
        let session = Arc::new(
            ScrapeSession::new(
                SessionStrategy::CredentialLogin {
                    login_url: "https://example.com/login/".to_string(),
                    username: "dev@example.com".to_string(),
                    password: "hunter2".to_string(),
                },
                Duration::from_secs(5),
                30,
            )
            .expect("session"),
        );
        ScreenerClient::new(session, "https://example.com").expect("client")
    }

    #[test]
    fn test_query_compilation() {
        let filters = ScreenFilters {
            max_price: 100.0,
            min_growth: Some(15.0),
            max_debt_to_equity: Some(0.5),
            min_market_cap: Some(500.0),
        };
        assert_eq!(
            filters.to_query(),
            "Current price < 100 AND Profit growth > 15 AND Debt to equity < 0.5 \
             AND Market Capitalization > 500"
        );
    }

    #[test]
    fn test_query_skips_absent_constraints() {
        let filters = ScreenFilters {
            max_price: 250.0,
            ..Default::default()
        };
        assert_eq!(filters.to_query(), "Current price < 250");
    }

    #[test]
    fn test_backstop_filtering() {
        let filters = ScreenFilters {
            max_price: 100.0,
            min_growth: Some(10.0),
            max_debt_to_equity: None,
            min_market_cap: None,
        };

        let good = ScreenRow {
            name: "Good Co".to_string(),
            price: 90.0,
            market_cap: None,
            profit_growth: Some(20.0),
            debt_to_equity: None,
            period_return: None,
        };
        let miscompiled = ScreenRow {
            name: "Pricey Co".to_string(),
            price: 150.0,
            market_cap: None,
            profit_growth: Some(20.0),
            debt_to_equity: None,
            period_return: None,
        };

        assert!(filters.matches(&good));
        // Upstream returned it anyway; the backstop drops it.
        assert!(!filters.matches(&miscompiled));
    }

    #[test]
    fn test_parse_table() {
        let page = r#"
            <table>
              <tr><th>S.No.</th><th>Name</th><th>CMP</th><th>P/E</th><th>Mar Cap</th></tr>
              <tr>
                <td>1.</td>
                <td><a href="/company/ABC/">ABC Industries</a></td>
                <td>92.50</td>
                <td>14.2</td>
                <td>1,250.75</td>
              </tr>
              <tr>
                <td>2.</td>
                <td><a href="/company/XYZ/">XYZ Ltd</a></td>
                <td>88.00</td>
                <td></td>
                <td>640.10</td>
              </tr>
            </table>
        "#;

        let rows = client().parse_table(page).expect("rows");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name, "ABC Industries");
        assert_eq!(rows[0].price, 92.50);
        assert_eq!(rows[0].market_cap, Some(1250.75));
        assert_eq!(rows[1].name, "XYZ Ltd");
    }

    #[test]
    fn test_empty_table_is_drift() {
        let result = client().parse_table("<html><body>No results</body></html>");
        assert!(matches!(result, Err(MarketError::ScrapeDrift { .. })));
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("1,234.5"), Some(1234.5));
        assert_eq!(parse_number("12.5%"), Some(12.5));
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("—"), None);
    }

    #[test]
    fn test_return_period_parsing() {
        let period: ReturnPeriod = serde_json::from_str("\"3month\"").expect("parse");
        assert_eq!(period, ReturnPeriod::ThreeMonths);
        assert_eq!(period.label(), "3month");

        let invalid: std::result::Result<ReturnPeriod, _> = serde_json::from_str("\"2week\"");
        assert!(invalid.is_err());
    }
}
