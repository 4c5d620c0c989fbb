//! Session management for scrape targets
//!
//! Exchange endpoints reject bare clients. Two techniques cover the sites
//! this adapter talks to:
//!
//! - `CookieBootstrap`: an unauthenticated warm-up request against the site
//!   root harvests session cookies into the jar; data requests then attach
//!   them with a realistic user agent and referer.
//! - `CredentialLogin`: a form login (CSRF token scraped from the login
//!   page) establishes an authenticated session over the same jar.
//!
//! Session setup is idempotent (check-before-connect) and a failure is
//! logged, not fatal: the next request retries.

use crate::error::{MarketError, Result};
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use regex::Regex;
use reqwest::Client;
use serde_json::Value;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Browser-like user agent attached to every scrape request
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

type SharedRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

/// How a session with the target site is established
#[derive(Debug, Clone)]
pub enum SessionStrategy {
    /// Unauthenticated warm-up request to harvest cookies
    CookieBootstrap {
        /// URL fetched to populate the cookie jar
        warmup_url: String,
    },

    /// Credentialed form login (CSRF token read from the login page)
    CredentialLogin {
        /// Login form URL
        login_url: String,
        /// Account name
        username: String,
        /// Account password
        password: String,
    },
}

/// A cookie-jar HTTP session with one scrape target
pub struct ScrapeSession {
    client: Client,
    strategy: SessionStrategy,
    rate_limiter: SharedRateLimiter,
    established: Mutex<bool>,
    csrf_pattern: Regex,
}

impl ScrapeSession {
    /// Create a new session
    ///
    /// # Arguments
    /// * `strategy` - How the session is established
    /// * `timeout` - Per-request timeout
    /// * `rate_per_minute` - Requests allowed per minute against this site
    pub fn new(
        strategy: SessionStrategy,
        timeout: Duration,
        rate_per_minute: u32,
    ) -> Result<Self> {
        let client = Client::builder()
            .cookie_store(true)
            .user_agent(BROWSER_USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(MarketError::Network)?;

        let quota = Quota::per_minute(
            NonZeroU32::new(rate_per_minute).unwrap_or_else(|| NonZeroU32::new(30).expect("nonzero")),
        );

        let csrf_pattern = Regex::new(r#"name=['"]csrfmiddlewaretoken['"]\s+value=['"]([^'"]+)['"]"#)
            .map_err(|e| MarketError::Config(format!("csrf pattern: {e}")))?;

        Ok(Self {
            client,
            strategy,
            rate_limiter: Arc::new(RateLimiter::direct(quota)),
            established: Mutex::new(false),
            csrf_pattern,
        })
    }

    /// Establish the session if not already established
    ///
    /// Holding the flag lock across the bootstrap keeps concurrent callers
    /// from racing duplicate logins.
    pub async fn ensure_session(&self) -> Result<()> {
        let mut established = self.established.lock().await;
        if *established {
            return Ok(());
        }

        self.rate_limiter.until_ready().await;

        match &self.strategy {
            SessionStrategy::CookieBootstrap { warmup_url } => {
                debug!(url = %warmup_url, "warming up scrape session");
                let response = self.client.get(warmup_url.as_str()).send().await?;
                if !response.status().is_success() {
                    return Err(MarketError::Api(format!(
                        "warm-up request failed: HTTP {}",
                        response.status()
                    )));
                }
            }
            SessionStrategy::CredentialLogin {
                login_url,
                username,
                password,
            } => {
                debug!(url = %login_url, "logging in to scrape target");
                let page = self
                    .client
                    .get(login_url.as_str())
                    .send()
                    .await?
                    .text()
                    .await?;
                let token = self
                    .csrf_pattern
                    .captures(&page)
                    .and_then(|c| c.get(1))
                    .map(|m| m.as_str().to_string())
                    .ok_or_else(|| MarketError::AuthRequired(
                        "login page carried no CSRF token".to_string(),
                    ))?;

                let response = self
                    .client
                    .post(login_url.as_str())
                    .header("Referer", login_url.as_str())
                    .form(&[
                        ("username", username.as_str()),
                        ("password", password.as_str()),
                        ("csrfmiddlewaretoken", token.as_str()),
                    ])
                    .send()
                    .await?;

                if !response.status().is_success() {
                    return Err(MarketError::AuthRequired(format!(
                        "login rejected: HTTP {}",
                        response.status()
                    )));
                }
            }
        }

        *established = true;
        Ok(())
    }

    /// GET a JSON endpoint within the established session
    pub async fn get_json(&self, url: &str, referer: &str) -> Result<Value> {
        self.ensure_session().await.inspect_err(|err| {
            warn!(error = %err, "session bootstrap failed");
        })?;

        self.rate_limiter.until_ready().await;

        let response = self
            .client
            .get(url)
            .header("Referer", referer)
            .header("Accept", "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(MarketError::Api(format!(
                "HTTP {} from {url}",
                response.status()
            )));
        }

        Ok(response.json().await?)
    }

    /// GET an HTML page within the established session
    pub async fn get_text(&self, url: &str, referer: &str) -> Result<String> {
        self.ensure_session().await.inspect_err(|err| {
            warn!(error = %err, "session bootstrap failed");
        })?;

        self.rate_limiter.until_ready().await;

        let response = self
            .client
            .get(url)
            .header("Referer", referer)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(MarketError::Api(format!(
                "HTTP {} from {url}",
                response.status()
            )));
        }

        Ok(response.text().await?)
    }

    /// Drop the established flag so the next request re-bootstraps
    pub async fn reset(&self) {
        let mut established = self.established.lock().await;
        *established = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csrf_pattern_matches_login_page() {
        let session = ScrapeSession::new(
            SessionStrategy::CookieBootstrap {
                warmup_url: "https://example.com".to_string(),
            },
            Duration::from_secs(5),
            30,
        )
        .expect("session");

        let page = r#"<form><input type="hidden" name="csrfmiddlewaretoken" value="abc123XYZ"></form>"#;
        let token = session
            .csrf_pattern
            .captures(page)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str());
        assert_eq!(token, Some("abc123XYZ"));
    }

    #[tokio::test]
    async fn test_reset_clears_established_flag() {
        let session = ScrapeSession::new(
            SessionStrategy::CookieBootstrap {
                warmup_url: "https://example.com".to_string(),
            },
            Duration::from_secs(5),
            30,
        )
        .expect("session");

        {
            let mut flag = session.established.lock().await;
            *flag = true;
        }
        session.reset().await;
        assert!(!*session.established.lock().await);
    }
}
