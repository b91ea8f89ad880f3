// src/fetch.rs
//! Fetch retry wrapper: one network fetch with bounded attempts and linear
//! backoff. Callers decide whether a final failure is fatal or becomes an
//! empty result.

use anyhow::{anyhow, Context, Result};
use std::time::Duration;
use tracing::warn;

#[derive(Clone)]
pub struct Fetcher {
    client: reqwest::Client,
    attempts: u32,
}

impl Fetcher {
    pub fn new(timeout: Duration, attempts: u32) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(4).min(timeout))
            .timeout(timeout)
            .build()
            .context("building http client")?;
        Ok(Self {
            client,
            attempts: attempts.max(1),
        })
    }

    /// GET the endpoint and return the body text. Non-2xx and transport
    /// errors are retried after `attempt × 1000ms`; the last error is
    /// propagated once attempts are exhausted.
    pub async fn get_text(&self, url: &str, user_agent: Option<&str>) -> Result<String> {
        let mut last_err: Option<anyhow::Error> = None;

        for attempt in 1..=self.attempts {
            match self.try_get(url, user_agent).await {
                Ok(body) => return Ok(body),
                Err(e) => {
                    warn!(url, attempt, error = %e, "fetch attempt failed");
                    last_err = Some(e);
                    if attempt < self.attempts {
                        tokio::time::sleep(Duration::from_millis(u64::from(attempt) * 1000)).await;
                    }
                }
            }
        }

        Err(last_err.unwrap_or_else(|| anyhow!("fetch failed: {url}")))
    }

    async fn try_get(&self, url: &str, user_agent: Option<&str>) -> Result<String> {
        let mut req = self.client.get(url);
        if let Some(ua) = user_agent {
            req = req.header(reqwest::header::USER_AGENT, ua);
        }
        let resp = req.send().await.with_context(|| format!("GET {url}"))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(anyhow!("GET {url} returned {status}"));
        }
        resp.text().await.with_context(|| format!("reading body of {url}"))
    }
}

/// One way of reaching a Tier-2 endpoint. Strategies are tried in order; the
/// first success wins.
#[derive(Debug, Clone)]
pub enum FetchStrategy {
    /// Route through a pass-through proxy (`{base}?url={encoded}`).
    Proxy { base: String },
    /// Direct fetch with a browser-like identifying header.
    Direct { user_agent: String },
}

impl FetchStrategy {
    fn describe(&self) -> &'static str {
        match self {
            FetchStrategy::Proxy { .. } => "proxy",
            FetchStrategy::Direct { .. } => "direct",
        }
    }
}

/// Build the proxied form of a target URL.
pub fn proxied_url(base: &str, target: &str) -> Result<String> {
    let url = reqwest::Url::parse_with_params(base, &[("url", target)])
        .with_context(|| format!("bad proxy base {base}"))?;
    Ok(url.to_string())
}

/// Try each strategy in order until one yields a body. All-fail returns the
/// last error; the caller downgrades that to an empty item list.
pub async fn fetch_with_strategies(
    fetcher: &Fetcher,
    target: &str,
    strategies: &[FetchStrategy],
) -> Result<String> {
    let mut last_err: Option<anyhow::Error> = None;

    for strategy in strategies {
        let result = match strategy {
            FetchStrategy::Proxy { base } => match proxied_url(base, target) {
                Ok(url) => fetcher.get_text(&url, None).await,
                Err(e) => Err(e),
            },
            FetchStrategy::Direct { user_agent } => {
                fetcher.get_text(target, Some(user_agent)).await
            }
        };
        match result {
            Ok(body) => return Ok(body),
            Err(e) => {
                warn!(target, strategy = strategy.describe(), error = %e, "strategy failed");
                last_err = Some(e);
            }
        }
    }

    Err(last_err.unwrap_or_else(|| anyhow!("no fetch strategy configured for {target}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn proxied_url_encodes_target() {
        let url = proxied_url(
            "https://api.allorigins.win/raw",
            "https://techcrunch.com/category/artificial-intelligence/feed/",
        )
        .expect("proxied url");
        assert!(url.starts_with("https://api.allorigins.win/raw?url="));
        assert!(url.contains("techcrunch.com%2F"));
    }

    #[test]
    fn attempts_are_clamped_to_at_least_one() {
        let f = Fetcher::new(Duration::from_secs(1), 0).expect("fetcher");
        assert_eq!(f.attempts, 1);
    }

    #[tokio::test]
    async fn unreachable_endpoint_propagates_error_after_retries() {
        let f = Fetcher::new(Duration::from_millis(200), 1).expect("fetcher");
        let res = f.get_text("http://127.0.0.1:1/feed.xml", None).await;
        assert!(res.is_err(), "closed port should fail");
    }
}
