//! The fetch port: the engine's only boundary with the network.
//!
//! Everything that needs page bytes goes through [`FetchPort`], so the whole
//! pipeline can run against an in-memory [`StaticFetcher`] in tests. The
//! production implementation, [`HttpFetcher`], wraps one shared
//! `reqwest::Client` with a browser-like User-Agent and a per-request
//! timeout.
//!
//! Every HTTP status — including 404 — comes back as `Ok(FetchResponse)`;
//! only transport-level failures (timeout, DNS, TLS) are errors. Callers
//! decide what a 404 means for them: the archive walker treats it as "no
//! content for that month", the pagination controller as "no more pages".

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::FetchError;

/// Several of these sites answer library-default User-Agents with 403s.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// One fetched page.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    pub status: u16,
    pub body: String,
    /// URL after redirects; used as the base for resolving relative links.
    pub final_url: String,
}

impl FetchResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_not_found(&self) -> bool {
        self.status == 404
    }
}

/// Injected page-fetching capability.
#[async_trait]
pub trait FetchPort: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchResponse, FetchError>;
}

/// Production fetcher over a shared `reqwest::Client`.
#[derive(Debug)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Build a fetcher with the given per-request timeout.
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl FetchPort for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchResponse, FetchError> {
        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout { url: url.to_string() }
            } else {
                FetchError::Transport { url: url.to_string(), source: e }
            }
        })?;

        let status = response.status().as_u16();
        let final_url = response.url().to_string();
        let body = response.text().await.map_err(|e| FetchError::Transport {
            url: url.to_string(),
            source: e,
        })?;

        debug!(%url, status, bytes = body.len(), "Fetched page");
        Ok(FetchResponse { status, body, final_url })
    }
}

/// Decorator that counts fetch outcomes on any inner [`FetchPort`].
///
/// The CLI uses the counters for its exit code: a run that found nothing
/// *and* never completed a single fetch is a total failure.
#[derive(Debug)]
pub struct Metered<F> {
    inner: F,
    ok: AtomicUsize,
    failed: AtomicUsize,
}

impl<F> Metered<F> {
    pub fn new(inner: F) -> Self {
        Self { inner, ok: AtomicUsize::new(0), failed: AtomicUsize::new(0) }
    }

    pub fn ok_count(&self) -> usize {
        self.ok.load(Ordering::Relaxed)
    }

    pub fn failed_count(&self) -> usize {
        self.failed.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl<F: FetchPort> FetchPort for Metered<F> {
    async fn fetch(&self, url: &str) -> Result<FetchResponse, FetchError> {
        match self.inner.fetch(url).await {
            Ok(resp) => {
                self.ok.fetch_add(1, Ordering::Relaxed);
                Ok(resp)
            }
            Err(e) => {
                self.failed.fetch_add(1, Ordering::Relaxed);
                warn!(%url, error = %e, "Fetch failed");
                Err(e)
            }
        }
    }
}

/// In-memory fetcher keyed by exact URL; unknown URLs answer 404.
///
/// This is the test double every adapter and controller test drives the
/// pipeline with — no test touches the network.
#[derive(Debug, Default)]
pub struct StaticFetcher {
    pages: HashMap<String, (u16, String)>,
    hits: std::sync::Mutex<Vec<String>>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a 200 response for a URL.
    pub fn with_page(mut self, url: &str, body: &str) -> Self {
        self.pages.insert(url.to_string(), (200, body.to_string()));
        self
    }

    /// Register an arbitrary status for a URL.
    pub fn with_status(mut self, url: &str, status: u16, body: &str) -> Self {
        self.pages.insert(url.to_string(), (status, body.to_string()));
        self
    }

    /// URLs requested so far, in order.
    pub fn requested(&self) -> Vec<String> {
        self.hits.lock().unwrap().clone()
    }
}

#[async_trait]
impl FetchPort for StaticFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchResponse, FetchError> {
        self.hits.lock().unwrap().push(url.to_string());
        let (status, body) = self
            .pages
            .get(url)
            .cloned()
            .unwrap_or((404, String::new()));
        Ok(FetchResponse { status, body, final_url: url.to_string() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_fetcher_serves_registered_pages() {
        let fetcher = StaticFetcher::new().with_page("https://a.test/", "<html></html>");
        let resp = fetcher.fetch("https://a.test/").await.unwrap();
        assert_eq!(resp.status, 200);
        assert!(resp.is_success());
        assert_eq!(resp.body, "<html></html>");
    }

    #[tokio::test]
    async fn test_static_fetcher_unknown_url_is_404() {
        let fetcher = StaticFetcher::new();
        let resp = fetcher.fetch("https://a.test/missing").await.unwrap();
        assert!(resp.is_not_found());
        assert!(!resp.is_success());
    }

    #[tokio::test]
    async fn test_static_fetcher_records_requests_in_order() {
        let fetcher = StaticFetcher::new()
            .with_page("https://a.test/1", "x")
            .with_page("https://a.test/2", "y");
        fetcher.fetch("https://a.test/1").await.unwrap();
        fetcher.fetch("https://a.test/2").await.unwrap();
        assert_eq!(fetcher.requested(), vec!["https://a.test/1", "https://a.test/2"]);
    }

    #[tokio::test]
    async fn test_metered_counts_successes() {
        let fetcher = Metered::new(StaticFetcher::new().with_page("https://a.test/", "x"));
        fetcher.fetch("https://a.test/").await.unwrap();
        fetcher.fetch("https://a.test/404").await.unwrap();
        // a 404 is still a completed fetch, not a failure
        assert_eq!(fetcher.ok_count(), 2);
        assert_eq!(fetcher.failed_count(), 0);
    }
}
