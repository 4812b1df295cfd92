//! Typed errors for the discovery engine.
//!
//! Two layers: [`FetchError`] covers transport-level failures raised by the
//! fetch port, and [`DiscoveryError`] covers everything an adapter or the
//! orchestrator can report. A plain HTTP 404 is *not* an error here — the
//! fetch port returns it as a normal response so that the archive walker can
//! treat a missing month as "no content for that period".

use thiserror::Error;

/// Transport-level failure while fetching a page.
///
/// Any response that actually came back from the server — including 404s and
/// 500s — is returned as an `Ok(FetchResponse)` by the port; this error only
/// covers requests that produced no usable response at all.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request exceeded the configured deadline.
    #[error("timed out fetching {url}")]
    Timeout { url: String },

    /// DNS failure, connection refusal, TLS trouble, or any other
    /// client-side transport problem.
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Errors surfaced by adapters and the orchestrator.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// The caller asked for a site that has no registered profile.
    /// This is the one hard configuration failure in the pipeline.
    #[error("unknown site '{0}'")]
    UnknownSite(String),

    /// The requested window has `start` after `end`.
    #[error("invalid date window: start {start} is after end {end}")]
    WindowInverted {
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    },

    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// A listing page or API payload was missing the structure the adapter
    /// expects. Callers treat this as "page contributed zero candidates".
    #[error("listing parse failed: {0}")]
    Parse(String),
}
