//! Fallback search tier over the Custom Search JSON API.
//!
//! Invoked only when site-native discovery under-produces. Search backends
//! vary in how well they honor recency, so no single query shape is trusted
//! alone — three complementary strategies run in order and their outputs are
//! merged:
//!
//! 1. `dateRestrict=dN` — ask the backend for the last N days
//! 2. `after:`/`before:` operators inside the query text
//! 3. `sort=date:r:YYYYMMDD:YYYYMMDD` — range-restricted date sort
//!
//! Results are domain-checked against the profile, validated like any other
//! candidate, and dated from their URL when possible. Undated results are
//! kept as DateUnknown; results dated outside the window are dropped here
//! rather than handed to the prioritizer.

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::{debug, info, warn};
use url::Url;

use crate::fetch::FetchPort;
use crate::models::{Candidate, DateWindow, SourceMethod, WindowStatus};
use crate::profiles::SiteProfile;
use crate::scrapers::{assemble_item, Assembled, ListingItem};

const API_ENDPOINT: &str = "https://www.googleapis.com/customsearch/v1";

/// The API returns at most ten results per request.
const PAGE_SIZE: usize = 10;

/// Credentials for the search backend; absent credentials disable the tier.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub api_key: String,
    pub engine_id: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    #[serde(default)]
    title: String,
    link: Option<String>,
    #[serde(default)]
    snippet: String,
}

#[derive(Debug, Clone, Copy)]
enum Strategy {
    DateRestrict,
    DateInQuery,
    SortByDate,
}

impl Strategy {
    const ALL: [Strategy; 3] = [Strategy::DateRestrict, Strategy::DateInQuery, Strategy::SortByDate];
}

fn query_terms(profile: &SiteProfile) -> String {
    profile
        .search_keywords
        .iter()
        .filter(|k| !k.trim().is_empty())
        .map(|k| format!("\"{}\"", k.trim()))
        .collect::<Vec<_>>()
        .join(" OR ")
}

fn request_url(
    strategy: Strategy,
    profile: &SiteProfile,
    config: &SearchConfig,
    window: &DateWindow,
    as_of: NaiveDate,
    num: usize,
) -> String {
    let mut query = query_terms(profile);
    let mut extra = String::new();
    match strategy {
        Strategy::DateRestrict => {
            let days = (as_of - window.start).num_days().max(1);
            extra = format!("&dateRestrict=d{days}");
        }
        Strategy::DateInQuery => {
            query = format!(
                "{query} after:{} before:{}",
                window.start.format("%Y-%m-%d"),
                window.end.format("%Y-%m-%d")
            );
        }
        Strategy::SortByDate => {
            extra = format!(
                "&sort=date:r:{}:{}",
                window.start.format("%Y%m%d"),
                window.end.format("%Y%m%d")
            );
        }
    }
    format!(
        "{API_ENDPOINT}?key={}&cx={}&num={num}&q={}{extra}",
        config.api_key,
        config.engine_id,
        urlencoding::encode(&query)
    )
}

/// Query the search backend for candidates inside `window`.
///
/// `limit` is the number of candidates still needed; strategies stop as soon
/// as it is met. `seen` dedups across strategies.
pub async fn search_fallback(
    profile: &'static SiteProfile,
    config: &SearchConfig,
    fetcher: &dyn FetchPort,
    window: &DateWindow,
    as_of: NaiveDate,
    limit: usize,
    seen: &mut HashSet<String>,
) -> Vec<Candidate> {
    let mut candidates: Vec<Candidate> = Vec::new();
    let base = Url::parse(API_ENDPOINT).expect("endpoint URL is valid");

    for strategy in Strategy::ALL {
        if candidates.len() >= limit {
            break;
        }
        let num = PAGE_SIZE.min(limit - candidates.len());
        let url = request_url(strategy, profile, config, window, as_of, num);
        debug!(site = profile.site_id, ?strategy, "Search strategy request");

        let resp = match fetcher.fetch(&url).await {
            Ok(resp) if resp.is_success() => resp,
            Ok(resp) => {
                warn!(site = profile.site_id, ?strategy, status = resp.status, "Search strategy failed");
                continue;
            }
            Err(e) => {
                warn!(site = profile.site_id, ?strategy, error = %e, "Search strategy failed");
                continue;
            }
        };
        let parsed: SearchResponse = match serde_json::from_str(&resp.body) {
            Ok(p) => p,
            Err(e) => {
                warn!(site = profile.site_id, ?strategy, error = %e, "Search response not parseable");
                continue;
            }
        };

        for item in parsed.items {
            if candidates.len() >= limit {
                break;
            }
            let link = match item.link {
                Some(l) if l.starts_with("http") => l,
                _ => continue,
            };
            let listing = ListingItem {
                href: link,
                title: item.title.clone(),
                snippet: if item.snippet.is_empty() { None } else { Some(item.snippet.clone()) },
                date_text: None,
                timestamp: None,
            };
            match assemble_item(
                &listing,
                &base,
                profile,
                SourceMethod::FallbackSearch,
                window,
                as_of,
                seen,
            ) {
                Assembled::Kept(c) if c.window_status == WindowStatus::OutOfWindow => {
                    debug!(site = profile.site_id, url = %c.url, "Search result outside window");
                }
                Assembled::Kept(c) => candidates.push(c),
                Assembled::OlderThanWindow | Assembled::Skipped => {}
            }
        }
    }

    info!(site = profile.site_id, count = candidates.len(), "Fallback search finished");
    candidates
}
