//! Archive-index walker for calendar-bucketed sources.
//!
//! Some sites organize news under monthly index pages instead of a
//! reverse-chronological feed. The walker enumerates every `(year, month)`
//! bucket the window overlaps, substitutes each into the profile's archive
//! templates, and fetches every index page exactly once — archive indexes
//! are not spidered further, so the pagination controller is not involved.
//!
//! A 404 for a month means "no archive for that period", not an error.

use std::collections::HashSet;

use chrono::NaiveDate;
use futures::stream::{self, StreamExt};
use tracing::{debug, info, warn};
use url::Url;

use crate::fetch::FetchPort;
use crate::models::{Candidate, DateWindow, SourceMethod};
use crate::profiles::instantiate_archive;
use crate::scrapers::{assemble_item, Assembled, ListingItem, SiteAdapter};

/// How many archive index pages are fetched concurrently.
const CONCURRENT_FETCHES: usize = 4;

/// Walk every monthly archive index overlapping `window`.
///
/// Index pages are fetched concurrently but reassembled in template/month
/// order, so output is deterministic for deterministic inputs.
pub async fn walk(
    adapter: &dyn SiteAdapter,
    fetcher: &dyn FetchPort,
    window: &DateWindow,
    as_of: NaiveDate,
    seen: &mut HashSet<String>,
) -> Vec<Candidate> {
    let profile = adapter.profile();
    let mut index_urls = Vec::new();
    for template in profile.archive_templates {
        for (year, month) in window.months() {
            index_urls.push(instantiate_archive(template, year, month));
        }
    }
    if index_urls.is_empty() {
        return Vec::new();
    }

    // Fan out the fetch+extract units; dedup and assembly happen after the
    // join, so no state is shared across in-flight tasks.
    let extracted: Vec<(String, Vec<ListingItem>)> = stream::iter(index_urls)
        .map(|url| async move {
            let items = fetch_index(adapter, fetcher, &url).await;
            (url, items)
        })
        .buffered(CONCURRENT_FETCHES)
        .collect()
        .await;

    let mut candidates = Vec::new();
    for (index_url, items) in extracted {
        let base = match Url::parse(&index_url) {
            Ok(u) => u,
            Err(_) => continue,
        };
        for item in &items {
            match assemble_item(
                item,
                &base,
                profile,
                SourceMethod::ArchiveScan,
                window,
                as_of,
                seen,
            ) {
                Assembled::Kept(candidate) => candidates.push(candidate),
                // month buckets are unordered within a page; an old item
                // carries no signal about its neighbors
                Assembled::OlderThanWindow | Assembled::Skipped => {}
            }
        }
    }

    info!(site = profile.site_id, count = candidates.len(), "Archive walk finished");
    candidates
}

async fn fetch_index(
    adapter: &dyn SiteAdapter,
    fetcher: &dyn FetchPort,
    url: &str,
) -> Vec<ListingItem> {
    let profile = adapter.profile();
    let resp = match fetcher.fetch(url).await {
        Ok(resp) => resp,
        Err(e) => {
            warn!(site = profile.site_id, %url, error = %e, "Archive fetch failed");
            return Vec::new();
        }
    };
    if resp.is_not_found() {
        debug!(site = profile.site_id, %url, "No archive for this period");
        return Vec::new();
    }
    if !resp.is_success() {
        warn!(site = profile.site_id, %url, status = resp.status, "Archive page error status");
        return Vec::new();
    }
    let base = Url::parse(&resp.final_url)
        .ok()
        .unwrap_or_else(|| Url::parse(url).expect("archive URL is valid"));
    match adapter.extract_listing(&resp.body, &base) {
        Ok(items) => items,
        Err(e) => {
            warn!(site = profile.site_id, %url, error = %e, "Archive parse failed");
            Vec::new()
        }
    }
}
