//! Discovery orchestrator: runs the tiers in fixed priority order.
//!
//! Tier order is archive walk, then category pagination, then fallback
//! search, short-circuiting as soon as accumulated in-window candidates
//! reach the quota. Each tier runs under its own wall-clock budget; a tier
//! that exceeds it is abandoned whole — its partial output is discarded, not
//! blended mid-flight. A failing tier degrades the result, it never fails
//! the run. The only hard errors are caller mistakes: an unknown site id or
//! an inverted window.

use std::collections::HashSet;
use std::time::Duration;

use chrono::NaiveDate;
use tracing::{info, instrument, warn};

use crate::archive;
use crate::error::DiscoveryError;
use crate::fetch::FetchPort;
use crate::merge;
use crate::models::{Candidate, DateWindow, DiscoveryResult, MethodCounts, SourceMethod};
use crate::pagination;
use crate::profiles::{self, instantiate_category};
use crate::scrapers;
use crate::search::{self, SearchConfig};

/// One discovery run's parameters.
#[derive(Debug, Clone)]
pub struct DiscoveryRequest {
    pub site_id: String,
    pub window: DateWindow,
    /// Maximum candidates returned; also the short-circuit threshold.
    pub quota: usize,
    /// Reference date for relative datelines ("3 days ago").
    pub as_of: NaiveDate,
    /// Keep out-of-window candidates even when the quota is met. For sites
    /// whose listings carry no dates this stops the prioritizer from
    /// discarding everything dated slightly off.
    pub no_date_filter: bool,
    /// Wall-clock budget per tier.
    pub tier_budget: Duration,
}

fn in_window_count(tiers: &[(SourceMethod, Vec<Candidate>)], window: &DateWindow) -> usize {
    tiers
        .iter()
        .flat_map(|(_, candidates)| candidates)
        .filter(|c| c.publication_date.map(|d| window.contains(d)).unwrap_or(false))
        .count()
}

/// Run discovery for one site.
///
/// Always returns a (possibly partial, possibly empty) result once the site
/// id resolves; per-tier fetch and parse failures are logged and skipped.
#[instrument(level = "info", skip_all, fields(site = %request.site_id))]
pub async fn discover(
    request: &DiscoveryRequest,
    fetcher: &dyn FetchPort,
    search_config: Option<&SearchConfig>,
) -> Result<DiscoveryResult, DiscoveryError> {
    let profile = profiles::lookup(&request.site_id)
        .ok_or_else(|| DiscoveryError::UnknownSite(request.site_id.clone()))?;
    let adapter = scrapers::adapter_for(profile.site_id)
        .ok_or_else(|| DiscoveryError::UnknownSite(request.site_id.clone()))?;
    let window = DateWindow::new(request.window.start, request.window.end)?;

    info!(
        start = %window.start,
        end = %window.end,
        quota = request.quota,
        "Starting discovery"
    );
    let mut tiers: Vec<(SourceMethod, Vec<Candidate>)> = Vec::new();

    // Tier 1: monthly archive indexes, for sites that have them.
    if !profile.archive_templates.is_empty() {
        let mut seen = HashSet::new();
        let walk = archive::walk(adapter, fetcher, &window, request.as_of, &mut seen);
        match tokio::time::timeout(request.tier_budget, walk).await {
            Ok(candidates) => {
                info!(count = candidates.len(), "Archive tier finished");
                tiers.push((SourceMethod::ArchiveScan, candidates));
            }
            Err(_) => {
                warn!(site = profile.site_id, "Archive tier exceeded its budget; discarded")
            }
        }
    }

    // Tier 2: paginated category listings.
    if in_window_count(&tiers, &window) < request.quota {
        let tier = async {
            let mut seen = HashSet::new();
            let mut candidates = Vec::new();
            for template in profile.category_pages {
                let seed = instantiate_category(template, &window);
                let paged = pagination::paginate(
                    adapter,
                    &seed,
                    fetcher,
                    &window,
                    request.as_of,
                    &mut seen,
                )
                .await;
                candidates.extend(paged.candidates);
            }
            candidates
        };
        match tokio::time::timeout(request.tier_budget, tier).await {
            Ok(candidates) => {
                info!(count = candidates.len(), "Category tier finished");
                tiers.push((SourceMethod::CategoryScan, candidates));
            }
            Err(_) => {
                warn!(site = profile.site_id, "Category tier exceeded its budget; discarded")
            }
        }
    } else {
        info!("Quota met by archive tier; skipping category scan");
    }

    // Tier 3: fallback search, last resort only.
    let found_in_window = in_window_count(&tiers, &window);
    if found_in_window < request.quota {
        if let Some(config) = search_config {
            let remaining = request.quota - found_in_window;
            let tier = async {
                let mut seen = HashSet::new();
                search::search_fallback(
                    profile,
                    config,
                    fetcher,
                    &window,
                    request.as_of,
                    remaining,
                    &mut seen,
                )
                .await
            };
            match tokio::time::timeout(request.tier_budget, tier).await {
                Ok(candidates) => {
                    info!(count = candidates.len(), "Search tier finished");
                    tiers.push((SourceMethod::FallbackSearch, candidates));
                }
                Err(_) => {
                    warn!(site = profile.site_id, "Search tier exceeded its budget; discarded")
                }
            }
        }
    }

    let merged = merge::merge(tiers);
    let candidates = merge::prioritize(merged, &window, request.quota, request.no_date_filter);
    let counts = MethodCounts::tally(&candidates);
    info!(
        total = candidates.len(),
        archive = counts.archive_scan,
        category = counts.category_scan,
        search = counts.fallback_search,
        "Discovery finished"
    );

    Ok(DiscoveryResult { site_id: profile.site_id.to_string(), window, candidates, counts })
}
