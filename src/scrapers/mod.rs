//! Per-site adapters for discovering article candidates.
//!
//! Every supported site implements the [`SiteAdapter`] capability. Adapters
//! only locate listing anchors and per-item date hints — pagination, date
//! resolution, URL validation, and window filtering are shared machinery
//! (`pagination`, `archive`, `dates`, and [`assemble_item`] here), so a new
//! site is ~60 lines of selectors.
//!
//! # Supported sources
//!
//! | Site | Module | Anchors | Date source |
//! |------|--------|---------|-------------|
//! | NYU / Washington Square News | [`nyu`] | heading + container selectors | URL path |
//! | Emory / Emory Wheel | [`emory`] | monthly story index + `article` cards | URL slug, dateline text |
//! | UC Davis | [`ucd`] | teaser cards | `<time datetime>` attribute |
//! | UBC Today | [`ubc`] | update cards | dateline text |
//! | USC Annenberg Media | [`usc`] | Arc XP JSON feed | `display_date` timestamp |
//! | Edinburgh / The Student | [`edin`] | date-filtered listing + category links | dateline text, URL path |

pub mod edin;
pub mod emory;
pub mod nyu;
pub mod ubc;
pub mod ucd;
pub mod usc;

use std::collections::HashSet;

use chrono::NaiveDate;
use scraper::ElementRef;
use url::Url;

use crate::dates;
use crate::error::DiscoveryError;
use crate::models::{canonicalize, Candidate, DateWindow, SourceMethod, WindowStatus};
use crate::profiles::{PaginationStyle, SiteProfile};

/// One anchor pulled off a listing page, before validation and dating.
#[derive(Debug, Clone)]
pub struct ListingItem {
    /// Raw href, possibly relative to the listing page.
    pub href: String,
    pub title: String,
    pub snippet: Option<String>,
    /// Visible dateline text, if the listing shows one.
    pub date_text: Option<String>,
    /// Structured timestamp (e.g. a `<time datetime>` attribute), if present.
    pub timestamp: Option<String>,
}

/// The per-site extraction capability.
///
/// Concrete adapters differ only in how they locate listing anchors
/// (CSS-selector based, JSON-API based, or hybrid) and where they find a
/// per-item date. They never loop over pages themselves — the pagination
/// controller owns that.
pub trait SiteAdapter: Send + Sync {
    fn profile(&self) -> &'static SiteProfile;

    /// Pull candidate anchors out of one listing page body.
    ///
    /// `base` is the page's final URL, used by callers to resolve relative
    /// hrefs. Returns `Err` only when the payload is structurally unusable;
    /// a page that merely matches nothing yields an empty list.
    fn extract_listing(&self, body: &str, base: &Url) -> Result<Vec<ListingItem>, DiscoveryError>;

    /// URL for the `page`-th page (zero-based) of a listing source, or
    /// `None` once this source has no further pages to offer.
    fn page_url(&self, seed: &str, page: usize) -> Option<String> {
        default_page_url(self.profile().pagination, seed, page)
    }
}

/// Look up the adapter registered for a site.
pub fn adapter_for(site_id: &str) -> Option<&'static dyn SiteAdapter> {
    static NYU: nyu::Nyu = nyu::Nyu;
    static EMORY: emory::Emory = emory::Emory;
    static UCD: ucd::Ucd = ucd::Ucd;
    static UBC: ubc::Ubc = ubc::Ubc;
    static USC: usc::Usc = usc::Usc;
    static EDIN: edin::Edin = edin::Edin;
    match site_id {
        "nyu" => Some(&NYU),
        "emory" => Some(&EMORY),
        "ucd" => Some(&UCD),
        "ubc" => Some(&UBC),
        "usc" => Some(&USC),
        "edin" => Some(&EDIN),
        _ => None,
    }
}

fn default_page_url(style: PaginationStyle, seed: &str, page: usize) -> Option<String> {
    if page == 0 {
        return Some(seed.to_string());
    }
    match style {
        PaginationStyle::QueryPage => {
            let sep = if seed.contains('?') { '&' } else { '?' };
            Some(format!("{seed}{sep}page={page}"))
        }
        PaginationStyle::PathPage => {
            Some(format!("{}/page/{}/", seed.trim_end_matches('/'), page + 1))
        }
        // Offset feeds build their own query; adapters override.
        PaginationStyle::QueryOffset { .. } => None,
        PaginationStyle::None => None,
    }
}

/// Path fragments that mark navigation, staff, and boilerplate links.
/// Matching URLs are discarded before validators even run; this is expected,
/// high-frequency, and not logged.
const SKIP_PATTERNS: &[&str] = &[
    "/category/", "/tag/", "/author/", "/page/",
    "/staff_name/", "/staff/", "/writer/", "/contributor/",
    "/about/", "/contact/", "/privacy/", "/terms/",
    "/subscribe/", "/newsletter/", "/membership/",
    "/search/", "/archive/", "/topic/",
];

fn is_navigation(url: &str) -> bool {
    let lower = url.to_lowercase();
    SKIP_PATTERNS.iter().any(|p| lower.contains(p))
}

/// Outcome of validating and dating one listing item.
#[derive(Debug)]
pub enum Assembled {
    Kept(Candidate),
    /// Dated strictly before the window start. On reverse-chronological
    /// listings this is the pagination stop signal.
    OlderThanWindow,
    /// Navigation link, duplicate, wrong domain, failed validators, or no
    /// usable title.
    Skipped,
}

/// Shared assembly: resolve, canonicalize, validate, date, and window-check
/// one listing item. `seen` is the per-source dedup set.
pub fn assemble_item(
    item: &ListingItem,
    base: &Url,
    profile: &SiteProfile,
    method: SourceMethod,
    window: &DateWindow,
    as_of: NaiveDate,
    seen: &mut HashSet<String>,
) -> Assembled {
    let title = item.title.trim();
    if title.is_empty() {
        return Assembled::Skipped;
    }
    let href = item.href.trim();
    if href.starts_with('#') || href.starts_with("javascript:") || href.starts_with("mailto:") {
        return Assembled::Skipped;
    }
    let absolute = match base.join(href) {
        Ok(u) => u,
        Err(_) => return Assembled::Skipped,
    };
    let canonical = match canonicalize(absolute.as_str()) {
        Some(u) => u,
        None => return Assembled::Skipped,
    };
    if is_navigation(&canonical) {
        return Assembled::Skipped;
    }
    let parsed = match Url::parse(&canonical) {
        Ok(u) => u,
        Err(_) => return Assembled::Skipped,
    };
    if !profile.allows(&parsed) {
        return Assembled::Skipped;
    }
    if !profile.validates(&canonical) {
        return Assembled::Skipped;
    }
    if seen.contains(&canonical) {
        return Assembled::Skipped;
    }

    let date = dates::resolve(
        &canonical,
        item.date_text.as_deref(),
        item.timestamp.as_deref(),
        as_of,
    );
    let window_status = match date {
        Some(d) if d < window.start => return Assembled::OlderThanWindow,
        Some(d) if d > window.end => WindowStatus::OutOfWindow,
        Some(_) => WindowStatus::InWindow,
        None => WindowStatus::DateUnknown,
    };

    seen.insert(canonical.clone());
    Assembled::Kept(Candidate {
        url: canonical,
        title: title.to_string(),
        snippet: item.snippet.clone().unwrap_or_else(|| title.to_string()),
        publication_date: date,
        window_status,
        source_method: method,
        site_id: profile.site_id.to_string(),
    })
}

/// Joined, whitespace-trimmed text content of an element.
pub(crate) fn element_text(el: &ElementRef) -> String {
    el.text().collect::<Vec<_>>().join(" ").split_whitespace().collect::<Vec<_>>().join(" ")
}
