//! Data models for discovered article candidates.
//!
//! This module defines the core data structures used throughout the engine:
//! - [`Candidate`]: a discovered, unverified article reference
//! - [`DateWindow`]: the inclusive calendar range a discovery run is scoped to
//! - [`SourceMethod`]: provenance tag recording which tier found a candidate
//! - [`DiscoveryResult`]: the ordered, deduplicated output of one run
//!
//! Serialized field names use camelCase to match the JSON contract consumed
//! by the downstream verification service.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use url::Url;

/// Which discovery tier produced a candidate.
///
/// Tier order is also priority order: when two tiers surface the same URL,
/// the candidate from the higher-priority (lower-numbered) tier wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceMethod {
    ArchiveScan,
    CategoryScan,
    FallbackSearch,
}

/// Where a candidate's publication date sits relative to the requested window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WindowStatus {
    InWindow,
    OutOfWindow,
    DateUnknown,
}

/// An unverified, discovered article reference.
///
/// Created by an adapter and immutable after emission, except for the window
/// annotation applied by the prioritizer. The `url` field is always canonical
/// (see [`canonicalize`]) and absolute.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub url: String,
    pub title: String,
    pub snippet: String,
    /// Resolved publication date, if any rule of the date resolver matched.
    pub publication_date: Option<NaiveDate>,
    pub window_status: WindowStatus,
    pub source_method: SourceMethod,
    pub site_id: String,
}

/// The inclusive calendar-date range a discovery run is scoped to.
///
/// Supplied by the caller once per run and passed explicitly through every
/// adapter and controller call — there is no process-global date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, crate::error::DiscoveryError> {
        if start > end {
            return Err(crate::error::DiscoveryError::WindowInverted { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Every `(year, month)` bucket the window overlaps, in calendar order.
    ///
    /// A window spanning December into January yields both months, across the
    /// year boundary.
    pub fn months(&self) -> Vec<(i32, u32)> {
        let mut months = Vec::new();
        let (mut y, mut m) = (self.start.year(), self.start.month());
        loop {
            months.push((y, m));
            if y == self.end.year() && m == self.end.month() {
                break;
            }
            m += 1;
            if m == 13 {
                m = 1;
                y += 1;
            }
        }
        months
    }
}

/// Per-tier counts for one discovery run.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodCounts {
    pub archive_scan: usize,
    pub category_scan: usize,
    pub fallback_search: usize,
}

impl MethodCounts {
    pub fn tally(candidates: &[Candidate]) -> Self {
        let mut counts = Self::default();
        for c in candidates {
            match c.source_method {
                SourceMethod::ArchiveScan => counts.archive_scan += 1,
                SourceMethod::CategoryScan => counts.category_scan += 1,
                SourceMethod::FallbackSearch => counts.fallback_search += 1,
            }
        }
        counts
    }
}

/// The ordered output of one orchestrator invocation.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryResult {
    pub site_id: String,
    pub window: DateWindow,
    pub candidates: Vec<Candidate>,
    pub counts: MethodCounts,
}

/// Query parameters that only exist for click tracking; stripped during
/// canonicalization so the same article shared through different channels
/// dedups to one URL.
const TRACKING_PARAMS: &[&str] = &["fbclid", "gclid", "igshid", "mc_cid", "mc_eid", "ref"];

fn is_tracking_param(name: &str) -> bool {
    name.starts_with("utm_") || TRACKING_PARAMS.contains(&name)
}

/// Normalize a URL into its canonical, dedup-key form.
///
/// Keeps scheme + host + path, drops the fragment, and strips tracking query
/// parameters while preserving meaningful ones (pagination offsets, search
/// terms). Returns `None` for non-HTTP(S) or unparseable input.
pub fn canonicalize(raw: &str) -> Option<String> {
    let mut url = Url::parse(raw).ok()?;
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }
    url.set_fragment(None);
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| !is_tracking_param(k))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    if kept.is_empty() {
        url.set_query(None);
    } else {
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        for (k, v) in &kept {
            serializer.append_pair(k, v);
        }
        let query = serializer.finish();
        url.set_query(Some(&query));
    }
    Some(url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_window_contains_is_inclusive() {
        let w = DateWindow::new(d(2025, 1, 1), d(2025, 1, 7)).unwrap();
        assert!(w.contains(d(2025, 1, 1)));
        assert!(w.contains(d(2025, 1, 7)));
        assert!(!w.contains(d(2024, 12, 31)));
        assert!(!w.contains(d(2025, 1, 8)));
    }

    #[test]
    fn test_window_rejects_inverted_range() {
        assert!(DateWindow::new(d(2025, 2, 1), d(2025, 1, 1)).is_err());
    }

    #[test]
    fn test_months_spans_year_boundary() {
        let w = DateWindow::new(d(2024, 12, 20), d(2025, 1, 5)).unwrap();
        assert_eq!(w.months(), vec![(2024, 12), (2025, 1)]);
    }

    #[test]
    fn test_months_single_month() {
        let w = DateWindow::new(d(2025, 3, 1), d(2025, 3, 31)).unwrap();
        assert_eq!(w.months(), vec![(2025, 3)]);
    }

    #[test]
    fn test_canonicalize_strips_tracking_params() {
        let url =
            "https://nyunews.com/news/2025/01/06/story/?utm_source=tw&utm_medium=social&fbclid=abc";
        assert_eq!(
            canonicalize(url).unwrap(),
            "https://nyunews.com/news/2025/01/06/story/"
        );
    }

    #[test]
    fn test_canonicalize_keeps_meaningful_query() {
        let url = "https://www.emorywheel.com/section/news?page=2&utm_campaign=x";
        assert_eq!(
            canonicalize(url).unwrap(),
            "https://www.emorywheel.com/section/news?page=2"
        );
    }

    #[test]
    fn test_canonicalize_drops_fragment_and_non_http() {
        assert_eq!(
            canonicalize("https://news.ubc.ca/2025/01/story/#comments").unwrap(),
            "https://news.ubc.ca/2025/01/story/"
        );
        assert!(canonicalize("mailto:tips@nyunews.com").is_none());
        assert!(canonicalize("javascript:void(0)").is_none());
    }

    #[test]
    fn test_source_method_priority_order() {
        assert!(SourceMethod::ArchiveScan < SourceMethod::CategoryScan);
        assert!(SourceMethod::CategoryScan < SourceMethod::FallbackSearch);
    }

    #[test]
    fn test_candidate_serializes_to_contract_fields() {
        let c = Candidate {
            url: "https://nyunews.com/news/2025/01/06/story/".to_string(),
            title: "Story".to_string(),
            snippet: "Story".to_string(),
            publication_date: Some(d(2025, 1, 6)),
            window_status: WindowStatus::InWindow,
            source_method: SourceMethod::ArchiveScan,
            site_id: "nyu".to_string(),
        };
        let json = serde_json::to_value(&c).unwrap();
        assert_eq!(json["publicationDate"], "2025-01-06");
        assert_eq!(json["sourceMethod"], "archive_scan");
        assert_eq!(json["windowStatus"], "inWindow");
        assert_eq!(json["siteId"], "nyu");
    }

    #[test]
    fn test_candidate_null_date_serializes_to_null() {
        let c = Candidate {
            url: "https://nyunews.com/a".to_string(),
            title: "A".to_string(),
            snippet: "A".to_string(),
            publication_date: None,
            window_status: WindowStatus::DateUnknown,
            source_method: SourceMethod::FallbackSearch,
            site_id: "nyu".to_string(),
        };
        let json = serde_json::to_value(&c).unwrap();
        assert!(json["publicationDate"].is_null());
    }

    #[test]
    fn test_method_counts_tally() {
        let mk = |m| Candidate {
            url: String::new(),
            title: String::new(),
            snippet: String::new(),
            publication_date: None,
            window_status: WindowStatus::DateUnknown,
            source_method: m,
            site_id: "nyu".to_string(),
        };
        let counts = MethodCounts::tally(&[
            mk(SourceMethod::ArchiveScan),
            mk(SourceMethod::ArchiveScan),
            mk(SourceMethod::FallbackSearch),
        ]);
        assert_eq!(counts.archive_scan, 2);
        assert_eq!(counts.category_scan, 0);
        assert_eq!(counts.fallback_search, 1);
    }
}
