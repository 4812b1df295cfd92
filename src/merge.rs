//! Merging, deduplication, and final ordering of tier outputs.
//!
//! Both stages are pure functions over candidate lists. [`merge`] unions the
//! tiers in priority order (archive > category > fallback search) and keeps
//! the first occurrence of each canonical URL, so a story found by two tiers
//! carries the higher-priority tier's provenance tag. [`prioritize`] applies
//! the window filter and produces the final ranked order.

use itertools::Itertools;

use crate::models::{canonicalize, Candidate, DateWindow, SourceMethod, WindowStatus};

/// Union tier outputs, deduplicating by canonical URL.
///
/// Input order does not matter — tiers are re-sorted into priority order
/// before the first-occurrence-wins pass.
pub fn merge(tiers: Vec<(SourceMethod, Vec<Candidate>)>) -> Vec<Candidate> {
    let mut tiers = tiers;
    tiers.sort_by_key(|(method, _)| *method);
    tiers
        .into_iter()
        .flat_map(|(_, candidates)| candidates)
        .filter_map(|c| {
            let url = canonicalize(&c.url)?;
            Some(Candidate { url, ..c })
        })
        .unique_by(|c| c.url.clone())
        .collect()
}

/// Label each candidate against the window and rank the final list.
///
/// Sort key per candidate:
/// - `(0, distance from window end)` — in-window, newest first
/// - `(1, insertion order)` — DateUnknown, left for downstream verification
/// - `(2, distance from window)` — out-of-window; only appended when the
///   quota would otherwise go unmet, unless `keep_out_of_window` is set
///   (the no-date-filter mode for sites whose listings carry no dates)
///
/// The result is truncated to `quota`.
pub fn prioritize(
    merged: Vec<Candidate>,
    window: &DateWindow,
    quota: usize,
    keep_out_of_window: bool,
) -> Vec<Candidate> {
    let mut in_window = Vec::new();
    let mut unknown = Vec::new();
    let mut out_of_window = Vec::new();

    for mut candidate in merged {
        match candidate.publication_date {
            Some(date) if window.contains(date) => {
                candidate.window_status = WindowStatus::InWindow;
                in_window.push(candidate);
            }
            Some(_) => {
                candidate.window_status = WindowStatus::OutOfWindow;
                out_of_window.push(candidate);
            }
            None => {
                candidate.window_status = WindowStatus::DateUnknown;
                unknown.push(candidate);
            }
        }
    }

    // stable sorts: ties keep their insertion order
    in_window.sort_by_key(|c| {
        let date = c.publication_date.expect("in-window candidates are dated");
        (window.end - date).num_days()
    });
    out_of_window.sort_by_key(|c| {
        let date = c.publication_date.expect("out-of-window candidates are dated");
        if date > window.end {
            (date - window.end).num_days()
        } else {
            (window.start - date).num_days()
        }
    });

    let mut result = in_window;
    result.extend(unknown);
    if keep_out_of_window {
        result.extend(out_of_window);
    } else if result.len() < quota {
        let missing = quota - result.len();
        result.extend(out_of_window.into_iter().take(missing));
    }
    result.truncate(quota);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn window() -> DateWindow {
        DateWindow::new(d(2025, 1, 1), d(2025, 1, 7)).unwrap()
    }

    fn candidate(url: &str, date: Option<NaiveDate>, method: SourceMethod) -> Candidate {
        Candidate {
            url: url.to_string(),
            title: url.to_string(),
            snippet: url.to_string(),
            publication_date: date,
            window_status: WindowStatus::DateUnknown,
            source_method: method,
            site_id: "nyu".to_string(),
        }
    }

    #[test]
    fn test_merge_first_tier_wins_for_shared_url() {
        let url = "https://nyunews.com/news/2025/01/06/story/";
        // category tier listed first in the input, but archive has priority
        let merged = merge(vec![
            (
                SourceMethod::CategoryScan,
                vec![candidate(url, Some(d(2025, 1, 6)), SourceMethod::CategoryScan)],
            ),
            (
                SourceMethod::ArchiveScan,
                vec![candidate(url, Some(d(2025, 1, 6)), SourceMethod::ArchiveScan)],
            ),
        ]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].source_method, SourceMethod::ArchiveScan);
    }

    #[test]
    fn test_merge_dedups_tracking_variants() {
        let merged = merge(vec![
            (
                SourceMethod::ArchiveScan,
                vec![candidate(
                    "https://nyunews.com/news/2025/01/06/story/",
                    None,
                    SourceMethod::ArchiveScan,
                )],
            ),
            (
                SourceMethod::FallbackSearch,
                vec![candidate(
                    "https://nyunews.com/news/2025/01/06/story/?utm_source=search",
                    None,
                    SourceMethod::FallbackSearch,
                )],
            ),
        ]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].source_method, SourceMethod::ArchiveScan);
    }

    #[test]
    fn test_prioritize_newest_first_then_unknown() {
        let merged = vec![
            candidate("https://a.test/jan5", Some(d(2025, 1, 5)), SourceMethod::CategoryScan),
            candidate("https://a.test/unknown", None, SourceMethod::CategoryScan),
            candidate("https://a.test/jan6", Some(d(2025, 1, 6)), SourceMethod::CategoryScan),
        ];
        let ranked = prioritize(merged, &window(), 10, false);
        let urls: Vec<_> = ranked.iter().map(|c| c.url.as_str()).collect();
        assert_eq!(
            urls,
            vec!["https://a.test/jan6", "https://a.test/jan5", "https://a.test/unknown"]
        );
        assert_eq!(ranked[2].window_status, WindowStatus::DateUnknown);
    }

    #[test]
    fn test_prioritize_out_of_window_excluded_when_quota_met() {
        // the concrete category-listing scenario: dates 01-09, 01-06, 01-05
        let merged = vec![
            candidate("https://a.test/jan9", Some(d(2025, 1, 9)), SourceMethod::CategoryScan),
            candidate("https://a.test/jan6", Some(d(2025, 1, 6)), SourceMethod::CategoryScan),
            candidate("https://a.test/jan5", Some(d(2025, 1, 5)), SourceMethod::CategoryScan),
        ];
        let ranked = prioritize(merged, &window(), 2, false);
        let urls: Vec<_> = ranked.iter().map(|c| c.url.as_str()).collect();
        assert_eq!(urls, vec!["https://a.test/jan6", "https://a.test/jan5"]);
    }

    #[test]
    fn test_prioritize_out_of_window_fills_unmet_quota() {
        let merged = vec![
            candidate("https://a.test/jan9", Some(d(2025, 1, 9)), SourceMethod::CategoryScan),
            candidate("https://a.test/jan6", Some(d(2025, 1, 6)), SourceMethod::CategoryScan),
        ];
        let ranked = prioritize(merged, &window(), 5, false);
        let urls: Vec<_> = ranked.iter().map(|c| c.url.as_str()).collect();
        assert_eq!(urls, vec!["https://a.test/jan6", "https://a.test/jan9"]);
        assert_eq!(ranked[1].window_status, WindowStatus::OutOfWindow);
    }

    #[test]
    fn test_prioritize_out_of_window_sorted_by_distance() {
        let merged = vec![
            candidate("https://a.test/feb1", Some(d(2025, 2, 1)), SourceMethod::CategoryScan),
            candidate("https://a.test/jan8", Some(d(2025, 1, 8)), SourceMethod::CategoryScan),
        ];
        let ranked = prioritize(merged, &window(), 5, false);
        let urls: Vec<_> = ranked.iter().map(|c| c.url.as_str()).collect();
        assert_eq!(urls, vec!["https://a.test/jan8", "https://a.test/feb1"]);
    }

    #[test]
    fn test_prioritize_no_date_filter_mode_keeps_out_of_window() {
        let merged = vec![
            candidate("https://a.test/jan6", Some(d(2025, 1, 6)), SourceMethod::CategoryScan),
            candidate("https://a.test/feb1", Some(d(2025, 2, 1)), SourceMethod::CategoryScan),
            candidate("https://a.test/jan5", Some(d(2025, 1, 5)), SourceMethod::CategoryScan),
        ];
        // quota already met by in-window items, yet out-of-window is kept
        let ranked = prioritize(merged, &window(), 3, true);
        let urls: Vec<_> = ranked.iter().map(|c| c.url.as_str()).collect();
        assert_eq!(
            urls,
            vec!["https://a.test/jan6", "https://a.test/jan5", "https://a.test/feb1"]
        );
    }

    #[test]
    fn test_prioritize_truncates_to_quota() {
        let merged: Vec<_> = (1..=6)
            .map(|day| {
                candidate(
                    &format!("https://a.test/jan{day}"),
                    Some(d(2025, 1, day)),
                    SourceMethod::CategoryScan,
                )
            })
            .collect();
        let ranked = prioritize(merged, &window(), 3, false);
        assert_eq!(ranked.len(), 3);
        assert_eq!(ranked[0].url, "https://a.test/jan6");
    }
}
