//! Pagination controller: a typed state machine over one listing source.
//!
//! Drives repeated fetch → parse → evaluate cycles for a single listing
//! (one category page and its follow-on pages), applying the stop
//! heuristics:
//!
//! ```text
//! Fetching ──ok──▶ Evaluating ──more──▶ Continuing ──▶ Fetching …
//!    │                  │
//!    │ transport/5xx    ├─ item older than window on a newest-first
//!    ▼                  │  listing          ▶ Stopped(WindowExhausted)
//! Stopped(FetchError)   ├─ nothing new      ▶ Stopped(NoNewItems)
//!                       └─ page cap hit     ▶ Stopped(PageLimitReached)
//! ```
//!
//! The terminal state always carries the candidates accumulated up to that
//! point — partial progress is never discarded. Callers inspect the typed
//! [`StopReason`] instead of threading break-flags through loops.

use std::collections::HashSet;

use chrono::NaiveDate;
use tracing::{debug, info, warn};
use url::Url;

use crate::fetch::{FetchPort, FetchResponse};
use crate::models::{Candidate, DateWindow, SourceMethod};
use crate::scrapers::{assemble_item, Assembled, SiteAdapter};

/// Why pagination over one listing source ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// A reverse-chronological listing produced an item older than the
    /// window start; everything further down is older still.
    WindowExhausted,
    /// A page yielded zero candidates that were not already seen (also
    /// covers parse failures and a 404 where a next page should be).
    NoNewItems,
    /// The profile's safety cap on pages was reached.
    PageLimitReached,
    /// The page fetch failed or answered with a non-2xx status.
    FetchError,
}

/// Terminal result of paginating one listing source.
#[derive(Debug)]
pub struct Paged {
    pub candidates: Vec<Candidate>,
    pub stop: StopReason,
}

enum PagerState {
    Fetching(usize),
    Evaluating { page: usize, resp: FetchResponse },
    Continuing(usize),
    Stopped(StopReason),
}

/// Paginate one listing source until a stop heuristic fires.
///
/// `seed` must already have any window placeholders substituted. `seen`
/// carries canonical URLs across the sources of one tier so the same story
/// is not re-emitted from a second listing.
pub async fn paginate(
    adapter: &dyn SiteAdapter,
    seed: &str,
    fetcher: &dyn FetchPort,
    window: &DateWindow,
    as_of: NaiveDate,
    seen: &mut HashSet<String>,
) -> Paged {
    let profile = adapter.profile();
    let mut candidates = Vec::new();
    let mut state = PagerState::Fetching(0);

    let stop = loop {
        state = match state {
            PagerState::Fetching(page) => {
                let url = match adapter.page_url(seed, page) {
                    Some(u) => u,
                    None => break StopReason::NoNewItems,
                };
                debug!(site = profile.site_id, page, %url, "Fetching listing page");
                match fetcher.fetch(&url).await {
                    Ok(resp) => PagerState::Evaluating { page, resp },
                    Err(e) => {
                        warn!(site = profile.site_id, page, error = %e, "Listing fetch failed");
                        PagerState::Stopped(StopReason::FetchError)
                    }
                }
            }

            PagerState::Evaluating { page, resp } => {
                if resp.is_not_found() {
                    debug!(site = profile.site_id, page, "Listing page not found");
                    PagerState::Stopped(StopReason::NoNewItems)
                } else if !resp.is_success() {
                    warn!(site = profile.site_id, page, status = resp.status, "Listing page error status");
                    PagerState::Stopped(StopReason::FetchError)
                } else {
                    let base = Url::parse(&resp.final_url)
                        .unwrap_or_else(|_| Url::parse(seed).expect("seed URL is valid"));
                    let items = match adapter.extract_listing(&resp.body, &base) {
                        Ok(items) => items,
                        Err(e) => {
                            warn!(site = profile.site_id, page, error = %e, "Listing parse failed");
                            break StopReason::NoNewItems;
                        }
                    };

                    let mut new_on_page = 0usize;
                    let mut exhausted = false;
                    for item in &items {
                        match assemble_item(
                            item,
                            &base,
                            profile,
                            SourceMethod::CategoryScan,
                            window,
                            as_of,
                            seen,
                        ) {
                            Assembled::Kept(candidate) => {
                                candidates.push(candidate);
                                new_on_page += 1;
                            }
                            Assembled::OlderThanWindow if profile.reverse_chronological => {
                                exhausted = true;
                                break;
                            }
                            Assembled::OlderThanWindow | Assembled::Skipped => {}
                        }
                    }

                    debug!(site = profile.site_id, page, kept = new_on_page, "Evaluated listing page");
                    if exhausted {
                        PagerState::Stopped(StopReason::WindowExhausted)
                    } else if new_on_page == 0 {
                        PagerState::Stopped(StopReason::NoNewItems)
                    } else if page + 1 >= profile.pagination_limit {
                        PagerState::Stopped(StopReason::PageLimitReached)
                    } else {
                        PagerState::Continuing(page)
                    }
                }
            }

            PagerState::Continuing(page) => PagerState::Fetching(page + 1),

            PagerState::Stopped(reason) => break reason,
        };
    };

    info!(
        site = profile.site_id,
        seed,
        count = candidates.len(),
        stop = ?stop,
        "Pagination finished"
    );
    Paged { candidates, stop }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DiscoveryError;
    use crate::fetch::StaticFetcher;
    use crate::models::WindowStatus;
    use crate::profiles::{PaginationStyle, SiteProfile};
    use crate::scrapers::ListingItem;
    use once_cell::sync::Lazy;
    use scraper::{Html, Selector};

    static TEST_PROFILE: Lazy<SiteProfile> = Lazy::new(|| SiteProfile {
        site_id: "campus",
        school: "Campus Test University",
        domains: &["campus.test"],
        category_pages: &["https://campus.test/news"],
        archive_templates: &[],
        validators: vec![],
        search_keywords: &["campus"],
        pagination: PaginationStyle::QueryPage,
        pagination_limit: 5,
        reverse_chronological: true,
    });

    /// Minimal adapter over `<a href data-date>` listings.
    struct TestAdapter;

    impl SiteAdapter for TestAdapter {
        fn profile(&self) -> &'static SiteProfile {
            &TEST_PROFILE
        }

        fn extract_listing(
            &self,
            body: &str,
            _base: &Url,
        ) -> Result<Vec<ListingItem>, DiscoveryError> {
            let doc = Html::parse_document(body);
            let sel = Selector::parse("a[href]").unwrap();
            Ok(doc
                .select(&sel)
                .filter_map(|a| {
                    let href = a.value().attr("href")?;
                    Some(ListingItem {
                        href: href.to_string(),
                        title: crate::scrapers::element_text(&a),
                        snippet: None,
                        date_text: a.value().attr("data-date").map(str::to_string),
                        timestamp: None,
                    })
                })
                .collect())
        }
    }

    fn window() -> DateWindow {
        DateWindow::new(
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 1, 7).unwrap(),
        )
        .unwrap()
    }

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 7).unwrap()
    }

    fn anchor(slug: &str, date: &str, title: &str) -> String {
        format!(r#"<a href="https://campus.test/{slug}" data-date="{date}">{title}</a>"#)
    }

    #[tokio::test]
    async fn test_window_exhausted_stops_before_next_page() {
        // window = [2025-01-01, 2025-01-07]; dates 01-09, 01-06 on page one,
        // 01-05, 2024-12-30 on page two. The 12-30 item must stop the crawl
        // before a third page is ever requested.
        let page1 = format!(
            "{}{}",
            anchor("a", "2025-01-09", "Too new"),
            anchor("b", "2025-01-06", "In window one")
        );
        let page2 = format!(
            "{}{}{}",
            anchor("c", "2025-01-05", "In window two"),
            anchor("d", "2024-12-30", "Too old"),
            anchor("e", "2025-01-04", "Never reached")
        );
        let fetcher = StaticFetcher::new()
            .with_page("https://campus.test/news", &page1)
            .with_page("https://campus.test/news?page=1", &page2);

        let mut seen = HashSet::new();
        let paged = paginate(
            &TestAdapter,
            "https://campus.test/news",
            &fetcher,
            &window(),
            as_of(),
            &mut seen,
        )
        .await;

        assert_eq!(paged.stop, StopReason::WindowExhausted);
        let urls: Vec<_> = paged.candidates.iter().map(|c| c.url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "https://campus.test/a",
                "https://campus.test/b",
                "https://campus.test/c"
            ]
        );
        assert_eq!(paged.candidates[0].window_status, WindowStatus::OutOfWindow);
        assert_eq!(paged.candidates[1].window_status, WindowStatus::InWindow);
        // exactly two pages fetched, no page 3
        assert_eq!(fetcher.requested().len(), 2);
    }

    #[tokio::test]
    async fn test_no_new_items_on_repeated_page() {
        let page = anchor("a", "2025-01-06", "Story");
        let fetcher = StaticFetcher::new()
            .with_page("https://campus.test/news", &page)
            .with_page("https://campus.test/news?page=1", &page);

        let mut seen = HashSet::new();
        let paged = paginate(
            &TestAdapter,
            "https://campus.test/news",
            &fetcher,
            &window(),
            as_of(),
            &mut seen,
        )
        .await;

        assert_eq!(paged.stop, StopReason::NoNewItems);
        assert_eq!(paged.candidates.len(), 1);
    }

    #[tokio::test]
    async fn test_missing_next_page_stops_quietly() {
        let page = anchor("a", "2025-01-06", "Story");
        let fetcher = StaticFetcher::new().with_page("https://campus.test/news", &page);

        let mut seen = HashSet::new();
        let paged = paginate(
            &TestAdapter,
            "https://campus.test/news",
            &fetcher,
            &window(),
            as_of(),
            &mut seen,
        )
        .await;

        // page two answers 404
        assert_eq!(paged.stop, StopReason::NoNewItems);
        assert_eq!(paged.candidates.len(), 1);
    }

    #[tokio::test]
    async fn test_page_limit_reached() {
        let mut fetcher = StaticFetcher::new();
        for page in 0..6 {
            let url = if page == 0 {
                "https://campus.test/news".to_string()
            } else {
                format!("https://campus.test/news?page={page}")
            };
            let body = anchor(&format!("p{page}"), "2025-01-06", "Story");
            fetcher = fetcher.with_page(&url, &body);
        }

        let mut seen = HashSet::new();
        let paged = paginate(
            &TestAdapter,
            "https://campus.test/news",
            &fetcher,
            &window(),
            as_of(),
            &mut seen,
        )
        .await;

        assert_eq!(paged.stop, StopReason::PageLimitReached);
        assert_eq!(paged.candidates.len(), 5);
        assert_eq!(fetcher.requested().len(), 5);
    }

    #[tokio::test]
    async fn test_server_error_keeps_partial_progress() {
        let page1 = anchor("a", "2025-01-06", "Story");
        let fetcher = StaticFetcher::new()
            .with_page("https://campus.test/news", &page1)
            .with_status("https://campus.test/news?page=1", 500, "oops");

        let mut seen = HashSet::new();
        let paged = paginate(
            &TestAdapter,
            "https://campus.test/news",
            &fetcher,
            &window(),
            as_of(),
            &mut seen,
        )
        .await;

        assert_eq!(paged.stop, StopReason::FetchError);
        assert_eq!(paged.candidates.len(), 1);
    }
}
