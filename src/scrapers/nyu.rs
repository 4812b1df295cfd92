//! NYU adapter: Washington Square News plus the nyu.edu news pages.
//!
//! Listings here are plain HTML with no reliable per-item dateline, so the
//! adapter casts a wide net over anchors — headline anchors, article
//! containers, and any anchor whose href carries a date path — and leaves
//! dating entirely to the URL patterns.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use url::Url;

use super::{element_text, ListingItem, SiteAdapter};
use crate::error::DiscoveryError;
use crate::profiles::{self, SiteProfile};

static HEADING_ANCHORS: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("h1 a[href], h2 a[href], h3 a[href], h4 a[href], h5 a[href]").unwrap()
});
static CONTAINERS: Lazy<Selector> =
    Lazy::new(|| Selector::parse("article, div.post, div.news-item, li.post").unwrap());
static ANY_ANCHOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").unwrap());

/// Quick pre-filter for hrefs that could plausibly be articles.
static NEWSISH_HREF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(/news/|/\d{4}/\d{2}/)").unwrap());

pub struct Nyu;

impl SiteAdapter for Nyu {
    fn profile(&self) -> &'static SiteProfile {
        profiles::lookup("nyu").unwrap()
    }

    fn extract_listing(&self, body: &str, _base: &Url) -> Result<Vec<ListingItem>, DiscoveryError> {
        let doc = Html::parse_document(body);
        let mut hrefs_seen = std::collections::HashSet::new();
        let mut items = Vec::new();

        let mut push = |href: &str, title: String, items: &mut Vec<ListingItem>| {
            if title.is_empty() || !NEWSISH_HREF.is_match(href) {
                return;
            }
            if hrefs_seen.insert(href.to_string()) {
                items.push(ListingItem {
                    href: href.to_string(),
                    title,
                    snippet: None,
                    date_text: None,
                    timestamp: None,
                });
            }
        };

        // Headline anchors first — these carry the cleanest titles.
        for anchor in doc.select(&HEADING_ANCHORS) {
            if let Some(href) = anchor.value().attr("href") {
                push(href, element_text(&anchor), &mut items);
            }
        }
        // Then the lead anchor of each article container.
        for container in doc.select(&CONTAINERS) {
            if let Some(anchor) = container.select(&ANY_ANCHOR).next() {
                if let Some(href) = anchor.value().attr("href") {
                    push(href, element_text(&anchor), &mut items);
                }
            }
        }
        // Finally any anchor with a dated path, catching layouts the two
        // passes above miss.
        for anchor in doc.select(&ANY_ANCHOR) {
            if let Some(href) = anchor.value().attr("href") {
                push(href, element_text(&anchor), &mut items);
            }
        }

        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = r#"
        <html><body>
          <article>
            <h2><a href="/news/2025/01/06/dining-hall-update/">Dining hall update</a></h2>
          </article>
          <article>
            <h2><a href="/news/2025/01/05/tuition-freeze/">Tuition freeze announced</a></h2>
          </article>
          <div class="sidebar">
            <a href="/2025/01/04/culture/winter-show/">Winter show review</a>
            <a href="/staff/jane-doe/">Jane Doe</a>
            <a href="/category/news/">News</a>
          </div>
        </body></html>"#;

    #[test]
    fn test_extracts_heading_and_dated_anchors() {
        let base = Url::parse("https://nyunews.com/category/news/").unwrap();
        let items = Nyu.extract_listing(LISTING, &base).unwrap();
        let hrefs: Vec<_> = items.iter().map(|i| i.href.as_str()).collect();
        assert!(hrefs.contains(&"/news/2025/01/06/dining-hall-update/"));
        assert!(hrefs.contains(&"/news/2025/01/05/tuition-freeze/"));
        assert!(hrefs.contains(&"/2025/01/04/culture/winter-show/"));
        // staff link has no date path and no /news/ segment
        assert!(!hrefs.contains(&"/staff/jane-doe/"));
    }

    #[test]
    fn test_no_duplicate_hrefs_within_page() {
        let base = Url::parse("https://nyunews.com/category/news/").unwrap();
        let items = Nyu.extract_listing(LISTING, &base).unwrap();
        let mut hrefs: Vec<_> = items.iter().map(|i| i.href.clone()).collect();
        hrefs.sort();
        hrefs.dedup();
        assert_eq!(hrefs.len(), items.len());
    }

    #[test]
    fn test_empty_page_yields_no_items() {
        let base = Url::parse("https://nyunews.com/category/news/").unwrap();
        let items = Nyu.extract_listing("<html><body></body></html>", &base).unwrap();
        assert!(items.is_empty());
    }
}
