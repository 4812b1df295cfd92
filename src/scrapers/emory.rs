//! Emory adapter: news.emory.edu monthly story indexes plus the Emory Wheel.
//!
//! A hybrid source. The university site buckets stories under
//! `/stories/{year}/{month}/.../story.html` (dates live in the URL slug or a
//! meta div), while the Wheel is a paginated section feed whose cards carry a
//! visible dateline. The adapter branches on the host of the page it was
//! handed.

use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use url::Url;

use super::{element_text, ListingItem, SiteAdapter};
use crate::error::DiscoveryError;
use crate::profiles::{self, SiteProfile};

static ANY_ANCHOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").unwrap());
static META_DIV: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.tag-list-item-meta").unwrap());
static WHEEL_CARD: Lazy<Selector> = Lazy::new(|| Selector::parse("article").unwrap());
static DATELINE: Lazy<Selector> = Lazy::new(|| Selector::parse("span.dateline").unwrap());

pub struct Emory;

impl Emory {
    /// Story links on a news.emory.edu monthly index.
    fn extract_story_index(&self, doc: &Html) -> Vec<ListingItem> {
        let mut items = Vec::new();
        for anchor in doc.select(&ANY_ANCHOR) {
            let href = match anchor.value().attr("href") {
                Some(h) => h,
                None => continue,
            };
            if !href.contains("/stories/") || !href.ends_with("/story.html") {
                continue;
            }
            let title = element_text(&anchor);
            // Index entries without a slug date carry it in a meta div
            // nested inside the anchor.
            let date_text = anchor.select(&META_DIV).next().map(|m| element_text(&m));
            items.push(ListingItem {
                href: href.to_string(),
                title: if title.is_empty() { "Untitled".to_string() } else { title },
                snippet: None,
                date_text,
                timestamp: None,
            });
        }
        items
    }

    /// Article cards on an Emory Wheel section page.
    fn extract_wheel_section(&self, doc: &Html) -> Vec<ListingItem> {
        let mut items = Vec::new();
        for card in doc.select(&WHEEL_CARD) {
            let anchor = card
                .select(&ANY_ANCHOR)
                .find(|a| a.value().attr("href").is_some_and(|h| h.contains("/article/")));
            let anchor = match anchor {
                Some(a) => a,
                None => continue,
            };
            let href = anchor.value().attr("href").unwrap();
            let title = anchor
                .value()
                .attr("title")
                .map(str::to_string)
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| element_text(&anchor));
            // Cards show two datelines (section, publication); the last one
            // is the publication date.
            let date_text = card.select(&DATELINE).last().map(|s| element_text(&s));
            items.push(ListingItem {
                href: href.to_string(),
                title,
                snippet: None,
                date_text,
                timestamp: None,
            });
        }
        items
    }
}

impl SiteAdapter for Emory {
    fn profile(&self) -> &'static SiteProfile {
        profiles::lookup("emory").unwrap()
    }

    fn extract_listing(&self, body: &str, base: &Url) -> Result<Vec<ListingItem>, DiscoveryError> {
        let doc = Html::parse_document(body);
        let items = match base.host_str() {
            Some("news.emory.edu") => self.extract_story_index(&doc),
            _ => self.extract_wheel_section(&doc),
        };
        Ok(items)
    }
}
