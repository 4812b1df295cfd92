//! UC Davis adapter: teaser cards on the university's "latest news" feed.
//!
//! Each card is a `div.vm-teaser__body` with the headline in an `<h3>` and a
//! machine-readable `<time datetime="...">` element, so this is the one
//! adapter that dates items from a structured timestamp.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use url::Url;

use super::{element_text, ListingItem, SiteAdapter};
use crate::error::DiscoveryError;
use crate::profiles::{self, SiteProfile};

static TEASER_BODY: Lazy<Selector> = Lazy::new(|| Selector::parse("div.vm-teaser__body").unwrap());
static HEADING_ANCHOR: Lazy<Selector> = Lazy::new(|| Selector::parse("h3 a[href]").unwrap());
static TIME_EL: Lazy<Selector> = Lazy::new(|| Selector::parse("time").unwrap());

static NEWSISH_HREF: Lazy<Regex> = Lazy::new(|| Regex::new(r"(/news/|/\d{4}/\d{2}/)").unwrap());

pub struct Ucd;

impl SiteAdapter for Ucd {
    fn profile(&self) -> &'static SiteProfile {
        profiles::lookup("ucd").unwrap()
    }

    fn extract_listing(&self, body: &str, _base: &Url) -> Result<Vec<ListingItem>, DiscoveryError> {
        let doc = Html::parse_document(body);
        let mut items = Vec::new();
        for teaser in doc.select(&TEASER_BODY) {
            let anchor = match teaser.select(&HEADING_ANCHOR).next() {
                Some(a) => a,
                None => continue,
            };
            let href = match anchor.value().attr("href") {
                Some(h) if NEWSISH_HREF.is_match(h) => h,
                _ => continue,
            };
            let timestamp = teaser
                .select(&TIME_EL)
                .next()
                .and_then(|t| t.value().attr("datetime"))
                .map(str::to_string);
            items.push(ListingItem {
                href: href.to_string(),
                title: element_text(&anchor),
                snippet: None,
                date_text: None,
                timestamp,
            });
        }
        Ok(items)
    }
}
