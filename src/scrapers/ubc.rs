//! UBC adapter: update cards on UBC Today and the news.ubc.ca category feed.
//!
//! Cards carry their date as visible text in the form
//! `"Sep 5, 2025 | Global Message"`; only the part before the pipe is the
//! dateline. Items from the Okanagan sub-site (`news.ok.ubc.ca`) are out of
//! scope for this profile and excluded.

use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use url::Url;

use super::{element_text, ListingItem, SiteAdapter};
use crate::error::DiscoveryError;
use crate::profiles::{self, SiteProfile};

static CARD: Lazy<Selector> = Lazy::new(|| Selector::parse("div.ubc-card__content").unwrap());
static ANY_ANCHOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").unwrap());
static CARD_TITLE: Lazy<Selector> = Lazy::new(|| Selector::parse("h2.card__title span").unwrap());
static CARD_DIV: Lazy<Selector> = Lazy::new(|| Selector::parse("div").unwrap());

pub struct Ubc;

impl SiteAdapter for Ubc {
    fn profile(&self) -> &'static SiteProfile {
        profiles::lookup("ubc").unwrap()
    }

    fn extract_listing(&self, body: &str, _base: &Url) -> Result<Vec<ListingItem>, DiscoveryError> {
        let doc = Html::parse_document(body);
        let mut items = Vec::new();
        for card in doc.select(&CARD) {
            let anchor = match card.select(&ANY_ANCHOR).next() {
                Some(a) => a,
                None => continue,
            };
            let href = match anchor.value().attr("href") {
                Some(h) => h,
                None => continue,
            };
            if href.contains("news.ok.ubc.ca") {
                continue;
            }
            let title = card
                .select(&CARD_TITLE)
                .next()
                .map(|t| element_text(&t))
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| element_text(&anchor));
            // The second div in the card is the dateline row.
            let date_text = card
                .select(&CARD_DIV)
                .nth(1)
                .map(|d| element_text(&d))
                .and_then(|text| text.split('|').next().map(|s| s.trim().to_string()));
            items.push(ListingItem {
                href: href.to_string(),
                title,
                snippet: None,
                date_text,
                timestamp: None,
            });
        }
        Ok(items)
    }
}
