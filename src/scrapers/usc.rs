//! USC adapter: Annenberg Media's Arc XP story feed.
//!
//! The only JSON-API adapter. The site's "load more" button calls a
//! `story-feed-query` endpoint paged by an `offset` query parameter; each
//! element carries its path under `websites.uscannenberg.website_url` and an
//! ISO `display_date`. Non-story elements (galleries, videos) are ignored.

use serde::Deserialize;
use url::Url;

use super::{ListingItem, SiteAdapter};
use crate::error::DiscoveryError;
use crate::profiles::{self, PaginationStyle, SiteProfile};

#[derive(Debug, Deserialize)]
struct Feed {
    #[serde(default)]
    content_elements: Vec<FeedElement>,
}

#[derive(Debug, Deserialize)]
struct FeedElement {
    #[serde(rename = "type")]
    kind: Option<String>,
    display_date: Option<String>,
    headlines: Option<Headlines>,
    description: Option<Description>,
    websites: Option<Websites>,
}

#[derive(Debug, Deserialize)]
struct Headlines {
    basic: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Description {
    basic: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Websites {
    uscannenberg: Option<WebsiteRef>,
}

#[derive(Debug, Deserialize)]
struct WebsiteRef {
    website_url: Option<String>,
}

pub struct Usc;

impl SiteAdapter for Usc {
    fn profile(&self) -> &'static SiteProfile {
        profiles::lookup("usc").unwrap()
    }

    fn extract_listing(&self, body: &str, _base: &Url) -> Result<Vec<ListingItem>, DiscoveryError> {
        let feed: Feed = serde_json::from_str(body)
            .map_err(|e| DiscoveryError::Parse(format!("story feed JSON: {e}")))?;

        let mut items = Vec::new();
        for el in feed.content_elements {
            if el.kind.as_deref() != Some("story") {
                continue;
            }
            let path = match el.websites.and_then(|w| w.uscannenberg).and_then(|s| s.website_url) {
                Some(p) => p,
                None => continue,
            };
            let title = el
                .headlines
                .and_then(|h| h.basic)
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| "Untitled".to_string());
            let snippet = el.description.and_then(|d| d.basic);
            items.push(ListingItem {
                href: format!("https://www.uscannenbergmedia.com{path}"),
                title,
                snippet,
                date_text: None,
                timestamp: el.display_date,
            });
        }
        Ok(items)
    }

    fn page_url(&self, seed: &str, page: usize) -> Option<String> {
        let step = match self.profile().pagination {
            PaginationStyle::QueryOffset { step } => step,
            _ => return None,
        };
        let query = format!(
            r#"{{"feature":"results-list","offset":{},"size":{}}}"#,
            page * step,
            step
        );
        Some(format!(
            "{seed}?query={}&_website=uscannenberg&d=101",
            urlencoding::encode(&query)
        ))
    }
}
