//! Static per-site configuration.
//!
//! Each supported site gets one [`SiteProfile`], constructed once at startup
//! and never mutated. The profile carries everything the shared machinery
//! needs to drive a site — seed listing URLs, monthly archive templates,
//! article-URL validators, pagination behavior — so the per-site adapters
//! only have to implement extraction.

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

use crate::models::DateWindow;

/// How a site's listing pages advance to the next page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaginationStyle {
    /// `?page=N` (or `&page=N` when the seed already has a query).
    QueryPage,
    /// `/page/N/` appended to the path (WordPress-style).
    PathPage,
    /// JSON feed endpoints paged by an `offset` parameter advancing in
    /// `step`-sized chunks.
    QueryOffset { step: usize },
    /// The listing is a single page; never request a second one.
    None,
}

/// Read-only description of one news source.
#[derive(Debug)]
pub struct SiteProfile {
    pub site_id: &'static str,
    pub school: &'static str,
    /// Hostnames discoveries are limited to. An entry containing a `/` is a
    /// host+path prefix and matches by substring instead.
    pub domains: &'static [&'static str],
    /// Seed URLs for listing pages. May carry `{start_year}`-style window
    /// placeholders, substituted per run.
    pub category_pages: &'static [&'static str],
    /// Monthly archive index templates with `{year}`/`{month}` placeholders.
    pub archive_templates: &'static [&'static str],
    /// An article URL must match at least one of these to survive.
    pub validators: Vec<Regex>,
    /// Keywords fed to the fallback search tier.
    pub search_keywords: &'static [&'static str],
    pub pagination: PaginationStyle,
    /// Safety cap on pages fetched from one listing source.
    pub pagination_limit: usize,
    /// Whether listings are confirmed newest-first, enabling the
    /// window-exhausted early exit.
    pub reverse_chronological: bool,
}

impl SiteProfile {
    /// Does this URL belong to one of the profile's configured domains?
    pub fn allows(&self, url: &Url) -> bool {
        let host = match url.host_str() {
            Some(h) => h,
            None => return false,
        };
        self.domains.iter().any(|entry| {
            if entry.contains('/') {
                url.as_str().contains(entry)
            } else {
                host == *entry || host.ends_with(&format!(".{entry}"))
            }
        })
    }

    /// Does this URL match at least one article validator?
    ///
    /// Profiles with no validators accept everything that survived the
    /// domain and navigation filters.
    pub fn validates(&self, url: &str) -> bool {
        self.validators.is_empty() || self.validators.iter().any(|re| re.is_match(url))
    }
}

fn regexes(patterns: &[&str]) -> Vec<Regex> {
    patterns.iter().map(|p| Regex::new(p).unwrap()).collect()
}

/// All registered site profiles. Built once, read-only afterwards.
pub static PROFILES: Lazy<Vec<SiteProfile>> = Lazy::new(|| {
    vec![
        SiteProfile {
            site_id: "nyu",
            school: "New York University",
            domains: &["nyunews.com", "www.nyu.edu/news"],
            category_pages: &["https://nyunews.com/category/news/"],
            archive_templates: &[
                "https://nyunews.com/{year}/{month}/",
                "https://www.nyu.edu/about/news-publications/news/{year}/{month}.html",
                "https://nyunews.com/news/{year}/{month}/",
            ],
            validators: regexes(&[
                r"/news/\d{4}/\d{2}/\d{2}/",
                r"/\d{4}/\d{2}/\d{2}/\w+",
                r"/news-publications/",
            ]),
            search_keywords: &["NYU", "New York student life", "campus events"],
            pagination: PaginationStyle::PathPage,
            pagination_limit: 20,
            reverse_chronological: false,
        },
        SiteProfile {
            site_id: "emory",
            school: "Emory University",
            domains: &["news.emory.edu", "emorywheel.com"],
            category_pages: &["https://www.emorywheel.com/section/news?per_page=20"],
            archive_templates: &["https://news.emory.edu/stories/{year}/{month}/"],
            validators: regexes(&[
                r"news\.emory\.edu/stories/\d{4}/\d{2}/.+/story\.html$",
                r"emorywheel\.com/article/",
            ]),
            search_keywords: &["Emory University", "Atlanta campus", "students"],
            pagination: PaginationStyle::QueryPage,
            pagination_limit: 20,
            reverse_chronological: true,
        },
        SiteProfile {
            site_id: "ucd",
            school: "University of California, Davis",
            domains: &["www.ucdavis.edu", "theaggie.org"],
            category_pages: &["https://www.ucdavis.edu/news/latest"],
            archive_templates: &[],
            validators: regexes(&[r"/news/"]),
            search_keywords: &["UC Davis", "Davis campus", "students"],
            pagination: PaginationStyle::QueryPage,
            pagination_limit: 20,
            reverse_chronological: false,
        },
        SiteProfile {
            site_id: "ubc",
            school: "University of British Columbia",
            domains: &["news.ubc.ca", "ubctoday.ubc.ca", "ubyssey.ca"],
            category_pages: &[
                "https://ubctoday.ubc.ca/updates-news-and-stories",
                "https://news.ubc.ca/category/university-news/",
            ],
            archive_templates: &[],
            validators: regexes(&[r"/\d{4}/\d{2}/", r"ubctoday\.ubc\.ca/"]),
            search_keywords: &["UBC", "Vancouver campus", "students"],
            pagination: PaginationStyle::QueryPage,
            pagination_limit: 30,
            reverse_chronological: true,
        },
        SiteProfile {
            site_id: "usc",
            school: "University of Southern California",
            domains: &["uscannenbergmedia.com", "news.usc.edu"],
            category_pages: &[
                "https://www.uscannenbergmedia.com/pf/api/v3/content/fetch/story-feed-query",
            ],
            archive_templates: &[],
            validators: regexes(&[r"uscannenbergmedia\.com/\d{4}/\d{2}/\d{2}/"]),
            search_keywords: &["USC", "Los Angeles campus", "students"],
            pagination: PaginationStyle::QueryOffset { step: 40 },
            pagination_limit: 30,
            reverse_chronological: true,
        },
        SiteProfile {
            site_id: "edin",
            school: "University of Edinburgh",
            domains: &["www.ed.ac.uk", "thestudentnews.co.uk"],
            category_pages: &[
                "https://www.ed.ac.uk/news/latest?search_api_news_fulltext=&field_news_publication_date%5Bmin%5D={start_year}-{start_month}-{start_day}&field_news_publication_date%5Bmax%5D={end_year}-{end_month}-{end_day}",
                "https://thestudentnews.co.uk/category/news/",
            ],
            archive_templates: &[],
            validators: regexes(&[r"ed\.ac\.uk/news/", r"/\d{4}/\d{2}/\d{2}/"]),
            search_keywords: &["Edinburgh", "Edinburgh campus", "students"],
            pagination: PaginationStyle::None,
            pagination_limit: 1,
            reverse_chronological: false,
        },
    ]
});

/// Look up a profile by its `site_id`.
pub fn lookup(site_id: &str) -> Option<&'static SiteProfile> {
    PROFILES.iter().find(|p| p.site_id == site_id)
}

/// Substitute `{year}` and `{month}` (zero-padded) into an archive template.
pub fn instantiate_archive(template: &str, year: i32, month: u32) -> String {
    template
        .replace("{year}", &year.to_string())
        .replace("{month}", &format!("{month:02}"))
}

/// Substitute window placeholders into a category seed URL.
///
/// Templates without placeholders pass through unchanged.
pub fn instantiate_category(template: &str, window: &DateWindow) -> String {
    use chrono::Datelike;
    template
        .replace("{start_year}", &window.start.year().to_string())
        .replace("{start_month}", &format!("{:02}", window.start.month()))
        .replace("{start_day}", &format!("{:02}", window.start.day()))
        .replace("{end_year}", &window.end.year().to_string())
        .replace("{end_month}", &format!("{:02}", window.end.month()))
        .replace("{end_day}", &format!("{:02}", window.end.day()))
}
