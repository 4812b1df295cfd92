//! Date resolution for discovered articles.
//!
//! News sites expose publication dates in wildly different shapes: an ISO
//! timestamp in a `<time datetime="...">` attribute, a `/2025/03/04/` segment
//! in the article URL, a human-readable dateline ("Tuesday, March 4, 2025"),
//! or a relative phrase ("3 days ago"). [`resolve`] tries these in a fixed
//! priority order and the first rule that produces a valid calendar date
//! wins — rules are never mixed.
//!
//! Impossible dates (month 13, February 30th) fail closed to `None`; nothing
//! is ever clamped into range.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;

/// `/news/YYYY/MM/DD/` — the most common shape on student-paper URLs.
static URL_NEWS_YMD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/news/(\d{4})/(\d{1,2})/(\d{1,2})/").unwrap());

/// `..._DD-MM-YYYY/story.html` — slug-embedded dates on monthly story indexes.
static URL_SLUG_DMY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"_(\d{2})-(\d{2})-(\d{4})/story\.html$").unwrap());

/// Generic `/YYYY/MM/DD/` anywhere in the path.
static URL_YMD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/(\d{4})/(\d{1,2})/(\d{1,2})/").unwrap());

static ORDINAL_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\d{1,2})(st|nd|rd|th)").unwrap());

static MONTH_ABBREV_DOT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Sept|Oct|Nov|Dec)\.").unwrap()
});

static NONSTANDARD_SEPT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bSept\b").unwrap());

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

static RELATIVE_AGO: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(\d+)\s+(minute|hour|day|week)s?\s+ago$").unwrap());

/// Resolve a candidate's publication date.
///
/// Priority order:
/// 1. a structured timestamp (ISO 8601 datetime or bare date attribute)
/// 2. a year/month/day pattern embedded in the URL path
/// 3. free-text parsing of a visible date string
/// 4. relative forms ("3 days ago"), resolved against `as_of`
///
/// Returns `None` when no rule matches or the matched digits do not form a
/// real calendar date.
pub fn resolve(
    url: &str,
    visible_text: Option<&str>,
    timestamp: Option<&str>,
    as_of: NaiveDate,
) -> Option<NaiveDate> {
    if let Some(date) = timestamp.and_then(from_timestamp) {
        return Some(date);
    }
    if let Some(date) = from_url(url) {
        return Some(date);
    }
    if let Some(text) = visible_text {
        if let Some(date) = from_text(text) {
            return Some(date);
        }
        if let Some(date) = from_relative(text, as_of) {
            return Some(date);
        }
    }
    None
}

/// Parse a structured ISO timestamp such as `2025-03-04T16:20:00Z`,
/// `2025-03-04T16:20:00-05:00`, or a bare `2025-03-04`.
pub fn from_timestamp(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt.date());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

/// Extract a date embedded in a URL path.
pub fn from_url(url: &str) -> Option<NaiveDate> {
    if let Some(caps) = URL_NEWS_YMD.captures(url) {
        return ymd(&caps[1], &caps[2], &caps[3]);
    }
    if let Some(caps) = URL_SLUG_DMY.captures(url) {
        // slug order is day-month-year
        return ymd(&caps[3], &caps[2], &caps[1]);
    }
    if let Some(caps) = URL_YMD.captures(url) {
        return ymd(&caps[1], &caps[2], &caps[3]);
    }
    None
}

/// Parse a human-readable date string into a calendar date.
///
/// Accepted shapes, tried most to least specific:
/// "Tuesday, March 4, 2025", "March 4, 2025", "Mar. 4, 2025",
/// "March 4th, 2025" (ordinal suffixes handled), "4 September, 2025",
/// and an already-normalized "2025-03-04".
pub fn from_text(raw: &str) -> Option<NaiveDate> {
    if raw.trim().is_empty() {
        return None;
    }
    let s = WHITESPACE.replace_all(raw.trim(), " ").into_owned();
    let s = ORDINAL_SUFFIX.replace_all(&s, "$1").into_owned();
    let s = MONTH_ABBREV_DOT.replace_all(&s, "$1").into_owned();
    let s = NONSTANDARD_SEPT.replace_all(&s, "Sep").into_owned();

    const FORMATS: &[&str] = &[
        "%A, %B %d, %Y", // Tuesday, March 4, 2025
        "%A, %b %d, %Y", // Tuesday, Mar 4, 2025
        "%B %d, %Y",     // March 4, 2025
        "%b %d, %Y",     // Mar 4, 2025
        "%d %B, %Y",     // 4 September, 2025
        "%d %B %Y",      // 4 September 2025
        "%d %b %Y",      // 4 Sep 2025
        "%Y-%m-%d",
    ];
    for fmt in FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(&s, fmt) {
            return Some(date);
        }
    }

    // Datelines with leading text ("Updated on ..., March 4, 2025"):
    // retry on the segment after the first comma.
    if let Some((_, tail)) = s.split_once(',') {
        let tail = tail.trim();
        for fmt in ["%B %d, %Y", "%b %d, %Y"] {
            if let Ok(date) = NaiveDate::parse_from_str(tail, fmt) {
                return Some(date);
            }
        }
    }
    None
}

/// Resolve a relative phrase against a caller-supplied "as-of" date.
pub fn from_relative(raw: &str, as_of: NaiveDate) -> Option<NaiveDate> {
    let s = WHITESPACE.replace_all(raw.trim(), " ").to_lowercase();
    match s.as_str() {
        "today" | "just now" => return Some(as_of),
        "yesterday" => return Some(as_of - Duration::days(1)),
        _ => {}
    }
    let caps = RELATIVE_AGO.captures(&s)?;
    let n: i64 = caps[1].parse().ok()?;
    match &caps[2] {
        "minute" | "hour" => Some(as_of),
        "day" => Some(as_of - Duration::days(n)),
        "week" => Some(as_of - Duration::days(7 * n)),
        _ => None,
    }
}

fn ymd(year: &str, month: &str, day: &str) -> Option<NaiveDate> {
    let y: i32 = year.parse().ok()?;
    let m: u32 = month.parse().ok()?;
    let d: u32 = day.parse().ok()?;
    NaiveDate::from_ymd_opt(y, m, d)
}
