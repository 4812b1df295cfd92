//! Command-line interface definitions.
//!
//! All options can be given as flags; the search credentials also read from
//! the environment so cron invocations don't have to put keys on the
//! command line.

use chrono::{Duration, NaiveDate};
use clap::Parser;

use crate::error::DiscoveryError;
use crate::models::DateWindow;
use crate::search::SearchConfig;

/// How many trailing days the window covers when no dates are given.
const DEFAULT_WINDOW_DAYS: i64 = 7;

/// Discover university news articles inside a date window.
///
/// # Examples
///
/// ```sh
/// # last seven days of NYU coverage
/// campus_news_scout --site nyu
///
/// # an explicit window, written as a JSON report
/// campus_news_scout --site emory --start-date 2025-01-01 --end-date 2025-01-07 -o ./reports
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Site to discover: nyu, emory, ucd, ubc, usc, or edin
    #[arg(short, long)]
    pub site: String,

    /// First day of the window, YYYY-MM-DD (default: seven days before the end)
    #[arg(long)]
    pub start_date: Option<NaiveDate>,

    /// Last day of the window, YYYY-MM-DD (default: today)
    #[arg(long)]
    pub end_date: Option<NaiveDate>,

    /// Maximum number of candidates to return
    #[arg(short = 'n', long, default_value_t = 120)]
    pub max_results: usize,

    /// Write the JSON report under this directory instead of stdout
    #[arg(short, long)]
    pub output_dir: Option<String>,

    /// Keep out-of-window candidates instead of dropping them once the
    /// quota is met (for sites whose listings carry no dates)
    #[arg(long)]
    pub no_date_filter: bool,

    /// Per-request fetch timeout, in seconds
    #[arg(long, default_value_t = 20)]
    pub fetch_timeout: u64,

    /// Wall-clock budget per discovery tier, in seconds
    #[arg(long, default_value_t = 120)]
    pub tier_budget: u64,

    /// API key for the fallback search tier
    #[arg(long, env = "GOOGLE_API_KEY")]
    pub google_api_key: Option<String>,

    /// Programmable Search Engine id for the fallback search tier
    #[arg(long, env = "CUSTOM_SEARCH_ENGINE_ID")]
    pub search_engine_id: Option<String>,
}

impl Cli {
    /// Resolve the requested window against `today`.
    pub fn window(&self, today: NaiveDate) -> Result<DateWindow, DiscoveryError> {
        let end = self.end_date.unwrap_or(today);
        let start = self
            .start_date
            .unwrap_or(end - Duration::days(DEFAULT_WINDOW_DAYS - 1));
        DateWindow::new(start, end)
    }

    /// Search credentials, when both halves are configured.
    pub fn search_config(&self) -> Option<SearchConfig> {
        match (&self.google_api_key, &self.search_engine_id) {
            (Some(api_key), Some(engine_id)) => Some(SearchConfig {
                api_key: api_key.clone(),
                engine_id: engine_id.clone(),
            }),
            _ => None,
        }
    }
}
