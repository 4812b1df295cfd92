//! # Campus News Scout
//!
//! Discovers candidate news articles published by university news sites and
//! student papers inside a caller-specified date window, and resolves them
//! into one deduplicated, provenance-tagged, priority-ordered list for
//! downstream verification.
//!
//! ## Architecture
//!
//! Discovery runs as tiers in fixed priority order:
//! 1. **Archive walk**: monthly archive indexes for sites that bucket news
//!    by calendar period
//! 2. **Category scan**: paginated listing pages, driven by a typed
//!    pagination state machine with early-exit heuristics
//! 3. **Fallback search**: an external search index, last resort only
//!
//! Tier outputs are merged by canonical URL, window-filtered, and ranked
//! newest-first. The report is printed as JSON or written under
//! `--output-dir`.
//!
//! ## Usage
//!
//! ```sh
//! campus_news_scout --site nyu --start-date 2025-01-01 --end-date 2025-01-07
//! ```

use std::process::ExitCode;
use std::time::Duration;

use chrono::Local;
use clap::Parser;
use tracing::{debug, error, info};
use tracing_subscriber::{fmt as tfmt, EnvFilter};

mod archive;
mod cli;
mod dates;
mod error;
mod fetch;
mod merge;
mod models;
mod orchestrator;
mod outputs;
mod pagination;
mod profiles;
mod scrapers;
mod search;

use cli::Cli;
use fetch::{HttpFetcher, Metered};
use orchestrator::DiscoveryRequest;

#[tokio::main]
async fn main() -> ExitCode {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("campus_news_scout starting up");

    // Parse CLI
    let args = Cli::parse();
    debug!(?args.site, ?args.start_date, ?args.end_date, "Parsed CLI arguments");

    let today = Local::now().date_naive();
    let window = match args.window(today) {
        Ok(window) => window,
        Err(e) => {
            error!(error = %e, "Invalid date window");
            return ExitCode::FAILURE;
        }
    };

    // ---- Build the fetch stack ----
    let fetcher = match HttpFetcher::new(Duration::from_secs(args.fetch_timeout)) {
        Ok(fetcher) => Metered::new(fetcher),
        Err(e) => {
            error!(error = %e, "Failed to build HTTP client");
            return ExitCode::FAILURE;
        }
    };
    let search_config = args.search_config();
    if search_config.is_none() {
        info!("Search credentials not configured; fallback search tier disabled");
    }

    // ---- Run discovery ----
    let request = DiscoveryRequest {
        site_id: args.site.clone(),
        window,
        quota: args.max_results,
        as_of: today,
        no_date_filter: args.no_date_filter,
        tier_budget: Duration::from_secs(args.tier_budget),
    };

    let result = match orchestrator::discover(&request, &fetcher, search_config.as_ref()).await {
        Ok(result) => result,
        Err(e) => {
            error!(error = %e, "Discovery failed");
            return ExitCode::FAILURE;
        }
    };

    info!(
        site = %result.site_id,
        candidates = result.candidates.len(),
        archive = result.counts.archive_scan,
        category = result.counts.category_scan,
        search = result.counts.fallback_search,
        fetched = fetcher.ok_count(),
        fetch_failures = fetcher.failed_count(),
        "Discovery complete"
    );

    // ---- Report output ----
    if let Some(ref output_dir) = args.output_dir {
        if let Err(e) = outputs::json::write_report(&result, output_dir).await {
            error!(%output_dir, error = %e, "Failed to write report");
            return ExitCode::FAILURE;
        }
    } else {
        match serde_json::to_string_pretty(&result) {
            Ok(report) => println!("{report}"),
            Err(e) => {
                error!(error = %e, "Failed to serialize report");
                return ExitCode::FAILURE;
            }
        }
    }

    let elapsed = start_time.elapsed();
    info!(?elapsed, secs = elapsed.as_secs(), "Execution complete");

    // Empty result with not one successful fetch means nothing was
    // reachable: total failure for scripting callers.
    if result.candidates.is_empty() && fetcher.ok_count() == 0 {
        error!("No candidates found and no fetch succeeded");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
