//! JSON report output.
//!
//! Serializes a [`DiscoveryResult`] for the downstream verification
//! service. Reports are grouped by site, one file per requested window.

use std::error::Error;

use tokio::fs;
use tracing::{info, instrument};

use crate::models::DiscoveryResult;

/// Write a discovery report under `output_dir`.
///
/// The file lands at `{output_dir}/{site_id}/{start}_{end}.json`; parent
/// directories are created as needed. Returns the path written.
#[instrument(level = "info", skip_all, fields(output_dir = %output_dir))]
pub async fn write_report(
    result: &DiscoveryResult,
    output_dir: &str,
) -> Result<String, Box<dyn Error>> {
    let report = serde_json::to_string_pretty(result)?;

    let site_dir = format!("{}/{}", output_dir.trim_end_matches('/'), result.site_id);
    fs::create_dir_all(&site_dir).await?;

    let path = format!("{}/{}_{}.json", site_dir, result.window.start, result.window.end);
    fs::write(&path, report).await?;
    info!(%path, candidates = result.candidates.len(), "Wrote discovery report");
    Ok(path)
}
