use anyhow::{Context, Result};
use reqwest::StatusCode;
use std::time::Duration;

use super::build_client;

/// Alternate NSIDC host serving the same daily extent file.
pub const NSIDC_MIRROR_URL: &str =
    "https://noaadata.apps.nsidc.org/NOAA/G02135/north/daily/data/N_seaice_extent_daily_v3.0.csv";

pub const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Issue a HEAD request with certificate verification on, so a broken chain
/// shows up as an error rather than being silently accepted.
pub fn head_status(url: &str, timeout: Duration) -> Result<StatusCode> {
    let client = build_client(true, timeout).context("building probe client")?;
    let resp = client
        .head(url)
        .send()
        .with_context(|| format!("HEAD {}", url))?;
    Ok(resp.status())
}
