// src/bin/check_urls.rs
//
// Probe every configured source (plus the alternate NSIDC host) with a HEAD
// request and report what comes back. Useful when the fetcher keeps falling
// back to mock data.

use anyhow::Result;
use climafetch::{
    config::CONFIG_ENV,
    fetch::probe::{head_status, NSIDC_MIRROR_URL, PROBE_TIMEOUT},
    Config,
};
use std::{env, path::PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env_filter).init();

    let config_path = env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .or_else(|| env::var_os(CONFIG_ENV).map(PathBuf::from));
    let config = Config::load(config_path.as_deref())?;

    let mut urls: Vec<String> = config.sources.values().map(|s| s.url.clone()).collect();
    if !urls.iter().any(|u| u == NSIDC_MIRROR_URL) {
        urls.push(NSIDC_MIRROR_URL.to_string());
    }

    let mut reachable = 0;
    for url in &urls {
        match head_status(url, PROBE_TIMEOUT) {
            Ok(status) => {
                info!(%url, %status, "probed");
                println!("{}: {}", url, status.as_u16());
                if status.is_success() {
                    reachable += 1;
                }
            }
            Err(e) => {
                warn!(%url, error = %format!("{:#}", e), "probe failed");
                println!("{}: {:#}", url, e);
            }
        }
    }

    info!(reachable, total = urls.len(), "done");
    Ok(())
}
