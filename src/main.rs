use anyhow::Result;
use climafetch::{config::CONFIG_ENV, fetch::HttpFetcher, Config, Pipeline};
use std::{env, path::PathBuf, process::ExitCode};
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

const USAGE: &str = "usage: climafetch [CONFIG.yaml]

Fetches CO2, temperature anomaly and Arctic sea-ice extent into the data
directory. Environment: CLIMATE_FETCH_CONFIG, CLIMATE_DATA_DIR,
CLIMATE_TIMEOUT_SECS, RUST_LOG.";

fn main() -> ExitCode {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env_filter).init();

    let arg = env::args_os().nth(1);
    if matches!(arg.as_deref().and_then(|a| a.to_str()), Some("-h" | "--help")) {
        println!("{}", USAGE);
        return ExitCode::SUCCESS;
    }

    match run(arg.map(PathBuf::from)) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(config_arg: Option<PathBuf>) -> Result<bool> {
    // ─── 2) configuration ────────────────────────────────────────────
    let config_path = config_arg.or_else(|| env::var_os(CONFIG_ENV).map(PathBuf::from));
    let config = Config::load(config_path.as_deref())?;
    info!(
        data_dir = %config.data_dir.display(),
        timeout_secs = config.timeout_secs,
        "startup"
    );

    // ─── 3) fetch, parse, write ──────────────────────────────────────
    let mut pipeline = Pipeline::new(config, HttpFetcher)?;
    let summary = pipeline.run();

    println!("{}", summary);
    Ok(summary.all_persisted())
}
