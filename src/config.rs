// src/config.rs

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fmt, fs,
    path::{Path, PathBuf},
    time::Duration,
};
use url::Url;

use crate::parse::Dialect;

/// Environment variable naming a YAML config file.
pub const CONFIG_ENV: &str = "CLIMATE_FETCH_CONFIG";
pub const DATA_DIR_ENV: &str = "CLIMATE_DATA_DIR";
pub const TIMEOUT_ENV: &str = "CLIMATE_TIMEOUT_SECS";

const DEFAULT_TIMEOUT_SECS: u64 = 60;

const CO2_URL: &str = "https://gml.noaa.gov/webdata/ccgg/trends/co2/co2_mm_mlo.csv";
const TEMPERATURE_URL: &str = "https://data.giss.nasa.gov/gistemp/tabledata_v4/GLB.Ts+dSST.csv";
const SEA_ICE_URL: &str = "https://masie_web.apps.nsidc.org/pub/DATASETS/NOAA/G02135/north/daily/data/N_seaice_extent_daily_v3.0.csv";

/// The three datasets, in the order they are processed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dataset {
    Co2,
    Temperature,
    SeaIce,
}

impl Dataset {
    pub const ALL: [Dataset; 3] = [Dataset::Co2, Dataset::Temperature, Dataset::SeaIce];

    pub fn as_str(&self) -> &'static str {
        match self {
            Dataset::Co2 => "co2",
            Dataset::Temperature => "temperature",
            Dataset::SeaIce => "sea_ice",
        }
    }

    /// Human-readable name used in the run summary.
    pub fn label(&self) -> &'static str {
        match self {
            Dataset::Co2 => "CO2",
            Dataset::Temperature => "Temperature",
            Dataset::SeaIce => "Sea Ice",
        }
    }

    /// Output file name inside the data directory.
    pub fn file_name(&self) -> &'static str {
        match self {
            Dataset::Co2 => "co2_monthly.json",
            Dataset::Temperature => "temperature_anomaly.json",
            Dataset::SeaIce => "sea_ice_extent.json",
        }
    }

    pub fn dialect(&self) -> Dialect {
        match self {
            Dataset::Co2 => Dialect::Co2,
            Dataset::Temperature => Dialect::Temperature,
            Dataset::SeaIce => Dialect::SeaIce,
        }
    }

    /// CO2 has no synthetic substitute.
    pub fn has_fallback(&self) -> bool {
        !matches!(self, Dataset::Co2)
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where one dataset is downloaded from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    pub url: String,
    /// Some providers serve a misconfigured certificate chain; the bypass is
    /// scoped to this source only.
    #[serde(default = "default_verify_tls")]
    pub verify_tls: bool,
}

fn default_verify_tls() -> bool {
    true
}

impl SourceConfig {
    pub fn new(url: impl Into<String>, verify_tls: bool) -> Self {
        Self {
            url: url.into(),
            verify_tls,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub data_dir: PathBuf,
    pub timeout_secs: u64,
    pub sources: BTreeMap<Dataset, SourceConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            sources: default_sources(),
        }
    }
}

fn default_sources() -> BTreeMap<Dataset, SourceConfig> {
    BTreeMap::from([
        (Dataset::Co2, SourceConfig::new(CO2_URL, false)),
        (Dataset::Temperature, SourceConfig::new(TEMPERATURE_URL, true)),
        (Dataset::SeaIce, SourceConfig::new(SEA_ICE_URL, false)),
    ])
}

impl Config {
    /// Build the run configuration: defaults, then the optional YAML file,
    /// then environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut cfg = match path {
            Some(p) => {
                let text = fs::read_to_string(p)
                    .with_context(|| format!("reading config {}", p.display()))?;
                Self::from_yaml_str(&text)
                    .with_context(|| format!("parsing config {}", p.display()))?
            }
            None => Self::default(),
        };
        cfg.apply_env(|key| std::env::var(key).ok())?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parse YAML; datasets the file does not mention keep their default source.
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let mut cfg: Config = serde_yaml::from_str(text)?;
        for (dataset, source) in default_sources() {
            cfg.sources.entry(dataset).or_insert(source);
        }
        Ok(cfg)
    }

    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup(DATA_DIR_ENV).filter(|d| !d.trim().is_empty()) {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(secs) = lookup(TIMEOUT_ENV) {
            self.timeout_secs = secs
                .trim()
                .parse()
                .with_context(|| format!("{} must be a whole number of seconds", TIMEOUT_ENV))?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.timeout_secs == 0 {
            bail!("timeout_secs must be greater than zero");
        }
        for dataset in Dataset::ALL {
            let source = self
                .sources
                .get(&dataset)
                .with_context(|| format!("no source configured for {}", dataset))?;
            let url = Url::parse(&source.url)
                .with_context(|| format!("invalid URL for {}: {}", dataset, source.url))?;
            if !matches!(url.scheme(), "http" | "https") {
                bail!("unsupported scheme for {}: {}", dataset, url.scheme());
            }
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn source(&self, dataset: Dataset) -> Option<&SourceConfig> {
        self.sources.get(&dataset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn defaults_are_valid_and_scope_tls_bypass() -> Result<()> {
        let cfg = Config::default();
        cfg.validate()?;
        assert_eq!(cfg.timeout(), Duration::from_secs(60));
        assert!(!cfg.source(Dataset::Co2).unwrap().verify_tls);
        assert!(cfg.source(Dataset::Temperature).unwrap().verify_tls);
        assert!(!cfg.source(Dataset::SeaIce).unwrap().verify_tls);
        assert_eq!(cfg.data_dir, PathBuf::from("data"));
        Ok(())
    }

    #[test]
    fn yaml_overrides_merge_with_defaults() -> Result<()> {
        let yaml = r#"
data_dir: /tmp/climate
timeout_secs: 5
sources:
  sea_ice:
    url: https://noaadata.apps.nsidc.org/NOAA/G02135/north/daily/data/N_seaice_extent_daily_v3.0.csv
"#;
        let cfg = Config::from_yaml_str(yaml)?;
        cfg.validate()?;
        assert_eq!(cfg.data_dir, PathBuf::from("/tmp/climate"));
        assert_eq!(cfg.timeout_secs, 5);
        let sea_ice = cfg.source(Dataset::SeaIce).unwrap();
        assert!(sea_ice.url.starts_with("https://noaadata"));
        assert!(sea_ice.verify_tls);
        assert_eq!(cfg.source(Dataset::Co2).unwrap().url, CO2_URL);
        Ok(())
    }

    #[test]
    fn env_overrides_apply() -> Result<()> {
        let mut cfg = Config::default();
        cfg.apply_env(|key| match key {
            DATA_DIR_ENV => Some("out".to_string()),
            TIMEOUT_ENV => Some(" 15 ".to_string()),
            _ => None,
        })?;
        assert_eq!(cfg.data_dir, PathBuf::from("out"));
        assert_eq!(cfg.timeout_secs, 15);

        let err = cfg.apply_env(|key| (key == TIMEOUT_ENV).then(|| "soon".to_string()));
        assert!(err.is_err());
        Ok(())
    }

    #[test]
    fn rejects_bad_urls_and_zero_timeout() {
        let mut cfg = Config::default();
        cfg.sources.insert(Dataset::Co2, SourceConfig::new("not a url", true));
        assert!(cfg.validate().is_err());

        let mut cfg = Config::default();
        cfg.sources.insert(Dataset::Co2, SourceConfig::new("ftp://example.com/co2.csv", true));
        assert!(cfg.validate().is_err());

        let cfg = Config {
            timeout_secs: 0,
            ..Config::default()
        };
        assert!(cfg.validate().is_err());
    }
}
