// src/fetch/mod.rs

use reqwest::blocking::Client;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::config::{Dataset, SourceConfig};
use crate::error::PipelineError;

pub mod probe;

const USER_AGENT: &str = concat!("climafetch/", env!("CARGO_PKG_VERSION"));

/// Retrieves the raw CSV body for one dataset. A single attempt; any failure is
/// final for the live path of that dataset.
pub trait Fetcher {
    fn fetch(
        &self,
        dataset: Dataset,
        source: &SourceConfig,
        timeout: Duration,
    ) -> Result<String, PipelineError>;
}

/// Blocking HTTP fetcher backed by reqwest.
#[derive(Debug, Default, Clone, Copy)]
pub struct HttpFetcher;

/// A fresh client per request keeps the certificate bypass local to the
/// source that asked for it.
pub(crate) fn build_client(verify_tls: bool, timeout: Duration) -> reqwest::Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .danger_accept_invalid_certs(!verify_tls)
        .build()
}

impl Fetcher for HttpFetcher {
    #[instrument(level = "debug", skip(self, source), fields(url = %source.url))]
    fn fetch(
        &self,
        dataset: Dataset,
        source: &SourceConfig,
        timeout: Duration,
    ) -> Result<String, PipelineError> {
        let client = build_client(source.verify_tls, timeout)
            .map_err(|e| PipelineError::network(dataset, format!("building client: {}", e)))?;

        debug!(verify_tls = source.verify_tls, ?timeout, "GET");
        let resp = client
            .get(&source.url)
            .send()
            .map_err(|e| PipelineError::network(dataset, describe(&e, &source.url)))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(PipelineError::network(
                dataset,
                format!("HTTP {} from {}", status, source.url),
            ));
        }

        let body = resp
            .text()
            .map_err(|e| PipelineError::network(dataset, format!("reading body: {}", e)))?;
        debug!(bytes = body.len(), "received");
        Ok(body)
    }
}

fn describe(err: &reqwest::Error, url: &str) -> String {
    if err.is_timeout() {
        format!("GET {} timed out", url)
    } else if err.is_connect() {
        format!("GET {} could not connect: {}", url, err)
    } else {
        format!("GET {} failed: {}", url, err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clients_build_with_and_without_verification() {
        assert!(build_client(true, Duration::from_secs(1)).is_ok());
        assert!(build_client(false, Duration::from_secs(1)).is_ok());
    }

    #[test]
    fn unreachable_host_is_a_network_error() {
        // Port 9 on loopback is the discard service and is normally closed.
        let source = SourceConfig::new("http://127.0.0.1:9/co2.csv", true);
        let err = HttpFetcher
            .fetch(Dataset::Co2, &source, Duration::from_secs(2))
            .unwrap_err();
        assert_eq!(err.kind(), "network");
    }
}
