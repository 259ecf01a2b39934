// src/pipeline.rs

use anyhow::Result;
use std::{fmt, path::PathBuf};
use tracing::{debug, error, info, info_span, warn};

use crate::aggregate::{median_baseline, monthly_means, BASELINE_YEARS};
use crate::config::{Config, Dataset};
use crate::error::PipelineError;
use crate::fetch::Fetcher;
use crate::model::DatasetDocument;
use crate::normalize::{
    co2_document, co2_records, sea_ice_document, temperature_document, temperature_records,
    timestamp_now,
};
use crate::parse::ParsedRows;
use crate::store::JsonStore;
use crate::synthetic::SyntheticGenerator;

/// Where a dataset's pipeline is, or where it stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    Fetching,
    Parsing,
    Normalizing,
    Synthesizing,
    Persisted,
    Failed,
}

#[derive(Debug)]
pub struct DatasetOutcome {
    pub dataset: Dataset,
    pub stage: Stage,
    /// The persisted document came from the synthetic generator.
    pub synthetic: bool,
    pub path: Option<PathBuf>,
    /// Last stage entered before something went wrong: the live stage that
    /// triggered a fallback, or the stage a failed write followed.
    pub failed_at: Option<Stage>,
    /// Why the live path (or the write) failed, if it did.
    pub error: Option<String>,
}

impl DatasetOutcome {
    pub fn succeeded(&self) -> bool {
        self.stage == Stage::Persisted
    }
}

#[derive(Debug, Default)]
pub struct RunSummary {
    pub outcomes: Vec<DatasetOutcome>,
}

impl RunSummary {
    pub fn success_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.succeeded()).count()
    }

    pub fn all_persisted(&self) -> bool {
        self.outcomes.iter().all(DatasetOutcome::succeeded)
    }

    pub fn outcome(&self, dataset: Dataset) -> Option<&DatasetOutcome> {
        self.outcomes.iter().find(|o| o.dataset == dataset)
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Summary:")?;
        for o in &self.outcomes {
            let status = match (o.succeeded(), o.synthetic) {
                (true, false) => "✓ Success",
                (true, true) => "✓ Success (mock data)",
                (false, _) => "✗ Failed",
            };
            writeln!(f, "   {}: {}", o.dataset.label(), status)?;
        }
        write!(
            f,
            "   Total: {}/{} datasets updated",
            self.success_count(),
            self.outcomes.len()
        )
    }
}

/// Convert cleaned rows into the document shape for their dataset.
fn normalize(rows: ParsedRows, last_updated: String) -> DatasetDocument {
    match rows {
        ParsedRows::Co2(rows) => {
            DatasetDocument::Co2(co2_document(co2_records(rows), last_updated))
        }
        ParsedRows::Temperature(rows) => DatasetDocument::Temperature(temperature_document(
            temperature_records(rows),
            false,
            last_updated,
        )),
        ParsedRows::SeaIce(rows) => {
            let years = monthly_means(&rows);
            let median = median_baseline(&years, BASELINE_YEARS);
            DatasetDocument::SeaIce(sea_ice_document(years, median, false, last_updated))
        }
    }
}

/// Runs the three dataset pipelines one after another. A failure in one never
/// affects the others.
pub struct Pipeline<F: Fetcher> {
    config: Config,
    fetcher: F,
    store: JsonStore,
    generator: SyntheticGenerator,
}

impl<F: Fetcher> Pipeline<F> {
    /// Errors only if the data directory cannot be created.
    pub fn new(config: Config, fetcher: F) -> Result<Self> {
        let store = JsonStore::new(&config.data_dir)?;
        Ok(Self {
            config,
            fetcher,
            store,
            generator: SyntheticGenerator::new(),
        })
    }

    pub fn with_generator(mut self, generator: SyntheticGenerator) -> Self {
        self.generator = generator;
        self
    }

    pub fn store(&self) -> &JsonStore {
        &self.store
    }

    pub fn run(&mut self) -> RunSummary {
        let outcomes = Dataset::ALL
            .into_iter()
            .map(|dataset| self.run_dataset(dataset))
            .collect();
        RunSummary { outcomes }
    }

    pub fn run_dataset(&mut self, dataset: Dataset) -> DatasetOutcome {
        let span = info_span!("dataset", dataset = %dataset);
        let _enter = span.enter();

        let mut stage = Stage::Fetching;
        let (doc, synthetic, failed_at, error) = match self.run_live(dataset, &mut stage) {
            Ok(doc) => (doc, false, None, None),
            Err(err) => {
                let failed_at = stage;
                stage = Stage::Synthesizing;
                match self.synthesize(dataset) {
                    Some(doc) => {
                        warn!(
                            ?failed_at,
                            kind = err.kind(),
                            error = %err,
                            "live data unavailable; using mock data"
                        );
                        (doc, true, Some(failed_at), Some(err.to_string()))
                    }
                    None => {
                        error!(
                            ?failed_at,
                            kind = err.kind(),
                            error = %err,
                            "no fallback; dataset not updated"
                        );
                        return DatasetOutcome {
                            dataset,
                            stage: Stage::Failed,
                            synthetic: false,
                            path: None,
                            failed_at: Some(failed_at),
                            error: Some(err.to_string()),
                        };
                    }
                }
            }
        };

        match self.store.write(dataset, &doc) {
            Ok(path) => {
                info!(
                    records = doc.record_count(),
                    synthetic,
                    path = %path.display(),
                    "saved"
                );
                DatasetOutcome {
                    dataset,
                    stage: Stage::Persisted,
                    synthetic,
                    path: Some(path),
                    failed_at,
                    error,
                }
            }
            Err(err) => {
                error!(after = ?stage, error = %err, "write failed");
                DatasetOutcome {
                    dataset,
                    stage: Stage::Failed,
                    synthetic,
                    path: None,
                    failed_at: Some(stage),
                    error: Some(err.to_string()),
                }
            }
        }
    }

    /// Fetch → parse → normalize. `stage` tracks how far it got.
    fn run_live(
        &self,
        dataset: Dataset,
        stage: &mut Stage,
    ) -> Result<DatasetDocument, PipelineError> {
        *stage = Stage::Fetching;
        let source = self
            .config
            .source(dataset)
            .ok_or_else(|| PipelineError::network(dataset, "no source configured"))?;
        info!(url = %source.url, "fetching");
        let body = self.fetcher.fetch(dataset, source, self.config.timeout())?;

        *stage = Stage::Parsing;
        let rows = dataset.dialect().parse(&body)?;

        *stage = Stage::Normalizing;
        Ok(normalize(rows, timestamp_now()))
    }

    /// Synthetic substitute, or `None` for datasets without one.
    fn synthesize(&mut self, dataset: Dataset) -> Option<DatasetDocument> {
        if !dataset.has_fallback() {
            return None;
        }
        debug!("generating mock data");
        Some(match dataset {
            Dataset::Temperature => {
                DatasetDocument::Temperature(self.generator.temperature_document())
            }
            Dataset::SeaIce => DatasetDocument::SeaIce(self.generator.sea_ice_document()),
            Dataset::Co2 => return None,
        })
    }
}
