use std::{io, path::PathBuf};

use thiserror::Error;

use crate::config::Dataset;

/// Everything that can go wrong inside one dataset's pipeline. None of these
/// abort the run; the orchestrator turns them into a fallback or a reported
/// failure.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Timeout, connection failure or non-2xx status.
    #[error("{dataset} network error: {message}")]
    Network { dataset: Dataset, message: String },

    /// Missing header or unreadable table structure.
    #[error("{dataset} parse error: {message}")]
    Parse { dataset: Dataset, message: String },

    /// No usable rows survived cleaning.
    #[error("{dataset} validation error: {message}")]
    Validation { dataset: Dataset, message: String },

    #[error("writing {path}: {source}")]
    Storage {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("serializing {dataset} document: {source}")]
    Serialize {
        dataset: Dataset,
        #[source]
        source: serde_json::Error,
    },
}

impl PipelineError {
    pub fn network(dataset: Dataset, message: impl Into<String>) -> Self {
        Self::Network {
            dataset,
            message: message.into(),
        }
    }

    pub fn parse(dataset: Dataset, message: impl Into<String>) -> Self {
        Self::Parse {
            dataset,
            message: message.into(),
        }
    }

    pub fn validation(dataset: Dataset, message: impl Into<String>) -> Self {
        Self::Validation {
            dataset,
            message: message.into(),
        }
    }

    /// Short category name for log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Network { .. } => "network",
            Self::Parse { .. } => "parse",
            Self::Validation { .. } => "validation",
            Self::Storage { .. } => "storage",
            Self::Serialize { .. } => "serialize",
        }
    }
}
