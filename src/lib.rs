pub mod aggregate;
pub mod config;
pub mod error;
pub mod fetch;
pub mod model;
pub mod normalize;
pub mod parse;
pub mod pipeline;
pub mod store;
pub mod synthetic;

pub use config::{Config, Dataset, SourceConfig};
pub use error::PipelineError;
pub use pipeline::{Pipeline, RunSummary};
