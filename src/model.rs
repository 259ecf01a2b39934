// src/model.rs

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::config::Dataset;

/// One monthly CO2 mole fraction.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Co2Record {
    pub year: i32,
    pub month: u32,
    pub average: f64,
}

/// One monthly global temperature anomaly.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct TemperatureRecord {
    pub year: i32,
    pub month: u32,
    pub anomaly: f64,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct SeaIceMonth {
    pub month: u32,
    pub extent: f64,
}

/// Year → monthly extents. Integer keys serialize as JSON strings ("1979").
pub type SeaIceYears = BTreeMap<i32, Vec<SeaIceMonth>>;

/// Calendar month (1..=12) → reference extent.
pub type MedianBaseline = BTreeMap<u32, f64>;

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Co2Document {
    pub source: String,
    pub location: String,
    pub unit: String,
    pub last_updated: String,
    pub data: Vec<Co2Record>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct TemperatureDocument {
    pub source: String,
    pub baseline: String,
    pub unit: String,
    pub last_updated: String,
    pub data: Vec<TemperatureRecord>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct SeaIceDocument {
    pub source: String,
    pub region: String,
    pub unit: String,
    pub last_updated: String,
    pub median: MedianBaseline,
    pub data: SeaIceYears,
}

/// The unit written to disk, one per dataset.
#[derive(Debug, Serialize, PartialEq, Clone)]
#[serde(untagged)]
pub enum DatasetDocument {
    Co2(Co2Document),
    Temperature(TemperatureDocument),
    SeaIce(SeaIceDocument),
}

impl DatasetDocument {
    pub fn dataset(&self) -> Dataset {
        match self {
            DatasetDocument::Co2(_) => Dataset::Co2,
            DatasetDocument::Temperature(_) => Dataset::Temperature,
            DatasetDocument::SeaIce(_) => Dataset::SeaIce,
        }
    }

    /// Number of monthly values carried in the payload.
    pub fn record_count(&self) -> usize {
        match self {
            DatasetDocument::Co2(d) => d.data.len(),
            DatasetDocument::Temperature(d) => d.data.len(),
            DatasetDocument::SeaIce(d) => d.data.values().map(Vec::len).sum(),
        }
    }

    /// Parse a document previously written for `dataset`.
    pub fn from_json(dataset: Dataset, text: &str) -> serde_json::Result<Self> {
        Ok(match dataset {
            Dataset::Co2 => DatasetDocument::Co2(serde_json::from_str(text)?),
            Dataset::Temperature => DatasetDocument::Temperature(serde_json::from_str(text)?),
            Dataset::SeaIce => DatasetDocument::SeaIce(serde_json::from_str(text)?),
        })
    }
}
