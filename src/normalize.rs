// src/normalize.rs

use chrono::{DateTime, SecondsFormat, Utc};

use crate::model::{
    Co2Document, Co2Record, MedianBaseline, SeaIceDocument, SeaIceYears, TemperatureDocument,
    TemperatureRecord,
};
use crate::parse::{Co2Row, TemperatureRow};

pub const MOCK_TAG: &str = "[MOCK DATA]";

pub const CO2_SOURCE: &str = "NOAA Global Monitoring Laboratory";
pub const CO2_LOCATION: &str = "Mauna Loa Observatory, Hawaii";
pub const CO2_UNIT: &str = "ppm";

pub const TEMPERATURE_SOURCE: &str = "NASA Goddard Institute for Space Studies";
pub const TEMPERATURE_BASELINE: &str = "1951-1980";
pub const TEMPERATURE_UNIT: &str = "°C";

pub const SEA_ICE_SOURCE: &str = "National Snow and Ice Data Center (NSIDC)";
pub const SEA_ICE_REGION: &str = "Arctic";
pub const SEA_ICE_UNIT: &str = "million km²";

/// Round to two decimals, ties away from zero.
pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// ISO-8601 UTC with microseconds and a `Z` suffix.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn timestamp_now() -> String {
    format_timestamp(Utc::now())
}

/// Provenance string, tagged when the payload is synthetic.
pub fn provenance(source: &str, synthetic: bool) -> String {
    if synthetic {
        format!("{} {}", source, MOCK_TAG)
    } else {
        source.to_string()
    }
}

/// Sort by (year, month) and keep the first record of any duplicate pair.
fn sort_dedup<T>(records: &mut Vec<T>, key: impl Fn(&T) -> (i32, u32)) {
    records.sort_by_key(|r| key(r));
    records.dedup_by(|b, a| key(a) == key(b));
}

pub fn co2_records(rows: Vec<Co2Row>) -> Vec<Co2Record> {
    let mut records: Vec<Co2Record> = rows
        .into_iter()
        .map(|r| Co2Record {
            year: r.year,
            month: r.month,
            average: round2(r.average),
        })
        .collect();
    sort_dedup(&mut records, |r| (r.year, r.month));
    records
}

pub fn temperature_records(rows: Vec<TemperatureRow>) -> Vec<TemperatureRecord> {
    let mut records: Vec<TemperatureRecord> = rows
        .into_iter()
        .map(|r| TemperatureRecord {
            year: r.year,
            month: r.month,
            anomaly: round2(r.anomaly),
        })
        .collect();
    sort_dedup(&mut records, |r| (r.year, r.month));
    records
}

pub fn co2_document(data: Vec<Co2Record>, last_updated: String) -> Co2Document {
    Co2Document {
        source: CO2_SOURCE.to_string(),
        location: CO2_LOCATION.to_string(),
        unit: CO2_UNIT.to_string(),
        last_updated,
        data,
    }
}

pub fn temperature_document(
    data: Vec<TemperatureRecord>,
    synthetic: bool,
    last_updated: String,
) -> TemperatureDocument {
    TemperatureDocument {
        source: provenance(TEMPERATURE_SOURCE, synthetic),
        baseline: TEMPERATURE_BASELINE.to_string(),
        unit: TEMPERATURE_UNIT.to_string(),
        last_updated,
        data,
    }
}

pub fn sea_ice_document(
    data: SeaIceYears,
    median: MedianBaseline,
    synthetic: bool,
    last_updated: String,
) -> SeaIceDocument {
    SeaIceDocument {
        source: provenance(SEA_ICE_SOURCE, synthetic),
        region: SEA_ICE_REGION.to_string(),
        unit: SEA_ICE_UNIT.to_string(),
        last_updated,
        median,
        data,
    }
}
