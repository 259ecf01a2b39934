use csv::{ReaderBuilder, Trim};
use tracing::debug;

use super::{cell_f64, cell_i32, TemperatureRow};
use crate::config::Dataset;
use crate::error::PipelineError;

const HEADER_TOKEN: &str = "Year";

const MONTH_COLUMNS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Byte offset of the first line containing the header token.
fn header_offset(text: &str) -> Option<usize> {
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        if line.contains(HEADER_TOKEN) {
            return Some(offset);
        }
        offset += line.len();
    }
    None
}

/// Parse the GISTEMP global means table.
///
/// Everything above the first line mentioning `Year` is title text. Each
/// present, non-missing `Jan`..`Dec` cell becomes one row.
pub fn parse_temperature(text: &str) -> Result<Vec<TemperatureRow>, PipelineError> {
    let start = header_offset(text).ok_or_else(|| {
        PipelineError::parse(Dataset::Temperature, "could not find 'Year' header")
    })?;

    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(text[start..].as_bytes());

    let headers = rdr
        .headers()
        .map_err(|e| PipelineError::parse(Dataset::Temperature, format!("header: {}", e)))?
        .clone();
    let year_idx = headers
        .iter()
        .position(|h| h == HEADER_TOKEN)
        .ok_or_else(|| {
            PipelineError::parse(Dataset::Temperature, "header line has no 'Year' column")
        })?;

    // (month number, column index) for the month columns this file actually has
    let month_idx: Vec<(u32, usize)> = MONTH_COLUMNS
        .iter()
        .enumerate()
        .filter_map(|(i, name)| {
            headers
                .iter()
                .position(|h| h == *name)
                .map(|col| (i as u32 + 1, col))
        })
        .collect();

    let mut rows = Vec::new();
    for (idx, result) in rdr.records().enumerate() {
        let record = result.map_err(|e| {
            PipelineError::parse(Dataset::Temperature, format!("record {}: {}", idx, e))
        })?;
        let Some(year) = cell_i32(record.get(year_idx)) else {
            continue;
        };
        for &(month, col) in &month_idx {
            if let Some(anomaly) = cell_f64(record.get(col)) {
                rows.push(TemperatureRow {
                    year,
                    month,
                    anomaly,
                });
            }
        }
    }

    debug!(
        rows = rows.len(),
        month_columns = month_idx.len(),
        "parsed temperature"
    );
    Ok(rows)
}
