use csv::{ReaderBuilder, Trim};
use tracing::{debug, trace};

use super::{cell_f64, cell_i32, cell_month, Co2Row};
use crate::config::Dataset;
use crate::error::PipelineError;

/// Positional columns of `co2_mm_mlo.csv`; the file has no header row we trust.
const COL_YEAR: usize = 0;
const COL_MONTH: usize = 1;
const COL_AVERAGE: usize = 3;

/// Parse the NOAA Mauna Loa monthly CSV.
///
/// `#` lines are comments. Rows whose average is unparseable or not positive
/// (the `-99.99` sentinel) are dropped, as are rows with a non-integer year or
/// month, which also takes care of the column-name line after the comments.
pub fn parse_co2(text: &str) -> Result<Vec<Co2Row>, PipelineError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .comment(Some(b'#'))
        .flexible(true)
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    let mut dropped = 0usize;
    for (idx, result) in rdr.records().enumerate() {
        let record = result.map_err(|e| {
            PipelineError::parse(Dataset::Co2, format!("record {}: {}", idx, e))
        })?;

        let average = match cell_f64(record.get(COL_AVERAGE)) {
            Some(v) if v > 0.0 => v,
            _ => {
                trace!(idx, "dropping row without a positive average");
                dropped += 1;
                continue;
            }
        };
        match (
            cell_i32(record.get(COL_YEAR)),
            cell_month(record.get(COL_MONTH)),
        ) {
            (Some(year), Some(month)) => rows.push(Co2Row {
                year,
                month,
                average,
            }),
            _ => dropped += 1,
        }
    }

    debug!(kept = rows.len(), dropped, "parsed co2");
    Ok(rows)
}
