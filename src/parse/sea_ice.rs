use csv::{ReaderBuilder, Trim};
use tracing::debug;

use super::{cell_f64, cell_i32, cell_month, SeaIceRow};
use crate::config::Dataset;
use crate::error::PipelineError;

fn column(headers: &csv::StringRecord, name: &str) -> Result<usize, PipelineError> {
    headers
        .iter()
        .position(|h| h.trim() == name)
        .ok_or_else(|| PipelineError::parse(Dataset::SeaIce, format!("missing '{}' column", name)))
}

/// Parse the NSIDC daily extent CSV (`Year, Month, Day, Extent, Missing, Source Data`).
///
/// Header names are trimmed before lookup. Rows whose Year, Month or Extent is
/// absent or fails coercion are dropped; that includes the units line NSIDC
/// ships directly under the header.
pub fn parse_sea_ice(text: &str) -> Result<Vec<SeaIceRow>, PipelineError> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }

    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let headers = rdr
        .headers()
        .map_err(|e| PipelineError::parse(Dataset::SeaIce, format!("header: {}", e)))?
        .clone();
    let year_idx = column(&headers, "Year")?;
    let month_idx = column(&headers, "Month")?;
    let extent_idx = column(&headers, "Extent")?;

    let mut rows = Vec::new();
    let mut dropped = 0usize;
    for (idx, result) in rdr.records().enumerate() {
        let record = result.map_err(|e| {
            PipelineError::parse(Dataset::SeaIce, format!("record {}: {}", idx, e))
        })?;
        match (
            cell_i32(record.get(year_idx)),
            cell_month(record.get(month_idx)),
            cell_f64(record.get(extent_idx)),
        ) {
            (Some(year), Some(month), Some(extent)) => rows.push(SeaIceRow {
                year,
                month,
                extent,
            }),
            _ => dropped += 1,
        }
    }

    debug!(kept = rows.len(), dropped, "parsed sea ice");
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    const SAMPLE: &str = "\
 Year, Month, Day,     Extent,    Missing, Source Data
 YYYY,    MM,  DD, 10^6 sq km, 10^6 sq km, Source data product web sites: http://nsidc.org/data/nsidc-0051.html
 1978,    10,  26,     10.231,      0.000, ['ftp://sidads.colorado.edu/pub/DATASETS/nsidc0051_gsfc_nasateam_seaice/final-gsfc/north/daily/1978/nt_19781026_n07_v1.1_n.bin']
 2020,     3,   1,     14.700,      0.000, ['x']
 2020,     3,   2,     15.100,      0.000, ['x']
 2020,     4,   1,           ,      0.000, ['x']
";

    #[test]
    fn trims_headers_and_drops_units_line() -> Result<()> {
        let rows = parse_sea_ice(SAMPLE)?;
        assert_eq!(rows.len(), 3);
        assert_eq!(
            rows[0],
            SeaIceRow {
                year: 1978,
                month: 10,
                extent: 10.231
            }
        );
        assert!(rows.iter().all(|r| !(r.year == 2020 && r.month == 4)));
        Ok(())
    }

    #[test]
    fn missing_extent_column_is_a_parse_error() {
        let err = parse_sea_ice("Year,Month,Day\n2020,1,1\n").unwrap_err();
        assert_eq!(err.kind(), "parse");
    }

    #[test]
    fn empty_body_yields_no_rows() -> Result<()> {
        assert!(parse_sea_ice("  \n")?.is_empty());
        Ok(())
    }
}
