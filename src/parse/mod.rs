// src/parse/mod.rs
//! CSV dialects of the three upstream providers.

use crate::config::Dataset;
use crate::error::PipelineError;

mod co2;
mod sea_ice;
mod temperature;

pub use co2::parse_co2;
pub use sea_ice::parse_sea_ice;
pub use temperature::parse_temperature;

/// One cleaned row of the NOAA Mauna Loa monthly file.
#[derive(Debug, Clone, PartialEq)]
pub struct Co2Row {
    pub year: i32,
    pub month: u32,
    pub average: f64,
}

/// One non-missing month cell of the GISTEMP table.
#[derive(Debug, Clone, PartialEq)]
pub struct TemperatureRow {
    pub year: i32,
    pub month: u32,
    pub anomaly: f64,
}

/// One daily sample of the NSIDC extent file.
#[derive(Debug, Clone, PartialEq)]
pub struct SeaIceRow {
    pub year: i32,
    pub month: u32,
    pub extent: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dialect {
    Co2,
    Temperature,
    SeaIce,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParsedRows {
    Co2(Vec<Co2Row>),
    Temperature(Vec<TemperatureRow>),
    SeaIce(Vec<SeaIceRow>),
}

impl ParsedRows {
    pub fn len(&self) -> usize {
        match self {
            ParsedRows::Co2(r) => r.len(),
            ParsedRows::Temperature(r) => r.len(),
            ParsedRows::SeaIce(r) => r.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Dialect {
    pub fn dataset(&self) -> Dataset {
        match self {
            Dialect::Co2 => Dataset::Co2,
            Dialect::Temperature => Dataset::Temperature,
            Dialect::SeaIce => Dataset::SeaIce,
        }
    }

    /// Parse raw response text. Zero surviving rows is a validation error.
    pub fn parse(&self, text: &str) -> Result<ParsedRows, PipelineError> {
        let rows = match self {
            Dialect::Co2 => ParsedRows::Co2(parse_co2(text)?),
            Dialect::Temperature => ParsedRows::Temperature(parse_temperature(text)?),
            Dialect::SeaIce => ParsedRows::SeaIce(parse_sea_ice(text)?),
        };
        if rows.is_empty() {
            return Err(PipelineError::validation(
                self.dataset(),
                "no usable rows after cleaning",
            ));
        }
        Ok(rows)
    }
}

/// Absent-value markers: empty cells and runs of asterisks ("***", "****").
pub(crate) fn is_missing(cell: &str) -> bool {
    let cell = cell.trim();
    cell.is_empty() || cell.chars().all(|c| c == '*')
}

pub(crate) fn cell_i32(cell: Option<&str>) -> Option<i32> {
    cell.map(str::trim)
        .filter(|c| !is_missing(c))
        .and_then(|c| c.parse().ok())
}

pub(crate) fn cell_month(cell: Option<&str>) -> Option<u32> {
    cell.map(str::trim)
        .filter(|c| !is_missing(c))
        .and_then(|c| c.parse().ok())
        .filter(|m| (1..=12).contains(m))
}

/// Finite float or absent; coercion failure never errors.
pub(crate) fn cell_f64(cell: Option<&str>) -> Option<f64> {
    cell.map(str::trim)
        .filter(|c| !is_missing(c))
        .and_then(|c| c.parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_markers() {
        assert!(is_missing("***"));
        assert!(is_missing(" **** "));
        assert!(is_missing(""));
        assert!(!is_missing("-.12"));
    }

    #[test]
    fn cell_coercion_yields_absence() {
        assert_eq!(cell_i32(Some(" 1979 ")), Some(1979));
        assert_eq!(cell_i32(Some("YYYY")), None);
        assert_eq!(cell_month(Some("13")), None);
        assert_eq!(cell_month(Some("07")), Some(7));
        assert_eq!(cell_f64(Some("10^6 sq km")), None);
        assert_eq!(cell_f64(Some("NaN")), None);
        assert_eq!(cell_f64(Some("-.12")), Some(-0.12));
        assert_eq!(cell_f64(None), None);
    }

    #[test]
    fn empty_input_is_a_validation_error_for_every_dialect() {
        for dialect in [Dialect::Co2, Dialect::SeaIce] {
            let err = dialect.parse("").unwrap_err();
            assert_eq!(err.kind(), "validation", "{:?}", dialect);
        }
        // No "Year" line at all: a structural problem, not an empty table.
        assert_eq!(Dialect::Temperature.parse("").unwrap_err().kind(), "parse");
    }
}
