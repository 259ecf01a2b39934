// src/synthetic.rs
//! Plausible stand-in datasets for when a live source is unavailable.

use chrono::{Datelike, Local, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::model::{
    MedianBaseline, SeaIceDocument, SeaIceMonth, SeaIceYears, TemperatureDocument,
    TemperatureRecord,
};
use crate::normalize::{round2, sea_ice_document, temperature_document, timestamp_now};

pub const TEMPERATURE_FIRST_YEAR: i32 = 1880;
const TEMPERATURE_SLOPE: f64 = 0.007;
const TEMPERATURE_ACCEL_YEAR: i32 = 1970;
const TEMPERATURE_ACCEL_SLOPE: f64 = 0.015;
const TEMPERATURE_OFFSET: f64 = 0.3;
const TEMPERATURE_NOISE_SD: f64 = 0.15;

pub const SEA_ICE_FIRST_YEAR: i32 = 2000;
const SEA_ICE_TREND_PER_YEAR: f64 = -0.05;
const SEA_ICE_NOISE_SD: f64 = 0.3;
const SEA_ICE_MEDIAN_OFFSET: f64 = 1.5;

/// Arctic seasonal cycle in million km², January first: maximum in March,
/// minimum in September.
pub const SEA_ICE_SEASON: [f64; 12] = [
    14.0, 15.0, 15.2, 14.5, 12.5, 11.0, 8.5, 6.0, 4.5, 6.5, 9.5, 12.0,
];

/// Trend value for `year` before noise.
pub fn temperature_trend(year: i32) -> f64 {
    let mut trend = (year - TEMPERATURE_FIRST_YEAR) as f64 * TEMPERATURE_SLOPE;
    if year > TEMPERATURE_ACCEL_YEAR {
        trend += (year - TEMPERATURE_ACCEL_YEAR) as f64 * TEMPERATURE_ACCEL_SLOPE;
    }
    trend - TEMPERATURE_OFFSET
}

/// Generates synthetic temperature and sea-ice documents. Infallible.
pub struct SyntheticGenerator {
    rng: StdRng,
    today: NaiveDate,
}

impl Default for SyntheticGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl SyntheticGenerator {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
            today: Local::now().date_naive(),
        }
    }

    /// Fixed seed and reference date, for reproducible output.
    pub fn with_seed(seed: u64, today: NaiveDate) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            today,
        }
    }

    /// Last month to emit for `year`: the current year stops before the
    /// current month, so January yields none.
    fn last_month(&self, year: i32) -> u32 {
        if year == self.today.year() {
            self.today.month() - 1
        } else {
            12
        }
    }

    /// Box-Muller transform.
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1: f64 = self.rng.gen::<f64>().max(1e-15);
        let u2: f64 = self.rng.gen();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }

    pub fn temperature_records(&mut self) -> Vec<TemperatureRecord> {
        let mut records = Vec::new();
        for year in TEMPERATURE_FIRST_YEAR..=self.today.year() {
            let trend = temperature_trend(year);
            for month in 1..=self.last_month(year) {
                let anomaly = trend + self.gauss(0.0, TEMPERATURE_NOISE_SD);
                records.push(TemperatureRecord {
                    year,
                    month,
                    anomaly: round2(anomaly),
                });
            }
        }
        records
    }

    pub fn sea_ice_years(&mut self) -> SeaIceYears {
        let mut years = SeaIceYears::new();
        for year in SEA_ICE_FIRST_YEAR..=self.today.year() {
            let trend = (year - SEA_ICE_FIRST_YEAR) as f64 * SEA_ICE_TREND_PER_YEAR;
            let months: Vec<SeaIceMonth> = (1..=self.last_month(year))
                .map(|month| {
                    let base = SEA_ICE_SEASON[(month - 1) as usize];
                    let extent = (base + trend + self.gauss(0.0, SEA_ICE_NOISE_SD)).max(0.0);
                    SeaIceMonth {
                        month,
                        extent: round2(extent),
                    }
                })
                .collect();
            if !months.is_empty() {
                years.insert(year, months);
            }
        }
        years
    }

    /// Stand-in for the 1981-2010 median: the seasonal template shifted up.
    pub fn sea_ice_median() -> MedianBaseline {
        SEA_ICE_SEASON
            .iter()
            .enumerate()
            .map(|(i, base)| (i as u32 + 1, round2(base + SEA_ICE_MEDIAN_OFFSET)))
            .collect()
    }

    pub fn temperature_document(&mut self) -> TemperatureDocument {
        temperature_document(self.temperature_records(), true, timestamp_now())
    }

    pub fn sea_ice_document(&mut self) -> SeaIceDocument {
        sea_ice_document(
            self.sea_ice_years(),
            Self::sea_ice_median(),
            true,
            timestamp_now(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::MOCK_TAG;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn trend_is_piecewise_linear() {
        assert!((temperature_trend(1880) - -0.3).abs() < 1e-12);
        assert!((temperature_trend(1970) - 0.33).abs() < 1e-9);
        // 0.007 + 0.015 per year after 1970
        let slope = temperature_trend(2001) - temperature_trend(2000);
        assert!((slope - 0.022).abs() < 1e-9);
    }

    #[test]
    fn temperature_stops_before_current_month() {
        let mut gen = SyntheticGenerator::with_seed(7, date(2024, 5, 16));
        let records = gen.temperature_records();
        assert_eq!(records.first().map(|r| (r.year, r.month)), Some((1880, 1)));
        let current: Vec<u32> = records
            .iter()
            .filter(|r| r.year == 2024)
            .map(|r| r.month)
            .collect();
        assert_eq!(current, vec![1, 2, 3, 4]);
        assert_eq!(records.len(), (2024 - 1880) * 12 + 4);
    }

    #[test]
    fn january_emits_nothing_for_current_year() {
        let mut gen = SyntheticGenerator::with_seed(7, date(2025, 1, 3));
        assert!(!gen.temperature_records().iter().any(|r| r.year == 2025));
        let years = gen.sea_ice_years();
        assert!(!years.contains_key(&2025));
        assert_eq!(years[&2024].len(), 12);
    }

    #[test]
    fn sea_ice_is_non_negative_and_seasonal() {
        let mut gen = SyntheticGenerator::with_seed(42, date(2024, 10, 1));
        let years = gen.sea_ice_years();
        assert_eq!(years.keys().next(), Some(&2000));
        assert_eq!(years[&2024].len(), 9);
        for months in years.values() {
            assert!(months.iter().all(|m| m.extent >= 0.0));
        }
        // 0.3 sd noise cannot close a 10M km² seasonal gap
        let y2000 = &years[&2000];
        assert!(y2000[2].extent > y2000[8].extent);
    }

    #[test]
    fn median_is_template_plus_offset() {
        let median = SyntheticGenerator::sea_ice_median();
        assert_eq!(median.len(), 12);
        assert_eq!(median[&3], 16.7);
        assert_eq!(median[&9], 6.0);
    }

    #[test]
    fn same_seed_same_output() {
        let today = date(2023, 7, 1);
        let a = SyntheticGenerator::with_seed(1, today).temperature_records();
        let b = SyntheticGenerator::with_seed(1, today).temperature_records();
        assert_eq!(a, b);
    }

    #[test]
    fn documents_are_marked_as_mock() {
        let mut gen = SyntheticGenerator::with_seed(3, date(2024, 2, 1));
        let doc = gen.sea_ice_document();
        assert!(doc.source.ends_with(MOCK_TAG));
        assert_eq!(doc.region, "Arctic");
        let doc = gen.temperature_document();
        assert!(doc.source.ends_with(MOCK_TAG));
        assert_eq!(doc.baseline, "1951-1980");
    }
}
