// src/aggregate.rs
//! Daily → monthly sea-ice extents and the per-month reference median.

use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use crate::model::{MedianBaseline, SeaIceMonth, SeaIceYears};
use crate::normalize::round2;
use crate::parse::SeaIceRow;

/// Reference period for the climatological median.
pub const BASELINE_YEARS: RangeInclusive<i32> = 1981..=2010;

/// Mean extent per (year, month), rounded, months ascending within each year.
pub fn monthly_means(rows: &[SeaIceRow]) -> SeaIceYears {
    let mut sums: BTreeMap<(i32, u32), (f64, usize)> = BTreeMap::new();
    for row in rows {
        let entry = sums.entry((row.year, row.month)).or_insert((0.0, 0));
        entry.0 += row.extent;
        entry.1 += 1;
    }

    let mut years = SeaIceYears::new();
    for ((year, month), (sum, count)) in sums {
        years.entry(year).or_default().push(SeaIceMonth {
            month,
            extent: round2(sum / count as f64),
        });
    }
    years
}

/// Median of a non-empty slice; the two middle values are averaged for even lengths.
pub fn median(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.total_cmp(b));
    let mid = values.len() / 2;
    Some(if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    })
}

/// For each calendar month, the rounded median of that month's extent over the
/// reference years present in `years`. Months with no reference data are omitted.
pub fn median_baseline(years: &SeaIceYears, reference: RangeInclusive<i32>) -> MedianBaseline {
    let mut baseline = MedianBaseline::new();
    for month in 1..=12u32 {
        let mut values: Vec<f64> = years
            .range(reference.clone())
            .filter_map(|(_, months)| months.iter().find(|m| m.month == month))
            .map(|m| m.extent)
            .collect();
        if let Some(m) = median(&mut values) {
            baseline.insert(month, round2(m));
        }
    }
    baseline
}
