//! Precipitation statistics derived from a finalized [`YearMap`].
//!
//! Totals, averages, year-over-year variation, wettest and driest year and
//! the grand total. Computation is pure; the result is an immutable
//! snapshot.

use crate::aggregate::YearMap;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Year-over-year change relative to the preceding present year
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum Variation {
    /// Percentage change
    Percent(f64),
    /// Preceding year's total is zero
    Undefined,
}

impl Variation {
    pub fn percent(&self) -> Option<f64> {
        match self {
            Variation::Percent(p) => Some(*p),
            Variation::Undefined => None,
        }
    }
}

impl fmt::Display for Variation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variation::Percent(p) => write!(f, "{:+.2}%", p),
            Variation::Undefined => write!(f, "undefined"),
        }
    }
}

/// Statistics for one year
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearStatistics {
    pub year: i32,
    pub total: f64,
    /// Omitted for an empty bucket
    pub average: Option<f64>,
    /// Omitted for the first year present
    pub variation: Option<Variation>,
    /// Values in the year's bucket
    pub value_count: usize,
}

/// A year paired with its total
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct YearTotal {
    pub year: i32,
    pub total: f64,
}

/// Immutable statistics snapshot
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Statistics {
    /// Per-year statistics in ascending year order
    pub years: Vec<YearStatistics>,
    pub wettest_year: Option<YearTotal>,
    pub driest_year: Option<YearTotal>,
    pub grand_total: f64,
}

impl Statistics {
    pub fn yearly_total(&self) -> BTreeMap<i32, f64> {
        self.years.iter().map(|y| (y.year, y.total)).collect()
    }

    pub fn yearly_average(&self) -> BTreeMap<i32, f64> {
        self.years
            .iter()
            .filter_map(|y| y.average.map(|avg| (y.year, avg)))
            .collect()
    }

    pub fn variation(&self) -> BTreeMap<i32, Variation> {
        self.years
            .iter()
            .filter_map(|y| y.variation.map(|v| (y.year, v)))
            .collect()
    }

    pub fn year(&self, year: i32) -> Option<&YearStatistics> {
        self.years.iter().find(|y| y.year == year)
    }

    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }
}

/// Derives [`Statistics`] from a year map
#[derive(Debug, Default, Clone, Copy)]
pub struct StatisticsCalculator;

impl StatisticsCalculator {
    /// Compute statistics
    ///
    /// Wettest and driest ties resolve to the earliest year.
    pub fn compute(year_map: &YearMap) -> Statistics {
        let mut years: Vec<YearStatistics> = Vec::with_capacity(year_map.len());
        let mut previous_total: Option<f64> = None;

        for (year, bucket) in year_map.iter() {
            let total = bucket.sum();
            let average = if bucket.is_empty() {
                None
            } else {
                Some(total / bucket.count() as f64)
            };
            let variation = previous_total.map(|prev| variation_between(prev, total));

            years.push(YearStatistics {
                year,
                total,
                average,
                variation,
                value_count: bucket.count(),
            });
            previous_total = Some(total);
        }

        let mut wettest: Option<YearTotal> = None;
        let mut driest: Option<YearTotal> = None;
        for y in &years {
            let candidate = YearTotal {
                year: y.year,
                total: y.total,
            };
            if wettest.is_none_or(|w| y.total > w.total) {
                wettest = Some(candidate);
            }
            if driest.is_none_or(|d| y.total < d.total) {
                driest = Some(candidate);
            }
        }

        let grand_total = years.iter().map(|y| y.total).sum();

        Statistics {
            years,
            wettest_year: wettest,
            driest_year: driest,
            grand_total,
        }
    }
}

fn variation_between(previous: f64, current: f64) -> Variation {
    if previous == 0.0 {
        Variation::Undefined
    } else {
        Variation::Percent((current - previous) / previous * 100.0)
    }
}
