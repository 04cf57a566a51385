//! Per-year aggregation of parsed records.
//!
//! A [`YearMap`] is keyed by calendar year and holds one [`YearBucket`] per
//! year. Recording and merging only append; each bucket is sorted once when
//! it is finalized, so sums are accumulated in a canonical order and stay
//! bit-identical whatever order the files were merged in.

use crate::models::{DataLine, Granularity};
use serde::Serialize;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::collections::btree_map;

/// Values and counters collected for one year
#[derive(Debug, Clone, Default, Serialize)]
pub struct YearBucket {
    values: Vec<f64>,
    total_values: usize,
    missing_values: usize,
    lines: usize,
    #[serde(skip)]
    finalized: bool,
}

impl YearBucket {
    /// Finalized bucket holding the given values and no line counters
    pub fn from_values(values: impl IntoIterator<Item = f64>) -> Self {
        let mut bucket = Self {
            values: values.into_iter().collect(),
            ..Self::default()
        };
        bucket.finalize();
        bucket
    }

    /// Fold one accepted line into the bucket
    pub fn record(&mut self, line: &DataLine, granularity: Granularity) {
        self.total_values += line.daily_values.len();
        self.missing_values += line.missing_count();
        self.lines += 1;

        match granularity {
            Granularity::Daily => self.append(line.valid_values()),
            Granularity::MonthlySum => self.append(std::iter::once(line.valid_sum())),
        }
    }

    /// Absorb another bucket for the same year
    pub fn absorb(&mut self, other: YearBucket) {
        self.total_values += other.total_values;
        self.missing_values += other.missing_values;
        self.lines += other.lines;

        let mut values = other.values;
        if values.len() > self.values.len() {
            std::mem::swap(&mut self.values, &mut values);
        }
        self.append(values);
    }

    fn append(&mut self, values: impl IntoIterator<Item = f64>) {
        self.values.extend(values);
        self.finalized = false;
    }

    /// Sort the values into canonical ascending order
    pub fn finalize(&mut self) {
        if !self.finalized {
            self.values.sort_by(f64::total_cmp);
            self.finalized = true;
        }
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Collected values; ascending once finalized, append order before
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    fn canonical_values(&self) -> Cow<'_, [f64]> {
        if self.finalized {
            Cow::Borrowed(&self.values)
        } else {
            let mut sorted = self.values.clone();
            sorted.sort_by(f64::total_cmp);
            Cow::Owned(sorted)
        }
    }

    pub fn count(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Sum of the collected values, accumulated in ascending order
    pub fn sum(&self) -> f64 {
        self.canonical_values().iter().sum()
    }

    /// Daily values contributed, sentinels included
    pub fn total_values(&self) -> usize {
        self.total_values
    }

    pub fn missing_values(&self) -> usize {
        self.missing_values
    }

    /// Body lines contributed
    pub fn lines(&self) -> usize {
        self.lines
    }
}

/// Buckets are equal when they hold the same multiset of values
impl PartialEq for YearBucket {
    fn eq(&self, other: &Self) -> bool {
        self.total_values == other.total_values
            && self.missing_values == other.missing_values
            && self.lines == other.lines
            && self.canonical_values() == other.canonical_values()
    }
}

/// Ordered map from calendar year to its bucket
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct YearMap {
    years: BTreeMap<i32, YearBucket>,
}

impl YearMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one accepted line into its year's bucket
    pub fn record(&mut self, line: &DataLine, granularity: Granularity) {
        self.years
            .entry(line.year)
            .or_default()
            .record(line, granularity);
    }

    /// Insert or absorb a bucket for a year
    pub fn insert_bucket(&mut self, year: i32, bucket: YearBucket) {
        match self.years.entry(year) {
            btree_map::Entry::Vacant(entry) => {
                entry.insert(bucket);
            }
            btree_map::Entry::Occupied(mut entry) => entry.get_mut().absorb(bucket),
        }
    }

    /// Merge another map into this one
    pub fn merge_from(&mut self, other: YearMap) {
        for (year, bucket) in other.years {
            self.insert_bucket(year, bucket);
        }
    }

    pub fn get(&self, year: i32) -> Option<&YearBucket> {
        self.years.get(&year)
    }

    /// Buckets in ascending year order
    pub fn iter(&self) -> impl Iterator<Item = (i32, &YearBucket)> {
        self.years.iter().map(|(year, bucket)| (*year, bucket))
    }

    pub fn years(&self) -> impl Iterator<Item = i32> + '_ {
        self.years.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.years.len()
    }

    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }

    pub fn total_values(&self) -> usize {
        self.years.values().map(YearBucket::total_values).sum()
    }

    pub fn missing_values(&self) -> usize {
        self.years.values().map(YearBucket::missing_values).sum()
    }

    /// Finalize every bucket
    pub fn finalize(&mut self) {
        for bucket in self.years.values_mut() {
            bucket.finalize();
        }
    }
}

/// Merge two year maps
///
/// Commutative and associative: the result depends only on the multiset
/// of values per year, never on argument order. Buckets are appended to,
/// not re-sorted; finalize the result before reading values in order.
pub fn merge(existing: YearMap, incoming: YearMap) -> YearMap {
    let (mut larger, smaller) = if existing.len() >= incoming.len() {
        (existing, incoming)
    } else {
        (incoming, existing)
    };
    larger.merge_from(smaller);
    larger
}

/// Accumulates per-file year maps over a directory scan
#[derive(Debug, Default)]
pub struct YearAggregator {
    years: YearMap,
    files_merged: usize,
}

impl YearAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge one file's year map
    pub fn add(&mut self, year_map: YearMap) {
        let current = std::mem::take(&mut self.years);
        self.years = merge(current, year_map);
        self.files_merged += 1;
    }

    pub fn files_merged(&self) -> usize {
        self.files_merged
    }

    /// Current merged view
    pub fn year_map(&self) -> &YearMap {
        &self.years
    }

    /// Finalized merged map
    pub fn finish(mut self) -> YearMap {
        self.years.finalize();
        self.years
    }
}
