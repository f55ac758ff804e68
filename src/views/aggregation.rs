//! Per-view aggregation of filtered records.
//!
//! Everything here is recomputed on each filter change; nothing is cached
//! between dispatches.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::core::DerivedRecord;
use crate::render::YearValue;

/// Sums values per year, in ascending year order.
#[must_use]
pub fn sum_by_year(records: &[&DerivedRecord]) -> Vec<YearValue> {
    let mut totals: BTreeMap<i32, f64> = BTreeMap::new();
    for record in records {
        *totals.entry(record.year).or_insert(0.0) += record.value;
    }
    totals
        .into_iter()
        .map(|(year, value)| YearValue { year, value })
        .collect()
}

/// One year of one format's line, carrying every plottable measure.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FormatPoint {
    pub year: i32,
    pub value: f64,
    pub value_change: f64,
    pub value_change_norm: f64,
}

impl From<&DerivedRecord> for FormatPoint {
    fn from(record: &DerivedRecord) -> Self {
        Self {
            year: record.year,
            value: record.value,
            value_change: record.value_change.unwrap_or(0.0),
            value_change_norm: record.value_change_norm.unwrap_or(0.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormatSeries {
    pub format: String,
    pub points: Vec<FormatPoint>,
}

/// Groups records into one series per format, formats in first-seen order
/// and points in input order.
#[must_use]
pub fn group_by_format(records: &[&DerivedRecord]) -> Vec<FormatSeries> {
    let mut groups: IndexMap<&str, Vec<FormatPoint>> = IndexMap::new();
    for record in records {
        groups
            .entry(record.format.as_str())
            .or_default()
            .push(FormatPoint::from(*record));
    }
    groups
        .into_iter()
        .map(|(format, points)| FormatSeries {
            format: format.to_owned(),
            points,
        })
        .collect()
}

/// Measure plotted on a line chart's y axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum YAccessor {
    #[default]
    Value,
    ValueChange,
    ValueChangeNorm,
}

impl YAccessor {
    /// Title-click cycle order.
    pub const CYCLE: [Self; 3] = [Self::Value, Self::ValueChange, Self::ValueChangeNorm];

    #[must_use]
    pub fn get(self, point: &FormatPoint) -> f64 {
        match self {
            Self::Value => point.value,
            Self::ValueChange => point.value_change,
            Self::ValueChangeNorm => point.value_change_norm,
        }
    }

    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Value => "Actual Value vs Time",
            Self::ValueChange => "Value Change vs Time",
            Self::ValueChangeNorm => "Value Change (normalized) vs Time",
        }
    }
}

/// Grouping key of a ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum RankKey {
    #[default]
    Format,
    Medium,
}

impl RankKey {
    fn key_of(self, record: &DerivedRecord) -> &str {
        match self {
            Self::Format => record.format.as_str(),
            Self::Medium => record.medium.as_str(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Aggregation {
    #[default]
    Sum,
    Mean,
}

impl Aggregation {
    /// Price series are averaged; summing per-unit prices over years is meaningless.
    #[must_use]
    pub fn for_metric_name(name: &str) -> Self {
        if name.to_ascii_lowercase().contains("price") {
            Self::Mean
        } else {
            Self::Sum
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankEntry {
    pub key: String,
    pub value: f64,
}

/// Aggregates records per key and sorts descending.
///
/// Ties keep the order in which keys were first seen.
#[must_use]
pub fn rank(records: &[&DerivedRecord], key: RankKey, aggregation: Aggregation) -> Vec<RankEntry> {
    let mut groups: IndexMap<&str, (f64, usize)> = IndexMap::new();
    for record in records {
        let slot = groups.entry(key.key_of(record)).or_insert((0.0, 0));
        slot.0 += record.value;
        slot.1 += 1;
    }

    let mut entries: Vec<RankEntry> = groups
        .into_iter()
        .map(|(key, (total, count))| RankEntry {
            key: key.to_owned(),
            value: match aggregation {
                Aggregation::Sum => total,
                Aggregation::Mean => total / count as f64,
            },
        })
        .collect();
    entries.sort_by_key(|entry| std::cmp::Reverse(OrderedFloat(entry.value)));
    entries
}
