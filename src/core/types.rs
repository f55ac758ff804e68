use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{DashError, DashResult};

/// Distribution channel a sales format belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Medium {
    Physical,
    Digital,
    Streaming,
    /// Any other non-blank label.
    Other,
}

impl Medium {
    /// Parses a medium label case-insensitively, ignoring surrounding whitespace.
    /// Unrecognized labels map to `Other`; only a blank label has no medium.
    #[must_use]
    pub fn parse(label: &str) -> Option<Self> {
        let label = label.trim();
        if label.is_empty() {
            None
        } else if label.eq_ignore_ascii_case("physical") {
            Some(Self::Physical)
        } else if label.eq_ignore_ascii_case("digital") {
            Some(Self::Digital)
        } else if label.eq_ignore_ascii_case("streaming") {
            Some(Self::Streaming)
        } else {
            Some(Self::Other)
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Physical => "Physical",
            Self::Digital => "Digital",
            Self::Streaming => "Streaming",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for Medium {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One parsed sales figure for a (format, year) pair of a single metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesRecord {
    pub format: String,
    pub medium: Medium,
    pub year: i32,
    pub value: f64,
}

impl SalesRecord {
    #[must_use]
    pub fn new(format: impl Into<String>, medium: Medium, year: i32, value: f64) -> Self {
        Self {
            format: format.into(),
            medium,
            year,
            value,
        }
    }
}

/// Sales record enriched with derived metrics.
///
/// `value_change` and `value_change_norm` are populated by the value-change
/// derivation. `price_per_unit` is only present on price series, where it
/// equals `value`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedRecord {
    pub format: String,
    pub medium: Medium,
    pub year: i32,
    pub value: f64,
    #[serde(default)]
    pub value_change: Option<f64>,
    #[serde(default)]
    pub value_change_norm: Option<f64>,
    #[serde(default)]
    pub price_per_unit: Option<f64>,
}

impl DerivedRecord {
    #[must_use]
    pub fn new(format: impl Into<String>, medium: Medium, year: i32, value: f64) -> Self {
        Self {
            format: format.into(),
            medium,
            year,
            value,
            value_change: None,
            value_change_norm: None,
            price_per_unit: None,
        }
    }

    #[must_use]
    pub fn same_slot(&self, format: &str, year: i32) -> bool {
        self.year == year && self.format == format
    }
}

impl From<SalesRecord> for DerivedRecord {
    fn from(record: SalesRecord) -> Self {
        Self::new(record.format, record.medium, record.year, record.value)
    }
}

impl From<&SalesRecord> for DerivedRecord {
    fn from(record: &SalesRecord) -> Self {
        Self::new(record.format.clone(), record.medium, record.year, record.value)
    }
}

/// Inclusive calendar-year window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct YearRange {
    start: i32,
    end: i32,
}

impl YearRange {
    pub fn new(start: i32, end: i32) -> DashResult<Self> {
        if start > end {
            return Err(DashError::InvalidData(format!(
                "year range start {start} must be <= end {end}"
            )));
        }
        Ok(Self { start, end })
    }

    /// Builds a range from nullable bounds; both must be present.
    pub fn from_bounds(start: Option<i32>, end: Option<i32>) -> DashResult<Option<Self>> {
        match (start, end) {
            (Some(start), Some(end)) => Self::new(start, end).map(Some),
            _ => Ok(None),
        }
    }

    #[must_use]
    pub const fn start(self) -> i32 {
        self.start
    }

    #[must_use]
    pub const fn end(self) -> i32 {
        self.end
    }

    /// Years between the bounds, saturating for ranges wider than `i32`.
    #[must_use]
    pub const fn span(self) -> i32 {
        self.end.saturating_sub(self.start)
    }

    #[must_use]
    pub const fn contains(self, year: i32) -> bool {
        self.start <= year && year <= self.end
    }

    /// Clamps both bounds into `domain`.
    #[must_use]
    pub fn clamp_to(self, domain: Self) -> Self {
        Self {
            start: self.start.clamp(domain.start, domain.end),
            end: self.end.clamp(domain.start, domain.end),
        }
    }
}

impl fmt::Display for YearRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.start, self.end)
    }
}
