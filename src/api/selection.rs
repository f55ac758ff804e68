use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::core::{DerivedRecord, YearRange};

use super::DashEvent;

const MIN_CENTERING_SPAN: i32 = 2;

/// The shared view window every view filters against.
///
/// A dashboard owns exactly one instance and folds each published event into
/// it before any view sees the event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionState {
    year_range: Option<YearRange>,
    active_formats: Option<IndexSet<String>>,
    highlighted_format: Option<String>,
    active_milestone_year: Option<i32>,
}

impl SelectionState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn year_range(&self) -> Option<YearRange> {
        self.year_range
    }

    #[must_use]
    pub fn year_range_start(&self) -> Option<i32> {
        self.year_range.map(YearRange::start)
    }

    #[must_use]
    pub fn year_range_end(&self) -> Option<i32> {
        self.year_range.map(YearRange::end)
    }

    #[must_use]
    pub fn active_formats(&self) -> Option<&IndexSet<String>> {
        self.active_formats.as_ref()
    }

    #[must_use]
    pub fn highlighted_format(&self) -> Option<&str> {
        self.highlighted_format.as_deref()
    }

    #[must_use]
    pub fn active_milestone_year(&self) -> Option<i32> {
        self.active_milestone_year
    }

    /// Folds one event into the state. Returns `true` when a field changed.
    pub fn apply(&mut self, event: &DashEvent) -> bool {
        match event {
            DashEvent::SelectionChanged { range, .. } => replace(&mut self.year_range, *range),
            DashEvent::FormatsChanged { formats } => {
                let formats = if formats.is_empty() {
                    None
                } else {
                    Some(formats.iter().cloned().collect())
                };
                replace(&mut self.active_formats, formats)
            }
            DashEvent::HighlightChanged { format } => {
                replace(&mut self.highlighted_format, format.clone())
            }
            DashEvent::MilestoneChanged { year } => {
                replace(&mut self.active_milestone_year, *year)
            }
            DashEvent::DataChanged { .. } | DashEvent::ScaleChanged { .. } => false,
        }
    }

    #[must_use]
    pub fn filter(&self, scope: FilterScope) -> RecordFilter {
        RecordFilter {
            years: if scope.years { self.year_range } else { None },
            formats: if scope.formats {
                self.active_formats.clone()
            } else {
                None
            },
        }
    }
}

fn replace<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        return false;
    }
    *slot = value;
    true
}

/// Which selection fields a view filters on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterScope {
    pub years: bool,
    pub formats: bool,
}

impl FilterScope {
    pub const ALL: Self = Self {
        years: true,
        formats: true,
    };
    pub const FORMATS_ONLY: Self = Self {
        years: false,
        formats: true,
    };
}

/// Conjunctive record predicate; an absent part accepts everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordFilter {
    years: Option<YearRange>,
    formats: Option<IndexSet<String>>,
}

impl RecordFilter {
    #[must_use]
    pub fn pass_through() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_years(mut self, years: Option<YearRange>) -> Self {
        self.years = years;
        self
    }

    #[must_use]
    pub fn with_formats<I, S>(mut self, formats: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let formats: IndexSet<String> = formats.into_iter().map(Into::into).collect();
        self.formats = (!formats.is_empty()).then_some(formats);
        self
    }

    #[must_use]
    pub fn is_pass_through(&self) -> bool {
        self.years.is_none() && self.formats.is_none()
    }

    #[must_use]
    pub fn matches(&self, format: &str, year: i32) -> bool {
        self.years.is_none_or(|range| range.contains(year))
            && self
                .formats
                .as_ref()
                .is_none_or(|formats| formats.contains(format))
    }

    /// Borrows the matching records, keeping their order.
    #[must_use]
    pub fn apply<'a>(&self, records: &'a [DerivedRecord]) -> Vec<&'a DerivedRecord> {
        records
            .iter()
            .filter(|record| self.matches(&record.format, record.year))
            .collect()
    }
}

/// Recenters the year window on a milestone.
///
/// The half-width is `max(2, current span) / 2`, so the window keeps its span
/// when wider than two years. Bounds are rounded to whole years and clamped to
/// `domain`; the result spans at least one year whenever the domain does.
#[must_use]
pub fn center_on_milestone(
    current: Option<YearRange>,
    milestone_year: i32,
    domain: YearRange,
) -> YearRange {
    let span = current.map_or(0, YearRange::span);
    let half_width = f64::from(span.max(MIN_CENTERING_SPAN)) / 2.0;
    let center = f64::from(milestone_year);
    let start = (center - half_width).round() as i32;
    let end = (center + half_width).round() as i32;

    let clamped = YearRange::new(start, end)
        .unwrap_or(domain)
        .clamp_to(domain);
    if clamped.span() >= 1 || domain.span() < 1 {
        return clamped;
    }
    if clamped.end() < domain.end() {
        YearRange::new(clamped.start(), clamped.end() + 1).unwrap_or(domain)
    } else {
        YearRange::new(clamped.start() - 1, clamped.end()).unwrap_or(domain)
    }
}
