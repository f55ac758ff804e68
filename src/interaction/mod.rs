mod coalescer;

pub use coalescer::{BrushCoalescer, CoalesceDecision, CoalescePolicy};

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::core::YearRange;
use crate::error::{DashError, DashResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum BrushMode {
    #[default]
    Idle,
    Brushing,
}

/// Range selection over a continuous year axis.
///
/// The extent is kept in fractional years next to the whole-year range it
/// selects. A brush is empty only when it has been cleared; a zero-width drag
/// still selects the year it started in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Brush {
    extent: Option<(f64, f64)>,
    years: Option<YearRange>,
    mode: BrushMode,
}

impl Brush {
    #[must_use]
    pub fn empty(self) -> bool {
        self.extent.is_none()
    }

    #[must_use]
    pub fn extent(self) -> Option<(f64, f64)> {
        self.extent
    }

    #[must_use]
    pub fn mode(self) -> BrushMode {
        self.mode
    }

    /// Updates the extent during a drag; `None` clears the brush.
    ///
    /// Extents whose years do not fit the calendar range are rejected and
    /// leave the brush unchanged.
    pub fn brush_to(&mut self, extent: Option<(f64, f64)>) -> DashResult<()> {
        match extent {
            Some((a, b)) => {
                if !a.is_finite() || !b.is_finite() {
                    return Err(DashError::InvalidData(
                        "brush extent must be finite".to_owned(),
                    ));
                }
                let years = brush_to_years(extent).ok_or_else(|| {
                    DashError::InvalidData(format!(
                        "brush extent ({a}, {b}) is outside the representable years"
                    ))
                })?;
                self.extent = Some((a.min(b), a.max(b)));
                self.years = Some(years);
            }
            None => {
                self.extent = None;
                self.years = None;
            }
        }
        self.mode = BrushMode::Brushing;
        Ok(())
    }

    /// Brushes between two calendar dates.
    pub fn brush_dates(&mut self, start: NaiveDate, end: NaiveDate) -> DashResult<()> {
        self.brush_to(Some((fractional_year(start), fractional_year(end))))
    }

    pub fn end_gesture(&mut self) {
        self.mode = BrushMode::Idle;
    }

    pub fn clear(&mut self) {
        self.extent = None;
        self.years = None;
        self.mode = BrushMode::Idle;
    }

    /// Moves the brush to cover `range` without starting a gesture.
    pub fn set_years(&mut self, range: Option<YearRange>) {
        self.extent = range.map(|range| (f64::from(range.start()), f64::from(range.end())));
        self.years = range;
    }

    #[must_use]
    pub fn years(self) -> Option<YearRange> {
        self.years
    }
}

/// Converts a continuous brush extent to whole calendar years.
///
/// Both bounds are truncated to their year; the result always spans at least
/// one year. An empty or non-finite extent, or one whose years overflow `i32`,
/// yields `None`.
#[must_use]
pub fn brush_to_years(extent: Option<(f64, f64)>) -> Option<YearRange> {
    let (a, b) = extent?;
    if !a.is_finite() || !b.is_finite() {
        return None;
    }
    let start = a.min(b).floor();
    let end = a.max(b).floor().max(start + 1.0);
    if start < f64::from(i32::MIN) || end > f64::from(i32::MAX) {
        return None;
    }
    YearRange::new(start as i32, end as i32).ok()
}

/// Position of `date` on a continuous year axis (Jan 1 is the whole year).
#[must_use]
pub fn fractional_year(date: NaiveDate) -> f64 {
    let days_in_year = if date.leap_year() { 366.0 } else { 365.0 };
    f64::from(date.year()) + f64::from(date.ordinal0()) / days_in_year
}
