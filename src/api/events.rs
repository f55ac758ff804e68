use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::core::{MetricSeries, YearRange};
use crate::views::ViewId;

/// Closed vocabulary of cross-view events.
///
/// Events addressed to one view carry a `target`; the rest are broadcast to
/// every view whose interests include the event kind.
#[derive(Debug, Clone, PartialEq)]
pub enum DashEvent {
    /// A data-source toggle swapped the series shown by `target` (all views when `None`).
    DataChanged {
        target: Option<ViewId>,
        series: Rc<MetricSeries>,
    },
    /// The overview brush (or milestone centering) moved the year window.
    SelectionChanged {
        range: Option<YearRange>,
        transition: bool,
        source: Option<ViewId>,
    },
    /// The format picker changed the active subset; empty means all formats.
    FormatsChanged { formats: Vec<String> },
    /// Pointer entered (`Some`) or left (`None`) a format's marks.
    HighlightChanged { format: Option<String> },
    MilestoneChanged { year: Option<i32> },
    /// The power-scale slider of `target` moved.
    ScaleChanged { target: ViewId, exponent: f64 },
}

impl DashEvent {
    #[must_use]
    pub fn kind(&self) -> EventKind {
        match self {
            Self::DataChanged { .. } => EventKind::DataChanged,
            Self::SelectionChanged { .. } => EventKind::SelectionChanged,
            Self::FormatsChanged { .. } => EventKind::FormatsChanged,
            Self::HighlightChanged { .. } => EventKind::HighlightChanged,
            Self::MilestoneChanged { .. } => EventKind::MilestoneChanged,
            Self::ScaleChanged { .. } => EventKind::ScaleChanged,
        }
    }

    #[must_use]
    pub fn target(&self) -> Option<ViewId> {
        match self {
            Self::DataChanged { target, .. } => *target,
            Self::ScaleChanged { target, .. } => Some(*target),
            _ => None,
        }
    }

    /// True when the event is broadcast or addressed to `view`.
    #[must_use]
    pub fn is_for(&self, view: ViewId) -> bool {
        self.target().is_none_or(|target| target == view)
    }

    #[must_use]
    pub fn selection(range: Option<YearRange>) -> Self {
        Self::SelectionChanged {
            range,
            transition: false,
            source: None,
        }
    }

    #[must_use]
    pub fn formats<I, S>(formats: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::FormatsChanged {
            formats: formats.into_iter().map(Into::into).collect(),
        }
    }

    #[must_use]
    pub fn highlight(format: Option<&str>) -> Self {
        Self::HighlightChanged {
            format: format.map(str::to_owned),
        }
    }

    #[must_use]
    pub fn milestone(year: Option<i32>) -> Self {
        Self::MilestoneChanged { year }
    }
}

/// Tag of a `DashEvent`, used as the handler-table key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    DataChanged,
    SelectionChanged,
    FormatsChanged,
    HighlightChanged,
    MilestoneChanged,
    ScaleChanged,
}

impl EventKind {
    pub const ALL: [Self; 6] = [
        Self::DataChanged,
        Self::SelectionChanged,
        Self::FormatsChanged,
        Self::HighlightChanged,
        Self::MilestoneChanged,
        Self::ScaleChanged,
    ];

    const fn bit(self) -> u8 {
        match self {
            Self::DataChanged => 1 << 0,
            Self::SelectionChanged => 1 << 1,
            Self::FormatsChanged => 1 << 2,
            Self::HighlightChanged => 1 << 3,
            Self::MilestoneChanged => 1 << 4,
            Self::ScaleChanged => 1 << 5,
        }
    }
}

/// Bitmask of event kinds a view consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct EventInterests {
    bits: u8,
}

impl EventInterests {
    #[must_use]
    pub const fn none() -> Self {
        Self { bits: 0 }
    }

    #[must_use]
    pub const fn all() -> Self {
        Self { bits: 0b11_1111 }
    }

    #[must_use]
    pub const fn from_kind(kind: EventKind) -> Self {
        Self { bits: kind.bit() }
    }

    #[must_use]
    pub const fn with(self, kind: EventKind) -> Self {
        Self {
            bits: self.bits | kind.bit(),
        }
    }

    #[must_use]
    pub const fn without(self, kind: EventKind) -> Self {
        Self {
            bits: self.bits & !kind.bit(),
        }
    }

    #[must_use]
    pub const fn contains(self, kind: EventKind) -> bool {
        (self.bits & kind.bit()) != 0
    }

    #[must_use]
    pub const fn is_none(self) -> bool {
        self.bits == 0
    }
}
