//! Linked views: each one filters its retained data against the shared
//! selection, aggregates it, and hands a frame to the renderer.

pub mod aggregation;
mod linked_series;
mod milestone_view;
mod parallel_view;

pub use aggregation::{
    Aggregation, FormatPoint, FormatSeries, RankEntry, RankKey, YAccessor, group_by_format, rank,
    sum_by_year,
};
pub use linked_series::{
    ChartPrimitive, LinkedSeriesView, SeriesAggregation, SeriesViewProfile,
};
pub use milestone_view::MilestoneView;
pub use parallel_view::ParallelCoordinatesView;

use std::fmt;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::api::{DashEvent, EventInterests, SelectionState};
use crate::error::DashResult;
use crate::render::ViewFrame;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ViewId(pub u16);

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Per-view update cycle: Idle → Wrangling → Rendered → Idle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ViewPhase {
    #[default]
    Idle,
    Wrangling,
    Rendered,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MilestoneStep {
    Next,
    Previous,
}

/// Direct user interaction with one view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ViewInput {
    /// Brush dragged to a fractional-year extent (`None` clears it).
    Brush {
        extent: Option<(f64, f64)>,
        at_seconds: f64,
    },
    BrushEnd { at_seconds: f64 },
    SliderDrag { pixel_y: f64 },
    /// Title click cycling the plotted metric.
    CycleMetric,
    Hover { format: Option<String> },
    MarkerClick { year: i32 },
    StepMilestone(MilestoneStep),
}

/// What a view produced for one event or input.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewOutcome {
    pub frame: Option<ViewFrame>,
    pub emitted: SmallVec<[DashEvent; 2]>,
}

impl ViewOutcome {
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn rendered(frame: ViewFrame) -> Self {
        Self {
            frame: Some(frame),
            emitted: SmallVec::new(),
        }
    }

    #[must_use]
    pub fn emitting(event: DashEvent) -> Self {
        let mut outcome = Self::none();
        outcome.emitted.push(event);
        outcome
    }

    #[must_use]
    pub fn and_emit(mut self, event: DashEvent) -> Self {
        self.emitted.push(event);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewSnapshot {
    pub id: ViewId,
    pub label: String,
    pub phase: ViewPhase,
    pub render_count: u64,
    pub displayed_marks: usize,
}

/// A view attached to the dashboard's event channel.
///
/// Views never mutate shared state. They read the selection snapshot handed
/// to them and report follow-up events through `ViewOutcome::emitted`; the
/// dashboard dispatches those after the current event has reached every view.
pub trait LinkedView {
    fn id(&self) -> ViewId;
    fn label(&self) -> &str;
    fn interests(&self) -> EventInterests;
    fn phase(&self) -> ViewPhase;

    /// Wrangles and renders from scratch; called once on registration.
    fn refresh(&mut self, selection: &SelectionState) -> DashResult<ViewOutcome>;

    fn on_event(&mut self, event: &DashEvent, selection: &SelectionState)
    -> DashResult<ViewOutcome>;

    fn on_input(&mut self, input: &ViewInput, selection: &SelectionState)
    -> DashResult<ViewOutcome>;

    /// Returns the view to `Idle` once its frame has been drawn.
    fn settle(&mut self);

    fn snapshot(&self) -> ViewSnapshot;

    fn accepts(&self, event: &DashEvent) -> bool {
        self.interests().contains(event.kind()) && event.is_for(self.id())
    }
}

/// Phase bookkeeping shared by the view implementations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct PhaseTracker {
    phase: ViewPhase,
    render_count: u64,
}

impl PhaseTracker {
    pub(crate) fn phase(self) -> ViewPhase {
        self.phase
    }

    pub(crate) fn render_count(self) -> u64 {
        self.render_count
    }

    pub(crate) fn begin_wrangle(&mut self) {
        self.phase = ViewPhase::Wrangling;
    }

    pub(crate) fn mark_rendered(&mut self) {
        self.phase = ViewPhase::Rendered;
        self.render_count += 1;
    }

    pub(crate) fn settle(&mut self) {
        self.phase = ViewPhase::Idle;
    }
}
