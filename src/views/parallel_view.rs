use std::rc::Rc;

use tracing::trace;

use crate::api::{DashEvent, EventInterests, EventKind, FilterScope, SelectionState};
use crate::core::{ColorMap, ParaTable};
use crate::error::DashResult;
use crate::render::{Emphasis, FrameContent, FramePolyline, ViewFrame};

use super::{LinkedView, PhaseTracker, ViewId, ViewInput, ViewOutcome, ViewPhase, ViewSnapshot};

/// Parallel-coordinates explorer over the wide per-format, per-year table.
///
/// Reads its own table instead of a metric series, so data-source toggles do
/// not reach it.
#[derive(Debug, Clone)]
pub struct ParallelCoordinatesView {
    id: ViewId,
    label: String,
    table: Rc<ParaTable>,
    colors: Rc<ColorMap>,
    displayed: Vec<usize>,
    tracker: PhaseTracker,
}

impl ParallelCoordinatesView {
    #[must_use]
    pub fn new(id: ViewId, table: Rc<ParaTable>, colors: Rc<ColorMap>) -> Self {
        Self {
            id,
            label: "Parallel Coordinates".to_owned(),
            table,
            colors,
            displayed: Vec::new(),
            tracker: PhaseTracker::default(),
        }
    }

    #[must_use]
    pub fn table(&self) -> &ParaTable {
        &self.table
    }

    fn wrangle(&mut self, selection: &SelectionState) {
        let filter = selection.filter(FilterScope::ALL);
        self.displayed = self
            .table
            .rows()
            .iter()
            .enumerate()
            .filter(|(_, row)| filter.matches(&row.format, row.year))
            .map(|(index, _)| index)
            .collect();
    }

    fn render(&mut self, selection: &SelectionState) -> ViewOutcome {
        let rows = self.table.rows();
        let dimensions = self.table.dimensions().to_vec();

        let extents: Vec<Option<(f64, f64)>> = (0..dimensions.len())
            .map(|dimension| {
                self.displayed
                    .iter()
                    .map(|&index| rows[index].values[dimension])
                    .fold(None, |acc, value| match acc {
                        None => Some((value, value)),
                        Some((min, max)) => Some((f64::min(min, value), f64::max(max, value))),
                    })
            })
            .collect();

        let highlight = selection.highlighted_format();
        let lines: Vec<FramePolyline> = self
            .displayed
            .iter()
            .map(|&index| {
                let row = &rows[index];
                FramePolyline {
                    format: row.format.clone(),
                    year: row.year,
                    values: row.values.clone(),
                    color: self.colors.color_for(&row.format),
                    emphasis: Emphasis::for_key(highlight, &row.format),
                }
            })
            .collect();

        trace!(view = %self.id, lines = lines.len(), "parallel coordinates drawn");
        self.tracker.mark_rendered();
        ViewOutcome::rendered(ViewFrame::new(
            self.id,
            FrameContent::Polylines {
                dimensions,
                extents,
                lines,
            },
        ))
    }
}

impl LinkedView for ParallelCoordinatesView {
    fn id(&self) -> ViewId {
        self.id
    }

    fn label(&self) -> &str {
        &self.label
    }

    fn interests(&self) -> EventInterests {
        EventInterests::from_kind(EventKind::SelectionChanged)
            .with(EventKind::FormatsChanged)
            .with(EventKind::HighlightChanged)
    }

    fn phase(&self) -> ViewPhase {
        self.tracker.phase()
    }

    fn refresh(&mut self, selection: &SelectionState) -> DashResult<ViewOutcome> {
        self.tracker.begin_wrangle();
        self.wrangle(selection);
        Ok(self.render(selection))
    }

    fn on_event(
        &mut self,
        event: &DashEvent,
        selection: &SelectionState,
    ) -> DashResult<ViewOutcome> {
        self.tracker.begin_wrangle();
        match event {
            DashEvent::SelectionChanged { .. } | DashEvent::FormatsChanged { .. } => {
                self.wrangle(selection);
                Ok(self.render(selection))
            }
            DashEvent::HighlightChanged { .. } => Ok(self.render(selection)),
            _ => {
                self.tracker.settle();
                Ok(ViewOutcome::none())
            }
        }
    }

    fn on_input(
        &mut self,
        input: &ViewInput,
        _selection: &SelectionState,
    ) -> DashResult<ViewOutcome> {
        match input {
            ViewInput::Hover { format } => Ok(ViewOutcome::emitting(DashEvent::HighlightChanged {
                format: format.clone(),
            })),
            _ => Ok(ViewOutcome::none()),
        }
    }

    fn settle(&mut self) {
        self.tracker.settle();
    }

    fn snapshot(&self) -> ViewSnapshot {
        ViewSnapshot {
            id: self.id,
            label: self.label.clone(),
            phase: self.tracker.phase(),
            render_count: self.tracker.render_count(),
            displayed_marks: self.displayed.len(),
        }
    }
}
