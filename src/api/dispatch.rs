use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::core::{MetricKind, YearRange};
use crate::error::{DashError, DashResult};
use crate::render::Renderer;
use crate::views::{ViewId, ViewInput, ViewOutcome};

use super::{DashEvent, Dashboard, EventKind, SubscriptionId};

/// Counters for one host call, including every cascaded event it caused.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchReport {
    pub events: usize,
    pub view_deliveries: usize,
    pub frames_rendered: usize,
    pub subscriber_deliveries: usize,
    pub selection_changes: usize,
}

impl DispatchReport {
    pub fn merge(&mut self, other: Self) {
        self.events += other.events;
        self.view_deliveries += other.view_deliveries;
        self.frames_rendered += other.frames_rendered;
        self.subscriber_deliveries += other.subscriber_deliveries;
        self.selection_changes += other.selection_changes;
    }
}

impl<R: Renderer> Dashboard<R> {
    /// Registers a host handler, called after the views for every event of `kind`.
    pub fn subscribe<F>(&mut self, kind: EventKind, handler: F) -> SubscriptionId
    where
        F: FnMut(&DashEvent) + 'static,
    {
        self.bus.subscribe(kind, handler)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.bus.unsubscribe(id)
    }

    /// Publishes `event` and dispatches everything it cascades into.
    pub fn publish(&mut self, event: DashEvent) -> DashResult<DispatchReport> {
        self.pending.push_back(event);
        self.drain()
    }

    /// Routes a user interaction to one view, then dispatches what it emitted.
    pub fn input(&mut self, view: ViewId, input: ViewInput) -> DashResult<DispatchReport> {
        let index = self.view_index(view).ok_or(DashError::UnknownView(view))?;
        trace!(view = %view, ?input, "view input");
        let outcome = self.views[index].on_input(&input, &self.selection)?;

        let mut report = DispatchReport::default();
        self.present(index, outcome, &mut report)?;
        report.merge(self.drain()?);
        Ok(report)
    }

    /// Restricts every view to `formats`; an empty list restores all formats.
    pub fn select_formats<I, S>(&mut self, formats: I) -> DashResult<DispatchReport>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.publish(DashEvent::formats(formats))
    }

    pub fn select_years(&mut self, range: Option<YearRange>) -> DashResult<DispatchReport> {
        self.publish(DashEvent::selection(range))
    }

    pub fn highlight(&mut self, format: Option<&str>) -> DashResult<DispatchReport> {
        self.publish(DashEvent::highlight(format))
    }

    pub fn select_milestone(&mut self, year: Option<i32>) -> DashResult<DispatchReport> {
        self.publish(DashEvent::milestone(year))
    }

    /// Swaps the series shown by `target`, or by every view when `None`.
    pub fn switch_metric(
        &mut self,
        target: Option<ViewId>,
        kind: MetricKind,
    ) -> DashResult<DispatchReport> {
        if let Some(view) = target {
            if self.view_index(view).is_none() {
                return Err(DashError::UnknownView(view));
            }
        }
        let series = self.series(kind)?;
        debug!(?target, series = series.name(), "switching metric");
        self.publish(DashEvent::DataChanged { target, series })
    }

    pub(super) fn drain(&mut self) -> DashResult<DispatchReport> {
        let limit = self.config.max_cascade_events;
        let mut report = DispatchReport::default();
        while let Some(event) = self.pending.pop_front() {
            if report.events >= limit {
                warn!(
                    limit,
                    dropped = self.pending.len() + 1,
                    "event cascade overflow, dropping queued events"
                );
                self.pending.clear();
                return Err(DashError::DispatchOverflow { limit });
            }
            if let Err(err) = self.dispatch_one(&event, &mut report) {
                self.pending.clear();
                return Err(err);
            }
        }
        Ok(report)
    }

    fn dispatch_one(&mut self, event: &DashEvent, report: &mut DispatchReport) -> DashResult<()> {
        report.events += 1;
        if self.selection.apply(event) {
            report.selection_changes += 1;
        }
        trace!(kind = ?event.kind(), "dispatching event");

        for index in 0..self.views.len() {
            if !self.views[index].accepts(event) {
                continue;
            }
            report.view_deliveries += 1;
            let outcome = self.views[index].on_event(event, &self.selection)?;
            self.present(index, outcome, report)?;
        }

        report.subscriber_deliveries += self.bus.publish(event);
        Ok(())
    }

    /// Draws a view's frame, returns the view to idle and queues its events.
    pub(super) fn present(
        &mut self,
        index: usize,
        outcome: ViewOutcome,
        report: &mut DispatchReport,
    ) -> DashResult<()> {
        let ViewOutcome { frame, emitted } = outcome;
        if let Some(frame) = frame {
            if let Err(err) = self.renderer.render(&frame) {
                warn!(view = %frame.view, error = %err, "renderer rejected frame");
                self.views[index].settle();
                return Err(err);
            }
            report.frames_rendered += 1;
        }
        self.views[index].settle();
        self.pending.extend(emitted);
        Ok(())
    }
}
