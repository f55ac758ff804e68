use std::rc::Rc;

use tracing::debug;

use crate::api::{DashEvent, EventInterests, EventKind, SelectionState};
use crate::error::DashResult;
use crate::extensions::Milestone;
use crate::render::{FrameContent, MilestoneCard, ViewFrame};

use super::{
    LinkedView, MilestoneStep, PhaseTracker, ViewId, ViewInput, ViewOutcome, ViewPhase,
    ViewSnapshot,
};

/// Step-through guide showing one milestone card at a time.
#[derive(Debug, Clone)]
pub struct MilestoneView {
    id: ViewId,
    label: String,
    milestones: Rc<[Milestone]>,
    image_dir: String,
    current: Option<usize>,
    tracker: PhaseTracker,
}

impl MilestoneView {
    #[must_use]
    pub fn new(id: ViewId, milestones: Rc<[Milestone]>, image_dir: impl Into<String>) -> Self {
        Self {
            id,
            label: "Milestones".to_owned(),
            milestones,
            image_dir: image_dir.into(),
            current: None,
            tracker: PhaseTracker::default(),
        }
    }

    #[must_use]
    pub fn current(&self) -> Option<&Milestone> {
        self.current.and_then(|index| self.milestones.get(index))
    }

    fn step(&self, step: MilestoneStep) -> Option<usize> {
        let len = self.milestones.len();
        if len == 0 {
            return None;
        }
        Some(match (step, self.current) {
            (MilestoneStep::Next, None) => 0,
            (MilestoneStep::Next, Some(index)) => (index + 1) % len,
            (MilestoneStep::Previous, None | Some(0)) => len - 1,
            (MilestoneStep::Previous, Some(index)) => index - 1,
        })
    }

    fn card(&self) -> Option<MilestoneCard> {
        self.current().map(|milestone| MilestoneCard {
            year: milestone.year,
            description: milestone.description.clone(),
            image_path: format!("{}/{}", self.image_dir, milestone.image_ref),
        })
    }

    fn render(&mut self) -> ViewOutcome {
        self.tracker.begin_wrangle();
        let frame = ViewFrame::new(self.id, FrameContent::Milestone(self.card()));
        self.tracker.mark_rendered();
        ViewOutcome::rendered(frame)
    }
}

impl LinkedView for MilestoneView {
    fn id(&self) -> ViewId {
        self.id
    }

    fn label(&self) -> &str {
        &self.label
    }

    fn interests(&self) -> EventInterests {
        EventInterests::from_kind(EventKind::MilestoneChanged)
    }

    fn phase(&self) -> ViewPhase {
        self.tracker.phase()
    }

    fn refresh(&mut self, selection: &SelectionState) -> DashResult<ViewOutcome> {
        self.current = selection
            .active_milestone_year()
            .and_then(|year| self.milestones.iter().position(|m| m.year == year));
        Ok(self.render())
    }

    fn on_event(
        &mut self,
        event: &DashEvent,
        _selection: &SelectionState,
    ) -> DashResult<ViewOutcome> {
        let DashEvent::MilestoneChanged { year } = event else {
            return Ok(ViewOutcome::none());
        };
        let index = year.and_then(|year| self.milestones.iter().position(|m| m.year == year));
        if index == self.current {
            return Ok(ViewOutcome::none());
        }
        self.current = index;
        Ok(self.render())
    }

    fn on_input(
        &mut self,
        input: &ViewInput,
        _selection: &SelectionState,
    ) -> DashResult<ViewOutcome> {
        let ViewInput::StepMilestone(step) = input else {
            return Ok(ViewOutcome::none());
        };
        let Some(index) = self.step(*step) else {
            return Ok(ViewOutcome::none());
        };
        self.current = Some(index);
        let year = self.milestones[index].year;
        debug!(view = %self.id, year, "milestone navigation");
        Ok(self.render().and_emit(DashEvent::milestone(Some(year))))
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
            displayed_marks: usize::from(self.current.is_some()),
        }
    }
}
