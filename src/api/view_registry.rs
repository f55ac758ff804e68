use std::rc::Rc;

use tracing::debug;

use crate::core::{MetricKind, ParaTable};
use crate::error::{DashError, DashResult};
use crate::render::Renderer;
use crate::views::{
    LinkedSeriesView, LinkedView, MilestoneView, ParallelCoordinatesView, RankKey, ViewId,
};

use super::{Dashboard, DispatchReport};

impl<R: Renderer> Dashboard<R> {
    /// Registers a view and draws its first frame against the current selection.
    pub fn add_view(&mut self, mut view: Box<dyn LinkedView>) -> DashResult<DispatchReport> {
        let id = view.id();
        if self.view_index(id).is_some() {
            return Err(DashError::DuplicateView(id));
        }
        let outcome = view.refresh(&self.selection)?;
        debug!(view = %id, label = view.label(), "view registered");
        self.views.push(view);

        let mut report = DispatchReport::default();
        self.present(self.views.len() - 1, outcome, &mut report)?;
        report.merge(self.drain()?);
        Ok(report)
    }

    /// Unregisters a view by id. Returns `true` when removed.
    pub fn remove_view(&mut self, id: ViewId) -> bool {
        if let Some(position) = self.view_index(id) {
            self.views.remove(position);
            debug!(view = %id, "view removed");
            return true;
        }
        false
    }

    #[must_use]
    pub fn view(&self, id: ViewId) -> Option<&dyn LinkedView> {
        self.view_index(id).map(|index| self.views[index].as_ref())
    }

    #[must_use]
    pub fn view_ids(&self) -> Vec<ViewId> {
        self.views.iter().map(|view| view.id()).collect()
    }

    #[must_use]
    pub fn view_count(&self) -> usize {
        self.views.len()
    }

    /// Overview timeline over `kind`, with the dashboard's milestones and
    /// brush coalescing policy.
    pub fn add_context_view(&mut self, id: ViewId, kind: MetricKind) -> DashResult<DispatchReport> {
        let view = LinkedSeriesView::context(
            id,
            self.series(kind)?,
            Rc::clone(&self.colors),
            self.config.coalesce_policy,
        )
        .with_milestones(Rc::clone(&self.milestones));
        self.add_view(Box::new(view))
    }

    pub fn add_focus_view(&mut self, id: ViewId, kind: MetricKind) -> DashResult<DispatchReport> {
        let view = LinkedSeriesView::focus(
            id,
            self.series(kind)?,
            Rc::clone(&self.colors),
            self.config.slider_height_px,
        )?;
        self.add_view(Box::new(view))
    }

    pub fn add_ranking_view(
        &mut self,
        id: ViewId,
        kind: MetricKind,
        key: RankKey,
    ) -> DashResult<DispatchReport> {
        let view = LinkedSeriesView::ranking(id, self.series(kind)?, Rc::clone(&self.colors), key);
        self.add_view(Box::new(view))
    }

    pub fn add_parallel_view(
        &mut self,
        id: ViewId,
        table: Rc<ParaTable>,
    ) -> DashResult<DispatchReport> {
        let view = ParallelCoordinatesView::new(id, table, Rc::clone(&self.colors));
        self.add_view(Box::new(view))
    }

    pub fn add_milestone_view(&mut self, id: ViewId) -> DashResult<DispatchReport> {
        let view = MilestoneView::new(
            id,
            Rc::clone(&self.milestones),
            self.config.milestone_image_dir.clone(),
        );
        self.add_view(Box::new(view))
    }

    pub(super) fn view_index(&self, id: ViewId) -> Option<usize> {
        self.views.iter().position(|view| view.id() == id)
    }
}
