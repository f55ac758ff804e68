use std::collections::VecDeque;
use std::rc::Rc;

use tracing::debug;

use crate::core::{ColorMap, Dataset, MetricKind, MetricSeries, SalesTables};
use crate::error::DashResult;
use crate::extensions::Milestone;
use crate::render::Renderer;
use crate::views::LinkedView;

use super::{DashEvent, DashboardConfig, EventBus, SelectionState};

/// Coordinator of the linked views.
///
/// The dashboard is the single owner of the selection state. Every event,
/// whether published by the host or emitted by a view, is folded into the
/// state first and then delivered to interested views in registration order.
pub struct Dashboard<R: Renderer> {
    pub(super) renderer: R,
    pub(super) config: DashboardConfig,
    pub(super) dataset: Rc<Dataset>,
    pub(super) colors: Rc<ColorMap>,
    pub(super) milestones: Rc<[Milestone]>,
    pub(super) selection: SelectionState,
    pub(super) views: Vec<Box<dyn LinkedView>>,
    pub(super) bus: EventBus,
    pub(super) pending: VecDeque<DashEvent>,
}

impl<R: Renderer> Dashboard<R> {
    pub fn new(
        renderer: R,
        dataset: Dataset,
        colors: ColorMap,
        config: DashboardConfig,
    ) -> DashResult<Self> {
        config.validate()?;
        debug!(
            series = dataset.names().len(),
            formats = colors.len(),
            "dashboard created"
        );
        Ok(Self {
            renderer,
            config,
            dataset: Rc::new(dataset),
            colors: Rc::new(colors),
            milestones: Rc::from(Vec::new()),
            selection: SelectionState::new(),
            views: Vec::new(),
            bus: EventBus::new(),
            pending: VecDeque::new(),
        })
    }

    /// Derives the dataset from parsed tables and adopts their color map.
    pub fn from_tables(
        renderer: R,
        tables: &SalesTables,
        config: DashboardConfig,
    ) -> DashResult<Self> {
        Self::new(
            renderer,
            Dataset::from_tables(tables),
            tables.color_map.clone(),
            config,
        )
    }

    #[must_use]
    pub fn with_milestones(mut self, milestones: Vec<Milestone>) -> Self {
        self.milestones = Rc::from(milestones);
        self
    }

    #[must_use]
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    #[must_use]
    pub fn into_renderer(self) -> R {
        self.renderer
    }

    #[must_use]
    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    #[must_use]
    pub fn dataset(&self) -> &Rc<Dataset> {
        &self.dataset
    }

    #[must_use]
    pub fn colors(&self) -> &Rc<ColorMap> {
        &self.colors
    }

    #[must_use]
    pub fn milestones(&self) -> &Rc<[Milestone]> {
        &self.milestones
    }

    #[must_use]
    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn series(&self, kind: MetricKind) -> DashResult<Rc<MetricSeries>> {
        self.dataset.require(kind)
    }

    /// Events queued by views and not yet dispatched.
    #[must_use]
    pub fn pending_events(&self) -> usize {
        self.pending.len()
    }
}
