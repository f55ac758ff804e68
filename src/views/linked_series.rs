use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::api::{
    DashEvent, EventInterests, EventKind, FilterScope, SelectionState, center_on_milestone,
};
use crate::core::{ColorMap, ExponentSlider, MetricSeries, PowerScale, YearRange};
use crate::error::DashResult;
use crate::extensions::{Milestone, mark_milestones};
use crate::interaction::{Brush, BrushCoalescer, CoalesceDecision, CoalescePolicy};
use crate::render::{Emphasis, FrameBar, FrameContent, FrameLine, ViewFrame, YearValue};

use super::aggregation::{
    Aggregation, FormatSeries, RankEntry, RankKey, YAccessor, group_by_format, rank, sum_by_year,
};
use super::{LinkedView, PhaseTracker, ViewId, ViewInput, ViewOutcome, ViewPhase, ViewSnapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChartPrimitive {
    Area,
    Line,
    Bar,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeriesAggregation {
    SumByYear,
    ByFormat,
    Rank(RankKey),
}

/// Static shape of a series view: what it filters on, how it aggregates and
/// which interactions it supports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesViewProfile {
    pub primitive: ChartPrimitive,
    pub aggregation: SeriesAggregation,
    pub scope: FilterScope,
    /// Measures cycled through on title click; the first is shown initially.
    pub accessors: Vec<YAccessor>,
    pub brushable: bool,
    pub highlightable: bool,
}

impl SeriesViewProfile {
    /// Overview timeline: per-year totals, filtered by format only.
    #[must_use]
    pub fn context() -> Self {
        Self {
            primitive: ChartPrimitive::Area,
            aggregation: SeriesAggregation::SumByYear,
            scope: FilterScope::FORMATS_ONLY,
            accessors: vec![YAccessor::Value],
            brushable: true,
            highlightable: false,
        }
    }

    #[must_use]
    pub fn focus() -> Self {
        Self {
            primitive: ChartPrimitive::Line,
            aggregation: SeriesAggregation::ByFormat,
            scope: FilterScope::ALL,
            accessors: YAccessor::CYCLE.to_vec(),
            brushable: false,
            highlightable: true,
        }
    }

    #[must_use]
    pub fn ranking(key: RankKey) -> Self {
        Self {
            primitive: ChartPrimitive::Bar,
            aggregation: SeriesAggregation::Rank(key),
            scope: FilterScope::ALL,
            accessors: vec![YAccessor::Value],
            brushable: false,
            highlightable: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Wrangled {
    Timeline(Vec<YearValue>),
    Lines(Vec<FormatSeries>),
    Ranking(Vec<RankEntry>),
}

impl Wrangled {
    fn len(&self) -> usize {
        match self {
            Self::Timeline(points) => points.len(),
            Self::Lines(lines) => lines.len(),
            Self::Ranking(entries) => entries.len(),
        }
    }
}

/// Context, focus and ranking charts share this one implementation; they
/// differ only in their `SeriesViewProfile`.
#[derive(Debug, Clone)]
pub struct LinkedSeriesView {
    id: ViewId,
    label: String,
    profile: SeriesViewProfile,
    series: Rc<MetricSeries>,
    colors: Rc<ColorMap>,
    milestones: Rc<[Milestone]>,
    brush: Brush,
    coalescer: BrushCoalescer,
    last_input_at: f64,
    slider: Option<ExponentSlider>,
    y_scale: PowerScale,
    accessor_index: usize,
    wrangled: Wrangled,
    tracker: PhaseTracker,
}

impl LinkedSeriesView {
    #[must_use]
    pub fn new(
        id: ViewId,
        profile: SeriesViewProfile,
        series: Rc<MetricSeries>,
        colors: Rc<ColorMap>,
    ) -> Self {
        Self {
            id,
            label: series.name().to_owned(),
            profile,
            series,
            colors,
            milestones: Rc::from(Vec::new()),
            brush: Brush::default(),
            coalescer: BrushCoalescer::new(CoalescePolicy::default()),
            last_input_at: 0.0,
            slider: None,
            y_scale: PowerScale::default(),
            accessor_index: 0,
            wrangled: Wrangled::Timeline(Vec::new()),
            tracker: PhaseTracker::default(),
        }
    }

    #[must_use]
    pub fn context(
        id: ViewId,
        series: Rc<MetricSeries>,
        colors: Rc<ColorMap>,
        policy: CoalescePolicy,
    ) -> Self {
        let mut view = Self::new(id, SeriesViewProfile::context(), series, colors);
        view.coalescer = BrushCoalescer::new(policy);
        view
    }

    /// Detail line chart with a power-scale slider `slider_height_px` tall.
    pub fn focus(
        id: ViewId,
        series: Rc<MetricSeries>,
        colors: Rc<ColorMap>,
        slider_height_px: f64,
    ) -> DashResult<Self> {
        let slider = ExponentSlider::new(slider_height_px)?;
        let mut view = Self::new(id, SeriesViewProfile::focus(), series, colors);
        view.y_scale = PowerScale::default().with_exponent(slider.exponent()?)?;
        view.slider = Some(slider);
        Ok(view)
    }

    #[must_use]
    pub fn ranking(
        id: ViewId,
        series: Rc<MetricSeries>,
        colors: Rc<ColorMap>,
        key: RankKey,
    ) -> Self {
        Self::new(id, SeriesViewProfile::ranking(key), series, colors)
    }

    /// Milestones drawn as markers on a brushable timeline.
    #[must_use]
    pub fn with_milestones(mut self, milestones: Rc<[Milestone]>) -> Self {
        self.milestones = milestones;
        self
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    #[must_use]
    pub fn profile(&self) -> &SeriesViewProfile {
        &self.profile
    }

    #[must_use]
    pub fn series(&self) -> &Rc<MetricSeries> {
        &self.series
    }

    #[must_use]
    pub fn brush(&self) -> Brush {
        self.brush
    }

    #[must_use]
    pub fn accessor(&self) -> YAccessor {
        self.profile
            .accessors
            .get(self.accessor_index)
            .copied()
            .unwrap_or_default()
    }

    #[must_use]
    pub fn y_scale(&self) -> PowerScale {
        self.y_scale
    }

    #[must_use]
    pub fn slider(&self) -> Option<ExponentSlider> {
        self.slider
    }

    fn wrangle(&mut self, selection: &SelectionState) {
        let series = Rc::clone(&self.series);
        let filtered = selection.filter(self.profile.scope).apply(series.records());
        self.wrangled = match self.profile.aggregation {
            SeriesAggregation::SumByYear => Wrangled::Timeline(sum_by_year(&filtered)),
            SeriesAggregation::ByFormat => Wrangled::Lines(group_by_format(&filtered)),
            SeriesAggregation::Rank(key) => Wrangled::Ranking(rank(
                &filtered,
                key,
                Aggregation::for_metric_name(series.name()),
            )),
        };
        trace!(
            view = %self.id,
            records = filtered.len(),
            marks = self.wrangled.len(),
            "wrangled"
        );
    }

    fn build_frame(&mut self, selection: &SelectionState) -> DashResult<ViewFrame> {
        let highlight = selection.highlighted_format();
        let frame = match &self.wrangled {
            Wrangled::Timeline(points) => {
                let x = year_domain(points.iter().map(|point| point.year));
                let y = zero_based_domain(points.iter().map(|point| point.value));
                let markers = x
                    .and_then(|(start, end)| YearRange::new(start as i32, end as i32).ok())
                    .map(|domain| {
                        mark_milestones(
                            &self.milestones,
                            domain,
                            selection.active_milestone_year(),
                        )
                    })
                    .unwrap_or_default();
                ViewFrame::new(
                    self.id,
                    FrameContent::Area {
                        points: points.clone(),
                        brush: self.brush.years(),
                        markers,
                    },
                )
                .with_domains(x, y)
            }
            Wrangled::Lines(groups) => {
                let accessor = self.accessor();
                let lines: Vec<FrameLine> = groups
                    .iter()
                    .map(|group| FrameLine {
                        format: group.format.clone(),
                        color: self.colors.color_for(&group.format),
                        emphasis: Emphasis::for_key(highlight, &group.format),
                        points: group
                            .points
                            .iter()
                            .map(|point| YearValue {
                                year: point.year,
                                value: accessor.get(point),
                            })
                            .collect(),
                    })
                    .collect();
                let x = year_domain(
                    lines
                        .iter()
                        .flat_map(|line| line.points.iter().map(|point| point.year)),
                );
                let y = zero_based_domain(
                    lines
                        .iter()
                        .flat_map(|line| line.points.iter().map(|point| point.value)),
                );
                ViewFrame::new(self.id, FrameContent::Lines(lines))
                    .with_title(accessor.title())
                    .with_domains(x, y)
            }
            Wrangled::Ranking(entries) => {
                let bars: Vec<FrameBar> = entries
                    .iter()
                    .map(|entry| FrameBar {
                        key: entry.key.clone(),
                        value: entry.value,
                        color: self.colors.color_for(&entry.key),
                        emphasis: Emphasis::for_key(highlight, &entry.key),
                    })
                    .collect();
                let x = (!bars.is_empty()).then(|| (0.0, bars.len() as f64));
                let y = zero_based_domain(bars.iter().map(|bar| bar.value));
                ViewFrame::new(self.id, FrameContent::Bars(bars)).with_domains(x, y)
            }
        };

        if let Some(domain) = frame.y_domain {
            self.y_scale = self.y_scale.with_domain(domain)?;
        }
        Ok(frame.with_y_exponent(self.y_scale.exponent()))
    }

    fn render(&mut self, selection: &SelectionState) -> DashResult<ViewOutcome> {
        let frame = self.build_frame(selection)?;
        self.tracker.mark_rendered();
        Ok(ViewOutcome::rendered(frame))
    }

    fn rewrangle(&mut self, selection: &SelectionState) -> DashResult<ViewOutcome> {
        self.tracker.begin_wrangle();
        self.wrangle(selection);
        self.render(selection)
    }

    /// Redraws retained data; used when only emphasis, scale or accessor moved.
    fn redraw(&mut self, selection: &SelectionState) -> DashResult<ViewOutcome> {
        self.tracker.begin_wrangle();
        self.render(selection)
    }

    fn recenter(&mut self, year: Option<i32>, selection: &SelectionState) -> DashResult<ViewOutcome> {
        let centered = match (year, self.series.year_domain()) {
            (Some(year), Some(domain)) => {
                Some(center_on_milestone(selection.year_range(), year, domain))
            }
            _ => None,
        };
        if let Some(range) = centered {
            debug!(view = %self.id, %range, "recentering on milestone");
            self.brush.set_years(Some(range));
            self.coalescer.discard_pending();
        }

        let mut outcome = self.redraw(selection)?;
        if let Some(range) = centered {
            outcome.emitted.push(DashEvent::SelectionChanged {
                range: Some(range),
                transition: true,
                source: Some(self.id),
            });
        }
        Ok(outcome)
    }

    /// Follows a selection published by another source: the brush is moved
    /// onto it and any held update is discarded.
    fn sync_brush(&mut self, range: Option<YearRange>) -> bool {
        if self.brush.years() == range {
            return false;
        }
        trace!(view = %self.id, ?range, "brush follows external selection");
        self.brush.set_years(range);
        self.coalescer.discard_pending();
        true
    }

    fn publish_decision(&self, decision: CoalesceDecision) -> ViewOutcome {
        match decision {
            CoalesceDecision::Publish(range) => ViewOutcome::emitting(DashEvent::SelectionChanged {
                range,
                transition: false,
                source: Some(self.id),
            }),
            CoalesceDecision::Hold | CoalesceDecision::Drop => ViewOutcome::none(),
        }
    }
}

impl LinkedView for LinkedSeriesView {
    fn id(&self) -> ViewId {
        self.id
    }

    fn label(&self) -> &str {
        &self.label
    }

    fn interests(&self) -> EventInterests {
        let mut interests =
            EventInterests::from_kind(EventKind::DataChanged).with(EventKind::FormatsChanged);
        if self.profile.scope.years || self.profile.brushable {
            interests = interests.with(EventKind::SelectionChanged);
        }
        if self.profile.highlightable {
            interests = interests.with(EventKind::HighlightChanged);
        }
        if self.profile.brushable {
            interests = interests.with(EventKind::MilestoneChanged);
        }
        if self.slider.is_some() {
            interests = interests.with(EventKind::ScaleChanged);
        }
        interests
    }

    fn phase(&self) -> ViewPhase {
        self.tracker.phase()
    }

    /// Selection changes this view published itself are not echoed back.
    fn accepts(&self, event: &DashEvent) -> bool {
        if matches!(event, DashEvent::SelectionChanged { source, .. } if *source == Some(self.id)) {
            return false;
        }
        self.interests().contains(event.kind()) && event.is_for(self.id)
    }

    fn refresh(&mut self, selection: &SelectionState) -> DashResult<ViewOutcome> {
        if self.profile.brushable {
            self.brush.set_years(selection.year_range());
        }
        self.rewrangle(selection)
    }

    fn on_event(
        &mut self,
        event: &DashEvent,
        selection: &SelectionState,
    ) -> DashResult<ViewOutcome> {
        match event {
            DashEvent::DataChanged { series, .. } => {
                debug!(view = %self.id, series = series.name(), "switching series");
                self.series = Rc::clone(series);
                self.coalescer.reset();
                self.rewrangle(selection)
            }
            DashEvent::SelectionChanged { range, .. } => {
                let moved = self.profile.brushable && self.sync_brush(*range);
                if self.profile.scope.years {
                    self.rewrangle(selection)
                } else if moved {
                    self.redraw(selection)
                } else {
                    Ok(ViewOutcome::none())
                }
            }
            DashEvent::FormatsChanged { .. } => self.rewrangle(selection),
            DashEvent::HighlightChanged { .. } => self.redraw(selection),
            DashEvent::MilestoneChanged { year } => self.recenter(*year, selection),
            DashEvent::ScaleChanged { exponent, .. } => {
                self.y_scale = self.y_scale.with_exponent(*exponent)?;
                self.redraw(selection)
            }
        }
    }

    fn on_input(
        &mut self,
        input: &ViewInput,
        selection: &SelectionState,
    ) -> DashResult<ViewOutcome> {
        match input {
            ViewInput::Brush { extent, at_seconds } if self.profile.brushable => {
                self.brush.brush_to(*extent)?;
                self.last_input_at = *at_seconds;
                let decision =
                    self.coalescer
                        .offer(self.brush.years(), selection.year_range(), *at_seconds);
                Ok(self.publish_decision(decision))
            }
            ViewInput::BrushEnd { at_seconds } if self.profile.brushable => {
                self.brush.end_gesture();
                self.last_input_at = *at_seconds;
                let decision = self.coalescer.settle(selection.year_range(), *at_seconds);
                Ok(self.publish_decision(decision))
            }
            ViewInput::SliderDrag { pixel_y } if self.slider.is_some() => {
                let Some(slider) = self.slider.as_mut() else {
                    return Ok(ViewOutcome::none());
                };
                let exponent = slider.drag_to(*pixel_y)?;
                Ok(ViewOutcome::emitting(DashEvent::ScaleChanged {
                    target: self.id,
                    exponent,
                }))
            }
            ViewInput::CycleMetric if self.profile.accessors.len() > 1 => {
                self.accessor_index = (self.accessor_index + 1) % self.profile.accessors.len();
                self.redraw(selection)
            }
            ViewInput::Hover { format } => Ok(ViewOutcome::emitting(DashEvent::HighlightChanged {
                format: format.clone(),
            })),
            ViewInput::MarkerClick { year } if self.profile.brushable => {
                Ok(ViewOutcome::emitting(DashEvent::milestone(Some(*year))))
            }
            _ => {
                trace!(view = %self.id, ?input, "input not handled");
                Ok(ViewOutcome::none())
            }
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
            displayed_marks: self.wrangled.len(),
        }
    }
}

fn year_domain(years: impl Iterator<Item = i32>) -> Option<(f64, f64)> {
    let (min, max) = years.fold(None, |acc: Option<(i32, i32)>, year| match acc {
        None => Some((year, year)),
        Some((min, max)) => Some((min.min(year), max.max(year))),
    })?;
    Some((f64::from(min), f64::from(max)))
}

/// `[min(0, min), max]` over `values`, `None` when empty.
fn zero_based_domain(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    let (min, max) = values.fold(None, |acc: Option<(f64, f64)>, value| match acc {
        None => Some((value, value)),
        Some((min, max)) => Some((min.min(value), max.max(value))),
    })?;
    Some((min.min(0.0), max))
}
