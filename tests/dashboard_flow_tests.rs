use std::cell::RefCell;
use std::rc::Rc;

use approx::assert_relative_eq;
use sales_lens::api::{DashEvent, Dashboard, DashboardConfig, EventKind};
use sales_lens::core::{Medium, MetricKind, ParaTable, SalesRecord, SalesTables, YearRange};
use sales_lens::extensions::Milestone;
use sales_lens::interaction::CoalescePolicy;
use sales_lens::render::{Emphasis, FrameContent, RecordingRenderer, ViewFrame};
use sales_lens::views::{MilestoneStep, RankKey, ViewId, ViewInput, ViewPhase};
use sales_lens::{DashError, DashResult};

const CONTEXT: ViewId = ViewId(0);
const FOCUS: ViewId = ViewId(1);
const RANKING: ViewId = ViewId(2);
const GUIDE: ViewId = ViewId(3);

fn sales(format: &str, medium: Medium, values: &[(i32, f64)]) -> Vec<SalesRecord> {
    values
        .iter()
        .map(|(year, value)| SalesRecord::new(format, medium, *year, *value))
        .collect()
}

fn fixture_tables() -> SalesTables {
    let mut units = sales(
        "CD",
        Medium::Physical,
        &[(1999, 100.0), (2000, 80.0), (2001, 60.0)],
    );
    units.extend(sales(
        "Vinyl",
        Medium::Physical,
        &[(1999, 10.0), (2000, 12.0), (2001, 15.0)],
    ));
    units.extend(sales(
        "Paid Subscriptions",
        Medium::Streaming,
        &[(2000, 2.0), (2001, 4.0)],
    ));

    let mut dollars = sales(
        "CD",
        Medium::Physical,
        &[(1999, 1500.0), (2000, 1200.0), (2001, 900.0)],
    );
    dollars.extend(sales(
        "Vinyl",
        Medium::Physical,
        &[(1999, 200.0), (2000, 250.0)],
    ));
    dollars.extend(sales(
        "Paid Subscriptions",
        Medium::Streaming,
        &[(2000, 240.0), (2001, 480.0)],
    ));

    SalesTables::from_records(units, dollars.clone(), dollars)
}

fn dashboard_with(config: DashboardConfig) -> DashResult<Dashboard<RecordingRenderer>> {
    let mut dashboard =
        Dashboard::from_tables(RecordingRenderer::default(), &fixture_tables(), config)?
            .with_milestones(vec![
                Milestone::new(2000, "Napster").with_image("napster.png"),
                Milestone::new(2001, "iPod").with_image("ipod.png"),
            ]);
    dashboard.add_context_view(CONTEXT, MetricKind::Units)?;
    dashboard.add_focus_view(FOCUS, MetricKind::Units)?;
    dashboard.add_ranking_view(RANKING, MetricKind::Units, RankKey::Format)?;
    dashboard.add_milestone_view(GUIDE)?;
    Ok(dashboard)
}

fn dashboard() -> Dashboard<RecordingRenderer> {
    dashboard_with(DashboardConfig::default()).expect("dashboard")
}

fn last_frame(dashboard: &Dashboard<RecordingRenderer>, view: ViewId) -> &ViewFrame {
    dashboard.renderer().last_for(view).expect("frame")
}

fn bar_keys(frame: &ViewFrame) -> Vec<String> {
    match &frame.content {
        FrameContent::Bars(bars) => bars.iter().map(|bar| bar.key.clone()).collect(),
        other => panic!("expected bars, got {other:?}"),
    }
}

fn years(start: i32, end: i32) -> YearRange {
    YearRange::new(start, end).expect("range")
}

#[test]
fn every_view_renders_once_on_registration() {
    let dashboard = dashboard();
    for view in [CONTEXT, FOCUS, RANKING, GUIDE] {
        assert_eq!(dashboard.renderer().count_for(view), 1, "view {view}");
        assert_eq!(
            dashboard.view(view).expect("view").phase(),
            ViewPhase::Idle
        );
    }
    assert_eq!(bar_keys(last_frame(&dashboard, RANKING)), vec![
        "CD",
        "Vinyl",
        "Paid Subscriptions"
    ]);
    assert!(matches!(
        last_frame(&dashboard, GUIDE).content,
        FrameContent::Milestone(None)
    ));
}

#[test]
fn format_selection_filters_and_empty_list_restores() {
    let mut dashboard = dashboard();

    let report = dashboard.select_formats(["CD"]).expect("select formats");
    assert_eq!(report.events, 1);
    assert_eq!(report.view_deliveries, 3);
    assert_eq!(report.frames_rendered, 3);
    assert_eq!(bar_keys(last_frame(&dashboard, RANKING)), vec!["CD"]);

    match &last_frame(&dashboard, CONTEXT).content {
        FrameContent::Area { points, .. } => {
            let totals: Vec<f64> = points.iter().map(|point| point.value).collect();
            assert_eq!(totals, vec![100.0, 80.0, 60.0]);
        }
        other => panic!("expected area, got {other:?}"),
    }

    dashboard
        .select_formats(Vec::<String>::new())
        .expect("clear formats");
    assert!(dashboard.selection().active_formats().is_none());
    assert_eq!(bar_keys(last_frame(&dashboard, RANKING)).len(), 3);
}

#[test]
fn brushing_the_context_refilters_the_detail_views() {
    let mut dashboard = dashboard();

    let report = dashboard
        .input(
            CONTEXT,
            ViewInput::Brush {
                extent: Some((2000.2, 2001.7)),
                at_seconds: 0.0,
            },
        )
        .expect("brush");
    assert_eq!(report.events, 1);
    assert_eq!(report.selection_changes, 1);
    assert_eq!(report.view_deliveries, 2);
    assert_eq!(dashboard.selection().year_range(), Some(years(2000, 2001)));

    match &last_frame(&dashboard, FOCUS).content {
        FrameContent::Lines(lines) => {
            assert_eq!(lines.len(), 3);
            for line in lines {
                assert!(line.points.iter().all(|p| (2000..=2001).contains(&p.year)));
            }
        }
        other => panic!("expected lines, got {other:?}"),
    }
    assert_eq!(
        last_frame(&dashboard, FOCUS).x_domain,
        Some((2000.0, 2001.0))
    );
    // The overview keeps showing the whole timeline.
    assert_eq!(dashboard.renderer().count_for(CONTEXT), 1);

    let repeat = dashboard
        .input(
            CONTEXT,
            ViewInput::Brush {
                extent: Some((2000.9, 2001.1)),
                at_seconds: 0.1,
            },
        )
        .expect("same years");
    assert_eq!(repeat.events, 0);

    dashboard
        .input(
            CONTEXT,
            ViewInput::Brush {
                extent: None,
                at_seconds: 0.2,
            },
        )
        .expect("clear brush");
    assert_eq!(dashboard.selection().year_range(), None);
}

#[test]
fn brush_events_reach_host_subscribers_after_views() {
    let mut dashboard = dashboard();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    dashboard.subscribe(EventKind::SelectionChanged, move |event| {
        sink.borrow_mut().push(event.clone());
    });

    let report = dashboard
        .input(
            CONTEXT,
            ViewInput::Brush {
                extent: Some((1999.0, 2000.5)),
                at_seconds: 0.0,
            },
        )
        .expect("brush");
    assert_eq!(report.subscriber_deliveries, 1);
    assert_eq!(
        *seen.borrow(),
        vec![DashEvent::SelectionChanged {
            range: Some(years(1999, 2000)),
            transition: false,
            source: Some(CONTEXT),
        }]
    );
}

fn brush_on(
    dashboard: &mut Dashboard<RecordingRenderer>,
    view: ViewId,
    extent: (f64, f64),
    at: f64,
) {
    dashboard
        .input(
            view,
            ViewInput::Brush {
                extent: Some(extent),
                at_seconds: at,
            },
        )
        .expect("brush");
}

fn drawn_brush(dashboard: &Dashboard<RecordingRenderer>, view: ViewId) -> Option<YearRange> {
    match &last_frame(dashboard, view).content {
        FrameContent::Area { brush, .. } => *brush,
        other => panic!("expected area, got {other:?}"),
    }
}

#[test]
fn rebrushing_a_range_after_another_context_moved_the_selection_restores_it() {
    let mut dashboard = dashboard();
    let second = ViewId(5);
    dashboard
        .add_context_view(second, MetricKind::Units)
        .expect("second context");

    brush_on(&mut dashboard, CONTEXT, (1999.0, 2000.5), 0.0);
    assert_eq!(dashboard.selection().year_range(), Some(years(1999, 2000)));
    assert_eq!(drawn_brush(&dashboard, second), Some(years(1999, 2000)));

    brush_on(&mut dashboard, second, (2000.0, 2001.5), 0.1);
    assert_eq!(dashboard.selection().year_range(), Some(years(2000, 2001)));
    assert_eq!(drawn_brush(&dashboard, CONTEXT), Some(years(2000, 2001)));

    let report = dashboard
        .input(
            CONTEXT,
            ViewInput::Brush {
                extent: Some((1999.0, 2000.5)),
                at_seconds: 0.2,
            },
        )
        .expect("rebrush");
    assert_eq!(report.events, 1);
    assert_eq!(dashboard.selection().year_range(), Some(years(1999, 2000)));
    assert_eq!(drawn_brush(&dashboard, second), Some(years(1999, 2000)));
}

#[test]
fn rebrushing_after_the_host_cleared_the_years_publishes_again() {
    let mut dashboard = dashboard();

    brush_on(&mut dashboard, CONTEXT, (1999.0, 2000.5), 0.0);
    dashboard.select_years(None).expect("clear years");
    assert_eq!(dashboard.selection().year_range(), None);
    assert_eq!(drawn_brush(&dashboard, CONTEXT), None);

    brush_on(&mut dashboard, CONTEXT, (1999.0, 2000.5), 0.1);
    assert_eq!(dashboard.selection().year_range(), Some(years(1999, 2000)));
}

#[test]
fn publish_on_settle_waits_for_the_gesture_to_end() {
    let config = DashboardConfig::default().with_coalesce_policy(CoalescePolicy::PublishOnSettle);
    let mut dashboard = dashboard_with(config).expect("dashboard");

    for (step, end) in [2000.5, 2001.5].into_iter().enumerate() {
        let report = dashboard
            .input(
                CONTEXT,
                ViewInput::Brush {
                    extent: Some((1999.0, end)),
                    at_seconds: step as f64 * 0.05,
                },
            )
            .expect("brush");
        assert_eq!(report.events, 0);
    }
    assert_eq!(dashboard.selection().year_range(), None);

    let report = dashboard
        .input(CONTEXT, ViewInput::BrushEnd { at_seconds: 0.2 })
        .expect("brush end");
    assert_eq!(report.events, 1);
    assert_eq!(dashboard.selection().year_range(), Some(years(1999, 2001)));
}

#[test]
fn marker_click_recenters_selection_and_shows_milestone() {
    let mut dashboard = dashboard();

    let report = dashboard
        .input(CONTEXT, ViewInput::MarkerClick { year: 2000 })
        .expect("marker click");
    assert_eq!(report.events, 2);
    assert_eq!(dashboard.selection().active_milestone_year(), Some(2000));
    assert_eq!(dashboard.selection().year_range(), Some(years(1999, 2001)));

    match &last_frame(&dashboard, GUIDE).content {
        FrameContent::Milestone(Some(card)) => {
            assert_eq!(card.year, 2000);
            assert_eq!(card.image_path, "img/napster.png");
        }
        other => panic!("expected milestone card, got {other:?}"),
    }

    match &last_frame(&dashboard, CONTEXT).content {
        FrameContent::Area { brush, markers, .. } => {
            assert_eq!(*brush, Some(years(1999, 2001)));
            let selected: Vec<i32> = markers
                .iter()
                .filter(|marker| marker.selected)
                .map(|marker| marker.year)
                .collect();
            assert_eq!(selected, vec![2000]);
        }
        other => panic!("expected area, got {other:?}"),
    }
}

#[test]
fn guide_navigation_wraps_and_drives_the_selection() {
    let mut dashboard = dashboard();

    dashboard
        .input(GUIDE, ViewInput::StepMilestone(MilestoneStep::Previous))
        .expect("previous");
    assert_eq!(dashboard.selection().active_milestone_year(), Some(2001));
    assert_eq!(dashboard.selection().year_range(), Some(years(2000, 2001)));

    dashboard
        .input(GUIDE, ViewInput::StepMilestone(MilestoneStep::Next))
        .expect("next");
    assert_eq!(dashboard.selection().active_milestone_year(), Some(2000));
}

#[test]
fn slider_rescales_only_the_focus_view() {
    let mut dashboard = dashboard();
    let ranking_frames = dashboard.renderer().count_for(RANKING);

    let report = dashboard
        .input(FOCUS, ViewInput::SliderDrag { pixel_y: 0.0 })
        .expect("slider");
    assert_eq!(report.events, 1);
    assert_eq!(report.view_deliveries, 1);
    assert_relative_eq!(last_frame(&dashboard, FOCUS).y_exponent, 0.1);
    assert_eq!(dashboard.renderer().count_for(RANKING), ranking_frames);

    let stray = dashboard
        .publish(DashEvent::ScaleChanged {
            target: RANKING,
            exponent: 0.5,
        })
        .expect("targeted scale");
    assert_eq!(stray.view_deliveries, 0);
}

#[test]
fn hover_highlights_without_refiltering() {
    let mut dashboard = dashboard();
    dashboard.select_formats(["CD"]).expect("formats");

    let report = dashboard
        .input(
            FOCUS,
            ViewInput::Hover {
                format: Some("Vinyl".to_owned()),
            },
        )
        .expect("hover");
    assert_eq!(report.selection_changes, 1);
    assert_eq!(dashboard.selection().highlighted_format(), Some("Vinyl"));

    match &last_frame(&dashboard, FOCUS).content {
        FrameContent::Lines(lines) => {
            assert_eq!(lines.len(), 1);
            assert_eq!(lines[0].format, "CD");
            assert_eq!(lines[0].emphasis, Emphasis::Faded);
        }
        other => panic!("expected lines, got {other:?}"),
    }

    dashboard
        .input(FOCUS, ViewInput::Hover { format: None })
        .expect("leave");
    assert_eq!(bar_keys(last_frame(&dashboard, RANKING)), vec!["CD"]);
    match &last_frame(&dashboard, RANKING).content {
        FrameContent::Bars(bars) => assert_eq!(bars[0].emphasis, Emphasis::Normal),
        other => panic!("expected bars, got {other:?}"),
    }
}

#[test]
fn title_click_cycles_the_plotted_measure() {
    let mut dashboard = dashboard();
    let titles: Vec<String> = (0..3)
        .map(|_| {
            dashboard
                .input(FOCUS, ViewInput::CycleMetric)
                .expect("cycle");
            last_frame(&dashboard, FOCUS)
                .title
                .clone()
                .expect("title")
        })
        .collect();
    assert_eq!(
        titles,
        vec![
            "Value Change vs Time",
            "Value Change (normalized) vs Time",
            "Actual Value vs Time",
        ]
    );
}

#[test]
fn switching_metric_targets_one_view() {
    let mut dashboard = dashboard();
    let focus_frames = dashboard.renderer().count_for(FOCUS);

    let report = dashboard
        .switch_metric(Some(RANKING), MetricKind::PricePerUnit)
        .expect("switch");
    assert_eq!(report.view_deliveries, 1);
    assert_eq!(dashboard.renderer().count_for(FOCUS), focus_frames);

    // Price series rank by mean price: Vinyl (20.4), CD (15), subscriptions (10).
    let frame = last_frame(&dashboard, RANKING);
    assert_eq!(bar_keys(frame), vec!["Vinyl", "CD", "Paid Subscriptions"]);
    match &frame.content {
        FrameContent::Bars(bars) => {
            assert_relative_eq!(bars[0].value, (20.0 + 250.0 / 12.0) / 2.0);
            assert_relative_eq!(bars[2].value, 10.0);
        }
        other => panic!("expected bars, got {other:?}"),
    }

    let err = dashboard
        .switch_metric(Some(ViewId(99)), MetricKind::Dollars)
        .expect_err("unknown view");
    assert!(matches!(err, DashError::UnknownView(ViewId(99))));
}

#[test]
fn broadcast_metric_switch_reaches_every_series_view() {
    let mut dashboard = dashboard();
    let report = dashboard
        .switch_metric(None, MetricKind::Dollars)
        .expect("switch all");
    assert_eq!(report.view_deliveries, 3);
    match &last_frame(&dashboard, CONTEXT).content {
        FrameContent::Area { points, .. } => {
            assert_eq!(points.first().map(|point| point.value), Some(1700.0));
        }
        other => panic!("expected area, got {other:?}"),
    }
}

#[test]
fn parallel_view_follows_years_and_formats() {
    let mut dashboard = dashboard();
    let csv = "format,medium,year,units,dollars\n\
               CD,Physical,1999,100,1500\n\
               CD,Physical,2000,80,1200\n\
               Vinyl,Physical,2000,12,250\n";
    let table = ParaTable::from_csv(csv.as_bytes()).expect("table");
    let para = ViewId(5);
    dashboard
        .add_parallel_view(para, Rc::new(table))
        .expect("parallel view");

    match &last_frame(&dashboard, para).content {
        FrameContent::Polylines {
            dimensions,
            extents,
            lines,
        } => {
            assert_eq!(dimensions, &vec!["units".to_owned(), "dollars".to_owned()]);
            assert_eq!(extents[0], Some((12.0, 100.0)));
            assert_eq!(lines.len(), 3);
        }
        other => panic!("expected polylines, got {other:?}"),
    }

    dashboard.select_formats(["Vinyl"]).expect("formats");
    assert_eq!(last_frame(&dashboard, para).content.mark_count(), 1);

    dashboard
        .select_years(Some(years(1999, 1999)))
        .expect("years");
    match &last_frame(&dashboard, para).content {
        FrameContent::Polylines { extents, lines, .. } => {
            assert!(lines.is_empty());
            assert_eq!(extents[0], None);
        }
        other => panic!("expected polylines, got {other:?}"),
    }
}

#[test]
fn empty_filter_results_render_empty_frames() {
    let mut dashboard = dashboard();
    dashboard.select_formats(["Cassette"]).expect("formats");
    let frame = last_frame(&dashboard, FOCUS);
    assert!(frame.is_empty());
    assert_eq!(frame.x_domain, None);
    assert_eq!(frame.y_domain, None);
}

#[test]
fn view_registry_rejects_duplicates_and_unknown_inputs() {
    let mut dashboard = dashboard();
    let err = dashboard
        .add_ranking_view(RANKING, MetricKind::Dollars, RankKey::Medium)
        .expect_err("duplicate");
    assert!(matches!(err, DashError::DuplicateView(RANKING)));

    assert!(dashboard.remove_view(RANKING));
    assert!(!dashboard.remove_view(RANKING));
    assert_eq!(dashboard.view_ids(), vec![CONTEXT, FOCUS, GUIDE]);

    let err = dashboard
        .input(RANKING, ViewInput::CycleMetric)
        .expect_err("removed view");
    assert!(matches!(err, DashError::UnknownView(RANKING)));
}

#[test]
fn runaway_cascades_are_cut_off() {
    let config = DashboardConfig::default().with_max_cascade_events(1);
    let mut dashboard = dashboard_with(config).expect("dashboard");

    let err = dashboard
        .input(CONTEXT, ViewInput::MarkerClick { year: 2000 })
        .expect_err("cascade");
    assert!(matches!(err, DashError::DispatchOverflow { limit: 1 }));
    assert_eq!(dashboard.pending_events(), 0);
}
