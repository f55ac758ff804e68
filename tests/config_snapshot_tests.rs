use sales_lens::api::{
    DASHBOARD_SNAPSHOT_JSON_SCHEMA_V1, Dashboard, DashboardConfig, DashboardSnapshot, EventKind,
};
use sales_lens::core::{Medium, MetricKind, SalesRecord, SalesTables, YearRange};
use sales_lens::interaction::CoalescePolicy;
use sales_lens::render::NullRenderer;
use sales_lens::views::{RankKey, ViewId, ViewPhase};

fn tables() -> SalesTables {
    let units = vec![
        SalesRecord::new("CD", Medium::Physical, 1999, 100.0),
        SalesRecord::new("CD", Medium::Physical, 2000, 80.0),
        SalesRecord::new("Download Single", Medium::Digital, 2000, 5.0),
    ];
    let dollars = vec![
        SalesRecord::new("CD", Medium::Physical, 1999, 1500.0),
        SalesRecord::new("CD", Medium::Physical, 2000, 1200.0),
        SalesRecord::new("Download Single", Medium::Digital, 2000, 5.0),
    ];
    SalesTables::from_records(units, dollars.clone(), dollars)
}

#[test]
fn empty_json_object_yields_default_config() {
    let config = DashboardConfig::from_json_str("{}").expect("config");
    assert_eq!(config, DashboardConfig::default());
    assert_eq!(config.coalesce_policy, CoalescePolicy::DropIdentical);
    assert_eq!(config.milestone_image_dir, "img");
}

#[test]
fn config_round_trips_through_json() {
    let config = DashboardConfig::new()
        .with_coalesce_policy(CoalescePolicy::MinInterval { seconds: 0.25 })
        .with_max_cascade_events(16)
        .with_slider_height_px(120.0)
        .with_milestone_image_dir("assets/milestones");
    let json = config.to_json_pretty().expect("serialize");
    assert_eq!(DashboardConfig::from_json_str(&json).expect("parse"), config);

    let parsed = DashboardConfig::from_json_str(
        r#"{"coalesce_policy":{"policy":"publish_on_settle"}}"#,
    )
    .expect("partial config");
    assert_eq!(parsed.coalesce_policy, CoalescePolicy::PublishOnSettle);
    assert_eq!(parsed.max_cascade_events, DashboardConfig::default().max_cascade_events);
}

#[test]
fn invalid_configs_are_rejected() {
    assert!(DashboardConfig::from_json_str(r#"{"max_cascade_events":0}"#).is_err());
    assert!(DashboardConfig::from_json_str(r#"{"slider_height_px":-5.0}"#).is_err());
    assert!(
        DashboardConfig::from_json_str(
            r#"{"coalesce_policy":{"policy":"min_interval","seconds":-1.0}}"#
        )
        .is_err()
    );
    assert!(DashboardConfig::from_json_str("not json").is_err());

    let bad = DashboardConfig::default().with_max_cascade_events(0);
    assert!(Dashboard::from_tables(NullRenderer::default(), &tables(), bad).is_err());
}

#[test]
fn snapshot_captures_selection_and_views() {
    let mut dashboard =
        Dashboard::from_tables(NullRenderer::default(), &tables(), DashboardConfig::default())
            .expect("dashboard");
    dashboard
        .add_context_view(ViewId(0), MetricKind::Units)
        .expect("context");
    dashboard
        .add_ranking_view(ViewId(1), MetricKind::Dollars, RankKey::Medium)
        .expect("ranking");
    dashboard.subscribe(EventKind::SelectionChanged, |_| {});
    dashboard
        .select_years(Some(YearRange::new(2000, 2000).expect("range")))
        .expect("select");

    let snapshot = dashboard.snapshot();
    assert_eq!(snapshot.series.len(), 5);
    assert_eq!(snapshot.subscriber_count, 1);
    assert_eq!(snapshot.pending_events, 0);
    assert_eq!(snapshot.selection.year_range_start(), Some(2000));

    let context = snapshot.view(ViewId(0)).expect("context snapshot");
    assert_eq!(context.phase, ViewPhase::Idle);
    assert_eq!(context.render_count, 2);
    assert_eq!(context.displayed_marks, 2);

    let ranking = snapshot.view(ViewId(1)).expect("ranking snapshot");
    assert_eq!(ranking.label, "Dollars");
    assert_eq!(ranking.render_count, 2);
    assert_eq!(ranking.displayed_marks, 2);
    assert_eq!(dashboard.renderer().frames_rendered, 4);

    let json = dashboard
        .snapshot_json_contract_v1_pretty()
        .expect("snapshot json");
    assert!(json.contains("\"schema_version\": 1"));
    let parsed = DashboardSnapshot::from_json_compat_str(&json).expect("parse");
    assert_eq!(parsed, snapshot);

    let bare = serde_json::to_string(&snapshot).expect("bare json");
    assert_eq!(
        DashboardSnapshot::from_json_compat_str(&bare).expect("bare parse"),
        snapshot
    );
}

#[test]
fn unsupported_snapshot_schema_is_rejected() {
    let dashboard =
        Dashboard::from_tables(NullRenderer::default(), &tables(), DashboardConfig::default())
            .expect("dashboard");
    let json = dashboard
        .snapshot_json_contract_v1_pretty()
        .expect("snapshot json")
        .replace(
            &format!("\"schema_version\": {DASHBOARD_SNAPSHOT_JSON_SCHEMA_V1}"),
            "\"schema_version\": 2",
        );
    let err = DashboardSnapshot::from_json_compat_str(&json).expect_err("schema");
    assert!(err.to_string().contains("unsupported snapshot schema version"));
}
