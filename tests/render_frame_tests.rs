use sales_lens::core::Color;
use sales_lens::render::{
    Emphasis, FrameBar, FrameContent, FrameLine, MilestoneCard, NullRenderer, RecordingRenderer,
    Renderer, ViewFrame, YearValue,
};
use sales_lens::telemetry::{init_default_tracing, init_tracing_with_directives};
use sales_lens::views::ViewId;

fn line_frame(value: f64) -> ViewFrame {
    ViewFrame::new(
        ViewId(1),
        FrameContent::Lines(vec![FrameLine {
            format: "CD".to_owned(),
            color: Some(Color::rgb(0.1, 0.2, 0.3)),
            emphasis: Emphasis::Normal,
            points: vec![YearValue { year: 2000, value }],
        }]),
    )
    .with_domains(Some((2000.0, 2000.0)), Some((0.0, 1.0)))
}

#[test]
fn emphasis_follows_the_highlighted_key() {
    assert_eq!(Emphasis::for_key(None, "CD"), Emphasis::Normal);
    assert_eq!(Emphasis::for_key(Some("CD"), "CD"), Emphasis::Highlighted);
    assert_eq!(Emphasis::for_key(Some("CD"), "Vinyl"), Emphasis::Faded);
}

#[test]
fn frame_validation_rejects_bad_geometry() {
    line_frame(0.5).validate().expect("valid frame");
    assert!(line_frame(f64::NAN).validate().is_err());
    assert!(
        line_frame(0.5)
            .with_domains(None, Some((1.0, 0.0)))
            .validate()
            .is_err()
    );
    assert!(line_frame(0.5).with_y_exponent(0.0).validate().is_err());

    let bad_color = ViewFrame::new(
        ViewId(2),
        FrameContent::Bars(vec![FrameBar {
            key: "CD".to_owned(),
            value: 1.0,
            color: Some(Color::rgb(2.0, 0.0, 0.0)),
            emphasis: Emphasis::Normal,
        }]),
    );
    assert!(bad_color.validate().is_err());
}

#[test]
fn null_renderer_counts_validated_frames() {
    let mut renderer = NullRenderer::default();
    renderer.render(&line_frame(0.5)).expect("render");
    assert!(renderer.render(&line_frame(f64::INFINITY)).is_err());

    assert_eq!(renderer.frames_rendered, 1);
    assert_eq!(renderer.last_view, Some(ViewId(1)));
    assert_eq!(renderer.last_mark_count, 1);
}

#[test]
fn recording_renderer_indexes_frames_by_view() {
    let mut renderer = RecordingRenderer::default();
    renderer.render(&line_frame(0.1)).expect("render");
    renderer
        .render(&ViewFrame::new(
            ViewId(7),
            FrameContent::Milestone(Some(MilestoneCard {
                year: 1983,
                description: "CD launch".to_owned(),
                image_path: "img/cd.png".to_owned(),
            })),
        ))
        .expect("render");
    renderer.render(&line_frame(0.2)).expect("render");

    assert_eq!(renderer.count_for(ViewId(1)), 2);
    assert_eq!(renderer.count_for(ViewId(7)), 1);
    let last = renderer.last_for(ViewId(1)).expect("frame");
    assert!(!last.is_empty());
    assert!(renderer.last_for(ViewId(3)).is_none());
}

#[test]
fn frames_serialize_for_tooling() {
    let json = serde_json::to_string(&line_frame(0.5)).expect("serialize");
    let parsed: ViewFrame = serde_json::from_str(&json).expect("parse");
    assert_eq!(parsed, line_frame(0.5));
    assert_eq!(ViewId(3).to_string(), "#3");
}

#[test]
fn tracing_init_is_opt_in() {
    let initialized = init_default_tracing();
    if cfg!(not(feature = "telemetry")) {
        assert!(!initialized);
    }
    // A global subscriber can only be installed once per process.
    assert!(!init_tracing_with_directives("sales_lens::api=trace") || !initialized);
}
