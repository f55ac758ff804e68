mod frame;
mod null_renderer;

pub use frame::{
    Emphasis, FrameBar, FrameContent, FrameLine, FramePolyline, MilestoneCard, ViewFrame,
    YearValue,
};
pub use null_renderer::{NullRenderer, RecordingRenderer};

use crate::error::DashResult;

/// Contract implemented by any drawing backend.
///
/// Backends receive a fully materialized `ViewFrame`, so drawing code stays
/// isolated from filtering, aggregation and event handling.
pub trait Renderer {
    fn render(&mut self, frame: &ViewFrame) -> DashResult<()>;
}
