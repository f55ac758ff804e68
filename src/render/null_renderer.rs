use crate::error::DashResult;
use crate::render::{Renderer, ViewFrame};
use crate::views::ViewId;

/// No-op renderer used by tests and headless dashboards.
///
/// It still validates every frame so invalid geometry is caught before a real
/// backend is attached.
#[derive(Debug, Default)]
pub struct NullRenderer {
    pub frames_rendered: usize,
    pub last_view: Option<ViewId>,
    pub last_mark_count: usize,
}

impl Renderer for NullRenderer {
    fn render(&mut self, frame: &ViewFrame) -> DashResult<()> {
        frame.validate()?;
        self.frames_rendered += 1;
        self.last_view = Some(frame.view);
        self.last_mark_count = frame.content.mark_count();
        Ok(())
    }
}

/// Renderer that keeps every validated frame, for inspection in tests and tools.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    pub frames: Vec<ViewFrame>,
}

impl RecordingRenderer {
    /// Most recent frame drawn for `view`.
    #[must_use]
    pub fn last_for(&self, view: ViewId) -> Option<&ViewFrame> {
        self.frames.iter().rev().find(|frame| frame.view == view)
    }

    #[must_use]
    pub fn count_for(&self, view: ViewId) -> usize {
        self.frames.iter().filter(|frame| frame.view == view).count()
    }
}

impl Renderer for RecordingRenderer {
    fn render(&mut self, frame: &ViewFrame) -> DashResult<()> {
        frame.validate()?;
        self.frames.push(frame.clone());
        Ok(())
    }
}
