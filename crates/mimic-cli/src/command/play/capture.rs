use image::RgbImage;
use mimic_arena::Arena;
use mimic_pipeline::{CaptureSource, CaptureUnavailable};
use mimic_vision::Capture;

/// Holds the most recently rendered arena view.
///
/// The view is rendered on update ticks, so it may lag a key press by one tick
/// and is missing until the first tick has run.
#[derive(Debug, Default)]
pub struct FrameCapture {
    latest: Option<RgbImage>,
    stale: bool,
}

impl FrameCapture {
    /// Marks the arena as changed since the last render.
    pub fn invalidate(&mut self) {
        self.stale = true;
    }

    /// Re-renders if the arena changed or nothing was rendered yet.
    pub fn refresh(&mut self, arena: &Arena) {
        if self.stale || self.latest.is_none() {
            self.latest = Some(arena.render());
            self.stale = false;
        }
    }

    #[must_use]
    pub fn latest(&self) -> Option<&RgbImage> {
        self.latest.as_ref()
    }
}

impl CaptureSource for FrameCapture {
    fn request_capture(&mut self) -> Result<Capture, CaptureUnavailable> {
        self.latest
            .clone()
            .map(Capture::new)
            .ok_or_else(|| CaptureUnavailable::new("no frame rendered yet"))
    }
}
