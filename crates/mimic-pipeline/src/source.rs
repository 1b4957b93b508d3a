use mimic_vision::{Capture, Frame};

use crate::DirectionScores;

/// Produces the current view on request.
///
/// A source may not be ready (for example before the first frame has been
/// rendered); it then returns [`CaptureUnavailable`] and the caller decides
/// whether to retry later.
pub trait CaptureSource {
    fn request_capture(&mut self) -> Result<Capture, CaptureUnavailable>;
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("capture unavailable: {reason}")]
pub struct CaptureUnavailable {
    reason: String,
}

impl CaptureUnavailable {
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

/// Optional presentation of what the pipeline sees and predicts.
pub trait DisplaySink {
    /// Called with every normalized frame (sampled or evaluated).
    fn show_frame(&mut self, _frame: &Frame) {}

    /// Called with every prediction.
    fn show_prediction(&mut self, _scores: &DirectionScores) {}
}

/// A [`DisplaySink`] that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDisplay;

impl DisplaySink for NoDisplay {}
