use mimic_pipeline::{DirectionScores, DisplaySink};
use mimic_vision::Frame;

pub use self::{framebuffer::FramebufferDisplay, status::StatusPanel};

mod framebuffer;
mod status;

/// Which picture the main panel shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, derive_more::Display)]
pub enum ViewMode {
    /// The arena as the operator sees it.
    #[default]
    #[display("human")]
    Human,
    /// The last frame fed to the classifier.
    #[display("machine")]
    Machine,
}

impl ViewMode {
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Human => Self::Machine,
            Self::Machine => Self::Human,
        }
    }
}

/// What the pipeline last showed: the normalized frame and the prediction.
#[derive(Debug, Default)]
pub struct PipelineView {
    pub mode: ViewMode,
    pub last_frame: Option<Frame>,
    pub last_prediction: Option<DirectionScores>,
}

impl DisplaySink for PipelineView {
    fn show_frame(&mut self, frame: &Frame) {
        self.last_frame = Some(frame.clone());
    }

    fn show_prediction(&mut self, scores: &DirectionScores) {
        self.last_prediction = Some(*scores);
    }
}
