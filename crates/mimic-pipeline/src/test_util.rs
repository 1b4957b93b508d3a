//! Mock collaborators shared by the unit tests.

use std::cell::Cell;

use image::{Rgb, RgbImage};
use mimic_vision::{Capture, Frame, InputTensor, TargetSize};

use crate::{
    CaptureSource, CaptureUnavailable, Classifier, ClassifierError, Direction, DirectionScores,
    DirectionState, DisplaySink, EncodedLabel, FitConfig, FitReport, LABEL_LEN, ReplayEntry,
};

/// A 4x4 frame whose red channel is `marker`, labeled with `held`.
pub fn labeled_entry(marker: u8, held: &[Direction]) -> ReplayEntry {
    let frame = Frame::from_image(RgbImage::from_pixel(4, 4, Rgb([marker, 0, 0])));
    ReplayEntry::new(frame, DirectionState::from_held(held.iter().copied()).encode())
}

/// Serves a scripted sequence of captures; `None` entries are unavailable.
#[derive(Debug)]
pub struct ScriptedSource {
    script: Vec<Option<u8>>,
    requests: usize,
}

impl ScriptedSource {
    pub fn new(script: Vec<Option<u8>>) -> Self {
        Self {
            script,
            requests: 0,
        }
    }

    pub fn requests(&self) -> usize {
        self.requests
    }
}

impl CaptureSource for ScriptedSource {
    fn request_capture(&mut self) -> Result<Capture, CaptureUnavailable> {
        let step = self.script.get(self.requests).copied().flatten();
        self.requests += 1;
        step.map(|marker| Capture::new(RgbImage::from_pixel(8, 8, Rgb([marker, 0, 0]))))
            .ok_or_else(|| CaptureUnavailable::new("renderer not ready"))
    }
}

/// Records every fit call; optionally fails at a given call.
#[derive(Debug)]
pub struct RecordingClassifier {
    pub input_size: TargetSize,
    pub seen: Vec<(f32, EncodedLabel, FitConfig)>,
    pub fail_at: Option<usize>,
    pub forward_calls: Cell<usize>,
    pub bias: f32,
}

impl RecordingClassifier {
    pub fn new(input_size: TargetSize) -> Self {
        Self {
            input_size,
            seen: Vec::new(),
            fail_at: None,
            forward_calls: Cell::new(0),
            bias: 0.0,
        }
    }
}

impl Classifier for RecordingClassifier {
    fn input_size(&self) -> TargetSize {
        self.input_size
    }

    fn fit(
        &mut self,
        input: &InputTensor,
        label: &EncodedLabel,
        config: &FitConfig,
    ) -> Result<FitReport, ClassifierError> {
        if input.size() != self.input_size {
            return Err(ClassifierError::InputShape {
                expected: self.input_size,
                actual: input.size(),
            });
        }
        if self.fail_at == Some(self.seen.len()) {
            return Err(ClassifierError::NonFinite);
        }
        self.seen.push((input.data()[0], *label, *config));
        self.bias += 0.125;
        #[expect(clippy::cast_precision_loss)]
        let loss = 1.0 / self.seen.len() as f32;
        Ok(FitReport {
            loss,
            accuracy: 0.5,
        })
    }

    fn forward(&self, input: &InputTensor) -> Result<DirectionScores, ClassifierError> {
        self.forward_calls.set(self.forward_calls.get() + 1);
        let mean = input.data().iter().sum::<f32>() / 100.0;
        Ok(DirectionScores([mean + self.bias; LABEL_LEN]))
    }
}

/// Keeps everything shown to it.
#[derive(Debug, Default)]
pub struct RecordingDisplay {
    pub frames: Vec<Frame>,
    pub predictions: Vec<DirectionScores>,
}

impl DisplaySink for RecordingDisplay {
    fn show_frame(&mut self, frame: &Frame) {
        self.frames.push(frame.clone());
    }

    fn show_prediction(&mut self, scores: &DirectionScores) {
        self.predictions.push(*scores);
    }
}
