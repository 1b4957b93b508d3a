use mimic_vision::{Capture, Frame};

use crate::{Classifier, ClassifierError, DirectionScores, DisplaySink, PipelineConfig};

/// Normalizes a capture and runs it through the classifier.
///
/// The classifier is borrowed immutably, so inference leaves its state
/// untouched and repeated calls on the same capture return the same scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InferenceStep {
    letterbox: bool,
}

impl InferenceStep {
    #[must_use]
    pub fn new(letterbox: bool) -> Self {
        Self { letterbox }
    }

    #[must_use]
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(config.letterbox)
    }

    #[must_use]
    pub fn letterbox(&self) -> bool {
        self.letterbox
    }

    pub fn predict<C>(
        &self,
        classifier: &C,
        capture: &Capture,
    ) -> Result<DirectionScores, ClassifierError>
    where
        C: Classifier + ?Sized,
    {
        let frame = Frame::normalize(capture, classifier.input_size(), self.letterbox);
        classifier.forward(&frame.to_input_tensor())
    }

    /// Like [`predict`](Self::predict), also showing the normalized frame and
    /// the resulting scores.
    pub fn predict_with_display<C>(
        &self,
        classifier: &C,
        capture: &Capture,
        display: &mut dyn DisplaySink,
    ) -> Result<DirectionScores, ClassifierError>
    where
        C: Classifier + ?Sized,
    {
        let frame = Frame::normalize(capture, classifier.input_size(), self.letterbox);
        display.show_frame(&frame);
        let scores = classifier.forward(&frame.to_input_tensor())?;
        tracing::debug!(?scores, "prediction");
        display.show_prediction(&scores);
        Ok(scores)
    }
}

#[cfg(test)]
mod tests {
    use image::{Rgb, RgbImage};
    use mimic_vision::TargetSize;

    use super::*;
    use crate::test_util::{RecordingClassifier, RecordingDisplay};

    fn capture() -> Capture {
        Capture::new(RgbImage::from_fn(20, 10, |x, y| {
            Rgb([u8::try_from(x * 10).unwrap(), u8::try_from(y * 20).unwrap(), 7])
        }))
    }

    #[test]
    fn test_predict_is_repeatable() {
        let classifier = RecordingClassifier::new(TargetSize::new(8, 8));
        let step = InferenceStep::new(false);
        let capture = capture();

        let first = step.predict(&classifier, &capture).unwrap();
        let second = step.predict(&classifier, &capture).unwrap();

        assert_eq!(first, second);
        assert_eq!(classifier.forward_calls.get(), 2);
        assert!(classifier.seen.is_empty());
    }

    #[test]
    fn test_scaling_mode_changes_input() {
        let classifier = RecordingClassifier::new(TargetSize::new(8, 8));
        let capture = capture();
        let cover = InferenceStep::new(false).predict(&classifier, &capture).unwrap();
        let letterbox = InferenceStep::new(true).predict(&classifier, &capture).unwrap();
        assert_ne!(cover, letterbox);
    }

    #[test]
    fn test_display_receives_frame_and_prediction() {
        let classifier = RecordingClassifier::new(TargetSize::new(6, 6));
        let mut display = RecordingDisplay::default();

        let scores = InferenceStep::new(true)
            .predict_with_display(&classifier, &capture(), &mut display)
            .unwrap();

        assert_eq!(display.frames.len(), 1);
        assert_eq!(display.frames[0].size(), TargetSize::new(6, 6));
        assert_eq!(display.predictions, [scores]);
    }
}
