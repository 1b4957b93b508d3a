//! Sequential per-example training over the replay buffer.
//!
//! Training walks the buffer in insertion order and issues exactly one fit
//! call per entry: step `i` trains on entry `i`. There is no shuffling, no
//! sampling with replacement and no mini-batching; the configured batch size
//! is passed through to the classifier unchanged.
//!
//! Steps are strictly sequential. A failed fit call aborts the run and is never
//! retried, since a partially applied update cannot be undone.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::{Classifier, ClassifierError, FitConfig, PipelineConfig, ReplayBuffer};

/// Result of one training step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepReport {
    /// Index of the buffer entry trained on.
    pub step: usize,
    pub loss: f32,
    pub accuracy: f32,
}

/// All step reports of one training run, in step order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    steps: Vec<StepReport>,
}

impl TrainingReport {
    #[must_use]
    pub fn steps(&self) -> &[StepReport] {
        &self.steps
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    #[must_use]
    pub fn final_loss(&self) -> Option<f32> {
        self.steps.last().map(|s| s.loss)
    }

    #[must_use]
    pub fn mean_loss(&self) -> Option<f32> {
        self.mean_of(|s| s.loss)
    }

    #[must_use]
    pub fn mean_accuracy(&self) -> Option<f32> {
        self.mean_of(|s| s.accuracy)
    }

    fn mean_of(&self, f: impl Fn(&StepReport) -> f32) -> Option<f32> {
        if self.steps.is_empty() {
            return None;
        }
        #[expect(clippy::cast_precision_loss)]
        let len = self.steps.len() as f32;
        Some(self.steps.iter().map(f).sum::<f32>() / len)
    }
}

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum TrainError {
    #[display(
        "training requested {requested} iterations but the replay buffer holds {available} entries"
    )]
    BufferUnderrun { requested: usize, available: usize },
    #[display("training step {step} failed")]
    Classifier {
        step: usize,
        source: ClassifierError,
    },
}

/// Drives a [`Classifier`] over a [`ReplayBuffer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrainingLoop {
    iterations: usize,
    fit_config: FitConfig,
    letterbox: bool,
}

impl TrainingLoop {
    #[must_use]
    pub fn new(iterations: usize, batch_size: usize) -> Self {
        Self {
            iterations,
            fit_config: FitConfig::single_epoch(batch_size),
            letterbox: false,
        }
    }

    #[must_use]
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(config.training_iterations, config.batch_size).letterbox(config.letterbox)
    }

    /// Scaling mode used for entries whose frames do not match the classifier
    /// input size.
    #[must_use]
    pub fn letterbox(self, letterbox: bool) -> Self {
        Self { letterbox, ..self }
    }

    #[must_use]
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    #[must_use]
    pub fn fit_config(&self) -> FitConfig {
        self.fit_config
    }

    /// Trains on entries `0..iterations`, calling `on_step` after each step.
    ///
    /// Fails with [`TrainError::BufferUnderrun`] before any fit call if the
    /// buffer holds fewer than `iterations` entries.
    pub fn run<C, F>(
        &self,
        classifier: &mut C,
        buffer: &ReplayBuffer,
        mut on_step: F,
    ) -> Result<TrainingReport, TrainError>
    where
        C: Classifier + ?Sized,
        F: FnMut(&StepReport),
    {
        if self.iterations > buffer.len() {
            return Err(TrainError::BufferUnderrun {
                requested: self.iterations,
                available: buffer.len(),
            });
        }

        let input_size = classifier.input_size();
        let mut report = TrainingReport::default();
        for (step, entry) in buffer.iter().take(self.iterations).enumerate() {
            // frames sampled with the classifier's size are used as-is
            let frame = if entry.frame().size() == input_size {
                Cow::Borrowed(entry.frame())
            } else {
                Cow::Owned(entry.frame().resized(input_size, self.letterbox))
            };
            let input = frame.to_input_tensor();

            let fit = classifier
                .fit(&input, entry.label(), &self.fit_config)
                .map_err(|source| TrainError::Classifier { step, source })?;
            let step_report = StepReport {
                step,
                loss: fit.loss,
                accuracy: fit.accuracy,
            };
            tracing::info!(
                step,
                loss = fit.loss,
                accuracy = fit.accuracy,
                "training step completed"
            );
            on_step(&step_report);
            report.steps.push(step_report);
        }
        Ok(report)
    }
}

/// Trains on the first `iterations` entries of `buffer`.
pub fn train<C>(
    classifier: &mut C,
    buffer: &ReplayBuffer,
    iterations: usize,
    batch_size: usize,
) -> Result<TrainingReport, TrainError>
where
    C: Classifier + ?Sized,
{
    TrainingLoop::new(iterations, batch_size).run(classifier, buffer, |_| {})
}

#[cfg(test)]
mod tests {
    use mimic_vision::TargetSize;

    use super::*;
    use crate::{
        Direction, DirectionState,
        test_util::{RecordingClassifier, labeled_entry},
    };

    fn buffer(len: u8) -> ReplayBuffer {
        (0..len)
            .map(|i| {
                let held = if i % 2 == 0 {
                    &[Direction::Up][..]
                } else {
                    &[Direction::Down, Direction::Left][..]
                };
                labeled_entry(i * 10, held)
            })
            .collect()
    }

    fn pixel_value(marker: u8) -> f32 {
        (f32::from(marker) - 127.5) / 127.5
    }

    #[test]
    fn test_fits_each_entry_in_order() {
        let buffer = buffer(5);
        let mut classifier = RecordingClassifier::new(TargetSize::new(4, 4));

        let report = train(&mut classifier, &buffer, 5, 8).unwrap();

        assert_eq!(classifier.seen.len(), 5);
        for (i, (first_value, label, config)) in classifier.seen.iter().enumerate() {
            let marker = u8::try_from(i * 10).unwrap();
            assert!((first_value - pixel_value(marker)).abs() < 1e-6);
            assert_eq!(label, buffer.get(i).unwrap().label());
            assert_eq!(*config, FitConfig { epochs: 1, batch_size: 8 });
        }
        assert_eq!(
            report.steps().iter().map(|s| s.step).collect::<Vec<_>>(),
            [0, 1, 2, 3, 4]
        );
    }

    #[test]
    fn test_partial_run_uses_leading_entries() {
        let buffer = buffer(5);
        let mut classifier = RecordingClassifier::new(TargetSize::new(4, 4));
        train(&mut classifier, &buffer, 2, 1).unwrap();
        assert_eq!(classifier.seen.len(), 2);
        assert_eq!(
            classifier.seen[1].1.decode(),
            DirectionState::from_held([Direction::Down, Direction::Left])
        );
    }

    #[test]
    fn test_underrun_fails_before_fitting() {
        let buffer = buffer(3);
        let mut classifier = RecordingClassifier::new(TargetSize::new(4, 4));

        let err = train(&mut classifier, &buffer, 4, 5).unwrap_err();

        assert_eq!(
            err,
            TrainError::BufferUnderrun {
                requested: 4,
                available: 3,
            }
        );
        assert!(classifier.seen.is_empty());
        assert_eq!(
            err.to_string(),
            "training requested 4 iterations but the replay buffer holds 3 entries"
        );
    }

    #[test]
    fn test_classifier_fault_aborts_run() {
        let buffer = buffer(5);
        let mut classifier = RecordingClassifier::new(TargetSize::new(4, 4));
        classifier.fail_at = Some(2);
        let mut observed = Vec::new();

        let err = TrainingLoop::new(5, 5)
            .run(&mut classifier, &buffer, |s| observed.push(s.step))
            .unwrap_err();

        assert_eq!(
            err,
            TrainError::Classifier {
                step: 2,
                source: ClassifierError::NonFinite,
            }
        );
        assert_eq!(observed, [0, 1]);
        assert_eq!(classifier.seen.len(), 2);
    }

    #[test]
    fn test_mismatched_frames_are_resized() {
        let buffer = buffer(2);
        let mut classifier = RecordingClassifier::new(TargetSize::new(6, 3));
        let report = train(&mut classifier, &buffer, 2, 1).unwrap();
        assert_eq!(report.len(), 2);
    }

    #[test]
    fn test_observer_sees_every_step() {
        let buffer = buffer(3);
        let mut classifier = RecordingClassifier::new(TargetSize::new(4, 4));
        let mut observed = Vec::new();
        let report = TrainingLoop::new(3, 5)
            .run(&mut classifier, &buffer, |s| observed.push(*s))
            .unwrap();
        assert_eq!(observed, report.steps());
    }

    #[test]
    fn test_report_summary() {
        let buffer = buffer(4);
        let mut classifier = RecordingClassifier::new(TargetSize::new(4, 4));
        let report = train(&mut classifier, &buffer, 4, 5).unwrap();

        // RecordingClassifier reports loss 1/n for the n-th call
        let expected_mean = (1.0 + 0.5 + 1.0 / 3.0 + 0.25) / 4.0;
        assert!((report.mean_loss().unwrap() - expected_mean).abs() < 1e-6);
        assert!((report.final_loss().unwrap() - 0.25).abs() < 1e-6);
        assert!((report.mean_accuracy().unwrap() - 0.5).abs() < 1e-6);

        let empty = train(&mut classifier, &buffer, 0, 5).unwrap();
        assert!(empty.is_empty());
        assert_eq!(empty.mean_loss(), None);
    }
}
