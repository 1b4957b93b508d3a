use chrono::{DateTime, Utc};
use mimic_model::PooledSoftmaxClassifier;
use mimic_pipeline::{InferenceStep, TrainingReport};
use serde::{Deserialize, Serialize};

/// A trained classifier with provenance, stored as JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelFile {
    pub name: String,
    pub trained_at: DateTime<Utc>,
    /// Training steps applied over the model's lifetime.
    pub steps: usize,
    /// Loss of the most recent training step.
    pub final_loss: Option<f32>,
    /// Whether the training frames were letterboxed rather than cropped to cover.
    #[serde(default)]
    pub letterbox: bool,
    pub classifier: PooledSoftmaxClassifier,
}

impl ModelFile {
    /// Wraps a freshly created classifier.
    pub fn untrained(
        name: impl Into<String>,
        classifier: PooledSoftmaxClassifier,
        letterbox: bool,
    ) -> Self {
        Self {
            name: name.into(),
            trained_at: Utc::now(),
            steps: 0,
            final_loss: None,
            letterbox,
            classifier,
        }
    }

    /// Inference that scales captures the way the training frames were scaled.
    pub fn inference(&self) -> InferenceStep {
        InferenceStep::new(self.letterbox)
    }

    /// Records a completed training run.
    pub fn record_training(&mut self, report: &TrainingReport) {
        if report.is_empty() {
            return;
        }
        self.trained_at = Utc::now();
        self.steps += report.len();
        self.final_loss = report.final_loss();
    }
}
