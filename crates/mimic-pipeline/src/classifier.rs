use mimic_vision::{InputTensor, TargetSize};
use serde::{Deserialize, Serialize};

use crate::{DirectionScores, EncodedLabel};

/// A trainable image classifier mapping frames to direction scores.
///
/// The pipeline treats implementations as opaque, stateful resources:
/// [`fit`](Self::fit) updates the state in place and is never retried, and
/// [`forward`](Self::forward) must not change it.
pub trait Classifier {
    /// Size of the frames the classifier accepts.
    fn input_size(&self) -> TargetSize;

    /// Runs one fit call on a single example.
    fn fit(
        &mut self,
        input: &InputTensor,
        label: &EncodedLabel,
        config: &FitConfig,
    ) -> Result<FitReport, ClassifierError>;

    /// Computes scores without updating any state.
    fn forward(&self, input: &InputTensor) -> Result<DirectionScores, ClassifierError>;
}

/// Configuration passed through to each fit call.
///
/// Each call receives a single example, so `batch_size` does not change how
/// many examples are used; it is forwarded as-is for the classifier to report
/// and aggregate with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FitConfig {
    pub epochs: usize,
    pub batch_size: usize,
}

impl FitConfig {
    #[must_use]
    pub const fn single_epoch(batch_size: usize) -> Self {
        Self {
            epochs: 1,
            batch_size,
        }
    }
}

/// Loss and accuracy reported by one fit call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitReport {
    pub loss: f32,
    pub accuracy: f32,
}

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum ClassifierError {
    #[display("input is {actual}, classifier expects {expected}")]
    InputShape {
        expected: TargetSize,
        actual: TargetSize,
    },
    #[display("invalid fit configuration: {reason}")]
    InvalidConfig { reason: String },
    #[display("classifier produced a non-finite value")]
    NonFinite,
}
