use std::time::Duration;

use mimic_vision::TargetSize;
use serde::{Deserialize, Serialize};

use crate::{FitConfig, SkippedTickPolicy};

/// Settings shared by sampling, training and inference.
///
/// Sampling and inference must use the same target size and letterbox flag,
/// otherwise the classifier is queried with frames unlike those it was trained
/// on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Classifier input width in pixels.
    pub target_width: u32,
    /// Classifier input height in pixels.
    pub target_height: u32,
    /// Letterbox (`true`) or cover (`false`) scaling.
    pub letterbox: bool,
    /// Delay between sampling ticks.
    pub sample_interval_ms: u64,
    /// Delay before the first sampling tick.
    pub start_delay_ms: u64,
    /// Number of samples taken before sampling stops.
    pub max_samples: usize,
    /// Whether an unavailable capture uses up a sample slot.
    pub skipped_tick_policy: SkippedTickPolicy,
    /// Number of buffer entries consumed by one training run.
    pub training_iterations: usize,
    /// Batch size forwarded to each fit call.
    pub batch_size: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            target_width: TargetSize::CLASSIFIER_INPUT.width,
            target_height: TargetSize::CLASSIFIER_INPUT.height,
            letterbox: false,
            sample_interval_ms: 250,
            start_delay_ms: 1000,
            max_samples: 50,
            skipped_tick_policy: SkippedTickPolicy::default(),
            training_iterations: 50,
            batch_size: 5,
        }
    }
}

impl PipelineConfig {
    #[must_use]
    pub fn target_size(&self) -> TargetSize {
        TargetSize::new(self.target_width, self.target_height)
    }

    #[must_use]
    pub fn sample_interval(&self) -> Duration {
        Duration::from_millis(self.sample_interval_ms)
    }

    #[must_use]
    pub fn start_delay(&self) -> Duration {
        Duration::from_millis(self.start_delay_ms)
    }

    #[must_use]
    pub fn fit_config(&self) -> FitConfig {
        FitConfig::single_epoch(self.batch_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: PipelineConfig =
            serde_json::from_str(r#"{"max_samples": 10, "letterbox": true}"#).unwrap();
        assert_eq!(config.max_samples, 10);
        assert!(config.letterbox);
        assert_eq!(config.target_size(), TargetSize::new(224, 224));
        assert_eq!(config.sample_interval(), Duration::from_millis(250));
        assert_eq!(config.fit_config(), FitConfig::single_epoch(5));
    }

    #[test]
    fn test_policy_is_kebab_case() {
        let config: PipelineConfig =
            serde_json::from_str(r#"{"skipped_tick_policy": "consume"}"#).unwrap();
        assert_eq!(config.skipped_tick_policy, SkippedTickPolicy::Consume);
    }

    #[test]
    fn test_unknown_fields_are_rejected() {
        assert!(serde_json::from_str::<PipelineConfig>(r#"{"max_sample": 10}"#).is_err());
    }
}
