use mimic_model::ClassifierConfig;
use mimic_pipeline::PipelineConfig;
use serde::{Deserialize, Serialize};

/// Contents of a `--config` JSON file.
///
/// ```json
/// {
///   "pipeline": { "max_samples": 100, "letterbox": true },
///   "classifier": { "learning_rate": 0.05 }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub pipeline: PipelineConfig,
    pub classifier: ClassifierConfig,
}
