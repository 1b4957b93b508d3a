use mimic_vision::TargetSize;
use serde::{Deserialize, Serialize};

/// Hyperparameters of [`PooledSoftmaxClassifier`](crate::PooledSoftmaxClassifier).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClassifierConfig {
    /// Number of pooling cells along each axis.
    pub pool_grid: u32,
    /// Step size of the gradient descent update.
    pub learning_rate: f32,
    /// Seed for weight initialization.
    pub seed: u64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            pool_grid: 8,
            learning_rate: 0.01,
            seed: 0,
        }
    }
}

impl ClassifierConfig {
    /// Checks the configuration against the input size it will be used with.
    pub fn validate(&self, input_size: TargetSize) -> Result<(), ModelConfigError> {
        if input_size.width == 0 || input_size.height == 0 {
            return Err(ModelConfigError::EmptyInput { input_size });
        }
        if self.pool_grid == 0
            || self.pool_grid > input_size.width
            || self.pool_grid > input_size.height
        {
            return Err(ModelConfigError::PoolGrid {
                grid: self.pool_grid,
                input_size,
            });
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(ModelConfigError::LearningRate {
                value: self.learning_rate,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum ModelConfigError {
    #[display("input size {input_size} has no pixels")]
    EmptyInput { input_size: TargetSize },
    #[display("pooling grid {grid} does not fit input size {input_size}")]
    PoolGrid { grid: u32, input_size: TargetSize },
    #[display("learning rate must be positive and finite, got {value}")]
    LearningRate { value: f32 },
    #[display("weight matrix has {actual} values, expected {expected}")]
    WeightShape { expected: usize, actual: usize },
    #[display("model parameters contain non-finite values")]
    NonFiniteParameter,
}
