use mimic_pipeline::{
    Classifier, ClassifierError, DirectionScores, EncodedLabel, FitConfig, FitReport, LABEL_LEN,
};
use mimic_vision::{InputTensor, TargetSize};
use serde::{Deserialize, Serialize};

use crate::{ClassifierConfig, ModelConfigError, init, loss, pooling};

/// Average pooling followed by a dense softmax layer.
///
/// See the [crate documentation](crate) for the architecture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ModelParameters", into = "ModelParameters")]
pub struct PooledSoftmaxClassifier {
    input_size: TargetSize,
    pool_grid: u32,
    learning_rate: f32,
    /// `LABEL_LEN × feature_len`, row-major.
    weights: Vec<f32>,
    bias: [f32; LABEL_LEN],
}

/// Serialized form of [`PooledSoftmaxClassifier`].
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ModelParameters {
    input_size: TargetSize,
    pool_grid: u32,
    learning_rate: f32,
    weights: Vec<f32>,
    bias: [f32; LABEL_LEN],
}

impl TryFrom<ModelParameters> for PooledSoftmaxClassifier {
    type Error = ModelConfigError;

    fn try_from(params: ModelParameters) -> Result<Self, Self::Error> {
        let config = ClassifierConfig {
            pool_grid: params.pool_grid,
            learning_rate: params.learning_rate,
            seed: 0,
        };
        config.validate(params.input_size)?;

        let expected = LABEL_LEN * pooling::feature_len(params.pool_grid);
        if params.weights.len() != expected {
            return Err(ModelConfigError::WeightShape {
                expected,
                actual: params.weights.len(),
            });
        }
        if !params
            .weights
            .iter()
            .chain(&params.bias)
            .all(|v| v.is_finite())
        {
            return Err(ModelConfigError::NonFiniteParameter);
        }

        Ok(Self {
            input_size: params.input_size,
            pool_grid: params.pool_grid,
            learning_rate: params.learning_rate,
            weights: params.weights,
            bias: params.bias,
        })
    }
}

impl From<PooledSoftmaxClassifier> for ModelParameters {
    fn from(model: PooledSoftmaxClassifier) -> Self {
        Self {
            input_size: model.input_size,
            pool_grid: model.pool_grid,
            learning_rate: model.learning_rate,
            weights: model.weights,
            bias: model.bias,
        }
    }
}

impl PooledSoftmaxClassifier {
    /// Creates an untrained classifier with Glorot-normal weights.
    pub fn new(input_size: TargetSize, config: &ClassifierConfig) -> Result<Self, ModelConfigError> {
        config.validate(input_size)?;
        let feature_len = pooling::feature_len(config.pool_grid);
        let mut rng = init::seeded_rng(config.seed);
        let weights = init::glorot_normal(&mut rng, feature_len, LABEL_LEN);
        tracing::debug!(
            %input_size,
            pool_grid = config.pool_grid,
            feature_len,
            seed = config.seed,
            "initialized classifier"
        );
        Ok(Self {
            input_size,
            pool_grid: config.pool_grid,
            learning_rate: config.learning_rate,
            weights,
            bias: [0.0; LABEL_LEN],
        })
    }

    #[must_use]
    pub fn pool_grid(&self) -> u32 {
        self.pool_grid
    }

    #[must_use]
    pub fn learning_rate(&self) -> f32 {
        self.learning_rate
    }

    /// Changes the step size used by subsequent fit calls.
    pub fn set_learning_rate(&mut self, learning_rate: f32) -> Result<(), ModelConfigError> {
        if !(learning_rate.is_finite() && learning_rate > 0.0) {
            return Err(ModelConfigError::LearningRate {
                value: learning_rate,
            });
        }
        self.learning_rate = learning_rate;
        Ok(())
    }

    #[must_use]
    pub fn parameter_count(&self) -> usize {
        self.weights.len() + self.bias.len()
    }

    fn check_input(&self, input: &InputTensor) -> Result<(), ClassifierError> {
        if input.size() == self.input_size {
            Ok(())
        } else {
            Err(ClassifierError::InputShape {
                expected: self.input_size,
                actual: input.size(),
            })
        }
    }

    fn logits(&self, features: &[f32]) -> [f32; LABEL_LEN] {
        std::array::from_fn(|k| {
            let row = &self.weights[k * features.len()..][..features.len()];
            self.bias[k] + row.iter().zip(features).map(|(w, f)| w * f).sum::<f32>()
        })
    }

    fn probabilities(&self, features: &[f32]) -> Result<[f32; LABEL_LEN], ClassifierError> {
        let probs = loss::softmax(&self.logits(features));
        if probs.iter().all(|p| p.is_finite()) {
            Ok(probs)
        } else {
            Err(ClassifierError::NonFinite)
        }
    }
}

impl Classifier for PooledSoftmaxClassifier {
    fn input_size(&self) -> TargetSize {
        self.input_size
    }

    /// Takes one gradient descent step per epoch on this single example.
    ///
    /// The reported loss and accuracy are those of the last epoch, measured
    /// before its update. `batch_size` only has to be positive: a single
    /// example always forms one batch.
    fn fit(
        &mut self,
        input: &InputTensor,
        label: &EncodedLabel,
        config: &FitConfig,
    ) -> Result<FitReport, ClassifierError> {
        self.check_input(input)?;
        if config.epochs == 0 || config.batch_size == 0 {
            return Err(ClassifierError::InvalidConfig {
                reason: format!(
                    "epochs and batch size must be positive (epochs: {}, batch size: {})",
                    config.epochs, config.batch_size
                ),
            });
        }

        let features = pooling::average_pool(input, self.pool_grid);
        let target = label.values();
        let mut report = FitReport {
            loss: 0.0,
            accuracy: 0.0,
        };
        for _ in 0..config.epochs {
            let probs = self.probabilities(&features)?;
            let step_loss = loss::categorical_cross_entropy(target, &probs);
            if !step_loss.is_finite() {
                return Err(ClassifierError::NonFinite);
            }
            let correct = loss::argmax(target) == loss::argmax(&probs);
            report = FitReport {
                loss: step_loss,
                accuracy: if correct { 1.0 } else { 0.0 },
            };

            let grad = loss::softmax_cross_entropy_grad(target, &probs);
            let feature_len = features.len();
            for (k, g) in grad.iter().enumerate() {
                let step = self.learning_rate * g;
                let row = &mut self.weights[k * feature_len..][..feature_len];
                for (w, f) in row.iter_mut().zip(&features) {
                    *w -= step * f;
                }
                self.bias[k] -= step;
            }
        }
        Ok(report)
    }

    fn forward(&self, input: &InputTensor) -> Result<DirectionScores, ClassifierError> {
        self.check_input(input)?;
        let features = pooling::average_pool(input, self.pool_grid);
        self.probabilities(&features).map(DirectionScores)
    }
}
