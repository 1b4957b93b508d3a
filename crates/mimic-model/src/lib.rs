//! A small trainable classifier for predicting held direction keys from frames.
//!
//! This crate provides [`PooledSoftmaxClassifier`], a concrete implementation of
//! [`mimic_pipeline::Classifier`] that can be trained online, one example at a
//! time, without any external runtime.
//!
//! # How It Works
//!
//! 1. **Pooling** - The `width × height × 3` input tensor is average-pooled into
//!    a `grid × grid × 3` feature vector (see [`pooling`])
//! 2. **Dense layer** - A weight matrix and bias map the features to one logit
//!    per direction
//! 3. **Softmax** - Logits become scores that sum to 1 (see [`loss`])
//! 4. **Update** - Each fit call takes one stochastic gradient descent step per
//!    epoch on the categorical cross-entropy loss
//!
//! # Architecture
//!
//! ```text
//! InputTensor (224×224×3, values in [-1, 1])
//!     ↓ average pooling
//! Features (grid×grid×3)
//!     ↓ dense (4 × features) + bias
//! Logits [up, right, down, left]
//!     ↓ softmax
//! DirectionScores
//! ```
//!
//! # Initialization
//!
//! Weights use Glorot-normal initialization drawn from a seeded PCG generator,
//! so a given [`ClassifierConfig`] always produces the same untrained model.
//! Biases start at zero.
//!
//! # Persistence
//!
//! The classifier implements `Serialize`/`Deserialize`. Deserialization
//! validates the weight matrix against the pooling grid, so a model file
//! edited by hand or saved with another grid size is rejected instead of
//! producing out-of-bounds reads.
//!
//! # Example
//!
//! ```
//! use mimic_model::{ClassifierConfig, PooledSoftmaxClassifier};
//! use mimic_pipeline::Classifier;
//! use mimic_vision::TargetSize;
//!
//! let classifier =
//!     PooledSoftmaxClassifier::new(TargetSize::new(32, 32), &ClassifierConfig::default()).unwrap();
//! assert_eq!(classifier.input_size(), TargetSize::new(32, 32));
//! ```

pub use self::{classifier::*, config::*};

mod classifier;
mod config;
pub mod init;
pub mod loss;
pub mod pooling;
