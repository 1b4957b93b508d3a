//! Imitation-learning pipeline: capture, label, train, infer.
//!
//! This crate turns an operator's own play into a supervised dataset and uses
//! it to train a classifier that predicts the held direction keys from what is
//! on screen.
//!
//! # How It Works
//!
//! 1. **Sampling** - A [`Sampler`] snapshots the view at a fixed interval,
//!    normalizes the capture and labels it with the currently held keys
//! 2. **Buffering** - Labeled examples accumulate in a [`ReplayBuffer`] in the
//!    order they were captured
//! 3. **Training** - A [`TrainingLoop`] feeds the buffer, one example per fit
//!    call, to a [`Classifier`]
//! 4. **Inference** - An [`InferenceStep`] normalizes a fresh capture the same
//!    way and asks the classifier for direction scores
//!
//! # Architecture
//!
//! ```text
//! CaptureSource ──→ Frame::normalize ──┬──→ ReplayBuffer ──→ TrainingLoop ──→ Classifier::fit
//!                                      │        ↑
//! SharedDirection ──→ encode ──────────┘        │
//!                                               │
//! CaptureSource ──→ Frame::normalize ──→ InferenceStep ──→ Classifier::forward
//! ```
//!
//! The capture source, the input state and the classifier are collaborators
//! supplied by the application; this crate only fixes the order in which they
//! are used.
//!
//! # Label Layout
//!
//! Labels are 4-element 0/1 vectors in `[up, right, down, left]` order (see
//! [`EncodedLabel`]). Training and inference must agree on this order.
//!
//! # Concurrency
//!
//! Everything runs on the caller's thread. Sampling ticks never overlap, and
//! training steps run strictly one after another because the classifier is a
//! single mutable resource. Inference borrows the classifier immutably, so it
//! cannot run while a training step holds it.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::time::{Duration, Instant};
//! use mimic_pipeline::{NoDisplay, PipelineConfig, ReplayBuffer, Sampler, SharedDirection, TrainingLoop};
//!
//! let config = PipelineConfig::default();
//! let direction = SharedDirection::new();
//! let mut buffer = ReplayBuffer::new();
//! let mut sampler = Sampler::from_config(&config);
//! sampler.start(Instant::now(), config.sample_interval(), config.max_samples);
//!
//! while sampler.state().is_running() {
//!     sampler.poll(Instant::now(), &mut source, &direction, &mut buffer, &mut NoDisplay);
//! }
//!
//! let report = TrainingLoop::from_config(&config).run(&mut classifier, &buffer, |_| {})?;
//! ```

pub use self::{
    classifier::*, config::*, direction::*, inference::*, replay::*, sampler::*, source::*,
    trainer::*,
};

mod classifier;
mod config;
mod direction;
mod inference;
mod replay;
mod sampler;
mod source;
mod trainer;

#[cfg(test)]
mod test_util;
