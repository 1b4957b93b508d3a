use std::path::PathBuf;

use clap::{Parser, Subcommand};
use mimic_pipeline::SkippedTickPolicy;

use crate::{schema::config::AppConfig, util};

use self::{play::PlayArg, predict::PredictArg, train::TrainArg};

mod play;
mod predict;
mod train;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Option<Mode>,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Play the arena while recording examples, then train and evaluate in place
    Play(#[clap(flatten)] PlayArg),
    /// Train a model offline on a saved dataset
    Train(#[clap(flatten)] TrainArg),
    /// Predict the direction for a single image
    Predict(#[clap(flatten)] PredictArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode.unwrap_or(Mode::Play(PlayArg::default())) {
        Mode::Play(arg) => play::run(&arg)?,
        Mode::Train(arg) => train::run(&arg)?,
        Mode::Predict(arg) => predict::run(&arg)?,
    }
    Ok(())
}

/// Configuration file plus per-field overrides, shared by the subcommands.
#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct ConfigArg {
    /// JSON configuration file; flags below override its values
    #[clap(long)]
    config: Option<PathBuf>,
    /// Scale captures to fit inside the classifier input (letterbox) instead of
    /// covering it; `--letterbox=false` selects cover
    #[clap(long, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    letterbox: Option<bool>,
    /// Delay between samples in milliseconds
    #[clap(long)]
    sample_interval_ms: Option<u64>,
    /// Delay before the first sample in milliseconds
    #[clap(long)]
    start_delay_ms: Option<u64>,
    /// Number of samples to take
    #[clap(long)]
    max_samples: Option<usize>,
    /// Whether an unavailable capture uses up a sample (retry, consume)
    #[clap(long)]
    skipped_tick_policy: Option<SkippedTickPolicy>,
    /// Number of buffer entries to train on
    #[clap(long)]
    iterations: Option<usize>,
    /// Batch size passed to each fit call
    #[clap(long)]
    batch_size: Option<usize>,
    /// Learning rate of newly created models
    #[clap(long)]
    learning_rate: Option<f32>,
    /// Seed for initializing newly created models
    #[clap(long)]
    seed: Option<u64>,
}

impl ConfigArg {
    pub(crate) fn load(&self) -> anyhow::Result<AppConfig> {
        let mut config = match &self.config {
            Some(path) => util::read_config_file(path)?,
            None => AppConfig::default(),
        };
        self.apply(&mut config);
        Ok(config)
    }

    /// Letterbox mode given on the command line, if any.
    pub(crate) fn letterbox(&self) -> Option<bool> {
        self.letterbox
    }

    fn apply(&self, config: &mut AppConfig) {
        let pipeline = &mut config.pipeline;
        if let Some(value) = self.letterbox {
            pipeline.letterbox = value;
        }
        if let Some(value) = self.sample_interval_ms {
            pipeline.sample_interval_ms = value;
        }
        if let Some(value) = self.start_delay_ms {
            pipeline.start_delay_ms = value;
        }
        if let Some(value) = self.max_samples {
            pipeline.max_samples = value;
        }
        if let Some(value) = self.skipped_tick_policy {
            pipeline.skipped_tick_policy = value;
        }
        if let Some(value) = self.iterations {
            pipeline.training_iterations = value;
        }
        if let Some(value) = self.batch_size {
            pipeline.batch_size = value;
        }

        let classifier = &mut config.classifier;
        if let Some(value) = self.learning_rate {
            classifier.learning_rate = value;
        }
        if let Some(value) = self.seed {
            classifier.seed = value;
        }
    }
}
