use std::path::PathBuf;

use anyhow::Context;
use mimic_arena::Arena;
use mimic_model::PooledSoftmaxClassifier;
use ratatui_runtime::Runtime;

use crate::{
    command::{ConfigArg, play::app::PlayApp},
    logging,
    schema::{dataset, model_file::ModelFile},
    util::{self, Output},
};

mod app;
mod capture;
mod input;

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct PlayArg {
    #[clap(flatten)]
    config: ConfigArg,
    /// Continue training an existing model file instead of a new model
    #[clap(long)]
    model: Option<PathBuf>,
    /// Write the model to this file on exit
    #[clap(long)]
    save_model: Option<PathBuf>,
    /// Write the recorded examples to this directory on exit
    #[clap(long)]
    save_dataset: Option<PathBuf>,
    /// Log file (the terminal is used by the UI)
    #[clap(long, default_value = "./data/mimic.log")]
    log_file: PathBuf,
}

pub(crate) fn run(arg: &PlayArg) -> anyhow::Result<()> {
    let PlayArg {
        config: config_arg,
        model,
        save_model,
        save_dataset,
        log_file,
    } = arg;

    logging::init_file(log_file)?;
    let mut config = config_arg.load()?;

    let model = match model {
        Some(path) => {
            let mut model = util::read_model_file(path)?;
            let input_size = mimic_pipeline::Classifier::input_size(&model.classifier);
            if input_size != config.pipeline.target_size() {
                tracing::info!(%input_size, "using the input size of the loaded model");
                config.pipeline.target_width = input_size.width;
                config.pipeline.target_height = input_size.height;
            }
            match config_arg.letterbox() {
                Some(letterbox) => model.letterbox = letterbox,
                None => config.pipeline.letterbox = model.letterbox,
            }
            model
        }
        None => {
            let classifier =
                PooledSoftmaxClassifier::new(config.pipeline.target_size(), &config.classifier)
                    .context("Failed to create classifier")?;
            ModelFile::untrained("play", classifier, config.pipeline.letterbox)
        }
    };

    let arena = Arena::builtin().context("Failed to load the built-in map")?;
    let mut app = PlayApp::new(arena, config, model);
    Runtime::new().run(&mut app)?;

    let (config, model, buffer) = app.into_parts();
    eprintln!(
        "Recorded {} examples, model trained for {} steps",
        buffer.len(),
        model.steps
    );

    if let Some(dir) = save_dataset {
        dataset::save_dataset(
            dir,
            &buffer,
            config.pipeline.target_size(),
            config.pipeline.letterbox,
        )?;
        eprintln!("Dataset saved to {}", dir.display());
    }
    if let Some(path) = save_model {
        Output::save_json(&model, Some(path.clone()))?;
        eprintln!("Model saved to {}", path.display());
    }

    Ok(())
}
