use std::path::PathBuf;

use anyhow::Context;
use mimic_model::PooledSoftmaxClassifier;
use mimic_pipeline::{Classifier as _, TrainingLoop};

use crate::{
    command::ConfigArg,
    logging,
    schema::{dataset, model_file::ModelFile},
    util::{self, Output},
};

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct TrainArg {
    #[clap(flatten)]
    config: ConfigArg,
    /// Dataset directory written by `play --save-dataset`
    #[clap(long)]
    dataset: PathBuf,
    /// Continue training this model instead of a new one
    #[clap(long)]
    model: Option<PathBuf>,
    /// Model name stored in a newly created model file
    #[clap(long, default_value = "offline")]
    name: String,
    /// Output model file (stdout if omitted)
    #[clap(long)]
    output: Option<PathBuf>,
    /// Number of passes over the dataset
    #[clap(long, default_value_t = 1)]
    epochs: usize,
}

pub(crate) fn run(arg: &TrainArg) -> anyhow::Result<()> {
    let TrainArg {
        config,
        dataset,
        model,
        name,
        output,
        epochs,
    } = arg;

    logging::init_stderr();
    let config = config.load()?;
    let (manifest, buffer) = dataset::load_dataset(dataset)?;
    eprintln!(
        "Loaded {} examples ({}, letterbox: {})",
        buffer.len(),
        manifest.target_size,
        manifest.letterbox
    );

    let mut model = match model {
        Some(path) => {
            let mut model = util::read_model_file(path)?;
            if model.letterbox != manifest.letterbox {
                tracing::warn!(
                    model = model.letterbox,
                    dataset = manifest.letterbox,
                    "letterbox mode differs from the model, using the dataset's"
                );
                model.letterbox = manifest.letterbox;
            }
            model
        }
        None => {
            let classifier = PooledSoftmaxClassifier::new(manifest.target_size, &config.classifier)
                .context("Failed to create classifier")?;
            ModelFile::untrained(name, classifier, manifest.letterbox)
        }
    };

    // frames that do not match the model are re-scaled the way they were captured
    let training = TrainingLoop::new(config.pipeline.training_iterations, config.pipeline.batch_size)
        .letterbox(manifest.letterbox);
    eprintln!(
        "Training {} ({}) for {} epochs of {} steps...",
        model.name,
        model.classifier.input_size(),
        epochs,
        training.iterations()
    );
    for epoch in 0..*epochs {
        let report = training
            .run(&mut model.classifier, &buffer, |_| {})
            .with_context(|| format!("Training failed in epoch {epoch}"))?;
        model.record_training(&report);
        eprintln!(
            "Epoch {epoch}: mean loss {:.4}, mean accuracy {:.3}",
            report.mean_loss().unwrap_or(f32::NAN),
            report.mean_accuracy().unwrap_or(f32::NAN)
        );
    }

    Output::save_json(&model, output.clone())?;
    if let Some(path) = output {
        eprintln!("Model saved to {}", path.display());
    }
    Ok(())
}
