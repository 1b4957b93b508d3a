use std::path::PathBuf;

use anyhow::Context;
use mimic_pipeline::{Direction, InferenceStep, LABEL_LEN};
use mimic_vision::Capture;
use serde::Serialize;

use crate::{logging, util};

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct PredictArg {
    /// Model file written by `train` or `play --save-model`
    #[clap(long)]
    model: PathBuf,
    /// Scale the image to fit inside the classifier input (letterbox) instead of
    /// covering it; defaults to the mode the model was trained with
    #[clap(long, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    letterbox: Option<bool>,
    /// Minimum score for a direction to count as held
    #[clap(long, default_value_t = 0.5)]
    threshold: f32,
    /// Image file to classify
    image: PathBuf,
}

#[derive(Debug, Serialize)]
struct Prediction {
    scores: [f32; LABEL_LEN],
    best: String,
    held: Vec<String>,
}

pub(crate) fn run(arg: &PredictArg) -> anyhow::Result<()> {
    let PredictArg {
        model,
        letterbox,
        threshold,
        image,
    } = arg;

    logging::init_stderr();
    let model = util::read_model_file(model)?;
    let capture = Capture::new(
        image::open(image)
            .with_context(|| format!("Failed to read image: {}", image.display()))?
            .to_rgb8(),
    );

    let inference = match letterbox {
        Some(letterbox) => InferenceStep::new(*letterbox),
        None => model.inference(),
    };
    let scores = inference
        .predict(&model.classifier, &capture)
        .context("Prediction failed")?;
    let prediction = Prediction {
        scores: *scores.values(),
        best: scores.argmax().to_string(),
        held: scores
            .to_direction(*threshold)
            .held()
            .map(|d: Direction| d.to_string())
            .collect(),
    };
    util::Output::save_json(&prediction, None)
}
