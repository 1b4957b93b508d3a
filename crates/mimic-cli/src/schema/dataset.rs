use std::{fs, path::Path};

use anyhow::{Context, bail};
use mimic_pipeline::{EncodedLabel, ReplayBuffer, ReplayEntry};
use mimic_vision::{Frame, TargetSize};
use serde::{Deserialize, Serialize};

use crate::util::{self, Output};

const MANIFEST_FILE: &str = "labels.json";

/// `labels.json` of a saved dataset directory; frames are stored next to it as
/// PNG files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetManifest {
    pub target_size: TargetSize,
    pub letterbox: bool,
    pub entries: Vec<DatasetEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetEntry {
    /// Frame file name, relative to the dataset directory.
    pub file: String,
    pub label: EncodedLabel,
}

/// Writes every buffer entry to `dir` in buffer order.
pub fn save_dataset(
    dir: &Path,
    buffer: &ReplayBuffer,
    target_size: TargetSize,
    letterbox: bool,
) -> anyhow::Result<DatasetManifest> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create dataset directory: {}", dir.display()))?;

    let mut entries = Vec::with_capacity(buffer.len());
    for (index, entry) in buffer.iter().enumerate() {
        let file = format!("frame_{index:05}.png");
        let path = dir.join(&file);
        entry
            .frame()
            .image()
            .save(&path)
            .with_context(|| format!("Failed to write frame: {}", path.display()))?;
        entries.push(DatasetEntry {
            file,
            label: *entry.label(),
        });
    }

    let manifest = DatasetManifest {
        target_size,
        letterbox,
        entries,
    };
    Output::save_json(&manifest, Some(dir.join(MANIFEST_FILE)))?;
    tracing::info!(dir = %dir.display(), entries = buffer.len(), "saved dataset");
    Ok(manifest)
}

/// Reads a dataset written by [`save_dataset`], preserving entry order.
pub fn load_dataset(dir: &Path) -> anyhow::Result<(DatasetManifest, ReplayBuffer)> {
    let manifest: DatasetManifest = util::read_json_file("dataset manifest", dir.join(MANIFEST_FILE))?;

    let mut buffer = ReplayBuffer::new();
    for entry in &manifest.entries {
        let path = dir.join(&entry.file);
        let image = image::open(&path)
            .with_context(|| format!("Failed to read frame: {}", path.display()))?
            .to_rgb8();
        let frame = Frame::from_image(image);
        if frame.size() != manifest.target_size {
            bail!(
                "Frame {} is {}, dataset declares {}",
                path.display(),
                frame.size(),
                manifest.target_size
            );
        }
        buffer.push(ReplayEntry::new(frame, entry.label));
    }
    tracing::info!(dir = %dir.display(), entries = buffer.len(), "loaded dataset");
    Ok((manifest, buffer))
}
