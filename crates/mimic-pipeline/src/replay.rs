//! Append-only store of labeled frames.

use std::slice;

use mimic_vision::Frame;

use crate::{DirectionState, EncodedLabel, LABEL_LEN};

/// One labeled example: a normalized frame and the keys held when it was
/// captured.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplayEntry {
    frame: Frame,
    label: EncodedLabel,
}

impl ReplayEntry {
    #[must_use]
    pub fn new(frame: Frame, label: EncodedLabel) -> Self {
        Self { frame, label }
    }

    #[must_use]
    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    #[must_use]
    pub fn label(&self) -> &EncodedLabel {
        &self.label
    }

    #[must_use]
    pub fn direction(&self) -> DirectionState {
        self.label.decode()
    }
}

/// Labeled examples in capture order.
///
/// Entries can only be appended; they are never reordered, replaced or
/// removed, so index order is capture order and training order. The buffer
/// grows without bound.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReplayBuffer {
    entries: Vec<ReplayEntry>,
}

impl ReplayBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry and returns its index.
    pub fn push(&mut self, entry: ReplayEntry) -> usize {
        self.entries.push(entry);
        self.entries.len() - 1
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&ReplayEntry> {
        self.entries.get(index)
    }

    #[must_use]
    pub fn entries(&self) -> &[ReplayEntry] {
        &self.entries
    }

    pub fn iter(&self) -> slice::Iter<'_, ReplayEntry> {
        self.entries.iter()
    }

    /// Number of entries with each direction held, in label order.
    #[must_use]
    pub fn direction_counts(&self) -> [usize; LABEL_LEN] {
        let mut counts = [0; LABEL_LEN];
        for entry in &self.entries {
            for direction in entry.direction().held() {
                counts[direction.index()] += 1;
            }
        }
        counts
    }
}

impl<'a> IntoIterator for &'a ReplayBuffer {
    type Item = &'a ReplayEntry;
    type IntoIter = slice::Iter<'a, ReplayEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl FromIterator<ReplayEntry> for ReplayBuffer {
    fn from_iter<T: IntoIterator<Item = ReplayEntry>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl Extend<ReplayEntry> for ReplayBuffer {
    fn extend<T: IntoIterator<Item = ReplayEntry>>(&mut self, iter: T) {
        self.entries.extend(iter);
    }
}
