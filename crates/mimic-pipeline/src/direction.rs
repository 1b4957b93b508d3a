//! Direction key state and its fixed-order numeric encoding.

use std::{cell::Cell, rc::Rc};

use serde::{Deserialize, Serialize};

/// Number of entries in an encoded label.
pub const LABEL_LEN: usize = 4;

/// A single direction key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum Direction {
    Up,
    Right,
    Down,
    Left,
}

impl Direction {
    /// All directions in label order.
    pub const ALL: [Self; LABEL_LEN] = [Self::Up, Self::Right, Self::Down, Self::Left];

    /// Position of this direction in an [`EncodedLabel`].
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Up => 0,
            Self::Right => 1,
            Self::Down => 2,
            Self::Left => 3,
        }
    }
}

/// Which direction keys are held. Any combination is allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct DirectionState {
    pub up: bool,
    pub right: bool,
    pub down: bool,
    pub left: bool,
}

impl DirectionState {
    pub const NONE: Self = Self {
        up: false,
        right: false,
        down: false,
        left: false,
    };

    #[must_use]
    pub fn from_held<I>(held: I) -> Self
    where
        I: IntoIterator<Item = Direction>,
    {
        let mut state = Self::NONE;
        for direction in held {
            state.set(direction, true);
        }
        state
    }

    #[must_use]
    pub const fn is_held(&self, direction: Direction) -> bool {
        match direction {
            Direction::Up => self.up,
            Direction::Right => self.right,
            Direction::Down => self.down,
            Direction::Left => self.left,
        }
    }

    pub fn set(&mut self, direction: Direction, held: bool) {
        let slot = match direction {
            Direction::Up => &mut self.up,
            Direction::Right => &mut self.right,
            Direction::Down => &mut self.down,
            Direction::Left => &mut self.left,
        };
        *slot = held;
    }

    pub fn held(&self) -> impl Iterator<Item = Direction> + '_ {
        Direction::ALL.into_iter().filter(|d| self.is_held(*d))
    }

    #[must_use]
    pub fn is_idle(&self) -> bool {
        *self == Self::NONE
    }

    #[must_use]
    pub fn encode(self) -> EncodedLabel {
        encode(self)
    }
}

/// A direction state as a `[up, right, down, left]` vector of 0s and 1s.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "[f32; LABEL_LEN]", into = "[f32; LABEL_LEN]")]
pub struct EncodedLabel([f32; LABEL_LEN]);

impl EncodedLabel {
    /// Builds a label from raw values, each of which must be exactly 0 or 1.
    pub fn try_from_values(values: [f32; LABEL_LEN]) -> Result<Self, InvalidLabelValue> {
        for (index, &value) in values.iter().enumerate() {
            #[allow(clippy::float_cmp)]
            let valid = value == 0.0 || value == 1.0;
            if !valid {
                return Err(InvalidLabelValue { index, value });
            }
        }
        Ok(Self(values))
    }

    #[must_use]
    pub fn values(&self) -> &[f32; LABEL_LEN] {
        &self.0
    }

    #[must_use]
    pub fn decode(&self) -> DirectionState {
        decode(self)
    }
}

impl TryFrom<[f32; LABEL_LEN]> for EncodedLabel {
    type Error = InvalidLabelValue;

    fn try_from(values: [f32; LABEL_LEN]) -> Result<Self, Self::Error> {
        Self::try_from_values(values)
    }
}

impl From<EncodedLabel> for [f32; LABEL_LEN] {
    fn from(label: EncodedLabel) -> Self {
        label.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, derive_more::Display, derive_more::Error)]
#[display("label value {value} at position {index} is not 0 or 1")]
pub struct InvalidLabelValue {
    pub index: usize,
    pub value: f32,
}

#[must_use]
pub fn encode(state: DirectionState) -> EncodedLabel {
    let mut values = [0.0; LABEL_LEN];
    for direction in state.held() {
        values[direction.index()] = 1.0;
    }
    EncodedLabel(values)
}

#[must_use]
pub fn decode(label: &EncodedLabel) -> DirectionState {
    DirectionState::from_held(
        Direction::ALL
            .into_iter()
            .filter(|d| label.0[d.index()] > 0.5),
    )
}

/// Raw classifier output, one score per direction in label order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DirectionScores(pub [f32; LABEL_LEN]);

impl DirectionScores {
    #[must_use]
    pub fn values(&self) -> &[f32; LABEL_LEN] {
        &self.0
    }

    #[must_use]
    pub fn score(&self, direction: Direction) -> f32 {
        self.0[direction.index()]
    }

    /// Highest-scoring direction; the first one wins ties.
    #[must_use]
    pub fn argmax(&self) -> Direction {
        let mut best = Direction::Up;
        for direction in Direction::ALL {
            if self.score(direction) > self.score(best) {
                best = direction;
            }
        }
        best
    }

    /// Directions scoring at least `threshold`.
    #[must_use]
    pub fn to_direction(&self, threshold: f32) -> DirectionState {
        DirectionState::from_held(
            Direction::ALL
                .into_iter()
                .filter(|d| self.score(*d) >= threshold),
        )
    }
}

/// Live direction key state shared between key handlers and the sampler.
///
/// Key handlers write through [`press`](Self::press) and
/// [`release`](Self::release); the sampler reads a [`snapshot`](Self::snapshot)
/// once per tick. Clones share the same state.
#[derive(Debug, Clone, Default)]
pub struct SharedDirection(Rc<Cell<DirectionState>>);

impl SharedDirection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, direction: Direction, held: bool) {
        let mut state = self.0.get();
        state.set(direction, held);
        self.0.set(state);
    }

    pub fn press(&self, direction: Direction) {
        self.set(direction, true);
    }

    pub fn release(&self, direction: Direction) {
        self.set(direction, false);
    }

    pub fn release_all(&self) {
        self.0.set(DirectionState::NONE);
    }

    #[must_use]
    pub fn snapshot(&self) -> DirectionState {
        self.0.get()
    }
}
