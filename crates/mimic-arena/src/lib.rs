//! A small top-down world for the operator to play in.
//!
//! The [`Arena`] holds a [`TileMap`] of ground and coins and a ship that
//! moves [`STEP_PX`] pixels per key press. [`Arena::render`] draws the part of
//! the world around the ship into an RGB image; that image is what the
//! imitation pipeline captures and the classifier learns from.

pub use self::{arena::*, map::*, render::palette};

mod arena;
mod map;
mod render;
