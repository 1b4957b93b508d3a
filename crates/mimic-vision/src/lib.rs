//! Screen captures and their normalization to a fixed classifier input.
//!
//! Every image that reaches the classifier goes through the same path:
//!
//! ```text
//! Capture (any size)
//!     ↓ compute_scale (letterbox or cover geometry)
//! Frame (fixed target size, black background)
//!     ↓ to_input_tensor
//! InputTensor (f32 in [-1, 1], HWC)
//! ```
//!
//! - [`Capture`] - A raw RGB snapshot of the rendered view
//! - [`compute_scale`] / [`ScaleResult`] - The scaling geometry
//! - [`Frame`] - A capture drawn onto a canvas of the target size
//! - [`InputTensor`] - Pixel values rescaled for the classifier
//!
//! # Example
//!
//! ```
//! use image::RgbImage;
//! use mimic_vision::{Capture, Frame, TargetSize};
//!
//! let capture = Capture::from(RgbImage::new(320, 160));
//! let frame = Frame::normalize(&capture, TargetSize::new(224, 224), true);
//! assert_eq!(frame.size(), TargetSize::new(224, 224));
//!
//! let tensor = frame.to_input_tensor();
//! assert_eq!(tensor.data().len(), 224 * 224 * 3);
//! ```

pub use self::{capture::*, frame::*, scale::*};

mod capture;
mod frame;
mod scale;
