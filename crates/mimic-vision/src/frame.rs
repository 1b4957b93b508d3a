use image::{
    RgbImage,
    imageops::{self, FilterType},
};
use serde::{Deserialize, Serialize};

use crate::{Capture, compute_scale};

/// Number of color channels in frames and tensors.
pub const CHANNELS: usize = 3;

const PIXEL_CENTER: f32 = 127.5;

/// Width and height of a fixed-size canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
#[display("{width}x{height}")]
pub struct TargetSize {
    pub width: u32,
    pub height: u32,
}

impl TargetSize {
    /// Input resolution of the default classifier.
    pub const CLASSIFIER_INPUT: Self = Self::new(224, 224);

    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[must_use]
    pub fn pixel_count(&self) -> usize {
        (self.width as usize) * (self.height as usize)
    }
}

impl Default for TargetSize {
    fn default() -> Self {
        Self::CLASSIFIER_INPUT
    }
}

/// A capture drawn onto a canvas of a fixed target size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    image: RgbImage,
}

impl Frame {
    /// Scales `capture` into a black canvas of size `target`.
    ///
    /// The capture is resized to the geometry computed by
    /// [`compute_scale`](crate::compute_scale) and drawn centered; parts falling
    /// outside the canvas are cropped. Only the source window that reaches the
    /// canvas is resized, so the work is bounded by the target size. A
    /// degenerate geometry yields a black frame.
    #[must_use]
    pub fn normalize(capture: &Capture, target: TargetSize, letterbox: bool) -> Self {
        let mut canvas = RgbImage::new(target.width, target.height);
        let scale = compute_scale(
            capture.width(),
            capture.height(),
            target.width,
            target.height,
            letterbox,
        );
        if scale.is_degenerate() {
            return Self { image: canvas };
        }
        let (Some(x), Some(y)) = (
            VisibleSpan::new(capture.width(), scale.width, scale.offset_left, target.width),
            VisibleSpan::new(capture.height(), scale.height, scale.offset_top, target.height),
        ) else {
            return Self { image: canvas };
        };

        let window =
            imageops::crop_imm(capture.image(), x.src_start, y.src_start, x.src_len, y.src_len)
                .to_image();
        let scaled = imageops::resize(&window, x.scaled_len, y.scaled_len, FilterType::Triangle);
        imageops::overlay(&mut canvas, &scaled, x.offset, y.offset);
        Self { image: canvas }
    }

    /// Wraps an image that is already the intended size (for example one loaded
    /// from a stored dataset).
    #[must_use]
    pub fn from_image(image: RgbImage) -> Self {
        Self { image }
    }

    #[must_use]
    pub fn size(&self) -> TargetSize {
        TargetSize::new(self.image.width(), self.image.height())
    }

    #[must_use]
    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    #[must_use]
    pub fn into_image(self) -> RgbImage {
        self.image
    }

    /// Re-normalizes this frame to another size, or returns it unchanged when the
    /// size already matches.
    #[must_use]
    pub fn resized(&self, target: TargetSize, letterbox: bool) -> Self {
        if self.size() == target {
            return self.clone();
        }
        Self::normalize(&Capture::new(self.image.clone()), target, letterbox)
    }

    /// Converts pixels from `[0, 255]` to `[-1, 1]`.
    #[must_use]
    pub fn to_input_tensor(&self) -> InputTensor {
        let data = self
            .image
            .as_raw()
            .iter()
            .map(|&p| (f32::from(p) - PIXEL_CENTER) / PIXEL_CENTER)
            .collect();
        InputTensor {
            size: self.size(),
            data,
        }
    }
}

/// The part of one axis of a scaled capture that lands on the canvas, widened
/// to whole source pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct VisibleSpan {
    src_start: u32,
    src_len: u32,
    /// Length of the kept source pixels after scaling.
    scaled_len: u32,
    /// Canvas position of the first kept pixel.
    offset: i64,
}

impl VisibleSpan {
    fn new(src: u32, scaled: u64, offset: i64, target: u32) -> Option<Self> {
        let src = i128::from(src);
        let scaled = i128::from(scaled);
        let offset = i128::from(offset);
        if src == 0 || scaled == 0 {
            return None;
        }

        let visible_start = (-offset).clamp(0, scaled);
        let visible_end = (i128::from(target) - offset).clamp(0, scaled);
        if visible_end <= visible_start {
            return None;
        }
        let src_start = visible_start * src / scaled;
        let src_end = ceil_div(visible_end * src, scaled);
        let mapped_start = src_start * scaled / src;
        let mapped_end = ceil_div(src_end * scaled, src);

        Some(Self {
            src_start: u32::try_from(src_start).ok()?,
            src_len: u32::try_from(src_end - src_start).ok()?,
            scaled_len: u32::try_from(mapped_end - mapped_start).ok()?,
            offset: i64::try_from(offset + mapped_start).ok()?,
        })
    }
}

// both operands are non-negative
fn ceil_div(n: i128, d: i128) -> i128 {
    (n + d - 1) / d
}

/// Classifier input: `height × width × 3` values in `[-1, 1]`, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct InputTensor {
    size: TargetSize,
    data: Vec<f32>,
}

impl InputTensor {
    #[must_use]
    pub fn size(&self) -> TargetSize {
        self.size
    }

    #[must_use]
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Iterates over `(x, y, [r, g, b])` in row-major order.
    pub fn pixels(&self) -> impl Iterator<Item = (usize, usize, &[f32])> + '_ {
        let width = self.size.width as usize;
        self.data
            .chunks_exact(CHANNELS)
            .enumerate()
            .map(move |(i, rgb)| (i % width, i / width, rgb))
    }
}

#[cfg(test)]
mod tests {
    use image::Rgb;

    use super::*;

    const RED: Rgb<u8> = Rgb([255, 0, 0]);
    const BLACK: Rgb<u8> = Rgb([0, 0, 0]);

    fn solid(width: u32, height: u32, color: Rgb<u8>) -> Capture {
        Capture::new(RgbImage::from_pixel(width, height, color))
    }

    #[test]
    fn test_letterbox_leaves_bars() {
        let frame = Frame::normalize(&solid(200, 100, RED), TargetSize::new(224, 224), true);
        assert_eq!(frame.size(), TargetSize::new(224, 224));

        let image = frame.image();
        // bars above and below the 112-pixel band starting at row 56
        assert_eq!(*image.get_pixel(0, 0), BLACK);
        assert_eq!(*image.get_pixel(223, 55), BLACK);
        assert_eq!(*image.get_pixel(100, 168), BLACK);
        assert_eq!(*image.get_pixel(100, 223), BLACK);
        for (x, y) in [(0, 56), (112, 112), (223, 167)] {
            let pixel = image.get_pixel(x, y);
            assert!(pixel[0] > 250 && pixel[1] < 5 && pixel[2] < 5, "({x}, {y}) = {pixel:?}");
        }
    }

    #[test]
    fn test_cover_fills_canvas() {
        let frame = Frame::normalize(&solid(200, 100, RED), TargetSize::new(224, 224), false);
        for (x, y) in [(0, 0), (223, 0), (0, 223), (223, 223), (112, 112)] {
            let pixel = frame.image().get_pixel(x, y);
            assert!(pixel[0] > 250, "({x}, {y}) = {pixel:?}");
        }
    }

    #[test]
    fn test_cover_crops_center() {
        // Left half red, right half blue, 2:1 aspect: cover keeps the middle,
        // so both colors stay visible around the center column.
        let mut image = RgbImage::from_pixel(200, 100, Rgb([0, 0, 255]));
        for y in 0..100 {
            for x in 0..100 {
                image.put_pixel(x, y, RED);
            }
        }
        let frame = Frame::normalize(&Capture::new(image), TargetSize::new(224, 224), false);
        assert!(frame.image().get_pixel(0, 112)[0] > 250);
        assert!(frame.image().get_pixel(223, 112)[2] > 250);
    }

    #[test]
    fn test_visible_span_of_tall_cover() {
        // 1x4000 covering 224x224 scales to 224x896000 at offset_top -447888
        let span = VisibleSpan::new(4000, 896_000, -447_888, 224).unwrap();
        assert_eq!(
            span,
            VisibleSpan {
                src_start: 1999,
                src_len: 2,
                scaled_len: 448,
                offset: -112,
            }
        );

        let whole = VisibleSpan::new(200, 112, 56, 224).unwrap();
        assert_eq!(
            whole,
            VisibleSpan {
                src_start: 0,
                src_len: 200,
                scaled_len: 112,
                offset: 56,
            }
        );

        assert_eq!(VisibleSpan::new(10, 100, -300, 224), None);
    }

    #[test]
    fn test_cover_of_extreme_aspect_resizes_only_visible_rows() {
        let green = Rgb([0, 255, 0]);
        let mut image = RgbImage::new(1, 4000);
        for y in 1990..2010 {
            image.put_pixel(0, y, green);
        }
        let capture = Capture::new(image);
        let target = TargetSize::new(224, 224);
        assert_eq!(compute_scale(1, 4000, 224, 224, false).height, 896_000);

        let frame = Frame::normalize(&capture, target, false);
        assert_eq!(frame.size(), target);
        for (x, y) in [(112, 112), (0, 0), (223, 223), (0, 112), (223, 111)] {
            assert_eq!(*frame.image().get_pixel(x, y), green, "({x}, {y})");
        }
    }

    #[test]
    fn test_degenerate_capture_is_black() {
        let frame = Frame::normalize(&solid(0, 0, RED), TargetSize::new(8, 8), false);
        assert_eq!(frame.size(), TargetSize::new(8, 8));
        assert!(frame.image().pixels().all(|p| *p == BLACK));
    }

    #[test]
    fn test_resized_keeps_matching_frame() {
        let frame = Frame::from_image(RgbImage::from_pixel(4, 4, RED));
        assert_eq!(frame.resized(TargetSize::new(4, 4), false), frame);
        assert_eq!(
            frame.resized(TargetSize::new(8, 2), true).size(),
            TargetSize::new(8, 2)
        );
    }

    #[test]
    fn test_tensor_range() {
        let mut image = RgbImage::new(2, 1);
        image.put_pixel(0, 0, Rgb([0, 255, 0]));
        image.put_pixel(1, 0, Rgb([255, 0, 255]));
        let tensor = Frame::from_image(image).to_input_tensor();

        assert_eq!(tensor.size(), TargetSize::new(2, 1));
        assert_eq!(tensor.data(), &[-1.0, 1.0, -1.0, 1.0, -1.0, 1.0]);

        let pixels = tensor.pixels().collect::<Vec<_>>();
        assert_eq!(pixels.len(), 2);
        assert_eq!(pixels[1].0, 1);
        assert_eq!(pixels[1].1, 0);
        assert_eq!(pixels[1].2, &[1.0, -1.0, 1.0]);
    }

    #[test]
    fn test_target_size_serialization() {
        let size = TargetSize::new(224, 160);
        let json = serde_json::to_string(&size).unwrap();
        assert_eq!(json, r#"{"width":224,"height":160}"#);
        assert_eq!(serde_json::from_str::<TargetSize>(&json).unwrap(), size);
        assert_eq!(size.to_string(), "224x160");
    }
}
