//! Letterbox/cover scaling geometry.
//!
//! [`compute_scale`] decides how a source image of arbitrary size is resized and
//! positioned inside a fixed-size canvas. The result determines which pixels the
//! classifier sees, so the computation is exact: every division is done on
//! integers, which equals flooring the exact rational value.
//!
//! # Modes
//!
//! - **Letterbox** (`letterbox = true`) - The whole source fits inside the
//!   canvas; bars remain along one axis.
//! - **Cover** (`letterbox = false`) - The source covers the whole canvas; the
//!   overflowing axis is cropped (offsets become negative).

/// Geometry for drawing a source image into a fixed-size canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScaleResult {
    /// Scaled width of the source image.
    pub width: u64,
    /// Scaled height of the source image.
    pub height: u64,
    /// Horizontal position of the scaled image inside the canvas.
    pub offset_left: i64,
    /// Vertical position of the scaled image inside the canvas.
    pub offset_top: i64,
    /// Whether the source was scaled to the target width (height derived).
    pub scale_to_width: bool,
}

impl ScaleResult {
    /// Result for non-positive inputs: nothing is drawn.
    pub const DEGENERATE: Self = Self {
        width: 0,
        height: 0,
        offset_left: 0,
        offset_top: 0,
        scale_to_width: true,
    };

    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Computes the scaling geometry from a source size to a target size.
///
/// Two candidates are considered: scaling to the target width (height derived)
/// and scaling to the target height (width derived). The height-fit candidate
/// "exceeds" when its width is larger than the target width; the width-fit
/// candidate is used when `letterbox == exceeds`.
///
/// Returns [`ScaleResult::DEGENERATE`] when any size is zero.
///
/// ```
/// use mimic_vision::compute_scale;
///
/// let scale = compute_scale(200, 100, 224, 224, true);
/// assert_eq!((scale.width, scale.height), (224, 112));
/// assert_eq!((scale.offset_left, scale.offset_top), (0, 56));
/// ```
#[must_use]
pub fn compute_scale(
    src_width: u32,
    src_height: u32,
    target_width: u32,
    target_height: u32,
    letterbox: bool,
) -> ScaleResult {
    if src_width == 0 || src_height == 0 || target_width == 0 || target_height == 0 {
        return ScaleResult::DEGENERATE;
    }

    let (sw, sh) = (u64::from(src_width), u64::from(src_height));
    let (tw, th) = (u64::from(target_width), u64::from(target_height));

    let width_fit = (tw, sh * tw / sw);
    let height_fit = (sw * th / sh, th);

    // sw * th / sh > tw, without the division
    let exceeds = sw * th > tw * sh;
    let scale_to_width = if letterbox { exceeds } else { !exceeds };

    let (width, height) = if scale_to_width {
        width_fit
    } else {
        height_fit
    };

    ScaleResult {
        width,
        height,
        offset_left: centered_offset(tw, width),
        offset_top: centered_offset(th, height),
        scale_to_width,
    }
}

/// `floor((target - size) / 2)`, rounding toward negative infinity.
fn centered_offset(target: u64, size: u64) -> i64 {
    let diff = i128::from(target) - i128::from(size);
    i64::try_from(diff.div_euclid(2)).unwrap_or(i64::MIN)
}
