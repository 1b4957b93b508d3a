//! Average pooling of input tensors into a fixed-size feature vector.
//!
//! The image is split into `grid × grid` cells. Pixel `(x, y)` falls into cell
//! `(x * grid / width, y * grid / height)`, so cells differ in size by at most
//! one pixel along each axis when the size is not a multiple of the grid. Each
//! cell contributes the mean of its red, green and blue values.
//!
//! Features are laid out as `[cell_y][cell_x][channel]`.

use mimic_vision::{CHANNELS, InputTensor};

/// Number of features produced for a grid size.
#[must_use]
pub fn feature_len(grid: u32) -> usize {
    let grid = grid as usize;
    grid * grid * CHANNELS
}

/// Averages `input` over a `grid × grid` partition.
///
/// Callers must ensure `0 < grid <= width` and `grid <= height`, otherwise
/// some cells are empty and yield zero.
#[must_use]
pub fn average_pool(input: &InputTensor, grid: u32) -> Vec<f32> {
    let size = input.size();
    let (width, height) = (size.width as usize, size.height as usize);
    let grid = grid as usize;

    let mut sums = vec![0.0_f32; grid * grid * CHANNELS];
    let mut counts = vec![0_u32; grid * grid];
    for (x, y, rgb) in input.pixels() {
        let cell = (y * grid / height) * grid + (x * grid / width);
        counts[cell] += 1;
        for (sum, value) in sums[cell * CHANNELS..][..CHANNELS].iter_mut().zip(rgb) {
            *sum += value;
        }
    }

    for (cell, &count) in counts.iter().enumerate() {
        if count > 0 {
            #[expect(clippy::cast_precision_loss)]
            let count = count as f32;
            for sum in &mut sums[cell * CHANNELS..][..CHANNELS] {
                *sum /= count;
            }
        }
    }
    sums
}

#[cfg(test)]
mod tests {
    use image::{Rgb, RgbImage};
    use mimic_vision::Frame;

    use super::*;

    fn tensor(image: RgbImage) -> InputTensor {
        Frame::from_image(image).to_input_tensor()
    }

    #[test]
    fn test_uniform_image_pools_to_constant() {
        let input = tensor(RgbImage::from_pixel(10, 6, Rgb([255, 0, 255])));
        let features = average_pool(&input, 3);
        assert_eq!(features.len(), feature_len(3));
        for rgb in features.chunks_exact(CHANNELS) {
            assert!((rgb[0] - 1.0).abs() < 1e-6);
            assert!((rgb[1] + 1.0).abs() < 1e-6);
            assert!((rgb[2] - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_cells_follow_layout() {
        // left half white, right half black
        let input = tensor(RgbImage::from_fn(4, 4, |x, _| {
            if x < 2 { Rgb([255; 3]) } else { Rgb([0; 3]) }
        }));
        let features = average_pool(&input, 2);
        // [y0x0, y0x1, y1x0, y1x1], each with 3 channels
        assert!((features[0] - 1.0).abs() < 1e-6);
        assert!((features[3] + 1.0).abs() < 1e-6);
        assert!((features[6] - 1.0).abs() < 1e-6);
        assert!((features[9] + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_uneven_cells_are_averaged() {
        let columns = |x: u32| match x {
            0 => Rgb([255; 3]),
            1 => Rgb([0; 3]),
            _ => Rgb([255; 3]),
        };
        let features = average_pool(&tensor(RgbImage::from_fn(3, 1, |x, _| columns(x))), 1);
        assert!((features[0] - 1.0 / 3.0).abs() < 1e-6);

        // 3 columns into 2 cells: columns 0 and 1 together, column 2 alone
        let features = average_pool(&tensor(RgbImage::from_fn(3, 2, |x, _| columns(x))), 2);
        assert!(features[0].abs() < 1e-6);
        assert!((features[3] - 1.0).abs() < 1e-6);
    }
}
