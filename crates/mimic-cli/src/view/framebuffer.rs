use image::{Rgb, RgbImage};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Color,
    widgets::{Block, Widget},
};

/// Draws an RGB image with half-block characters, two pixel rows per cell.
///
/// The image is scaled with nearest-neighbor sampling to fill the area while
/// keeping its aspect ratio; the unused margin stays blank.
#[derive(Debug)]
pub struct FramebufferDisplay<'a> {
    image: &'a RgbImage,
    block: Option<Block<'a>>,
}

impl<'a> FramebufferDisplay<'a> {
    pub fn new(image: &'a RgbImage) -> Self {
        Self { image, block: None }
    }

    pub fn block(self, block: Block<'a>) -> Self {
        Self {
            block: Some(block),
            ..self
        }
    }
}

/// Size of the drawn picture in (columns, pixel rows) for an area of
/// `columns × 2·rows` pixel cells.
fn fit(image: (u32, u32), columns: u16, rows: u16) -> (u32, u32) {
    let (width, height) = image;
    if width == 0 || height == 0 || columns == 0 || rows == 0 {
        return (0, 0);
    }
    let (area_w, area_h) = (u64::from(columns), u64::from(rows) * 2);
    let (width, height) = (u64::from(width), u64::from(height));
    let (w, h) = if area_w * height <= area_h * width {
        (area_w, (height * area_w / width).max(1))
    } else {
        ((width * area_h / height).max(1), area_h)
    };
    (
        u32::try_from(w).unwrap_or(u32::MAX),
        u32::try_from(h).unwrap_or(u32::MAX),
    )
}

fn sample(image: &RgbImage, x: u32, y: u32, out_w: u32, out_h: u32) -> Color {
    let src_x = u64::from(x) * u64::from(image.width()) / u64::from(out_w);
    let src_y = u64::from(y) * u64::from(image.height()) / u64::from(out_h);
    let Rgb([r, g, b]) = *image.get_pixel(
        u32::try_from(src_x).unwrap_or(0),
        u32::try_from(src_y).unwrap_or(0),
    );
    Color::Rgb(r, g, b)
}

impl Widget for FramebufferDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let inner = match &self.block {
            Some(block) => {
                let inner = block.inner(area);
                block.clone().render(area, buf);
                inner
            }
            None => area,
        };

        let (out_w, out_h) = fit(self.image.dimensions(), inner.width, inner.height);
        if out_w == 0 || out_h == 0 {
            return;
        }
        // center within the area
        let margin_x = (u32::from(inner.width) - out_w) / 2;
        let margin_y = (u32::from(inner.height) * 2 - out_h) / 4;

        for column in 0..out_w {
            for row in 0..out_h.div_ceil(2) {
                let top = sample(self.image, column, row * 2, out_w, out_h);
                let bottom = if row * 2 + 1 < out_h {
                    sample(self.image, column, row * 2 + 1, out_w, out_h)
                } else {
                    Color::Reset
                };
                let (Ok(x), Ok(y)) = (
                    u16::try_from(margin_x + column),
                    u16::try_from(margin_y + row),
                ) else {
                    continue;
                };
                if let Some(cell) = buf.cell_mut((inner.x + x, inner.y + y)) {
                    cell.set_symbol("▀").set_fg(top).set_bg(bottom);
                }
            }
        }
    }
}
