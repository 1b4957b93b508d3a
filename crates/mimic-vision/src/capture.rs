use image::RgbImage;

/// A raw RGB snapshot of the rendered view.
///
/// Captures have no size constraints; they are normalized by
/// [`Frame::normalize`](crate::Frame::normalize) before use.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::From)]
pub struct Capture {
    image: RgbImage,
}

impl Capture {
    #[must_use]
    pub fn new(image: RgbImage) -> Self {
        Self { image }
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    #[must_use]
    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    #[must_use]
    pub fn into_image(self) -> RgbImage {
        self.image
    }
}
