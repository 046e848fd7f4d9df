use crate::{
    assets::decode::{PreparedImage, unpremultiply_rgba8},
    assets::frame::PhotoCircle,
    foundation::core::{BoundingBox, Canvas, Rgba8, ViewTransform},
    foundation::error::FrameResult,
};

/// Final raster of one render: photo, frame and background.
#[derive(Clone, Debug)]
pub struct RenderedFrame {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
    pub premultiplied: bool,
}

impl RenderedFrame {
    /// Pixel at `(x, y)` as stored.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        self.data
            .get(i..i + 4)
            .map(|px| [px[0], px[1], px[2], px[3]])
    }

    /// Straight-alpha RGBA8 copy suitable for encoders.
    pub fn to_straight_rgba8(&self) -> Vec<u8> {
        if self.premultiplied {
            unpremultiply_rgba8(&self.data)
        } else {
            self.data.clone()
        }
    }
}

/// Everything one render needs. Borrowed from the session snapshot; never mutated.
#[derive(Clone, Copy, Debug)]
pub struct RenderJob<'a> {
    pub image: &'a PreparedImage,
    pub bbox: Option<&'a BoundingBox>,
    pub view: &'a ViewTransform,
    pub output: Canvas,
}

/// Fixed layout of the composition.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderSettings {
    /// Coordinate space of the frame artwork; outputs are scaled from it.
    pub design: Canvas,
    pub background: Rgba8,
    pub circle: PhotoCircle,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            design: Canvas::EXPORT,
            background: Rgba8::opaque(0x0A, 0x01, 0x1A),
            circle: PhotoCircle::DEFAULT,
        }
    }
}

/// Draws a [`RenderJob`] into a fresh [`RenderedFrame`].
///
/// Implementations may cache decoded paints between calls but must produce
/// identical pixels for identical jobs.
pub trait Compositor {
    fn render(&mut self, job: &RenderJob<'_>) -> FrameResult<RenderedFrame>;
}
