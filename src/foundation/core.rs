use crate::foundation::error::{FrameError, FrameResult};

pub use kurbo::{Affine, Point, Rect, Vec2};

/// Pixel dimensions of a render target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
}

impl Canvas {
    /// Full-resolution export size; also the coordinate space of the frame artwork.
    pub const EXPORT: Canvas = Canvas {
        width: 1080,
        height: 1350,
    };

    /// Default on-screen preview size (0.4 of the export size).
    pub const PREVIEW: Canvas = Canvas {
        width: 432,
        height: 540,
    };

    pub fn new(width: u32, height: u32) -> FrameResult<Self> {
        if width == 0 || height == 0 {
            return Err(FrameError::config("canvas width and height must be > 0"));
        }
        // vello_cpu pixmaps are u16-addressed.
        if width > u32::from(u16::MAX) || height > u32::from(u16::MAX) {
            return Err(FrameError::config(format!(
                "canvas {width}x{height} exceeds {max}x{max}",
                max = u16::MAX
            )));
        }
        Ok(Self { width, height })
    }

    /// Per-axis scale that maps `from` coordinates onto this canvas.
    pub fn scale_from(self, from: Canvas) -> Vec2 {
        Vec2::new(
            f64::from(self.width) / f64::from(from.width),
            f64::from(self.height) / f64::from(from.height),
        )
    }
}

/// Straight (non-premultiplied) RGBA8 color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Parse `#RRGGBB` or `#RRGGBBAA`.
    pub fn from_hex(hex: &str) -> FrameResult<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        let channel = |i: usize| -> FrameResult<u8> {
            digits
                .get(i..i + 2)
                .and_then(|s| u8::from_str_radix(s, 16).ok())
                .ok_or_else(|| FrameError::config(format!("invalid hex color '{hex}'")))
        };
        match digits.len() {
            6 => Ok(Self::opaque(channel(0)?, channel(2)?, channel(4)?)),
            8 => Ok(Self {
                r: channel(0)?,
                g: channel(2)?,
                b: channel(4)?,
                a: channel(6)?,
            }),
            _ => Err(FrameError::config(format!("invalid hex color '{hex}'"))),
        }
    }
}

/// Face location normalized to `[0, 1]` against the original upload, origin top-left.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    /// Returns `None` for the "no face" signal: non-finite values or a
    /// non-positive width/height (which covers the all-zero box).
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Option<Self> {
        let finite = [x, y, width, height].iter().all(|v| v.is_finite());
        if !finite || width <= 0.0 || height <= 0.0 {
            return None;
        }
        Some(Self {
            x,
            y,
            width,
            height,
        })
    }

    /// Box center in pixel coordinates of an image of the given size.
    pub fn center_px(&self, image_width: f64, image_height: f64) -> Point {
        Point::new(
            (self.x + self.width / 2.0) * image_width,
            (self.y + self.height / 2.0) * image_height,
        )
    }
}

/// User-controlled zoom and pan. Pan is in destination (design-space) pixels.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ViewTransform {
    pub zoom: f64,
    pub pan: Vec2,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            pan: Vec2::ZERO,
        }
    }
}

impl ViewTransform {
    /// Zoom below 1 is raised to 1 and non-finite values fall back to the identity.
    pub fn new(zoom: f64, pan: Vec2) -> Self {
        Self::default().with_zoom(zoom, f64::MAX).with_pan(pan)
    }

    /// Zoom and pan as they are safe to sample with, whatever the public fields hold.
    pub fn sanitized(&self) -> Self {
        Self::new(self.zoom, self.pan)
    }

    /// Copy with zoom clamped to `[1, max_zoom]`. Non-finite input resets to 1.
    pub fn with_zoom(self, zoom: f64, max_zoom: f64) -> Self {
        let zoom = if zoom.is_finite() {
            zoom.clamp(1.0, max_zoom.max(1.0))
        } else {
            1.0
        };
        Self { zoom, ..self }
    }

    pub fn with_pan(self, pan: Vec2) -> Self {
        if !(pan.x.is_finite() && pan.y.is_finite()) {
            return self;
        }
        Self { pan, ..self }
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
