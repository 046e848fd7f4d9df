//! The decorative frame overlay and its fixed photo-circle geometry.

use std::{path::Path, sync::Arc};

use anyhow::Context;

use crate::{
    assets::decode::parse_svg,
    foundation::core::{Canvas, Point, Rect},
    foundation::error::{FrameError, FrameResult},
};

const BUILTIN_FRAME_SVG: &[u8] = include_bytes!("../../assets/frame.svg");

/// Placement of the photo inside the frame artwork, in design-space pixels.
///
/// These values are tied to the artwork: the built-in frame draws its glowing
/// ring at exactly this circle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PhotoCircle {
    pub center: Point,
    pub radius: f64,
}

impl PhotoCircle {
    pub const DEFAULT: PhotoCircle = PhotoCircle {
        center: Point::new(540.0, 620.0),
        radius: 300.0,
    };

    /// Side of the destination square the sample rect is stretched into.
    pub fn dest_size(&self) -> f64 {
        self.radius * 2.0
    }

    /// Square circumscribing the circle.
    pub fn dest_rect(&self) -> Rect {
        Rect::new(
            self.center.x - self.radius,
            self.center.y - self.radius,
            self.center.x + self.radius,
            self.center.y + self.radius,
        )
    }
}

/// Parsed frame graphic. Cheap to clone.
#[derive(Clone, Debug)]
pub struct FrameGraphic {
    tree: Arc<usvg::Tree>,
}

impl FrameGraphic {
    /// The bundled "GAME ON" artwork.
    pub fn builtin() -> FrameResult<Self> {
        Self::from_svg_bytes(BUILTIN_FRAME_SVG)
    }

    pub fn from_svg_bytes(bytes: &[u8]) -> FrameResult<Self> {
        let tree = parse_svg(bytes).map_err(|e| FrameError::frame_load(format!("{e:#}")))?;
        Ok(Self {
            tree: Arc::new(tree),
        })
    }

    pub fn from_path(path: &Path) -> FrameResult<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("read frame svg '{}'", path.display()))
            .map_err(|e| FrameError::frame_load(format!("{e:#}")))?;
        Self::from_svg_bytes(&bytes)
    }

    /// Intrinsic size of the artwork.
    pub fn size(&self) -> (f32, f32) {
        let s = self.tree.size();
        (s.width(), s.height())
    }

    /// Rasterize stretched over a full canvas. Returns premultiplied RGBA8.
    pub fn rasterize(&self, canvas: Canvas) -> FrameResult<Vec<u8>> {
        let (svg_w, svg_h) = self.size();
        if !(svg_w.is_finite() && svg_h.is_finite() && svg_w > 0.0 && svg_h > 0.0) {
            return Err(FrameError::frame_load("frame svg has invalid width/height"));
        }

        let mut pixmap = resvg::tiny_skia::Pixmap::new(canvas.width, canvas.height)
            .ok_or_else(|| FrameError::frame_load("failed to allocate frame pixmap"))?;

        let sx = (canvas.width as f32) / svg_w;
        let sy = (canvas.height as f32) / svg_h;
        let xform = resvg::tiny_skia::Transform::from_scale(sx, sy);

        resvg::render(&self.tree, xform, &mut pixmap.as_mut());
        Ok(pixmap.take())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/frame.rs"]
mod tests;
