//! Source/destination geometry for the circular photo crop.
//!
//! Given the active image's pixel size, an optional face box and the user's
//! zoom/pan, [`compute_sample_rect`] picks the square of source pixels that is
//! stretched into the destination square. The sample rect is never clamped to
//! the image; [`visible_mapping`] trims it to real pixels so that the area
//! outside the source stays unpainted.

use crate::foundation::core::{Affine, BoundingBox, Rect, ViewTransform};

/// Margin applied around a detected face: the crop side is 1.8x the face's larger side.
pub const FACE_MARGIN: f64 = 1.8;

/// Region of the source image, in source pixels, that fills the destination square.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SampleRect {
    pub sx: f64,
    pub sy: f64,
    pub s_width: f64,
    pub s_height: f64,
}

impl SampleRect {
    pub fn to_rect(self) -> Rect {
        Rect::new(
            self.sx,
            self.sy,
            self.sx + self.s_width,
            self.sy + self.s_height,
        )
    }

    pub fn center(self) -> (f64, f64) {
        (
            self.sx + self.s_width / 2.0,
            self.sy + self.s_height / 2.0,
        )
    }

    /// Affine mapping source pixels of this rect onto `dest`.
    pub fn to_dest(self, dest: Rect) -> Affine {
        Affine::translate((dest.x0, dest.y0))
            * Affine::scale_non_uniform(
                dest.width() / self.s_width,
                dest.height() / self.s_height,
            )
            * Affine::translate((-self.sx, -self.sy))
    }
}

/// Part of a sample rect that lies inside the image, with its destination footprint.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VisibleMapping {
    /// Source pixels to paint (subset of the image bounds).
    pub source: Rect,
    /// Where those pixels land in destination space.
    pub dest: Rect,
    /// Full source-to-destination transform of the sample rect.
    pub transform: Affine,
}

/// Square base crop before zoom and pan.
pub fn base_rect(image_width: f64, image_height: f64, bbox: Option<&BoundingBox>) -> SampleRect {
    match bbox {
        Some(b) => {
            let center = b.center_px(image_width, image_height);
            let size = (b.width * image_width).max(b.height * image_height) * FACE_MARGIN;
            SampleRect {
                sx: center.x - size / 2.0,
                sy: center.y - size / 2.0,
                s_width: size,
                s_height: size,
            }
        }
        None => {
            let size = image_width.min(image_height);
            SampleRect {
                sx: (image_width - size) / 2.0,
                sy: (image_height - size) / 2.0,
                s_width: size,
                s_height: size,
            }
        }
    }
}

/// Compute the source rectangle to sample for a destination square of side `dest_size`.
///
/// Zoom shrinks the base rect about its center by `1 / zoom`. Pan is in
/// destination pixels and is converted to source space proportionally to the
/// current (zoomed) sample size, so a given drag moves the image by the same
/// fraction of the visible crop at any zoom level.
pub fn compute_sample_rect(
    image_width: f64,
    image_height: f64,
    bbox: Option<&BoundingBox>,
    view: &ViewTransform,
    dest_size: f64,
) -> SampleRect {
    let base = base_rect(image_width, image_height, bbox);
    let view = view.sanitized();

    let inv_zoom = 1.0 / view.zoom;
    let mut rect = SampleRect {
        sx: base.sx + (base.s_width - base.s_width * inv_zoom) / 2.0,
        sy: base.sy + (base.s_height - base.s_height * inv_zoom) / 2.0,
        s_width: base.s_width * inv_zoom,
        s_height: base.s_height * inv_zoom,
    };

    rect.sx -= view.pan.x * (rect.s_width / dest_size);
    rect.sy -= view.pan.y * (rect.s_height / dest_size);

    tracing::trace!(?rect, zoom = view.zoom, "sample rect");
    rect
}

/// Clip `sample` to the image bounds and map the surviving part into `dest`.
///
/// Returns `None` when the sample rect misses the image entirely or is degenerate.
pub fn visible_mapping(
    sample: SampleRect,
    image_width: f64,
    image_height: f64,
    dest: Rect,
) -> Option<VisibleMapping> {
    if !(sample.s_width > 0.0 && sample.s_height > 0.0) {
        return None;
    }
    let image = Rect::new(0.0, 0.0, image_width, image_height);
    let source = sample.to_rect().intersect(image);
    if source.width() <= 0.0 || source.height() <= 0.0 {
        return None;
    }

    let transform = sample.to_dest(dest);
    let dest = transform.transform_rect_bbox(source);
    Some(VisibleMapping {
        source,
        dest,
        transform,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/transform/sample.rs"]
mod tests;
