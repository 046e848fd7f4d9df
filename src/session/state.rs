//! Immutable session snapshots.

use std::sync::Arc;

use crate::{
    assets::decode::SourceImage,
    export::png::ExportedFile,
    foundation::core::{BoundingBox, Point, Vec2, ViewTransform},
};

/// Tag of one upload. Every gateway request carries the id it was issued for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ImageId(pub(crate) u64);

impl ImageId {
    pub fn get(self) -> u64 {
        self.0
    }
}

/// Lifecycle of the current image.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    Empty,
    Uploaded,
    Analyzing,
    Analyzed,
    Enhancing,
    Enhanced,
}

impl Phase {
    /// A gateway call is outstanding.
    pub fn is_busy(self) -> bool {
        matches!(self, Self::Analyzing | Self::Enhancing)
    }
}

/// Which image is displayed and exported.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Variant {
    Original,
    Edited,
}

/// Pointer position and pan at the start of a drag.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DragState {
    pub start_point: Point,
    pub start_pan: Vec2,
}

/// One snapshot of the studio. Transitions produce new snapshots; nothing
/// mutates a snapshot in place once it has been handed out.
#[derive(Clone, Debug)]
pub struct Session {
    pub(crate) phase: Phase,
    pub(crate) next_image_id: u64,
    pub(crate) image_id: Option<ImageId>,
    pub(crate) source: Option<SourceImage>,
    pub(crate) edited: Option<SourceImage>,
    pub(crate) bbox: Option<BoundingBox>,
    pub(crate) view: ViewTransform,
    pub(crate) drag: Option<DragState>,
    pub(crate) enhancement_spent: bool,
    pub(crate) exported: Option<Arc<ExportedFile>>,
    pub(crate) error: Option<String>,
    pub(crate) max_zoom: f64,
}

impl Session {
    pub fn new(max_zoom: f64) -> Self {
        Self {
            phase: Phase::Empty,
            next_image_id: 1,
            image_id: None,
            source: None,
            edited: None,
            bbox: None,
            view: ViewTransform::default(),
            drag: None,
            enhancement_spent: false,
            exported: None,
            error: None,
            max_zoom: max_zoom.max(1.0),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn image_id(&self) -> Option<ImageId> {
        self.image_id
    }

    pub fn source(&self) -> Option<&SourceImage> {
        self.source.as_ref()
    }

    pub fn edited(&self) -> Option<&SourceImage> {
        self.edited.as_ref()
    }

    pub fn active_variant(&self) -> Option<Variant> {
        match (&self.source, &self.edited) {
            (None, _) => None,
            (Some(_), Some(_)) => Some(Variant::Edited),
            (Some(_), None) => Some(Variant::Original),
        }
    }

    /// The edited image when one exists, otherwise the upload.
    pub fn active_image(&self) -> Option<&SourceImage> {
        self.edited.as_ref().or(self.source.as_ref())
    }

    pub fn bbox(&self) -> Option<&BoundingBox> {
        self.bbox.as_ref()
    }

    pub fn view(&self) -> &ViewTransform {
        &self.view
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn max_zoom(&self) -> f64 {
        self.max_zoom
    }

    pub fn exported(&self) -> Option<&ExportedFile> {
        self.exported.as_deref()
    }

    /// Last user-visible error, cleared by the next successful action.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn can_enhance(&self) -> bool {
        self.phase == Phase::Analyzed && self.edited.is_none() && !self.enhancement_spent
    }

    pub fn can_export(&self) -> bool {
        matches!(self.phase, Phase::Analyzed | Phase::Enhanced)
    }

    pub fn can_share(&self) -> bool {
        self.exported.is_some()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(3.0)
    }
}
