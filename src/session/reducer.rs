//! Pure session transitions.
//!
//! `reduce` never performs I/O. Work that needs the outside world (gateway
//! calls, rendering, writing files) is returned as [`Effect`]s; the runtime
//! runs them and feeds the outcome back as another [`Event`].

use std::sync::Arc;

use crate::{
    assets::decode::SourceImage,
    export::png::ExportedFile,
    foundation::{
        core::{BoundingBox, Point, Vec2, ViewTransform},
        error::FrameError,
    },
    session::state::{DragState, ImageId, Phase, Session},
};

/// Inputs to the session.
///
/// Gateway and export outcomes carry the user-facing message on failure; the
/// typed error is returned to the caller by the runtime.
#[derive(Debug)]
pub enum Event {
    Upload(SourceImage),
    /// The picked file could not be read. The previous image stays.
    UploadFailed(String),
    UploadComplete,
    DetectionFinished {
        image_id: ImageId,
        result: Result<Option<BoundingBox>, String>,
    },
    Enhance {
        instruction: String,
    },
    EnhancementFinished {
        image_id: ImageId,
        result: Result<SourceImage, String>,
    },
    Revert,
    SetZoom(f64),
    PanBy(Vec2),
    SetPan(Vec2),
    DragStart(Point),
    DragMove(Point),
    DragEnd,
    ResetView,
    Export,
    Exported(ExportedFile),
    ExportFailed(String),
    RenderFailed(String),
    Share,
}

impl Event {
    fn name(&self) -> &'static str {
        match self {
            Self::Upload(_) => "upload",
            Self::UploadFailed(_) => "upload_failed",
            Self::UploadComplete => "upload_complete",
            Self::DetectionFinished { .. } => "detection_finished",
            Self::Enhance { .. } => "enhance",
            Self::EnhancementFinished { .. } => "enhancement_finished",
            Self::Revert => "revert",
            Self::SetZoom(_) => "set_zoom",
            Self::PanBy(_) => "pan_by",
            Self::SetPan(_) => "set_pan",
            Self::DragStart(_) => "drag_start",
            Self::DragMove(_) => "drag_move",
            Self::DragEnd => "drag_end",
            Self::ResetView => "reset_view",
            Self::Export => "export",
            Self::Exported(_) => "exported",
            Self::ExportFailed(_) => "export_failed",
            Self::RenderFailed(_) => "render_failed",
            Self::Share => "share",
        }
    }
}

/// Work requested by a transition.
#[derive(Clone, Debug)]
pub enum Effect {
    DetectFace {
        image_id: ImageId,
        image: SourceImage,
    },
    Enhance {
        image_id: ImageId,
        image: SourceImage,
        instruction: String,
    },
    RenderPreview,
    Export,
    Share {
        file: Arc<ExportedFile>,
    },
}

/// Result of applying one event.
#[derive(Debug)]
pub struct Transition {
    pub session: Session,
    pub effects: Vec<Effect>,
    /// The event is not accepted in the current phase; `session` is unchanged.
    pub rejected: Option<FrameError>,
    /// The event answered a request for an image that is no longer current.
    pub stale: bool,
}

impl Transition {
    fn applied(session: Session, effects: Vec<Effect>) -> Self {
        Self {
            session,
            effects,
            rejected: None,
            stale: false,
        }
    }

    fn rejected(session: &Session, msg: impl Into<String>) -> Self {
        Self {
            session: session.clone(),
            effects: Vec::new(),
            rejected: Some(FrameError::invalid_transition(msg)),
            stale: false,
        }
    }

    fn stale(session: &Session) -> Self {
        Self {
            session: session.clone(),
            effects: Vec::new(),
            rejected: None,
            stale: true,
        }
    }

    fn unchanged(session: &Session) -> Self {
        Self::applied(session.clone(), Vec::new())
    }
}

pub fn reduce(session: &Session, event: Event) -> Transition {
    let name = event.name();
    match event {
        Event::Upload(image) => {
            if session.phase == Phase::Enhancing {
                return Transition::rejected(session, "cannot upload while enhancement is running");
            }
            let image_id = ImageId(session.next_image_id);
            let next = Session {
                phase: Phase::Uploaded,
                next_image_id: session.next_image_id + 1,
                image_id: Some(image_id),
                source: Some(image),
                ..Session::new(session.max_zoom)
            };
            Transition::applied(next, vec![Effect::RenderPreview])
        }

        Event::UploadFailed(msg) => {
            let mut next = session.clone();
            next.error = Some(msg);
            Transition::applied(next, Vec::new())
        }

        Event::UploadComplete => {
            let (Phase::Uploaded, Some(image_id), Some(image)) =
                (session.phase, session.image_id, session.source.as_ref())
            else {
                return Transition::rejected(session, "no freshly uploaded image to analyze");
            };
            let effect = Effect::DetectFace {
                image_id,
                image: image.clone(),
            };
            let mut next = session.clone();
            next.phase = Phase::Analyzing;
            Transition::applied(next, vec![effect])
        }

        Event::DetectionFinished { image_id, result } => {
            if session.phase != Phase::Analyzing || session.image_id != Some(image_id) {
                return Transition::stale(session);
            }
            let mut next = session.clone();
            next.phase = Phase::Analyzed;
            // Detection failure only costs the face-centered crop.
            next.bbox = result.unwrap_or(None);
            Transition::applied(next, vec![Effect::RenderPreview])
        }

        Event::Enhance { instruction } => {
            if session.phase == Phase::Enhancing {
                return Transition::rejected(session, "enhancement is already running");
            }
            if !session.can_enhance() {
                return Transition::rejected(
                    session,
                    "enhancement is only available once per analyzed upload",
                );
            }
            let (Some(image_id), Some(image)) = (session.image_id, session.source.as_ref()) else {
                return Transition::rejected(session, "no image to enhance");
            };
            let effect = Effect::Enhance {
                image_id,
                image: image.clone(),
                instruction,
            };
            let mut next = session.clone();
            next.phase = Phase::Enhancing;
            next.exported = None;
            next.error = None;
            Transition::applied(next, vec![effect])
        }

        Event::EnhancementFinished { image_id, result } => {
            if session.phase != Phase::Enhancing || session.image_id != Some(image_id) {
                return Transition::stale(session);
            }
            let mut next = session.clone();
            match result {
                Ok(edited) => {
                    next.phase = Phase::Enhanced;
                    next.edited = Some(edited);
                    next.enhancement_spent = true;
                    Transition::applied(next, vec![Effect::RenderPreview])
                }
                Err(msg) => {
                    next.phase = Phase::Analyzed;
                    next.error = Some(msg);
                    Transition::applied(next, Vec::new())
                }
            }
        }

        Event::Revert => {
            if session.phase != Phase::Enhanced {
                return Transition::rejected(session, "there is no enhanced image to revert");
            }
            let mut next = session.clone();
            next.phase = Phase::Analyzed;
            next.edited = None;
            next.exported = None;
            next.error = None;
            Transition::applied(next, vec![Effect::RenderPreview])
        }

        Event::SetZoom(_)
        | Event::PanBy(_)
        | Event::SetPan(_)
        | Event::DragStart(_)
        | Event::DragMove(_)
        | Event::DragEnd
        | Event::ResetView
            if session.source.is_none() =>
        {
            Transition::rejected(session, format!("{name}: no image loaded"))
        }

        Event::SetZoom(zoom) => with_view(session, session.view.with_zoom(zoom, session.max_zoom)),
        Event::PanBy(delta) => with_view(session, session.view.with_pan(session.view.pan + delta)),
        Event::SetPan(pan) => with_view(session, session.view.with_pan(pan)),
        Event::ResetView => with_view(session, ViewTransform::default()),

        Event::DragStart(point) => {
            let mut next = session.clone();
            next.drag = Some(DragState {
                start_point: point,
                start_pan: session.view.pan,
            });
            Transition::applied(next, Vec::new())
        }
        Event::DragMove(point) => match session.drag {
            Some(drag) => with_view(
                session,
                session
                    .view
                    .with_pan(drag.start_pan + (point - drag.start_point)),
            ),
            None => Transition::unchanged(session),
        },
        Event::DragEnd => {
            let mut next = session.clone();
            next.drag = None;
            Transition::applied(next, Vec::new())
        }

        Event::Export => {
            if !session.can_export() {
                return Transition::rejected(session, "nothing to export yet");
            }
            let mut next = session.clone();
            next.error = None;
            Transition::applied(next, vec![Effect::Export])
        }

        Event::Exported(file) => {
            if !session.can_export() {
                return Transition::stale(session);
            }
            let mut next = session.clone();
            next.exported = Some(Arc::new(file));
            Transition::applied(next, Vec::new())
        }

        Event::ExportFailed(msg) | Event::RenderFailed(msg) => {
            let mut next = session.clone();
            next.error = Some(msg);
            Transition::applied(next, Vec::new())
        }

        Event::Share => match &session.exported {
            Some(file) => Transition::applied(
                session.clone(),
                vec![Effect::Share { file: file.clone() }],
            ),
            None => Transition::rejected(
                session,
                "Sharing is not available or no image has been prepared.",
            ),
        },
    }
}

fn with_view(session: &Session, view: ViewTransform) -> Transition {
    if view == session.view {
        return Transition::unchanged(session);
    }
    let mut next = session.clone();
    next.view = view;
    Transition::applied(next, vec![Effect::RenderPreview])
}

#[cfg(test)]
#[path = "../../tests/unit/session/reducer.rs"]
mod tests;
