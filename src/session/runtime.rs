//! Effect runner around the pure reducer.
//!
//! [`Studio`] owns the current [`Session`] snapshot together with the gateway,
//! compositor and export sink. Public operations dispatch one event and then
//! drain the resulting effects, feeding every outcome back through the
//! reducer, so all state changes still go through [`reduce`].

use std::{collections::VecDeque, path::PathBuf};

use crate::{
    assets::decode::SourceImage,
    config::StudioConfig,
    export::{
        png::{ExportedFile, SharePayload, encode_png},
        sink::ExportSink,
    },
    foundation::{
        core::{BoundingBox, Canvas, Point, Vec2, ViewTransform},
        error::{FrameError, FrameResult},
    },
    gateway::AiGateway,
    render::backend::{Compositor, RenderJob, RenderedFrame},
    session::{
        reducer::{Effect, Event, reduce},
        state::{ImageId, Phase, Session, Variant},
    },
};

/// Everything that determines a preview raster.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderKey {
    pub image_id: ImageId,
    pub variant: Variant,
    pub bbox: Option<BoundingBox>,
    pub view: ViewTransform,
    pub output: Canvas,
}

/// Outcome of running one effect.
#[derive(Debug, Default)]
pub struct EffectOutcome {
    /// Follow-up event for the reducer.
    pub event: Option<Event>,
    /// Typed error to hand back to the caller once the event is applied.
    pub error: Option<FrameError>,
}

impl EffectOutcome {
    fn event(event: Event) -> Self {
        Self {
            event: Some(event),
            error: None,
        }
    }

    fn failed(event: Event, error: FrameError) -> Self {
        Self {
            event: Some(event),
            error: Some(error),
        }
    }
}

/// Where the last export went.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportReport {
    pub file_name: String,
    pub byte_len: usize,
    pub path: Option<PathBuf>,
}

pub struct Studio<G, S> {
    session: Session,
    config: StudioConfig,
    gateway: G,
    compositor: Box<dyn Compositor>,
    sink: S,
    live_preview: bool,
    preview: Option<(RenderKey, RenderedFrame)>,
    last_export_path: Option<PathBuf>,
}

impl<G: AiGateway, S: ExportSink> Studio<G, S> {
    pub fn new(
        config: StudioConfig,
        gateway: G,
        compositor: Box<dyn Compositor>,
        sink: S,
    ) -> Self {
        Self {
            session: Session::new(config.max_zoom),
            config,
            gateway,
            compositor,
            sink,
            live_preview: true,
            preview: None,
            last_export_path: None,
        }
    }

    /// Disable rendering after every view change. `preview()` still renders on demand.
    pub fn with_live_preview(mut self, enabled: bool) -> Self {
        self.live_preview = enabled;
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn config(&self) -> &StudioConfig {
        &self.config
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Last rendered preview, if any.
    pub fn current_preview(&self) -> Option<&RenderedFrame> {
        self.preview.as_ref().map(|(_, frame)| frame)
    }

    /// Apply one event. Rejected events leave the snapshot untouched.
    pub fn dispatch(&mut self, event: Event) -> FrameResult<Vec<Effect>> {
        self.apply(event).map(|(effects, _)| effects)
    }

    /// Returns the effects plus whether the event was current.
    fn apply(&mut self, event: Event) -> FrameResult<(Vec<Effect>, bool)> {
        let before = self.session.phase();
        let transition = reduce(&self.session, event);
        if let Some(err) = transition.rejected {
            tracing::debug!(phase = ?before, error = %err, "event rejected");
            return Err(err);
        }
        if transition.stale {
            tracing::warn!(
                phase = ?before,
                current = ?self.session.image_id(),
                "discarding response for a previous image"
            );
            return Ok((Vec::new(), false));
        }
        self.session = transition.session;
        let after = self.session.phase();
        if before != after {
            tracing::info!(from = ?before, to = ?after, "session phase changed");
        }
        Ok((transition.effects, true))
    }

    /// Perform the I/O behind `effect`.
    pub async fn run_effect(&mut self, effect: Effect) -> EffectOutcome {
        match effect {
            Effect::DetectFace { image_id, image } => {
                let result = self
                    .gateway
                    .detect_face(image.bytes.as_slice(), &image.mime_type)
                    .await;
                let result = match result {
                    Ok(bbox) => {
                        tracing::debug!(?bbox, "face detection finished");
                        Ok(bbox)
                    }
                    Err(err) => {
                        tracing::warn!(error = %err, "face detection failed; using center crop");
                        Err(err.user_message())
                    }
                };
                EffectOutcome::event(Event::DetectionFinished { image_id, result })
            }
            Effect::Enhance {
                image_id,
                image,
                instruction,
            } => match self.enhance_image(&image, &instruction).await {
                Ok(edited) => EffectOutcome::event(Event::EnhancementFinished {
                    image_id,
                    result: Ok(edited),
                }),
                Err(err) => EffectOutcome::failed(
                    Event::EnhancementFinished {
                        image_id,
                        result: Err(err.user_message()),
                    },
                    err,
                ),
            },
            Effect::RenderPreview => {
                if !self.live_preview {
                    return EffectOutcome::default();
                }
                match self.render_preview() {
                    Ok(()) => EffectOutcome::default(),
                    Err(err) => EffectOutcome::failed(Event::RenderFailed(err.user_message()), err),
                }
            }
            Effect::Export => match self.export_active() {
                Ok((file, path)) => {
                    self.last_export_path = path;
                    EffectOutcome::event(Event::Exported(file))
                }
                Err(err) => EffectOutcome::failed(Event::ExportFailed(err.user_message()), err),
            },
            // Handing the payload to a share sheet is up to the embedder.
            Effect::Share { .. } => EffectOutcome::default(),
        }
    }

    /// Dispatch `event` and drain every effect it causes.
    pub async fn drive(&mut self, event: Event) -> FrameResult<()> {
        let (effects, _) = self.apply(event)?;
        let mut queue = VecDeque::from(effects);
        let mut surfaced = None;

        while let Some(effect) = queue.pop_front() {
            if matches!(effect, Effect::RenderPreview)
                && queue.iter().any(|e| matches!(e, Effect::RenderPreview))
            {
                tracing::debug!("coalescing queued preview render");
                continue;
            }
            let outcome = self.run_effect(effect).await;
            let Some(event) = outcome.event else {
                if let Some(err) = outcome.error {
                    surfaced.get_or_insert(err);
                }
                continue;
            };
            let (follow_up, current) = self.apply(event)?;
            if current && let Some(err) = outcome.error {
                surfaced.get_or_insert(err);
            }
            queue.extend(follow_up);
        }

        match surfaced {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Load a picked file and run face detection on it.
    ///
    /// Unreadable input keeps the previous image and surfaces a read error.
    /// Detection runs even when the first preview fails; the first error is returned.
    pub async fn upload(&mut self, bytes: Vec<u8>, mime_type: Option<&str>) -> FrameResult<()> {
        let image = match SourceImage::from_bytes(bytes, mime_type) {
            Ok(image) => image,
            Err(err) => {
                tracing::warn!(error = %err, "upload could not be read");
                self.dispatch(Event::UploadFailed(err.user_message()))?;
                return Err(err);
            }
        };
        tracing::info!(
            width = image.width(),
            height = image.height(),
            mime = %image.mime_type,
            "image uploaded"
        );
        // A failed first preview must not keep the upload from being analyzed.
        let shown = self.drive(Event::Upload(image)).await;
        if self.session.phase() != Phase::Uploaded {
            return shown;
        }
        let analyzed = self.drive(Event::UploadComplete).await;
        shown.and(analyzed)
    }

    /// Run the one-shot AI enhancement on the uploaded image.
    pub async fn enhance(&mut self) -> FrameResult<()> {
        let instruction = self.config.enhance_instruction.clone();
        self.drive(Event::Enhance { instruction }).await
    }

    pub async fn revert(&mut self) -> FrameResult<()> {
        self.drive(Event::Revert).await
    }

    pub async fn set_zoom(&mut self, zoom: f64) -> FrameResult<()> {
        self.drive(Event::SetZoom(zoom)).await
    }

    pub async fn pan_by(&mut self, delta: Vec2) -> FrameResult<()> {
        self.drive(Event::PanBy(delta)).await
    }

    pub async fn set_pan(&mut self, pan: Vec2) -> FrameResult<()> {
        self.drive(Event::SetPan(pan)).await
    }

    pub async fn drag_start(&mut self, point: Point) -> FrameResult<()> {
        self.drive(Event::DragStart(point)).await
    }

    pub async fn drag_move(&mut self, point: Point) -> FrameResult<()> {
        self.drive(Event::DragMove(point)).await
    }

    pub async fn drag_end(&mut self) -> FrameResult<()> {
        self.drive(Event::DragEnd).await
    }

    pub async fn reset_view(&mut self) -> FrameResult<()> {
        self.drive(Event::ResetView).await
    }

    /// Render the preview for the current snapshot, reusing the last one when
    /// nothing that affects it has changed.
    pub fn preview(&mut self) -> FrameResult<Option<&RenderedFrame>> {
        self.render_preview()?;
        Ok(self.current_preview())
    }

    /// Render at export resolution, encode PNG and deliver it to the sink.
    pub async fn export(&mut self) -> FrameResult<ExportReport> {
        self.drive(Event::Export).await?;
        let file = self
            .session
            .exported()
            .ok_or_else(|| FrameError::export("export finished without a file"))?;
        Ok(ExportReport {
            file_name: file.file_name.clone(),
            byte_len: file.bytes.len(),
            path: self.last_export_path.clone(),
        })
    }

    /// Build the share payload for the last export.
    pub fn share(&mut self) -> FrameResult<SharePayload> {
        let effects = self.dispatch(Event::Share)?;
        let file = effects
            .into_iter()
            .find_map(|effect| match effect {
                Effect::Share { file } => Some(file),
                _ => None,
            })
            .ok_or_else(|| {
                FrameError::invalid_transition(
                    "Sharing is not available or no image has been prepared.",
                )
            })?;
        Ok(SharePayload {
            file: (*file).clone(),
            details: self.config.share.clone(),
        })
    }

    fn render_key(&self, output: Canvas) -> Option<RenderKey> {
        Some(RenderKey {
            image_id: self.session.image_id()?,
            variant: self.session.active_variant()?,
            bbox: self.session.bbox().copied(),
            view: *self.session.view(),
            output,
        })
    }

    fn render_preview(&mut self) -> FrameResult<()> {
        let Some(key) = self.render_key(self.config.preview) else {
            return Ok(());
        };
        if self.preview.as_ref().is_some_and(|(last, _)| *last == key) {
            tracing::debug!("preview unchanged; skipping render");
            return Ok(());
        }
        let frame = self.render_active(self.config.preview)?;
        self.preview = Some((key, frame));
        Ok(())
    }

    fn render_active(&mut self, output: Canvas) -> FrameResult<RenderedFrame> {
        let image = self
            .session
            .active_image()
            .ok_or_else(|| FrameError::render("no image to render"))?;
        let job = RenderJob {
            image: &image.pixels,
            bbox: self.session.bbox.as_ref(),
            view: &self.session.view,
            output,
        };
        self.compositor.render(&job)
    }

    fn export_active(&mut self) -> FrameResult<(ExportedFile, Option<PathBuf>)> {
        let frame = self.render_active(self.config.output)?;
        let file = encode_png(&frame, &self.config.export_file_name)?;
        let path = self.sink.deliver(&file)?;
        tracing::info!(
            file = %file.file_name,
            bytes = file.bytes.len(),
            width = frame.width,
            height = frame.height,
            "exported image"
        );
        Ok((file, path))
    }

    async fn enhance_image(
        &self,
        image: &SourceImage,
        instruction: &str,
    ) -> FrameResult<SourceImage> {
        let enhanced = self
            .gateway
            .enhance(image.bytes.as_slice(), &image.mime_type, instruction)
            .await?;
        let edited = SourceImage::from_bytes(enhanced.bytes, Some(&enhanced.mime_type))
            .map_err(|e| FrameError::enhancement(format!("returned image is unreadable: {e}")))?;
        if edited.dimensions() != image.dimensions() {
            tracing::warn!(
                original = ?image.dimensions(),
                edited = ?edited.dimensions(),
                "enhanced image size differs; face box is applied to the edited image"
            );
        }
        Ok(edited)
    }
}

impl<G, S> std::fmt::Debug for Studio<G, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Studio")
            .field("phase", &self.session.phase())
            .field("image_id", &self.session.image_id())
            .field("live_preview", &self.live_preview)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/runtime.rs"]
mod tests;
