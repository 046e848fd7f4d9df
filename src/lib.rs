//! gameframe decorates a portrait photo with the "GAME ON" event frame.
//!
//! The flow is session-oriented:
//!
//! - Upload a photo into a [`Studio`]; a face is located through an [`AiGateway`]
//! - Adjust zoom and pan, optionally run the one-shot AI enhancement
//! - Render previews and export a PNG through an [`ExportSink`]
//!
//! All rendering happens on the CPU in a fixed 1080x1350 design space, so a
//! preview and an export of the same state differ only in resolution.
#![forbid(unsafe_code)]

pub mod assets;
pub mod config;
pub mod export;
pub mod foundation;
pub mod gateway;
pub mod render;
pub mod session;
pub mod transform;

pub use crate::assets::decode::SourceImage;
pub use crate::assets::frame::{FrameGraphic, PhotoCircle};
pub use crate::config::{GatewaySettings, StudioConfig};
pub use crate::export::png::{ExportedFile, ShareDetails, SharePayload, encode_png};
pub use crate::export::sink::{DirectorySink, ExportSink, InMemorySink};
pub use crate::foundation::core::{BoundingBox, Canvas, Point, Rgba8, Vec2, ViewTransform};
pub use crate::foundation::error::{FrameError, FrameResult};
pub use crate::gateway::gemini::{GeminiConfig, GeminiGateway};
pub use crate::gateway::{AiGateway, EnhancedImage, OfflineGateway};
pub use crate::render::backend::{Compositor, RenderJob, RenderSettings, RenderedFrame};
pub use crate::render::cpu::CpuCompositor;
pub use crate::session::reducer::{Effect, Event, Transition, reduce};
pub use crate::session::runtime::{EffectOutcome, ExportReport, RenderKey, Studio};
pub use crate::session::state::{ImageId, Phase, Session, Variant};
pub use crate::transform::sample::{SampleRect, compute_sample_rect};
