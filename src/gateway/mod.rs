//! Boundary to the external AI service.
//!
//! The session only depends on [`AiGateway`]; [`gemini::GeminiGateway`] is the
//! production implementation and [`OfflineGateway`] runs without network
//! access (no face is ever found and enhancement is unavailable).

use std::future::Future;

use crate::foundation::{
    core::BoundingBox,
    error::{FrameError, FrameResult},
};

pub mod gemini;

/// Image bytes returned by an enhancement call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnhancedImage {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

/// Face detection and image enhancement.
///
/// `detect_face` returns `Ok(None)` for "no face" (including empty or
/// malformed answers) and `Err` only for transport-level failures.
/// `enhance` fails when the service answers without an image.
pub trait AiGateway {
    fn detect_face(
        &self,
        image: &[u8],
        mime_type: &str,
    ) -> impl Future<Output = FrameResult<Option<BoundingBox>>>;

    fn enhance(
        &self,
        image: &[u8],
        mime_type: &str,
        instruction: &str,
    ) -> impl Future<Output = FrameResult<EnhancedImage>>;
}

/// Gateway that never talks to the network.
#[derive(Clone, Copy, Debug, Default)]
pub struct OfflineGateway;

impl AiGateway for OfflineGateway {
    async fn detect_face(
        &self,
        _image: &[u8],
        _mime_type: &str,
    ) -> FrameResult<Option<BoundingBox>> {
        Ok(None)
    }

    async fn enhance(
        &self,
        _image: &[u8],
        _mime_type: &str,
        _instruction: &str,
    ) -> FrameResult<EnhancedImage> {
        Err(FrameError::enhancement(
            "enhancement is unavailable without an AI gateway",
        ))
    }
}
