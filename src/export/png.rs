use std::io::Cursor;

use crate::{
    foundation::error::{FrameError, FrameResult},
    render::backend::RenderedFrame,
};

pub const PNG_MIME_TYPE: &str = "image/png";

/// An encoded export: the downloadable file and the handle kept for sharing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportedFile {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// Text attached to a share request alongside the exported file.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ShareDetails {
    pub title: String,
    pub text: String,
    pub url: String,
}

impl Default for ShareDetails {
    fn default() -> Self {
        Self {
            title: "GAME ON!".to_string(),
            text: "I have turned my game on! Get your custom photo frame for Rendezvous 2025. \
                   Join here: https://bit.ly/rendezvous-2025"
                .to_string(),
            url: "https://bit.ly/rendezvous-2025".to_string(),
        }
    }
}

/// What a platform share sheet receives.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SharePayload {
    pub file: ExportedFile,
    pub details: ShareDetails,
}

/// Encode a rendered frame as PNG.
pub fn encode_png(frame: &RenderedFrame, file_name: &str) -> FrameResult<ExportedFile> {
    let file_name = normalize_png_name(file_name)?;
    let rgba = frame.to_straight_rgba8();
    let img = image::RgbaImage::from_raw(frame.width, frame.height, rgba)
        .ok_or_else(|| FrameError::export("rendered frame byte length mismatch"))?;

    let mut bytes = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .map_err(|e| FrameError::export(format!("encode png: {e}")))?;

    Ok(ExportedFile {
        file_name,
        mime_type: PNG_MIME_TYPE.to_string(),
        bytes,
    })
}

/// Plain file name with a `.png` extension; path separators are rejected.
pub(crate) fn normalize_png_name(name: &str) -> FrameResult<String> {
    let name = name.trim();
    if name.is_empty() || name.contains(['/', '\\']) || name == "." || name == ".." {
        return Err(FrameError::export(format!("invalid export file name '{name}'")));
    }
    if name.to_ascii_lowercase().ends_with(".png") {
        Ok(name.to_string())
    } else {
        Ok(format!("{name}.png"))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/png.rs"]
mod tests;
