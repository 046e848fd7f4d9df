use std::sync::Arc;

use anyhow::Context;

use crate::foundation::error::{FrameError, FrameResult};

/// Decoded raster in premultiplied RGBA8 form.
#[derive(Clone, Debug)]
pub struct PreparedImage {
    pub width: u32,
    pub height: u32,
    /// Premultiplied RGBA8, row-major, tightly packed.
    pub rgba8_premul: Arc<Vec<u8>>,
}

/// An uploaded (or AI-edited) photo: the encoded bytes sent to the gateway
/// plus the decoded pixels drawn by the compositor.
#[derive(Clone, Debug)]
pub struct SourceImage {
    pub bytes: Arc<Vec<u8>>,
    pub mime_type: String,
    pub pixels: PreparedImage,
}

impl SourceImage {
    /// Decode an upload. `mime_type` falls back to content sniffing when absent.
    pub fn from_bytes(bytes: Vec<u8>, mime_type: Option<&str>) -> FrameResult<Self> {
        let mime_type = match mime_type {
            Some(m) if !m.trim().is_empty() => m.trim().to_string(),
            _ => sniff_mime_type(&bytes)
                .ok_or_else(|| FrameError::read("unrecognized image format"))?
                .to_string(),
        };
        let pixels = decode_image(&bytes).map_err(|e| FrameError::read(format!("{e:#}")))?;
        Ok(Self {
            bytes: Arc::new(bytes),
            mime_type,
            pixels,
        })
    }

    pub fn width(&self) -> u32 {
        self.pixels.width
    }

    pub fn height(&self) -> u32 {
        self.pixels.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.pixels.width, self.pixels.height)
    }
}

/// MIME type guessed from magic bytes, e.g. `image/jpeg`.
pub fn sniff_mime_type(bytes: &[u8]) -> Option<&'static str> {
    image::guess_format(bytes).ok().map(|f| f.to_mime_type())
}

pub fn decode_image(bytes: &[u8]) -> FrameResult<PreparedImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    Ok(PreparedImage {
        width,
        height,
        rgba8_premul: Arc::new(rgba8_premul),
    })
}

pub fn parse_svg(bytes: &[u8]) -> FrameResult<usvg::Tree> {
    let mut opts = usvg::Options::default();
    opts.fontdb_mut().load_system_fonts();
    let tree = usvg::Tree::from_data(bytes, &opts).context("parse svg tree")?;
    Ok(tree)
}

fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}

/// Inverse of premultiplication, used before PNG encoding.
pub fn unpremultiply_rgba8(rgba8_premul: &[u8]) -> Vec<u8> {
    let mut out = rgba8_premul.to_vec();
    for px in out.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        if a == 0 || a == 255 {
            continue;
        }
        for c in &mut px[..3] {
            *c = ((u16::from(*c) * 255 + a / 2) / a).min(255) as u8;
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
