//! Studio settings.
//!
//! Every field has a default, so an empty JSON object (or no file at all) is a
//! valid configuration. Gateway credentials are resolved later by
//! [`GeminiConfig::from_env`](crate::gateway::gemini::GeminiConfig::from_env).

use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::{
    assets::frame::FrameGraphic,
    export::png::{ShareDetails, normalize_png_name},
    foundation::core::{Canvas, Rgba8},
    foundation::error::{FrameError, FrameResult},
    gateway::gemini::{DEFAULT_DETECT_MODEL, DEFAULT_ENHANCE_MODEL},
    render::backend::RenderSettings,
};

pub const DEFAULT_ENHANCE_INSTRUCTION: &str = "Enhance the lighting and colors to make this photo \
look more vibrant and epic, suitable for a gaming event promo picture.";

pub const DEFAULT_EXPORT_FILE_NAME: &str = "game-on-photo.png";

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StudioConfig {
    /// Export resolution.
    pub output: Canvas,
    /// Live preview resolution.
    pub preview: Canvas,
    /// Upper bound of the zoom slider.
    pub max_zoom: f64,
    /// Background behind the photo, `#RRGGBB`.
    pub background: String,
    pub enhance_instruction: String,
    pub export_file_name: String,
    pub share: ShareDetails,
    /// Replacement frame artwork. Must keep the photo ring at (540, 620) r=300
    /// in a 1080x1350 viewBox.
    pub frame_svg: Option<PathBuf>,
    pub gateway: GatewaySettings,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            output: Canvas::EXPORT,
            preview: Canvas::PREVIEW,
            max_zoom: 3.0,
            background: "#0A011A".to_string(),
            enhance_instruction: DEFAULT_ENHANCE_INSTRUCTION.to_string(),
            export_file_name: DEFAULT_EXPORT_FILE_NAME.to_string(),
            share: ShareDetails::default(),
            frame_svg: None,
            gateway: GatewaySettings::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GatewaySettings {
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub detect_model: String,
    pub enhance_model: String,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            base_url: None,
            api_key: None,
            detect_model: DEFAULT_DETECT_MODEL.to_string(),
            enhance_model: DEFAULT_ENHANCE_MODEL.to_string(),
        }
    }
}

impl StudioConfig {
    /// Load and validate a JSON config file.
    pub fn load(path: &Path) -> FrameResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> FrameResult<Self> {
        let cfg: Self = serde_json::from_str(text)
            .map_err(|e| FrameError::config(format!("parse config JSON: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> FrameResult<()> {
        Canvas::new(self.output.width, self.output.height)?;
        Canvas::new(self.preview.width, self.preview.height)?;
        if !self.max_zoom.is_finite() || self.max_zoom < 1.0 {
            return Err(FrameError::config("max_zoom must be a finite number >= 1"));
        }
        Rgba8::from_hex(&self.background)?;
        if self.enhance_instruction.trim().is_empty() {
            return Err(FrameError::config("enhance_instruction must not be empty"));
        }
        if self.export_file_name.trim().is_empty() {
            return Err(FrameError::config("export_file_name must not be empty"));
        }
        normalize_png_name(&self.export_file_name).map_err(|_| {
            FrameError::config(format!(
                "export_file_name '{}' must be a plain file name",
                self.export_file_name
            ))
        })?;
        Ok(())
    }

    pub fn render_settings(&self) -> FrameResult<RenderSettings> {
        Ok(RenderSettings {
            background: Rgba8::from_hex(&self.background)?,
            ..RenderSettings::default()
        })
    }

    /// The configured frame artwork, or the bundled one.
    pub fn frame_graphic(&self) -> FrameResult<FrameGraphic> {
        match &self.frame_svg {
            Some(path) => FrameGraphic::from_path(path),
            None => FrameGraphic::builtin(),
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
