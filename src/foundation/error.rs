/// Convenience result type used across gameframe.
pub type FrameResult<T> = Result<T, FrameError>;

/// Top-level error taxonomy used by studio APIs.
#[derive(thiserror::Error, Debug)]
pub enum FrameError {
    /// The uploaded file could not be read or decoded.
    #[error("read error: {0}")]
    Read(String),

    /// Face detection failed. Absorbed by the session, which falls back to a center crop.
    #[error("detection error: {0}")]
    Detection(String),

    /// The enhancement call failed or returned no usable image.
    #[error("enhancement error: {0}")]
    Enhancement(String),

    /// The active image could not be turned into drawable pixels.
    #[error("image decode error: {0}")]
    ImageDecode(String),

    /// The frame graphic could not be parsed or rasterized.
    #[error("frame load error: {0}")]
    FrameLoad(String),

    /// Compositing failed for a reason other than decoding.
    #[error("render error: {0}")]
    Render(String),

    /// PNG encoding or writing the exported file failed.
    #[error("export error: {0}")]
    Export(String),

    /// An event arrived in a phase that does not accept it.
    #[error("invalid transition: {0}")]
    InvalidTransition(String),

    /// Invalid configuration values.
    #[error("config error: {0}")]
    Config(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FrameError {
    /// Build a [`FrameError::Read`] value.
    pub fn read(msg: impl Into<String>) -> Self {
        Self::Read(msg.into())
    }

    /// Build a [`FrameError::Detection`] value.
    pub fn detection(msg: impl Into<String>) -> Self {
        Self::Detection(msg.into())
    }

    /// Build a [`FrameError::Enhancement`] value.
    pub fn enhancement(msg: impl Into<String>) -> Self {
        Self::Enhancement(msg.into())
    }

    /// Build a [`FrameError::ImageDecode`] value.
    pub fn image_decode(msg: impl Into<String>) -> Self {
        Self::ImageDecode(msg.into())
    }

    /// Build a [`FrameError::FrameLoad`] value.
    pub fn frame_load(msg: impl Into<String>) -> Self {
        Self::FrameLoad(msg.into())
    }

    /// Build a [`FrameError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`FrameError::Export`] value.
    pub fn export(msg: impl Into<String>) -> Self {
        Self::Export(msg.into())
    }

    /// Build a [`FrameError::InvalidTransition`] value.
    pub fn invalid_transition(msg: impl Into<String>) -> Self {
        Self::InvalidTransition(msg.into())
    }

    /// Build a [`FrameError::Config`] value.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Text shown to the user when this error is surfaced.
    pub fn user_message(&self) -> String {
        match self {
            Self::Read(_) => "Failed to read the image file.".to_string(),
            Self::Detection(_) => "Could not analyze photo for headshot detection.".to_string(),
            Self::Enhancement(msg) => format!("AI enhancement failed: {msg}"),
            Self::ImageDecode(_) => "Failed to load the uploaded image.".to_string(),
            Self::FrameLoad(_) => "Failed to load the photo frame graphic.".to_string(),
            Self::Export(_) => "Failed to create image file.".to_string(),
            Self::Render(msg) | Self::InvalidTransition(msg) | Self::Config(msg) => msg.clone(),
            Self::Other(err) => err.to_string(),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
