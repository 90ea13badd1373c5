//! Renderer error types.

use pawcanvas_core::CanvasError;
use thiserror::Error;

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Errors that can occur while decoding or exporting.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Input bytes are not a usable image.
    #[error("Failed to decode image: {0}")]
    Decode(String),

    /// Encoding the output failed.
    #[error("Failed to encode image: {0}")]
    Encode(String),

    /// Building or rasterizing the SVG scene failed.
    #[error("Export failed: {0}")]
    Export(String),

    /// Export parameters were rejected.
    #[error("Invalid export parameters: {0}")]
    InvalidConfig(String),
}

impl From<RenderError> for CanvasError {
    fn from(err: RenderError) -> Self {
        match err {
            RenderError::Decode(msg) => Self::Decode(msg),
            RenderError::InvalidConfig(msg) => Self::Validation(msg),
            RenderError::Encode(_) | RenderError::Export(_) => Self::Render(err.to_string()),
        }
    }
}
