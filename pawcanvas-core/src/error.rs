//! Error types for canvas document operations.

use thiserror::Error;

use crate::ObjectId;

/// Result type for canvas operations.
pub type CanvasResult<T> = Result<T, CanvasError>;

/// Errors that can occur while editing a canvas document.
///
/// Every variant is recoverable: the document stays in its last good state.
#[derive(Debug, Error)]
pub enum CanvasError {
    /// Construction parameters were rejected.
    #[error("Invalid parameters: {0}")]
    Validation(String),

    /// The addressed object does not exist in the document.
    #[error("Object not found: {0}")]
    NotFound(ObjectId),

    /// No image object is eligible for the requested operation.
    #[error("No eligible image: {0}")]
    NoTarget(String),

    /// A bitmap could not be decoded.
    #[error("Failed to decode bitmap: {0}")]
    Decode(String),

    /// Flattening or encoding the document failed.
    #[error("Render failed: {0}")]
    Render(String),

    /// A remote collaborator (persistence, background removal) failed.
    #[error("Remote service failed: {0}")]
    RemoteService(String),

    /// Another remote operation is already in flight for this document.
    #[error("An operation is already in progress")]
    Busy,

    /// Snapshot serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CanvasError {
    /// Whether the error should be shown as a non-blocking notice rather
    /// than a hard failure of the editing action.
    #[must_use]
    pub fn is_notice(&self) -> bool {
        matches!(
            self,
            Self::NoTarget(_) | Self::RemoteService(_) | Self::Busy
        )
    }
}
