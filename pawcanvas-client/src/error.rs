//! Error types for the backend collaborators.

use pawcanvas_core::CanvasError;
use thiserror::Error;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur when talking to the backend or the
/// background-removal service.
#[derive(Debug, Error)]
pub enum ClientError {
    /// A configured URL is invalid.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
    /// HTTP layer failed (connection, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// JSON parsing failed.
    #[error("failed to parse payload: {0}")]
    Json(#[from] serde_json::Error),
    /// Input rejected before any request was sent.
    #[error("{0}")]
    Validation(String),
    /// No session tokens are available.
    #[error("not logged in")]
    NotAuthenticated,
    /// Credentials or tokens were rejected.
    #[error("authentication failed: {0}")]
    Unauthorized(String),
    /// The backend answered with an error status.
    #[error("backend error {status}: {detail}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// The backend's `detail` message, or the raw body.
        detail: String,
    },
    /// The response did not match the expected structure.
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),
    /// Background removal is not configured.
    #[error("no background removal service configured")]
    NoBackgroundRemover,
}

impl From<ClientError> for CanvasError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Validation(msg) => Self::Validation(msg),
            other => Self::RemoteService(other.to_string()),
        }
    }
}
