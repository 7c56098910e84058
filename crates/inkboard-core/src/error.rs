//! Error types for the whiteboard core.

use thiserror::Error;

/// Errors raised while loading or validating canvas state.
#[derive(Debug, Error)]
pub enum CanvasError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid canvas state: {0}")]
    InvalidState(String),
}

/// Result type for canvas operations.
pub type CanvasResult<T> = Result<T, CanvasError>;
