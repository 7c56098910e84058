//! Application errors.

use inkboard_core::error::CanvasError;
use inkboard_render::RendererError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid settings in {}: {source}", path.display())]
    Settings {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Canvas(#[from] CanvasError),
    #[error(transparent)]
    Render(#[from] RendererError),
    #[error("invalid color: {0}")]
    InvalidColor(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AppError::Io {
            path: path.into(),
            source,
        }
    }
}
