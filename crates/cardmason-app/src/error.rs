//! Application errors.

use cardmason_core::{ConfigError, LayoutError};
use cardmason_render::RendererError;
use thiserror::Error;

/// Errors surfaced by the hosts.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error("Layout error: {0}")]
    Layout(#[from] LayoutError),
    #[error("Render error: {0}")]
    Render(#[from] RendererError),
    #[error("Invalid script: {0}")]
    Script(String),
}

/// Result type for application operations.
pub type AppResult<T> = Result<T, AppError>;
