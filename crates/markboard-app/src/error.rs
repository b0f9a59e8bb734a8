//! Application error type.

use markboard_core::config::ConfigError;
use markboard_core::document::DocumentError;
use markboard_core::entitlements::CapacityError;
use markboard_core::session::SessionError;
use markboard_render::RenderError;
use thiserror::Error;

/// Errors surfaced by CLI commands.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Document(#[from] DocumentError),
    #[error(transparent)]
    Capacity(#[from] CapacityError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error("Invalid script: {0}")]
    Script(String),
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Result type for CLI commands.
pub type AppResult<T> = Result<T, AppError>;
