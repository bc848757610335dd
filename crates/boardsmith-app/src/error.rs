//! Errors of the session driver.

use boardsmith_core::{SceneError, SettingsError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),
    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid script: {0}")]
    Script(#[from] serde_json::Error),
    #[error("Unknown shortcut: {0}")]
    UnknownShortcut(String),
}

pub type AppResult<T> = Result<T, AppError>;
