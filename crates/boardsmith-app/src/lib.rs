//! Boardsmith Application
//!
//! Headless session driver: settings lookup, the demo board and scripted input.

mod demo;
mod error;
mod script;
mod shortcuts;

pub use demo::{DemoBoard, outline};
pub use error::{AppError, AppResult};
pub use script::{Script, Step, run_command};
pub use shortcuts::{Command, Shortcut, ShortcutRegistry};

use boardsmith_core::EditorSettings;
use std::path::PathBuf;

/// Location of the user's settings file.
pub fn settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("boardsmith").join("settings.json"))
}

/// Load the user's settings, falling back to defaults when there are none.
pub fn load_settings() -> AppResult<EditorSettings> {
    match settings_path() {
        Some(path) if path.exists() => {
            log::info!("Loading settings from {}", path.display());
            Ok(EditorSettings::load(&path)?)
        }
        _ => Ok(EditorSettings::default()),
    }
}
