//! Editor settings.

use kurbo::Vec2;
use peniko::Color;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Settings errors.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid settings: {0}")]
    Json(#[from] serde_json::Error),
}

/// Serializable RGBA8 color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

impl From<Rgba> for Color {
    fn from(color: Rgba) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// Tunables of one editing session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    /// Page distance the pointer must travel before a press becomes a drag.
    pub drag_threshold: f64,
    /// Rotation handle size as a fraction of the element's smaller side.
    pub rotate_handle_ratio: f64,
    /// Lower bound of the rotation handle size.
    pub rotate_handle_min: f64,
    pub paste_offset: Vec2,
    /// Oldest transactions are dropped beyond this.
    pub max_undo_history: usize,
    pub min_zoom: f64,
    pub max_zoom: f64,
    pub highlight_color: Rgba,
    /// Suppresses gestures that mutate the scene, and undo/redo.
    pub readonly: bool,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            drag_threshold: 0.0,
            rotate_handle_ratio: 0.05,
            rotate_handle_min: 10.0,
            paste_offset: Vec2::new(10.0, 10.0),
            max_undo_history: crate::memento::MAX_UNDO_HISTORY,
            min_zoom: 0.1,
            max_zoom: 10.0,
            highlight_color: Rgba::new(255, 140, 0, 255),
            readonly: false,
        }
    }
}

impl EditorSettings {
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load settings from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Highlight color for renderers.
    pub fn highlight(&self) -> Color {
        self.highlight_color.into()
    }

    /// Side of the square rotation handle at each corner of a `width` x `height` element.
    pub fn rotate_handle_size(&self, width: f64, height: f64) -> f64 {
        (width.min(height) * self.rotate_handle_ratio).max(self.rotate_handle_min)
    }
}
