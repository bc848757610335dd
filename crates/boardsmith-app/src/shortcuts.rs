//! Keyboard shortcut registry.

use serde::{Deserialize, Serialize};

/// Editor command reachable from the keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    Undo,
    Redo,
    Group,
    Ungroup,
    Copy,
    Paste,
    Delete,
    Abort,
}

/// A keyboard shortcut definition.
#[derive(Debug, Clone)]
pub struct Shortcut {
    pub key: &'static str,
    pub ctrl: bool,
    pub shift: bool,
    pub command: Command,
    pub description: &'static str,
}

impl Shortcut {
    pub const fn new(key: &'static str, ctrl: bool, shift: bool, command: Command, description: &'static str) -> Self {
        Self {
            key,
            ctrl,
            shift,
            command,
            description,
        }
    }

    /// Format the shortcut for display (e.g., "Ctrl+Z").
    pub fn format(&self) -> String {
        let mut parts = Vec::new();
        if self.ctrl {
            parts.push("Ctrl");
        }
        if self.shift {
            parts.push("Shift");
        }
        parts.push(self.key);
        parts.join("+")
    }

    fn matches(&self, key: &str, ctrl: bool, shift: bool) -> bool {
        self.key.eq_ignore_ascii_case(key) && self.ctrl == ctrl && self.shift == shift
    }
}

/// Registry of all keyboard shortcuts.
pub struct ShortcutRegistry;

impl ShortcutRegistry {
    /// Get all registered shortcuts.
    pub fn all() -> Vec<Shortcut> {
        vec![
            Shortcut::new("Z", true, false, Command::Undo, "Undo"),
            Shortcut::new("Z", true, true, Command::Redo, "Redo"),
            Shortcut::new("Y", true, false, Command::Redo, "Redo"),
            Shortcut::new("G", true, false, Command::Group, "Group selected elements"),
            Shortcut::new("G", true, true, Command::Ungroup, "Ungroup selected elements"),
            Shortcut::new("C", true, false, Command::Copy, "Copy selection"),
            Shortcut::new("V", true, false, Command::Paste, "Paste copies"),
            Shortcut::new("Delete", false, false, Command::Delete, "Delete selected elements"),
            Shortcut::new("Backspace", false, false, Command::Delete, "Delete selected elements"),
            Shortcut::new("Escape", false, false, Command::Abort, "Cancel current drag"),
        ]
    }

    /// Command bound to a key combination, if any.
    pub fn find(key: &str, ctrl: bool, shift: bool) -> Option<Command> {
        Self::all()
            .into_iter()
            .find(|shortcut| shortcut.matches(key, ctrl, shift))
            .map(|shortcut| shortcut.command)
    }

    /// Log all shortcuts.
    pub fn log_all() {
        for shortcut in Self::all() {
            log::debug!("  {:20} {}", shortcut.format(), shortcut.description);
        }
    }
}
