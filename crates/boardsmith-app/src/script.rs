//! JSON scripts of pointer and keyboard input replayed through an editor.
//!
//! A script is a JSON array of steps:
//!
//! ```json
//! [
//!   { "step": "pointer", "event": { "type": "down", "position": { "x": 40.0, "y": 40.0 } } },
//!   { "step": "pointer", "event": { "type": "up", "position": { "x": 90.0, "y": 60.0 } } },
//!   { "step": "key", "key": "Z", "ctrl": true },
//!   { "step": "command", "command": "redo" }
//! ]
//! ```

use crate::error::{AppError, AppResult};
use crate::shortcuts::{Command, ShortcutRegistry};
use boardsmith_core::{Editor, PointerEvent};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One scripted input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum Step {
    Pointer {
        event: PointerEvent,
    },
    /// A key press resolved through the shortcut registry.
    Key {
        key: String,
        #[serde(default)]
        ctrl: bool,
        #[serde(default)]
        shift: bool,
    },
    Command {
        command: Command,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Script {
    pub steps: Vec<Step>,
}

impl Script {
    pub fn from_json(json: &str) -> AppResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> AppResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Feed every step to `editor`, stopping at the first failing one.
    pub fn run(&self, editor: &mut Editor) -> AppResult<()> {
        for (index, step) in self.steps.iter().enumerate() {
            log::debug!("step {}: {:?}", index, step);
            run_step(editor, step)?;
        }
        Ok(())
    }
}

fn run_step(editor: &mut Editor, step: &Step) -> AppResult<()> {
    match step {
        Step::Pointer { event } => {
            editor.handle_pointer_event(event.clone());
            Ok(())
        }
        Step::Key { key, ctrl, shift } => {
            let command = ShortcutRegistry::find(key, *ctrl, *shift).ok_or_else(|| {
                let mut name = String::new();
                if *ctrl {
                    name.push_str("Ctrl+");
                }
                if *shift {
                    name.push_str("Shift+");
                }
                name.push_str(key);
                AppError::UnknownShortcut(name)
            })?;
            run_command(editor, command)
        }
        Step::Command { command } => run_command(editor, *command),
    }
}

/// Execute one editor command.
pub fn run_command(editor: &mut Editor, command: Command) -> AppResult<()> {
    match command {
        Command::Undo => {
            if !editor.undo() {
                log::debug!("nothing to undo");
            }
        }
        Command::Redo => {
            if !editor.redo() {
                log::debug!("nothing to redo");
            }
        }
        Command::Group => {
            if let Some(group) = editor.group_selected() {
                log::info!("created group {}", group);
            }
        }
        Command::Ungroup => {
            let members = editor.ungroup_selected();
            log::info!("ungrouped into {} units", members.len());
        }
        Command::Copy => {
            let copied = editor.copy();
            log::info!("copied {} elements", copied);
        }
        Command::Paste => {
            let pasted = editor.paste()?;
            log::info!("pasted {} elements", pasted.len());
        }
        Command::Delete => {
            let deleted = editor.delete_selected()?;
            log::info!("deleted {} elements", deleted);
        }
        Command::Abort => editor.abort_gesture(),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use boardsmith_core::{Element, SelectionModel};
    use kurbo::{Point, Rect};
    use std::io::Write;

    const DRAG_AND_UNDO: &str = r#"[
        { "step": "pointer", "event": { "type": "down", "position": { "x": 5.0, "y": 5.0 } } },
        { "step": "pointer", "event": { "type": "move", "position": { "x": 25.0, "y": 15.0 } } },
        { "step": "pointer", "event": { "type": "up", "position": { "x": 45.0, "y": 25.0 } } },
        { "step": "key", "key": "Z", "ctrl": true }
    ]"#;

    fn editor_with_piece() -> (Editor, boardsmith_core::ElementId) {
        let mut editor = Editor::default();
        let piece = editor
            .insert_on_board(
                Element::new("piece", Rect::new(0.0, 0.0, 10.0, 10.0))
                    .moveable(true)
                    .with_drag(boardsmith_core::factory(boardsmith_core::drag::DragMoveOperation::new)),
            )
            .unwrap();
        (editor, piece)
    }

    #[test]
    fn test_parse_steps() {
        let script = Script::from_json(DRAG_AND_UNDO).unwrap();
        assert_eq!(script.len(), 4);
        assert_eq!(
            script.steps[3],
            Step::Key {
                key: "Z".to_string(),
                ctrl: true,
                shift: false,
            }
        );
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"[{{ "step": "command", "command": "paste" }}]"#).unwrap();

        let script = Script::load(file.path()).unwrap();
        assert_eq!(
            script.steps,
            vec![Step::Command {
                command: Command::Paste
            }]
        );
    }

    #[test]
    fn test_invalid_script() {
        assert!(matches!(
            Script::from_json(r#"[{ "step": "dance" }]"#),
            Err(AppError::Script(_))
        ));
        assert!(matches!(Script::load("/nonexistent/script.json"), Err(AppError::Io(_))));
    }

    #[test]
    fn test_run_drag_then_undo() {
        let (mut editor, piece) = editor_with_piece();
        let script = Script::from_json(DRAG_AND_UNDO).unwrap();

        Script {
            steps: script.steps[..3].to_vec(),
        }
        .run(&mut editor)
        .unwrap();
        assert_eq!(editor.scene.get(piece).unwrap().position(), Point::new(40.0, 20.0));
        assert!(editor.selection.is_selected(&editor.scene, piece));

        run_step(&mut editor, &script.steps[3]).unwrap();
        assert_eq!(editor.scene.get(piece).unwrap().position(), Point::ZERO);
    }

    #[test]
    fn test_unknown_shortcut_stops_script() {
        let (mut editor, _) = editor_with_piece();
        let script = Script::from_json(r#"[{ "step": "key", "key": "Q", "ctrl": true }]"#).unwrap();

        let err = script.run(&mut editor).unwrap_err();
        assert!(matches!(err, AppError::UnknownShortcut(ref name) if name == "Ctrl+Q"));
    }

    #[test]
    fn test_copy_paste_commands() {
        let (mut editor, piece) = editor_with_piece();
        editor.selection.select(&mut editor.scene, piece);

        run_command(&mut editor, Command::Copy).unwrap();
        run_command(&mut editor, Command::Paste).unwrap();
        assert_eq!(editor.scene.children(editor.canvas.base_root()).len(), 2);

        run_command(&mut editor, Command::Delete).unwrap();
        assert_eq!(editor.scene.children(editor.canvas.base_root()).len(), 1);
    }
}
