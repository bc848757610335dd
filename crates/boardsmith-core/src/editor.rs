//! Editing session: scene, canvas, selection and the gesture in progress.

use crate::canvas::Canvas;
use crate::drag::{
    DragFactory, DragGesture, DragScrollOperation, DragSelectAreaOperation, DragSwitchOperation, factory,
};
use crate::element::{Element, ElementId};
use crate::error::SceneResult;
use crate::groups::{GroupId, GroupMember, Groups};
use crate::input::{MouseButton, PointerEvent, PointerInput};
use crate::scene::Scene;
use crate::selection::SelectionModel;
use crate::settings::EditorSettings;
use kurbo::{Affine, Point};
use std::collections::HashSet;
use std::fmt;

/// Zoom step of one wheel notch.
const WHEEL_ZOOM_FACTOR: f64 = 1.1;

/// Drag operation of the base layer root: middle button scrolls, anything else draws a
/// selection rectangle.
pub fn board_drag() -> DragFactory {
    factory(|| {
        DragSwitchOperation::new()
            .case(
                |_, _, _, input| input.button == MouseButton::Middle,
                DragScrollOperation::new(),
            )
            .otherwise(DragSelectAreaOperation::new())
    })
}

/// One editing session.
pub struct Editor {
    pub scene: Scene,
    pub canvas: Canvas,
    pub selection: Groups,
    pub settings: EditorSettings,
    gesture: Option<DragGesture>,
    /// Detached copies taken by the last [`Editor::copy`].
    clipboard: Vec<ElementId>,
    /// Button of the press in progress, for events that do not carry one.
    button: MouseButton,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(EditorSettings::default())
    }
}

impl fmt::Debug for Editor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Editor")
            .field("elements", &self.scene.len())
            .field("selection", &self.selection)
            .field("gesture", &self.gesture)
            .field("clipboard", &self.clipboard.len())
            .finish_non_exhaustive()
    }
}

impl Editor {
    pub fn new(settings: EditorSettings) -> Self {
        let mut scene = Scene::with_history_limit(settings.max_undo_history);
        let canvas = Canvas::new(&mut scene, &settings);
        if let Some(base) = scene.get_mut(canvas.base_root()) {
            base.drag = Some(board_drag());
        }
        Self {
            scene,
            canvas,
            selection: Groups::new(),
            settings,
            gesture: None,
            clipboard: Vec::new(),
            button: MouseButton::Left,
        }
    }

    /// Insert an element and attach it to the base layer.
    pub fn insert_on_board(&mut self, element: Element) -> SceneResult<ElementId> {
        let id = self.scene.insert(element);
        self.scene.add(self.canvas.base_root(), id)?;
        Ok(id)
    }

    // --- pointer ---

    /// Start a gesture on the element under the pointer.
    ///
    /// Elements without a drag operation hand the press to the base layer root.
    pub fn pointer_down(&mut self, input: PointerInput) {
        if let Some(gesture) = self.gesture.take() {
            gesture.abort(self);
        }
        self.button = input.button;
        let point = self.canvas.canvas_point(input.position);
        let base = self.canvas.base_root();
        let hit = self
            .canvas
            .get_element_from_point(&self.scene, point, &HashSet::new())
            .filter(|&id| self.scene.get(id).is_some_and(|e| e.drag().is_some()))
            .unwrap_or(base);
        let Some(make) = self.scene.get(hit).and_then(|e| e.drag().cloned()) else {
            return;
        };
        self.gesture = DragGesture::begin(self, hit, make(), &input);
    }

    pub fn pointer_move(&mut self, input: PointerInput) {
        if let Some(mut gesture) = self.gesture.take() {
            gesture.on_drag_move(self, &input);
            self.gesture = Some(gesture);
        }
    }

    pub fn pointer_up(&mut self, input: PointerInput) {
        if let Some(gesture) = self.gesture.take() {
            gesture.on_drop(self, &input);
        }
    }

    /// Abandon the gesture in progress, reverting whatever it moved.
    pub fn abort_gesture(&mut self) {
        if let Some(gesture) = self.gesture.take() {
            gesture.abort(self);
        }
    }

    /// Whether a drag has started and not yet been dropped.
    pub fn is_dragging(&self) -> bool {
        self.gesture.as_ref().is_some_and(DragGesture::is_started)
    }

    /// Dispatch a page-space pointer event.
    pub fn handle_pointer_event(&mut self, event: PointerEvent) {
        match event {
            PointerEvent::Down {
                position,
                button,
                modifiers,
            } => self.pointer_down(PointerInput {
                position,
                button,
                modifiers,
            }),
            PointerEvent::Move { position, modifiers } => self.pointer_move(PointerInput {
                position,
                button: self.button,
                modifiers,
            }),
            PointerEvent::Up { position, modifiers } => self.pointer_up(PointerInput {
                position,
                button: self.button,
                modifiers,
            }),
            PointerEvent::Scroll { position, delta } => {
                let factor = if delta.y > 0.0 {
                    1.0 / WHEEL_ZOOM_FACTOR
                } else {
                    WHEEL_ZOOM_FACTOR
                };
                self.zoom_at(position, factor);
            }
        }
    }

    pub fn zoom_at(&mut self, page: Point, factor: f64) {
        self.canvas.zoom_at(&mut self.scene, page, factor);
    }

    // --- history ---

    /// Undo the last transaction. Does nothing in readonly mode.
    pub fn undo(&mut self) -> bool {
        if self.settings.readonly {
            return false;
        }
        self.abort_gesture();
        let undone = self.scene.undo();
        self.selection.retain_under(&mut self.scene, self.canvas.base_root());
        undone
    }

    /// Redo the last undone transaction. Does nothing in readonly mode.
    pub fn redo(&mut self) -> bool {
        if self.settings.readonly {
            return false;
        }
        self.abort_gesture();
        let redone = self.scene.redo();
        self.selection.retain_under(&mut self.scene, self.canvas.base_root());
        redone
    }

    // --- groups ---

    pub fn group_selected(&mut self) -> Option<GroupId> {
        if self.settings.readonly {
            return None;
        }
        self.scene.memento_mut().open();
        self.selection.regroup(&mut self.scene)
    }

    pub fn ungroup_selected(&mut self) -> Vec<GroupMember> {
        if self.settings.readonly {
            return Vec::new();
        }
        self.scene.memento_mut().open();
        self.selection.ungroup(&mut self.scene)
    }

    // --- clipboard ---

    /// Keep detached copies of the selection. Returns the number of copied elements.
    pub fn copy(&mut self) -> usize {
        let selected = self.selection.selected().to_vec();
        if selected.is_empty() {
            return 0;
        }
        self.clipboard = self.scene.duplicate(&selected);
        self.clipboard.len()
    }

    /// Place new copies of the clipboard on the board, offset from the previous paste,
    /// and select them. One transaction.
    pub fn paste(&mut self) -> SceneResult<Vec<ElementId>> {
        if self.settings.readonly || self.clipboard.is_empty() {
            return Ok(Vec::new());
        }
        let offset = Affine::translate(self.settings.paste_offset);
        for &id in &self.clipboard {
            if let Some(element) = self.scene.get_mut(id) {
                element.matrix = offset * element.matrix;
            }
        }
        self.scene.memento_mut().open();
        let pasted = self.scene.duplicate(&self.clipboard);
        let base = self.canvas.base_root();
        for &id in &pasted {
            self.scene.add(base, id)?;
        }
        self.selection.unselect_all(&mut self.scene);
        for &id in &pasted {
            self.selection.select(&mut self.scene, id);
        }
        log::debug!("pasted {} elements", pasted.len());
        Ok(pasted)
    }

    /// Detach the selected elements. One transaction.
    pub fn delete_selected(&mut self) -> SceneResult<usize> {
        if self.settings.readonly {
            return Ok(0);
        }
        let selected = self.selection.selected().to_vec();
        self.selection.unselect_all(&mut self.scene);
        self.scene.memento_mut().open();
        for &id in &selected {
            self.scene.detach(id)?;
        }
        Ok(selected.len())
    }
}
