use super::{DragOperation, DragStart};
use crate::editor::Editor;
use crate::element::ElementId;
use crate::event::Event;
use crate::input::PointerInput;
use crate::selection::SelectionModel;
use kurbo::{Affine, Point, Rect};

/// Whether a canvas point lies in one of the four corner handles of `element`.
///
/// Handles are squares inside the local bounds, sized from the editor settings.
pub fn in_rotate_handle(editor: &Editor, element: ElementId, point: Point) -> bool {
    let Some(bounds) = editor.scene.get(element).map(|e| e.bounds()) else {
        return false;
    };
    let size = editor
        .settings
        .rotate_handle_size(bounds.width(), bounds.height());
    let local = editor.scene.global_to_local(element, point);
    [
        Rect::new(bounds.x0, bounds.y0, bounds.x0 + size, bounds.y0 + size),
        Rect::new(bounds.x1 - size, bounds.y0, bounds.x1, bounds.y0 + size),
        Rect::new(bounds.x0, bounds.y1 - size, bounds.x0 + size, bounds.y1),
        Rect::new(bounds.x1 - size, bounds.y1 - size, bounds.x1, bounds.y1),
    ]
    .iter()
    .any(|handle| handle.contains(local))
}

/// Rotates one element around the center of its bounding box.
#[derive(Debug, Default)]
pub struct DragRotateOperation {
    center: Point,
    start_angle: f64,
    angle: f64,
    /// Canvas transform of the element and of its parent at drag start.
    origin_global: Affine,
    parent_global: Affine,
}

impl DragRotateOperation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Angle applied so far, in radians.
    pub fn angle(&self) -> f64 {
        self.angle
    }

    fn revert(editor: &mut Editor, element: ElementId) {
        if let Some(session) = editor.scene.end_drag_session(element) {
            editor.scene.revert(element, &session.origin);
            editor.scene.recover(element, &session.origin);
        }
    }
}

impl DragOperation for DragRotateOperation {
    fn accept(&mut self, editor: &Editor, element: ElementId, point: Point, _input: &PointerInput) -> bool {
        !editor.settings.readonly
            && editor
                .scene
                .get(element)
                .is_some_and(|e| e.rotatable && e.parent().is_some())
            && in_rotate_handle(editor, element, point)
    }

    fn do_drag_start(&mut self, editor: &mut Editor, element: ElementId, start: &DragStart) {
        let scene = &mut editor.scene;
        scene.memento_mut().open();
        editor
            .selection
            .adjust_selection(scene, element, start.input.modifiers, false);

        scene.register(element);
        let parent = scene.parent(element);
        if let Some(parent) = parent {
            scene.register(parent);
        }
        scene.begin_drag_session(element);

        self.center = scene.gbox(element).center();
        self.start_angle = (start.point - self.center).atan2();
        self.angle = 0.0;
        self.origin_global = scene.global_matrix(element);
        self.parent_global = parent.map_or(Affine::IDENTITY, |p| scene.global_matrix(p));
        scene.fire(element, Event::DragStart(start.point));
    }

    fn do_drag_move(&mut self, editor: &mut Editor, element: ElementId, point: Point, _input: &PointerInput) {
        self.angle = (point - self.center).atan2() - self.start_angle;
        let global = Affine::rotate_about(self.angle, self.center) * self.origin_global;
        if let Some(e) = editor.scene.get_mut(element) {
            e.matrix = self.parent_global.inverse() * global;
        }
        editor.scene.fire(element, Event::DragRotated(self.angle));
    }

    fn do_drop(&mut self, editor: &mut Editor, element: ElementId, _point: Point, _input: &PointerInput) {
        let scene = &mut editor.scene;
        let Some(parent) = scene.parent(element) else {
            Self::revert(editor, element);
            editor.scene.memento_mut().cancel();
            return;
        };
        let accepted = scene.accepts_rotation(parent, element, self.angle)
            && scene.accepts_rotated(element, self.angle)
            && !scene.is_drop_cancelled(element);

        if accepted {
            scene.end_drag_session(element);
            scene.fire(element, Event::Geometry);
            scene.fire(parent, Event::ReceiveRotation(element));
            scene.fire(element, Event::Rotated(self.angle));
        } else {
            log::debug!("rotation of {} by {:.3} refused", element, self.angle);
            Self::revert(editor, element);
            editor.scene.fire(parent, Event::RevertRotation(element));
            editor.scene.fire(element, Event::RevertRotated(parent));
            editor.scene.memento_mut().cancel();
        }
    }

    fn do_click(&mut self, editor: &mut Editor, element: ElementId, _point: Point, input: &PointerInput) {
        editor
            .selection
            .adjust_selection(&mut editor.scene, element, input.modifiers, true);
    }

    fn do_abort(&mut self, editor: &mut Editor, element: ElementId) {
        Self::revert(editor, element);
        editor.scene.memento_mut().cancel();
    }
}
