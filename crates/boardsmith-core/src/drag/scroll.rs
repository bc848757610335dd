use super::{DragOperation, DragStart};
use crate::editor::Editor;
use crate::element::ElementId;
use crate::event::Event;
use crate::input::PointerInput;
use kurbo::Point;

/// Pans the viewport with the pointer.
#[derive(Debug, Default)]
pub struct DragScrollOperation {
    /// Last pointer position in page coordinates.
    last_page: Point,
}

impl DragScrollOperation {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DragOperation for DragScrollOperation {
    fn do_drag_start(&mut self, _editor: &mut Editor, _element: ElementId, start: &DragStart) {
        self.last_page = start.page;
    }

    fn do_drag_move(&mut self, editor: &mut Editor, _element: ElementId, _point: Point, input: &PointerInput) {
        editor.canvas.viewport.pan(input.position - self.last_page);
        self.last_page = input.position;
    }

    fn do_drop(&mut self, editor: &mut Editor, _element: ElementId, _point: Point, _input: &PointerInput) {
        let base = editor.canvas.base_root();
        editor.scene.fire(base, Event::ScrollEnd);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventKind;
    use crate::input::MouseButton;
    use crate::observable::tests::{Recorder, watch};
    use kurbo::Vec2;
    use std::sync::Arc;

    #[test]
    fn test_middle_drag_pans_viewport() {
        let mut editor = Editor::default();
        let recorder = Arc::new(Recorder::default());
        let base = editor.canvas.base_root();
        watch(&mut editor.scene, &recorder, &[base]);
        let press = |x, y| PointerInput::new(Point::new(x, y)).with_button(MouseButton::Middle);

        editor.pointer_down(press(100.0, 100.0));
        editor.pointer_move(press(130.0, 90.0));
        editor.pointer_move(press(150.0, 80.0));
        editor.pointer_up(press(150.0, 80.0));

        assert_eq!(editor.canvas.viewport.offset, Vec2::new(50.0, -20.0));
        assert_eq!(editor.canvas.canvas_point(Point::new(150.0, 80.0)), Point::new(100.0, 100.0));
        assert_eq!(recorder.kinds(), vec![EventKind::ScrollEnd]);
    }
}
