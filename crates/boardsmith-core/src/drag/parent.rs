use super::{DragOperation, DragStart};
use crate::editor::Editor;
use crate::element::ElementId;
use crate::input::PointerInput;
use kurbo::Point;

/// Hands the gesture to the drag operation of the element's parent, so parts are moved
/// through their owner.
#[derive(Default)]
pub struct ParentDragOperation {
    delegate: Option<(ElementId, Box<dyn DragOperation>)>,
}

impl ParentDragOperation {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DragOperation for ParentDragOperation {
    fn accept(&mut self, editor: &Editor, element: ElementId, point: Point, input: &PointerInput) -> bool {
        self.delegate = None;
        let Some(parent) = editor.scene.parent(element) else {
            return false;
        };
        let Some(make) = editor.scene.get(parent).and_then(|e| e.drag().cloned()) else {
            return false;
        };
        let mut op = make();
        if !op.accept(editor, parent, point, input) {
            return false;
        }
        self.delegate = Some((parent, op));
        true
    }

    fn do_drag_start(&mut self, editor: &mut Editor, _element: ElementId, start: &DragStart) {
        if let Some((parent, op)) = self.delegate.as_mut() {
            op.do_drag_start(editor, *parent, start);
        }
    }

    fn do_drag_move(&mut self, editor: &mut Editor, _element: ElementId, point: Point, input: &PointerInput) {
        if let Some((parent, op)) = self.delegate.as_mut() {
            op.do_drag_move(editor, *parent, point, input);
        }
    }

    fn do_drop(&mut self, editor: &mut Editor, _element: ElementId, point: Point, input: &PointerInput) {
        if let Some((parent, op)) = self.delegate.as_mut() {
            op.do_drop(editor, *parent, point, input);
        }
    }

    fn do_click(&mut self, editor: &mut Editor, _element: ElementId, point: Point, input: &PointerInput) {
        if let Some((parent, op)) = self.delegate.as_mut() {
            op.do_click(editor, *parent, point, input);
        }
    }

    fn do_abort(&mut self, editor: &mut Editor, _element: ElementId) {
        if let Some((parent, op)) = self.delegate.as_mut() {
            op.do_abort(editor, *parent);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drag::{DragMoveOperation, factory};
    use crate::element::{Element, Selectability};
    use kurbo::Rect;

    #[test]
    fn test_dragging_a_part_moves_its_owner() {
        let mut editor = Editor::default();
        let tile = editor
            .insert_on_board(
                Element::container("tile", Rect::new(0.0, 0.0, 40.0, 40.0))
                    .moveable(true)
                    .with_drag(factory(DragMoveOperation::new)),
            )
            .unwrap();
        let part = editor.scene.insert(
            Element::new("emblem", Rect::new(0.0, 0.0, 10.0, 10.0))
                .at(Point::new(5.0, 5.0))
                .selectable(Selectability::Owner)
                .with_drag(factory(ParentDragOperation::new)),
        );
        editor.scene.add(tile, part).unwrap();

        editor.pointer_down(PointerInput::new(Point::new(8.0, 8.0)));
        editor.pointer_move(PointerInput::new(Point::new(108.0, 58.0)));
        editor.pointer_up(PointerInput::new(Point::new(108.0, 58.0)));

        assert_eq!(editor.scene.get(tile).unwrap().position(), Point::new(100.0, 50.0));
        assert_eq!(editor.scene.get(part).unwrap().position(), Point::new(5.0, 5.0));
        assert_eq!(editor.scene.parent(part), Some(tile));
    }

    #[test]
    fn test_unattached_part_refuses() {
        let mut editor = Editor::default();
        let part = editor.scene.insert(Element::new("emblem", Rect::new(0.0, 0.0, 10.0, 10.0)));
        let mut op = ParentDragOperation::new();
        let input = PointerInput::new(Point::ZERO);
        assert!(!op.accept(&editor, part, Point::ZERO, &input));
    }
}
