use super::{DragOperation, DragStart};
use crate::editor::Editor;
use crate::element::ElementId;
use crate::input::PointerInput;
use crate::selection::SelectionModel;
use kurbo::{Point, Rect};

/// Rubber-band selection on the base layer.
#[derive(Debug, Default)]
pub struct DragSelectAreaOperation {
    origin: Point,
}

impl DragSelectAreaOperation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Representatives of base layer elements with a bounding box corner inside `area`.
    fn touched(editor: &Editor, area: Rect) -> Vec<ElementId> {
        let scene = &editor.scene;
        let base = editor.canvas.base_root();
        let mut found = Vec::new();
        for id in scene.descendants(base).into_iter().skip(1) {
            let Some(rep) = scene.selectable_of(id) else {
                continue;
            };
            if found.contains(&rep) {
                continue;
            }
            let gbox = scene.gbox(rep);
            let corners = [
                Point::new(gbox.x0, gbox.y0),
                Point::new(gbox.x1, gbox.y0),
                Point::new(gbox.x0, gbox.y1),
                Point::new(gbox.x1, gbox.y1),
            ];
            if corners.iter().any(|&corner| area.contains(corner)) {
                found.push(rep);
            }
        }
        found
    }
}

impl DragOperation for DragSelectAreaOperation {
    fn do_drag_start(&mut self, editor: &mut Editor, _element: ElementId, start: &DragStart) {
        self.origin = start.point;
        editor.canvas.prepare_glass_for_drag_start(&mut editor.scene);
        editor
            .canvas
            .set_rubber_band(Some(Rect::from_points(start.point, start.point)));
    }

    fn do_drag_move(&mut self, editor: &mut Editor, _element: ElementId, point: Point, _input: &PointerInput) {
        editor
            .canvas
            .set_rubber_band(Some(Rect::from_points(self.origin, point)));
    }

    fn do_drop(&mut self, editor: &mut Editor, _element: ElementId, point: Point, input: &PointerInput) {
        let area = Rect::from_points(self.origin, point);
        if !input.modifiers.toggles_selection() {
            editor.selection.unselect_all(&mut editor.scene);
        }
        let touched = Self::touched(editor, area);
        log::debug!("area select: {} elements in {:?}", touched.len(), area);
        for id in touched {
            editor.selection.select(&mut editor.scene, id);
        }
        editor.canvas.clear_glass(&mut editor.scene);
    }

    fn do_click(&mut self, editor: &mut Editor, _element: ElementId, _point: Point, input: &PointerInput) {
        if !input.modifiers.toggles_selection() {
            editor.selection.unselect_all(&mut editor.scene);
        }
    }

    fn do_abort(&mut self, editor: &mut Editor, _element: ElementId) {
        editor.canvas.clear_glass(&mut editor.scene);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{Element, Selectability};
    use crate::input::Modifiers;

    fn square(editor: &mut Editor, at: Point) -> ElementId {
        editor
            .insert_on_board(Element::new("square", Rect::new(0.0, 0.0, 10.0, 10.0)).at(at))
            .unwrap()
    }

    #[test]
    fn test_rubber_band_selects_touched_elements() {
        let mut editor = Editor::default();
        let inside = square(&mut editor, Point::new(20.0, 20.0));
        let overlapping = square(&mut editor, Point::new(45.0, 45.0));
        let outside = square(&mut editor, Point::new(200.0, 200.0));

        editor.pointer_down(PointerInput::new(Point::new(10.0, 10.0)));
        editor.pointer_move(PointerInput::new(Point::new(30.0, 30.0)));
        assert_eq!(editor.canvas.rubber_band(), Some(Rect::new(10.0, 10.0, 30.0, 30.0)));
        editor.pointer_up(PointerInput::new(Point::new(50.0, 50.0)));

        assert!(editor.selection.is_selected(&editor.scene, inside));
        assert!(editor.selection.is_selected(&editor.scene, overlapping));
        assert!(!editor.selection.is_selected(&editor.scene, outside));
        assert_eq!(editor.canvas.rubber_band(), None);
    }

    #[test]
    fn test_modifier_extends_selection() {
        let mut editor = Editor::default();
        let first = square(&mut editor, Point::new(100.0, 100.0));
        let second = square(&mut editor, Point::new(20.0, 20.0));
        editor.selection.select(&mut editor.scene, first);
        let shift = Modifiers {
            shift: true,
            ..Modifiers::default()
        };

        editor.pointer_down(PointerInput::new(Point::new(10.0, 10.0)).with_modifiers(shift));
        editor.pointer_up(PointerInput::new(Point::new(40.0, 40.0)).with_modifiers(shift));

        assert_eq!(editor.selection.selected(), &[first, second]);
    }

    #[test]
    fn test_parts_select_their_owner() {
        let mut editor = Editor::default();
        let boxed = editor
            .insert_on_board(Element::container("box", Rect::new(0.0, 0.0, 100.0, 100.0)).at(Point::new(300.0, 300.0)))
            .unwrap();
        let lid = editor.scene.insert(
            Element::new("lid", Rect::new(0.0, 0.0, 10.0, 10.0))
                .at(Point::new(5.0, 5.0))
                .selectable(Selectability::Owner),
        );
        editor.scene.add(boxed, lid).unwrap();

        editor.pointer_down(PointerInput::new(Point::new(250.0, 250.0)));
        editor.pointer_up(PointerInput::new(Point::new(320.0, 320.0)));

        assert_eq!(editor.selection.selected(), &[boxed]);
    }

    #[test]
    fn test_click_on_empty_board_clears_selection() {
        let mut editor = Editor::default();
        let piece = square(&mut editor, Point::new(100.0, 100.0));
        editor.selection.select(&mut editor.scene, piece);

        editor.pointer_down(PointerInput::new(Point::new(10.0, 10.0)));
        editor.pointer_up(PointerInput::new(Point::new(10.0, 10.0)));

        assert!(editor.selection.is_empty());
    }
}
