use super::{DragOperation, DragStart};
use crate::editor::Editor;
use crate::element::ElementId;
use crate::input::PointerInput;
use kurbo::Point;

/// Guard of a [`DragSwitchOperation`] case.
pub type DragPredicate = Box<dyn Fn(&Editor, ElementId, Point, &PointerInput) -> bool>;

/// Picks the first case whose predicate holds and whose operation accepts, then hands
/// it the whole gesture.
#[derive(Default)]
pub struct DragSwitchOperation {
    cases: Vec<(DragPredicate, Box<dyn DragOperation>)>,
    committed: Option<usize>,
}

impl DragSwitchOperation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn case<P, O>(mut self, predicate: P, op: O) -> Self
    where
        P: Fn(&Editor, ElementId, Point, &PointerInput) -> bool + 'static,
        O: DragOperation + 'static,
    {
        self.cases.push((Box::new(predicate), Box::new(op)));
        self
    }

    /// Case taken if no earlier one applies.
    pub fn otherwise<O: DragOperation + 'static>(self, op: O) -> Self {
        self.case(|_, _, _, _| true, op)
    }

    pub fn committed(&self) -> Option<usize> {
        self.committed
    }

    fn active(&mut self) -> Option<&mut Box<dyn DragOperation>> {
        let index = self.committed?;
        self.cases.get_mut(index).map(|(_, op)| op)
    }
}

impl DragOperation for DragSwitchOperation {
    fn accept(&mut self, editor: &Editor, element: ElementId, point: Point, input: &PointerInput) -> bool {
        self.committed = None;
        for (index, (predicate, op)) in self.cases.iter_mut().enumerate() {
            if predicate(editor, element, point, input) && op.accept(editor, element, point, input) {
                self.committed = Some(index);
                return true;
            }
        }
        false
    }

    fn do_drag_start(&mut self, editor: &mut Editor, element: ElementId, start: &DragStart) {
        if let Some(op) = self.active() {
            op.do_drag_start(editor, element, start);
        }
    }

    fn do_drag_move(&mut self, editor: &mut Editor, element: ElementId, point: Point, input: &PointerInput) {
        if let Some(op) = self.active() {
            op.do_drag_move(editor, element, point, input);
        }
    }

    fn do_drop(&mut self, editor: &mut Editor, element: ElementId, point: Point, input: &PointerInput) {
        if let Some(op) = self.active() {
            op.do_drop(editor, element, point, input);
        }
    }

    fn do_click(&mut self, editor: &mut Editor, element: ElementId, point: Point, input: &PointerInput) {
        if let Some(op) = self.active() {
            op.do_click(editor, element, point, input);
        }
    }

    fn do_abort(&mut self, editor: &mut Editor, element: ElementId) {
        if let Some(op) = self.active() {
            op.do_abort(editor, element);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::MouseButton;
    use std::sync::{Arc, Mutex};

    /// Operation that logs the calls it receives.
    struct Scripted {
        name: &'static str,
        accepts: bool,
        calls: Arc<Mutex<Vec<String>>>,
    }

    impl DragOperation for Scripted {
        fn accept(&mut self, _: &Editor, _: ElementId, _: Point, _: &PointerInput) -> bool {
            self.calls.lock().unwrap().push(format!("{}:accept", self.name));
            self.accepts
        }

        fn do_drag_start(&mut self, _: &mut Editor, _: ElementId, _: &DragStart) {
            self.calls.lock().unwrap().push(format!("{}:start", self.name));
        }

        fn do_drag_move(&mut self, _: &mut Editor, _: ElementId, _: Point, _: &PointerInput) {
            self.calls.lock().unwrap().push(format!("{}:move", self.name));
        }

        fn do_drop(&mut self, _: &mut Editor, _: ElementId, _: Point, _: &PointerInput) {
            self.calls.lock().unwrap().push(format!("{}:drop", self.name));
        }
    }

    #[test]
    fn test_switch_commits_to_first_matching_case() {
        let mut editor = Editor::default();
        let calls = Arc::new(Mutex::new(Vec::new()));
        let scripted = |name, accepts| Scripted {
            name,
            accepts,
            calls: calls.clone(),
        };
        let mut switch = DragSwitchOperation::new()
            .case(|_, _, _, input| input.button == MouseButton::Middle, scripted("scroll", true))
            .case(|_, _, _, _| true, scripted("refusing", false))
            .otherwise(scripted("fallback", true));

        let element = editor.canvas.base_root();
        let input = PointerInput::new(Point::ZERO);
        assert!(switch.accept(&editor, element, Point::ZERO, &input));
        assert_eq!(switch.committed(), Some(2));

        let start = DragStart {
            page: Point::ZERO,
            point: Point::ZERO,
            input,
            moved: true,
        };
        switch.do_drag_start(&mut editor, element, &start);
        switch.do_drop(&mut editor, element, Point::ZERO, &input);

        assert_eq!(
            *calls.lock().unwrap(),
            vec!["refusing:accept", "fallback:accept", "fallback:start", "fallback:drop"]
        );
    }

    #[test]
    fn test_switch_refuses_when_no_case_applies() {
        let editor = Editor::default();
        let mut switch = DragSwitchOperation::new().case(|_, _, _, _| false, DragSwitchOperation::new());
        let input = PointerInput::new(Point::ZERO);
        assert!(!switch.accept(&editor, editor.canvas.base_root(), Point::ZERO, &input));
        assert_eq!(switch.committed(), None);
    }
}
