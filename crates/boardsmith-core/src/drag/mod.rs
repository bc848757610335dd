//! Drag-and-drop protocol.
//!
//! A gesture is driven by a [`DragGesture`]: it asks the operation to accept the press,
//! starts the drag lazily once the pointer has actually moved, and ends either with a
//! drop (the drag started) or a click (it did not).

mod move_op;
mod parent;
mod rotate;
mod scroll;
mod select_area;
mod switch;

pub use move_op::{DragMoveOperation, SelectionExtension};
pub use parent::ParentDragOperation;
pub use rotate::{DragRotateOperation, in_rotate_handle};
pub use scroll::DragScrollOperation;
pub use select_area::DragSelectAreaOperation;
pub use switch::{DragPredicate, DragSwitchOperation};

use crate::editor::Editor;
use crate::element::ElementId;
use crate::input::PointerInput;
use kurbo::Point;
use std::fmt;
use std::sync::Arc;

/// Creates a fresh operation for every gesture started on an element.
pub type DragFactory = Arc<dyn Fn() -> Box<dyn DragOperation> + Send + Sync>;

/// Wrap an operation constructor into a [`DragFactory`].
pub fn factory<F, O>(make: F) -> DragFactory
where
    F: Fn() -> O + Send + Sync + 'static,
    O: DragOperation + 'static,
{
    Arc::new(move || Box::new(make()))
}

/// Where and how a gesture started.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragStart {
    /// Press position in page coordinates.
    pub page: Point,
    /// Press position in canvas coordinates.
    pub point: Point,
    pub input: PointerInput,
    /// Whether the pointer left the press position.
    pub moved: bool,
}

/// One kind of gesture.
///
/// `point` arguments are in canvas coordinates. Only `accept` may refuse; the `do_*`
/// methods run to completion.
pub trait DragOperation {
    /// Whether this operation takes the gesture pressed on `element`.
    fn accept(&mut self, _editor: &Editor, _element: ElementId, _point: Point, _input: &PointerInput) -> bool {
        true
    }

    /// First movement of an accepted gesture.
    fn do_drag_start(&mut self, editor: &mut Editor, element: ElementId, start: &DragStart);

    fn do_drag_move(&mut self, editor: &mut Editor, element: ElementId, point: Point, input: &PointerInput);

    fn do_drop(&mut self, editor: &mut Editor, element: ElementId, point: Point, input: &PointerInput);

    /// Release without movement.
    fn do_click(&mut self, _editor: &mut Editor, _element: ElementId, _point: Point, _input: &PointerInput) {}

    /// The started gesture is abandoned (Escape).
    fn do_abort(&mut self, _editor: &mut Editor, _element: ElementId) {}

    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// An accepted gesture in progress.
pub struct DragGesture {
    op: Box<dyn DragOperation>,
    element: ElementId,
    start: DragStart,
    started: bool,
}

impl fmt::Debug for DragGesture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DragGesture")
            .field("op", &self.op.name())
            .field("element", &self.element)
            .field("start", &self.start)
            .field("started", &self.started)
            .finish()
    }
}

impl DragGesture {
    /// Offer a press on `element` to `op`. Returns `None` when the operation refuses.
    pub fn begin(editor: &Editor, element: ElementId, mut op: Box<dyn DragOperation>, input: &PointerInput) -> Option<Self> {
        let point = editor.canvas.canvas_point(input.position);
        if !op.accept(editor, element, point, input) {
            return None;
        }
        log::debug!("gesture accepted by {} on {}", op.name(), element);
        Some(Self {
            op,
            element,
            start: DragStart {
                page: input.position,
                point,
                input: *input,
                moved: false,
            },
            started: false,
        })
    }

    pub fn element(&self) -> ElementId {
        self.element
    }

    pub fn start(&self) -> &DragStart {
        &self.start
    }

    /// Whether the drag has started, i.e. the pointer moved past the threshold.
    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn on_drag_move(&mut self, editor: &mut Editor, input: &PointerInput) {
        if !self.started {
            let distance = (input.position - self.start.page).hypot();
            if distance == 0.0 || distance < editor.settings.drag_threshold {
                return;
            }
            self.start.moved = true;
            self.started = true;
            self.op.do_drag_start(editor, self.element, &self.start);
        }
        let point = editor.canvas.canvas_point(input.position);
        self.op.do_drag_move(editor, self.element, point, input);
    }

    /// Release the pointer: drop if the drag started, click otherwise.
    pub fn on_drop(mut self, editor: &mut Editor, input: &PointerInput) {
        self.on_drag_move(editor, input);
        let point = editor.canvas.canvas_point(input.position);
        if self.started {
            self.op.do_drop(editor, self.element, point, input);
        } else {
            self.op.do_click(editor, self.element, point, input);
        }
    }

    pub fn abort(mut self, editor: &mut Editor) {
        if self.started {
            log::debug!("gesture on {} aborted", self.element);
            self.op.do_abort(editor, self.element);
        }
    }
}
