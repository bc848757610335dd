//! Demo board: a map with counters and a box whose cover forwards drops to its tray.

use crate::error::AppResult;
use boardsmith_core::drag::{
    DragMoveOperation, DragRotateOperation, DragSwitchOperation, ParentDragOperation, in_rotate_handle,
};
use boardsmith_core::{DragFactory, Editor, Element, ElementBehavior, ElementId, Event, Scene, Selectability, factory};
use kurbo::{Point, Rect};
use std::sync::Arc;

const COUNTER_SIZE: f64 = 40.0;

/// Rotate from a corner handle, move from anywhere else.
fn counter_drag() -> DragFactory {
    factory(|| {
        DragSwitchOperation::new()
            .case(
                |editor, element, point, _| in_rotate_handle(editor, element, point),
                DragRotateOperation::new(),
            )
            .otherwise(DragMoveOperation::new())
    })
}

/// Logs what happens to the pieces it watches.
#[derive(Debug)]
struct MapBehavior;

impl ElementBehavior for MapBehavior {
    fn notified(&self, scene: &mut Scene, _me: ElementId, source: ElementId, event: &Event) {
        if let Event::Dropped(target) = event {
            let name = scene.get(*target).map_or("?", |e| e.name.as_str());
            log::info!("{} dropped into {}", source, name);
        }
    }
}

/// Remembers the name of the container it was last dropped into.
#[derive(Debug)]
struct CounterBehavior;

impl ElementBehavior for CounterBehavior {
    fn dropped(&self, scene: &mut Scene, me: ElementId, target: ElementId) {
        let Some(zone) = scene.get(target).map(|e| e.name.clone()) else {
            return;
        };
        if let Err(err) = scene.set_property(me, "zone", zone.into()) {
            log::warn!("cannot record zone of {}: {}", me, err);
        }
    }
}

/// Forwards drops aimed at the box to its tray.
#[derive(Debug)]
struct BoxBehavior {
    tray: ElementId,
}

impl ElementBehavior for BoxBehavior {
    fn drop_target(&self, _scene: &Scene, _me: ElementId) -> Option<ElementId> {
        Some(self.tray)
    }
}

/// Holds counters only.
#[derive(Debug)]
struct TrayBehavior;

impl ElementBehavior for TrayBehavior {
    fn accept_drop(&self, scene: &Scene, _me: ElementId, element: ElementId) -> bool {
        scene.get(element).is_some_and(|e| e.name == "counter")
    }
}

/// Ids of the demo board's elements.
#[derive(Debug, Clone)]
pub struct DemoBoard {
    pub map: ElementId,
    pub counters: Vec<ElementId>,
    pub boxed: ElementId,
    pub tray: ElementId,
    pub cover: ElementId,
}

impl DemoBoard {
    /// Lay the board out on the editor's base layer. The setup is not undoable.
    pub fn build(editor: &mut Editor) -> AppResult<Self> {
        let map = editor.insert_on_board(
            Element::container("map", Rect::new(0.0, 0.0, 800.0, 600.0))
                .selectable(Selectability::None)
                .with_behavior(Arc::new(MapBehavior)),
        )?;

        let mut counters = Vec::new();
        for index in 0..3u8 {
            let counter = editor.scene.insert(
                Element::new("counter", Rect::new(0.0, 0.0, COUNTER_SIZE, COUNTER_SIZE))
                    .at(Point::new(50.0 + 70.0 * f64::from(index), 50.0))
                    .moveable(true)
                    .rotatable(true)
                    .with_behavior(Arc::new(CounterBehavior))
                    .with_drag(counter_drag())
                    .with_property("value", (index + 1).into()),
            );
            editor.scene.add(map, counter)?;
            editor.scene.add_observer(counter, map);
            counters.push(counter);
        }

        let parent_drag = factory(ParentDragOperation::new);
        let tray = editor.scene.insert(
            Element::container("tray", Rect::new(0.0, 0.0, 200.0, 150.0))
                .selectable(Selectability::Owner)
                .with_behavior(Arc::new(TrayBehavior))
                .with_drag(parent_drag.clone()),
        );
        let cover = editor.scene.insert(
            Element::new("cover", Rect::new(0.0, 0.0, 200.0, 150.0))
                .selectable(Selectability::Owner)
                .with_drag(parent_drag),
        );
        let boxed = editor.scene.insert(
            Element::container("box", Rect::new(0.0, 0.0, 200.0, 150.0))
                .at(Point::new(500.0, 100.0))
                .moveable(true)
                .with_behavior(Arc::new(BoxBehavior { tray }))
                .with_drag(factory(DragMoveOperation::new)),
        );
        editor.scene.add(boxed, tray)?;
        editor.scene.add(boxed, cover)?;
        editor.scene.add(map, boxed)?;

        editor.scene.memento_mut().clear();
        log::debug!("demo board ready: {} elements", editor.scene.len());
        Ok(Self {
            map,
            counters,
            boxed,
            tray,
            cover,
        })
    }
}

/// Indented description of the base layer, one line per element.
pub fn outline(editor: &Editor) -> Vec<String> {
    let mut lines = Vec::new();
    for &child in editor.scene.children(editor.canvas.base_root()) {
        describe(&editor.scene, child, 0, &mut lines);
    }
    lines
}

fn describe(scene: &Scene, id: ElementId, depth: usize, lines: &mut Vec<String>) {
    let Some(element) = scene.get(id) else {
        return;
    };
    let at = element.position();
    let mut line = format!("{}{} at ({:.1}, {:.1})", "  ".repeat(depth), element.name, at.x, at.y);
    for (key, value) in element.properties() {
        line.push_str(&format!(" {}={}", key, value));
    }
    lines.push(line);
    for &child in scene.children(id) {
        describe(scene, child, depth + 1, lines);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use boardsmith_core::PointerInput;

    fn drag(editor: &mut Editor, from: Point, to: Point) {
        editor.pointer_down(PointerInput::new(from));
        editor.pointer_move(PointerInput::new(to));
        editor.pointer_up(PointerInput::new(to));
    }

    #[test]
    fn test_build_is_not_undoable() {
        let mut editor = Editor::default();
        let board = DemoBoard::build(&mut editor).unwrap();

        assert_eq!(editor.scene.children(board.map).len(), 4);
        assert_eq!(editor.scene.children(board.boxed), &[board.tray, board.cover]);
        assert!(!editor.scene.memento().can_undo());
    }

    #[test]
    fn test_cover_forwards_drop_to_tray() {
        let mut editor = Editor::default();
        let board = DemoBoard::build(&mut editor).unwrap();
        let counter = board.counters[0];

        drag(&mut editor, Point::new(70.0, 70.0), Point::new(570.0, 170.0));

        assert_eq!(editor.scene.parent(counter), Some(board.tray));
        assert_eq!(editor.scene.get(counter).unwrap().position(), Point::new(50.0, 50.0));
        assert_eq!(editor.scene.property(counter, "zone"), Some(&serde_json::Value::from("tray")));

        assert!(editor.undo());
        assert_eq!(editor.scene.parent(counter), Some(board.map));
        assert_eq!(editor.scene.get(counter).unwrap().position(), Point::new(50.0, 50.0));
        assert_eq!(editor.scene.property(counter, "zone"), None);
    }

    #[test]
    fn test_pressing_the_cover_moves_the_box() {
        let mut editor = Editor::default();
        let board = DemoBoard::build(&mut editor).unwrap();

        drag(&mut editor, Point::new(650.0, 200.0), Point::new(660.0, 210.0));

        assert_eq!(editor.scene.get(board.boxed).unwrap().position(), Point::new(510.0, 110.0));
        assert_eq!(editor.scene.parent(board.boxed), Some(board.map));
    }

    #[test]
    fn test_outline() {
        let mut editor = Editor::default();
        DemoBoard::build(&mut editor).unwrap();

        let lines = outline(&editor);
        assert_eq!(lines.len(), 7);
        assert_eq!(lines[0], "map at (0.0, 0.0)");
        assert_eq!(lines[1], "  counter at (50.0, 50.0) value=1");
        assert_eq!(lines[5], "    tray at (0.0, 0.0)");
    }
}
