//! Scene arena: elements keyed by id, their geometry, and the undo log that tracks them.

use crate::element::{DragSession, Element, ElementId, Selectability};
use crate::error::{SceneError, SceneResult};
use crate::event::Event;
use crate::groups::GroupTable;
use crate::memento::{ElementMemento, EntityKey, Memento, Record, Transaction};
use kurbo::{Affine, Point, Rect};
use serde_json::Value;
use std::collections::{HashMap, HashSet};

/// All elements of an editing session.
///
/// Elements are never dropped from the arena: a removed element is only unattached, so
/// undo can put it back.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    elements: HashMap<ElementId, Element>,
    pub(crate) groups: GroupTable,
    memento: Memento,
}

impl Scene {
    /// Create an empty scene with the default undo history limit.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_history_limit(max_history: usize) -> Self {
        Self {
            memento: Memento::with_history_limit(max_history),
            ..Self::default()
        }
    }

    /// Add an unattached element to the arena.
    pub fn insert(&mut self, element: Element) -> ElementId {
        let id = element.id;
        self.elements.insert(id, element);
        id
    }

    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.elements.get_mut(&id)
    }

    /// Get an element or fail with [`SceneError::NotFound`].
    pub fn element(&self, id: ElementId) -> SceneResult<&Element> {
        self.elements.get(&id).ok_or(SceneError::NotFound(id))
    }

    pub(crate) fn element_mut(&mut self, id: ElementId) -> SceneResult<&mut Element> {
        self.elements.get_mut(&id).ok_or(SceneError::NotFound(id))
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.elements.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn groups(&self) -> &GroupTable {
        &self.groups
    }

    pub fn memento(&self) -> &Memento {
        &self.memento
    }

    pub fn memento_mut(&mut self) -> &mut Memento {
        &mut self.memento
    }

    // --- undo log ---

    /// Record the element's current state in the open transaction.
    pub fn register(&mut self, id: ElementId) {
        let Some(element) = self.elements.get(&id) else {
            return;
        };
        self.memento.register_with(EntityKey::Element(id), || {
            Some(Record::Element(ElementMemento::capture(element)))
        });
    }

    /// Record the group table in the open transaction.
    pub(crate) fn register_groups(&mut self) {
        let groups = &self.groups;
        self.memento
            .register_with(EntityKey::Groups, || Some(Record::Groups(groups.clone())));
    }

    /// Snapshot an element (`_memento`).
    pub fn snapshot(&self, id: ElementId) -> Option<ElementMemento> {
        self.elements.get(&id).map(ElementMemento::capture)
    }

    /// Restore an element from a snapshot (`_revert`).
    pub fn revert(&mut self, id: ElementId, record: &ElementMemento) {
        if let Some(element) = self.elements.get_mut(&id) {
            record.restore(element);
        }
    }

    /// Run the element's post-revert hook, if it has one.
    pub fn recover(&mut self, id: ElementId, record: &ElementMemento) {
        let behavior = self.elements.get(&id).and_then(|e| e.behavior.clone());
        if let Some(behavior) = behavior {
            behavior.recover(self, id, record);
        }
    }

    /// Undo the most recent transaction. Returns false when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        let Some(tx) = self.memento.begin_undo() else {
            return false;
        };
        log::debug!("undo: reverting {} entities", tx.len());
        let inverse = self.replay(&tx);
        self.memento.end_undo(inverse);
        true
    }

    /// Redo the most recently undone transaction.
    pub fn redo(&mut self) -> bool {
        let Some(tx) = self.memento.begin_redo() else {
            return false;
        };
        log::debug!("redo: reapplying {} entities", tx.len());
        let inverse = self.replay(&tx);
        self.memento.end_redo(inverse);
        true
    }

    /// Revert every entity of a transaction and return the snapshot that undoes the revert.
    fn replay(&mut self, tx: &Transaction) -> Transaction {
        let mut inverse = Transaction::default();
        for key in tx.keys() {
            if let Some(record) = self.capture(key) {
                inverse.insert(key, record);
            }
        }
        for (key, record) in tx.iter() {
            match (key, record) {
                (EntityKey::Element(id), Record::Element(memento)) => self.revert(id, memento),
                (EntityKey::Groups, Record::Groups(table)) => self.groups = table.clone(),
                _ => log::warn!("memento: record does not match key {:?}", key),
            }
        }
        for (key, record) in tx.iter() {
            if let (EntityKey::Element(id), Record::Element(memento)) = (key, record) {
                self.recover(id, memento);
            }
        }
        inverse
    }

    fn capture(&self, key: EntityKey) -> Option<Record> {
        match key {
            EntityKey::Element(id) => self.snapshot(id).map(Record::Element),
            EntityKey::Groups => Some(Record::Groups(self.groups.clone())),
        }
    }

    // --- tree queries ---

    pub fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.elements.get(&id).and_then(|e| e.parent)
    }

    /// Children in z-order (back to front).
    pub fn children(&self, id: ElementId) -> &[ElementId] {
        self.elements.get(&id).map(|e| e.children()).unwrap_or(&[])
    }

    /// Ancestors, nearest first.
    pub fn ancestors(&self, id: ElementId) -> Vec<ElementId> {
        let mut result = Vec::new();
        let mut current = self.parent(id);
        while let Some(parent) = current {
            if result.contains(&parent) {
                break;
            }
            result.push(parent);
            current = self.parent(parent);
        }
        result
    }

    /// Whether `ancestor` is a strict ancestor of `id`.
    pub fn is_ancestor(&self, ancestor: ElementId, id: ElementId) -> bool {
        self.ancestors(id).contains(&ancestor)
    }

    /// Topmost ancestor, or the element itself when unattached.
    pub fn root_of(&self, id: ElementId) -> ElementId {
        self.ancestors(id).last().copied().unwrap_or(id)
    }

    /// The element itself or its nearest container ancestor.
    pub fn nearest_container(&self, id: ElementId) -> Option<ElementId> {
        std::iter::once(id)
            .chain(self.ancestors(id))
            .find(|&candidate| self.get(candidate).is_some_and(Element::is_container))
    }

    /// The element placed in the selection on behalf of `id`.
    pub fn selectable_of(&self, id: ElementId) -> Option<ElementId> {
        match self.get(id)?.selectable {
            Selectability::None => None,
            Selectability::Itself => Some(id),
            Selectability::Owner => self.parent(id).and_then(|parent| self.selectable_of(parent)),
        }
    }

    /// Every element of a subtree, root first.
    pub fn descendants(&self, root: ElementId) -> Vec<ElementId> {
        let mut result = Vec::new();
        let mut stack = vec![root];
        let mut seen = HashSet::new();
        while let Some(id) = stack.pop() {
            if !seen.insert(id) {
                continue;
            }
            result.push(id);
            stack.extend(self.children(id).iter().rev());
        }
        result
    }

    // --- geometry ---

    pub fn matrix(&self, id: ElementId) -> Affine {
        self.get(id).map(|e| e.matrix).unwrap_or(Affine::IDENTITY)
    }

    /// Canvas-space transform of an element.
    ///
    /// Elements previewed on the glass layer report their glass matrix.
    pub fn global_matrix(&self, id: ElementId) -> Affine {
        let Some(element) = self.get(id) else {
            return Affine::IDENTITY;
        };
        if let Some(glass) = element.glass {
            return glass;
        }
        match element.parent {
            Some(parent) if parent != id => self.global_matrix(parent) * element.matrix,
            _ => element.matrix,
        }
    }

    pub fn local_to_global(&self, id: ElementId, point: Point) -> Point {
        self.global_matrix(id) * point
    }

    pub fn global_to_local(&self, id: ElementId, point: Point) -> Point {
        self.global_matrix(id).inverse() * point
    }

    /// Canvas-space position of the element's origin.
    pub fn global_position(&self, id: ElementId) -> Point {
        self.local_to_global(id, Point::ZERO)
    }

    /// Canvas-space bounding box.
    pub fn gbox(&self, id: ElementId) -> Rect {
        let bounds = self.get(id).map(|e| e.bounds).unwrap_or(Rect::ZERO);
        self.global_matrix(id).transform_rect_bbox(bounds)
    }

    /// Topmost element of a subtree containing `point`, skipping excluded subtrees and
    /// glass previews.
    pub fn element_at(&self, point: Point, root: ElementId, exclude: &HashSet<ElementId>) -> Option<ElementId> {
        if exclude.contains(&root) {
            return None;
        }
        let element = self.get(root)?;
        if element.glass.is_some() {
            return None;
        }
        for &child in element.children().iter().rev() {
            if let Some(hit) = self.element_at(point, child, exclude) {
                return Some(hit);
            }
        }
        self.gbox(root).contains(point).then_some(root)
    }

    // --- undoable mutators ---

    /// Replace an element's local matrix and fire `geometry`.
    pub fn set_matrix(&mut self, id: ElementId, matrix: Affine) -> SceneResult<()> {
        self.element(id)?;
        self.register(id);
        self.element_mut(id)?.matrix = matrix;
        self.fire(id, Event::Geometry);
        Ok(())
    }

    /// Move an element's origin to a position in its parent's space.
    pub fn move_to(&mut self, id: ElementId, position: Point) -> SceneResult<()> {
        let matrix = self.element(id)?.matrix;
        let [a, b, c, d, _, _] = matrix.as_coeffs();
        self.set_matrix(id, Affine::new([a, b, c, d, position.x, position.y]))
    }

    pub fn set_bounds(&mut self, id: ElementId, bounds: Rect) -> SceneResult<()> {
        self.element(id)?;
        self.register(id);
        self.element_mut(id)?.bounds = bounds;
        self.fire(id, Event::Geometry);
        Ok(())
    }

    pub fn property(&self, id: ElementId, key: &str) -> Option<&Value> {
        self.get(id).and_then(|e| e.property(key))
    }

    pub fn set_property(&mut self, id: ElementId, key: impl Into<String>, value: Value) -> SceneResult<()> {
        self.element(id)?;
        self.register(id);
        self.element_mut(id)?.properties.insert(key.into(), value);
        Ok(())
    }

    pub fn remove_property(&mut self, id: ElementId, key: &str) -> SceneResult<Option<Value>> {
        self.element(id)?;
        self.register(id);
        Ok(self.element_mut(id)?.properties.remove(key))
    }

    pub(crate) fn set_highlight(&mut self, id: ElementId, highlighted: bool) {
        if let Some(element) = self.get_mut(id) {
            element.highlighted = highlighted;
        }
    }

    // --- drag sessions ---

    /// Create the per-gesture `_drag`/`_origin` state of an element.
    pub(crate) fn begin_drag_session(&mut self, id: ElementId) -> Option<&DragSession> {
        let origin = self.snapshot(id)?;
        let element = self.get_mut(id)?;
        element.session = Some(DragSession {
            origin,
            origin_parent: element.parent,
            cancelled: false,
        });
        element.session.as_ref()
    }

    pub(crate) fn end_drag_session(&mut self, id: ElementId) -> Option<DragSession> {
        self.get_mut(id).and_then(|e| e.session.take())
    }

    /// Ask for the element's drop to be refused. Honoured until the commit point of the
    /// drop in progress; ignored outside a gesture.
    pub fn cancel_drop(&mut self, id: ElementId) {
        if let Some(session) = self.get_mut(id).and_then(|e| e.session.as_mut()) {
            log::debug!("drop of {} cancelled by request", id);
            session.cancelled = true;
        }
    }

    pub fn is_drop_cancelled(&self, id: ElementId) -> bool {
        self.get(id)
            .and_then(|e| e.session.as_ref())
            .is_some_and(|s| s.cancelled)
    }

    // --- optional hooks with permissive defaults ---

    /// Substitute drop target offered by `target`, if any.
    pub fn drop_target_of(&self, target: ElementId) -> Option<ElementId> {
        let behavior = self.get(target)?.behavior.as_ref()?;
        behavior.drop_target(self, target)
    }

    pub fn accepts_drop(&self, target: ElementId, element: ElementId) -> bool {
        self.get(target)
            .and_then(|e| e.behavior.as_ref())
            .is_none_or(|b| b.accept_drop(self, target, element))
    }

    pub fn accepts_dropped(&self, element: ElementId, target: ElementId) -> bool {
        self.get(element)
            .and_then(|e| e.behavior.as_ref())
            .is_none_or(|b| b.accept_dropped(self, element, target))
    }

    pub fn accepts_rotation(&self, container: ElementId, element: ElementId, angle: f64) -> bool {
        self.get(container)
            .and_then(|e| e.behavior.as_ref())
            .is_none_or(|b| b.accept_rotation(self, container, element, angle))
    }

    pub fn accepts_rotated(&self, element: ElementId, angle: f64) -> bool {
        self.get(element)
            .and_then(|e| e.behavior.as_ref())
            .is_none_or(|b| b.accept_rotated(self, element, angle))
    }

    /// Run `receive_drop` on the target, then fire `receive-drop`.
    pub(crate) fn receive_drop(&mut self, target: ElementId, element: ElementId) {
        let behavior = self.get(target).and_then(|e| e.behavior.clone());
        if let Some(behavior) = behavior {
            behavior.receive_drop(self, target, element);
        }
        self.fire(target, Event::ReceiveDrop(element));
    }

    /// Run `dropped` on the element, then fire `dropped`.
    pub(crate) fn dropped(&mut self, element: ElementId, target: ElementId) {
        let behavior = self.get(element).and_then(|e| e.behavior.clone());
        if let Some(behavior) = behavior {
            behavior.dropped(self, element, target);
        }
        self.fire(element, Event::Dropped(target));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behavior::ElementBehavior;
    use kurbo::Vec2;
    use std::sync::{Arc, Mutex};

    /// Records where its partner stands whenever it recovers, then marks itself.
    #[derive(Debug)]
    struct Follower {
        partner: ElementId,
        seen: Mutex<Vec<Point>>,
    }

    impl ElementBehavior for Follower {
        fn recover(&self, scene: &mut Scene, me: ElementId, _record: &ElementMemento) {
            let partner = scene.get(self.partner).map(Element::position);
            self.seen.lock().unwrap().extend(partner);
            scene.set_property(me, "recovered", serde_json::json!(true)).unwrap();
        }
    }

    fn square(scene: &mut Scene, name: &str, at: Point, size: f64) -> ElementId {
        scene.insert(Element::new(name, Rect::new(0.0, 0.0, size, size)).at(at))
    }

    #[test]
    fn test_register_snapshot_and_undo_geometry() {
        let mut scene = Scene::new();
        let id = square(&mut scene, "piece", Point::ZERO, 10.0);

        scene.move_to(id, Point::new(50.0, 30.0)).unwrap();
        scene.move_to(id, Point::new(70.0, 10.0)).unwrap();
        assert_eq!(scene.memento().current().len(), 1);

        assert!(scene.undo());
        assert_eq!(scene.get(id).unwrap().position(), Point::ZERO);

        assert!(scene.redo());
        assert_eq!(scene.get(id).unwrap().position(), Point::new(70.0, 10.0));
    }

    #[test]
    fn test_recover_runs_after_every_revert_without_recording() {
        let mut scene = Scene::new();
        let partner = square(&mut scene, "partner", Point::ZERO, 10.0);
        let follower = Arc::new(Follower {
            partner,
            seen: Mutex::new(Vec::new()),
        });
        let me = scene.insert(
            Element::new("follower", Rect::new(0.0, 0.0, 10.0, 10.0)).with_behavior(follower.clone()),
        );

        scene.move_to(me, Point::new(1.0, 1.0)).unwrap();
        scene.move_to(partner, Point::new(2.0, 2.0)).unwrap();

        assert!(scene.undo());
        assert_eq!(*follower.seen.lock().unwrap(), vec![Point::ZERO]);
        assert_eq!(scene.get(me).unwrap().position(), Point::ZERO);
        assert_eq!(scene.property(me, "recovered"), Some(&serde_json::json!(true)));
        assert_eq!(scene.memento().undo_depth(), 0);
        assert!(scene.memento().current().is_empty());
        assert_eq!(scene.memento().redo_depth(), 1);

        assert!(scene.redo());
        assert_eq!(*follower.seen.lock().unwrap(), vec![Point::ZERO, Point::new(2.0, 2.0)]);
        assert_eq!(scene.memento().undo_depth(), 1);
        assert_eq!(scene.memento().redo_depth(), 0);
    }

    #[test]
    fn test_undo_on_empty_log_is_noop() {
        let mut scene = Scene::new();
        assert!(!scene.undo());
        assert!(!scene.redo());
    }

    #[test]
    fn test_redo_invalidated_by_new_transaction() {
        let mut scene = Scene::new();
        let id = square(&mut scene, "piece", Point::ZERO, 10.0);

        scene.move_to(id, Point::new(5.0, 5.0)).unwrap();
        scene.memento_mut().open();
        assert!(scene.undo());
        assert!(scene.memento().can_redo());

        scene.move_to(id, Point::new(9.0, 9.0)).unwrap();
        scene.memento_mut().open();
        assert!(!scene.memento().can_redo());
        assert!(!scene.redo());
    }

    #[test]
    fn test_cancel_keeps_current_state() {
        let mut scene = Scene::new();
        let a = square(&mut scene, "a", Point::ZERO, 10.0);
        let b = square(&mut scene, "b", Point::ZERO, 10.0);

        scene.move_to(a, Point::new(1.0, 1.0)).unwrap();
        scene.move_to(b, Point::new(2.0, 2.0)).unwrap();
        scene.memento_mut().cancel();

        assert_eq!(scene.get(a).unwrap().position(), Point::new(1.0, 1.0));
        assert_eq!(scene.get(b).unwrap().position(), Point::new(2.0, 2.0));
        assert!(!scene.undo());
    }

    #[test]
    fn test_property_undo_removes_added_key() {
        let mut scene = Scene::new();
        let id = square(&mut scene, "counter", Point::ZERO, 10.0);

        scene.set_property(id, "strength", serde_json::json!(3)).unwrap();
        assert_eq!(scene.property(id, "strength"), Some(&serde_json::json!(3)));

        assert!(scene.undo());
        assert_eq!(scene.property(id, "strength"), None);
    }

    #[test]
    fn test_global_matrix_and_gbox() {
        let mut scene = Scene::new();
        let map = scene.insert(Element::container("map", Rect::new(0.0, 0.0, 200.0, 200.0)).at(Point::new(100.0, 50.0)));
        let piece = square(&mut scene, "piece", Point::new(10.0, 10.0), 20.0);
        scene.add(map, piece).unwrap();

        assert_eq!(scene.global_position(piece), Point::new(110.0, 60.0));
        assert_eq!(scene.gbox(piece), Rect::new(110.0, 60.0, 130.0, 80.0));
        assert_eq!(scene.global_to_local(map, Point::new(110.0, 60.0)), Point::new(10.0, 10.0));
        assert_eq!(scene.root_of(piece), map);
    }

    #[test]
    fn test_element_at_prefers_topmost_child() {
        let mut scene = Scene::new();
        let map = scene.insert(Element::container("map", Rect::new(0.0, 0.0, 200.0, 200.0)));
        let below = square(&mut scene, "below", Point::new(10.0, 10.0), 50.0);
        let above = square(&mut scene, "above", Point::new(30.0, 30.0), 50.0);
        scene.add(map, below).unwrap();
        scene.add(map, above).unwrap();

        let none = HashSet::new();
        assert_eq!(scene.element_at(Point::new(40.0, 40.0), map, &none), Some(above));
        assert_eq!(scene.element_at(Point::new(15.0, 15.0), map, &none), Some(below));
        assert_eq!(scene.element_at(Point::new(150.0, 150.0), map, &none), Some(map));

        let exclude: HashSet<_> = [above].into_iter().collect();
        assert_eq!(scene.element_at(Point::new(40.0, 40.0), map, &exclude), Some(below));
    }

    #[test]
    fn test_selectable_of_delegates_to_owner() {
        let mut scene = Scene::new();
        let boxed = scene.insert(Element::container("box", Rect::new(0.0, 0.0, 50.0, 50.0)));
        let lid = scene.insert(Element::new("lid", Rect::new(0.0, 0.0, 50.0, 5.0)).selectable(Selectability::Owner));
        scene.add(boxed, lid).unwrap();

        assert_eq!(scene.selectable_of(lid), Some(boxed));
        assert_eq!(scene.selectable_of(boxed), Some(boxed));
    }

    #[test]
    fn test_cancel_drop_outside_gesture_is_ignored() {
        let mut scene = Scene::new();
        let id = square(&mut scene, "piece", Point::ZERO, 10.0);
        scene.cancel_drop(id);
        assert!(!scene.is_drop_cancelled(id));

        scene.begin_drag_session(id);
        scene.cancel_drop(id);
        assert!(scene.is_drop_cancelled(id));
        assert!(scene.end_drag_session(id).is_some_and(|s| s.cancelled));
        assert!(!scene.is_drop_cancelled(id));
    }

    #[test]
    fn test_glass_matrix_overrides_parent_chain() {
        let mut scene = Scene::new();
        let map = scene.insert(Element::container("map", Rect::new(0.0, 0.0, 200.0, 200.0)).at(Point::new(100.0, 0.0)));
        let piece = square(&mut scene, "piece", Point::ZERO, 10.0);
        scene.add(map, piece).unwrap();

        scene.get_mut(piece).unwrap().glass = Some(Affine::translate(Vec2::new(5.0, 5.0)));
        assert_eq!(scene.global_position(piece), Point::new(5.0, 5.0));
        let none = HashSet::new();
        assert_eq!(scene.element_at(Point::new(101.0, 1.0), map, &none), Some(map));
    }
}
