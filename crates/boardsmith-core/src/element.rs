//! Scene elements and their capabilities.

use crate::behavior::ElementBehavior;
use crate::drag::DragFactory;
use crate::memento::ElementMemento;
use kurbo::{Affine, Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Unique identifier for elements.
pub type ElementId = Uuid;

/// How an element takes part in the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Selectability {
    /// Never selected.
    None,
    /// Selected as itself.
    #[default]
    Itself,
    /// Selection goes to the nearest ancestor that is selectable as itself.
    Owner,
}

/// Transient per-gesture state, alive between drag start and drop.
#[derive(Debug, Clone)]
pub struct DragSession {
    /// Snapshot taken at drag start, used to roll back a refused drop.
    pub origin: ElementMemento,
    /// Parent at drag start.
    pub origin_parent: Option<ElementId>,
    /// Set by [`crate::Scene::cancel_drop`] until the commit point.
    pub cancelled: bool,
}

/// A node of the scene graph.
#[derive(Clone)]
pub struct Element {
    pub(crate) id: ElementId,
    /// Kind label ("counter", "map", ...).
    pub name: String,
    pub(crate) matrix: Affine,
    pub(crate) bounds: Rect,
    pub(crate) parent: Option<ElementId>,
    /// Present only for containers.
    pub(crate) children: Option<Vec<ElementId>>,
    /// Created on first subscription, dropped when empty.
    pub(crate) observers: Option<Vec<ElementId>>,
    pub(crate) properties: BTreeMap<String, Value>,
    /// Whether move gestures may pick this element up.
    pub moveable: bool,
    /// Whether rotate gestures may pick this element up.
    pub rotatable: bool,
    pub selectable: Selectability,
    pub(crate) highlighted: bool,
    pub(crate) behavior: Option<Arc<dyn ElementBehavior>>,
    pub(crate) drag: Option<DragFactory>,
    /// Canvas-space matrix while the element is previewed on the glass layer.
    pub(crate) glass: Option<Affine>,
    pub(crate) session: Option<DragSession>,
}

impl Element {
    /// Create a new leaf element with local bounds.
    pub fn new(name: impl Into<String>, bounds: Rect) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            matrix: Affine::IDENTITY,
            bounds,
            parent: None,
            children: None,
            observers: None,
            properties: BTreeMap::new(),
            moveable: false,
            rotatable: false,
            selectable: Selectability::Itself,
            highlighted: false,
            behavior: None,
            drag: None,
            glass: None,
            session: None,
        }
    }

    /// Create a new container element.
    pub fn container(name: impl Into<String>, bounds: Rect) -> Self {
        Self::new(name, bounds).with_children()
    }

    /// Give this element the container capability.
    pub fn with_children(mut self) -> Self {
        self.children.get_or_insert_with(Vec::new);
        self
    }

    /// Place the element at a position inside its parent.
    pub fn at(mut self, position: Point) -> Self {
        self.matrix = Affine::translate(position.to_vec2());
        self
    }

    pub fn with_matrix(mut self, matrix: Affine) -> Self {
        self.matrix = matrix;
        self
    }

    pub fn moveable(mut self, moveable: bool) -> Self {
        self.moveable = moveable;
        self
    }

    pub fn rotatable(mut self, rotatable: bool) -> Self {
        self.rotatable = rotatable;
        self
    }

    pub fn selectable(mut self, selectable: Selectability) -> Self {
        self.selectable = selectable;
        self
    }

    pub fn with_behavior(mut self, behavior: Arc<dyn ElementBehavior>) -> Self {
        self.behavior = Some(behavior);
        self
    }

    /// Attach the drag operation used when a gesture starts on this element.
    pub fn with_drag(mut self, drag: DragFactory) -> Self {
        self.drag = Some(drag);
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: Value) -> Self {
        self.properties.insert(key.into(), value);
        self
    }

    pub fn id(&self) -> ElementId {
        self.id
    }

    /// Local transform relative to the parent.
    pub fn matrix(&self) -> Affine {
        self.matrix
    }

    /// Local bounds, before the matrix is applied.
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Translation part of the local matrix.
    pub fn position(&self) -> Point {
        let Vec2 { x, y } = self.matrix.translation();
        Point::new(x, y)
    }

    pub fn parent(&self) -> Option<ElementId> {
        self.parent
    }

    pub fn is_container(&self) -> bool {
        self.children.is_some()
    }

    /// Children in z-order (back to front). Empty for leaves.
    pub fn children(&self) -> &[ElementId] {
        self.children.as_deref().unwrap_or(&[])
    }

    /// Current observers in subscription order.
    pub fn observers(&self) -> &[ElementId] {
        self.observers.as_deref().unwrap_or(&[])
    }

    pub fn has_observer_set(&self) -> bool {
        self.observers.is_some()
    }

    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    pub fn properties(&self) -> &BTreeMap<String, Value> {
        &self.properties
    }

    pub fn is_highlighted(&self) -> bool {
        self.highlighted
    }

    pub fn behavior(&self) -> Option<&Arc<dyn ElementBehavior>> {
        self.behavior.as_ref()
    }

    pub fn drag(&self) -> Option<&DragFactory> {
        self.drag.as_ref()
    }

    /// Whether the element is currently previewed on the glass layer.
    pub fn is_on_glass(&self) -> bool {
        self.glass.is_some()
    }

    pub fn session(&self) -> Option<&DragSession> {
        self.session.as_ref()
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Element")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("matrix", &self.matrix)
            .field("bounds", &self.bounds)
            .field("parent", &self.parent)
            .field("children", &self.children)
            .field("observers", &self.observers)
            .field("behavior", &self.behavior)
            .field("on_glass", &self.glass.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_builder() {
        let element = Element::new("counter", Rect::new(0.0, 0.0, 20.0, 20.0))
            .at(Point::new(5.0, 7.0))
            .moveable(true)
            .selectable(Selectability::Owner);

        assert_eq!(element.position(), Point::new(5.0, 7.0));
        assert!(element.moveable);
        assert!(!element.rotatable);
        assert!(!element.is_container());
        assert!(element.children().is_empty());
        assert_eq!(element.selectable, Selectability::Owner);
    }

    #[test]
    fn test_container_has_children_list() {
        let map = Element::container("map", Rect::new(0.0, 0.0, 100.0, 100.0));
        assert!(map.is_container());
        assert!(!map.has_observer_set());
    }
}
