//! Semantic events fired by scene elements to their observers.

use crate::element::ElementId;
use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An event together with its payload.
///
/// Element payloads name the other party: `Add(child)` is fired by the container,
/// `Attach(container)` by the child.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    Add(ElementId),
    Remove(ElementId),
    Attach(ElementId),
    Detach(ElementId),
    /// A child changed its position inside the firing container.
    Displace(ElementId),
    /// The firing element changed its position inside the given container.
    Displaced(ElementId),
    Select,
    Unselect,
    /// New zoom factor of the canvas.
    Zoom(f64),
    Geometry,
    DragStart(Point),
    DragMove(Point),
    DragDrop(Point),
    /// Angle (radians) applied so far by a rotation gesture.
    DragRotated(f64),
    ReceiveDrop(ElementId),
    Dropped(ElementId),
    RevertDrop(ElementId),
    RevertDropped(ElementId),
    ReceiveRotation(ElementId),
    Rotated(f64),
    RevertRotation(ElementId),
    RevertRotated(ElementId),
    ScrollEnd,
}

/// Payload-free discriminant of [`Event`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    Add,
    Remove,
    Attach,
    Detach,
    Displace,
    Displaced,
    Select,
    Unselect,
    Zoom,
    Geometry,
    DragStart,
    DragMove,
    DragDrop,
    DragRotated,
    ReceiveDrop,
    Dropped,
    RevertDrop,
    RevertDropped,
    ReceiveRotation,
    Rotated,
    RevertRotation,
    RevertRotated,
    ScrollEnd,
}

impl Event {
    /// Get the kind of this event.
    pub fn kind(&self) -> EventKind {
        match self {
            Event::Add(_) => EventKind::Add,
            Event::Remove(_) => EventKind::Remove,
            Event::Attach(_) => EventKind::Attach,
            Event::Detach(_) => EventKind::Detach,
            Event::Displace(_) => EventKind::Displace,
            Event::Displaced(_) => EventKind::Displaced,
            Event::Select => EventKind::Select,
            Event::Unselect => EventKind::Unselect,
            Event::Zoom(_) => EventKind::Zoom,
            Event::Geometry => EventKind::Geometry,
            Event::DragStart(_) => EventKind::DragStart,
            Event::DragMove(_) => EventKind::DragMove,
            Event::DragDrop(_) => EventKind::DragDrop,
            Event::DragRotated(_) => EventKind::DragRotated,
            Event::ReceiveDrop(_) => EventKind::ReceiveDrop,
            Event::Dropped(_) => EventKind::Dropped,
            Event::RevertDrop(_) => EventKind::RevertDrop,
            Event::RevertDropped(_) => EventKind::RevertDropped,
            Event::ReceiveRotation(_) => EventKind::ReceiveRotation,
            Event::Rotated(_) => EventKind::Rotated,
            Event::RevertRotation(_) => EventKind::RevertRotation,
            Event::RevertRotated(_) => EventKind::RevertRotated,
            Event::ScrollEnd => EventKind::ScrollEnd,
        }
    }

    /// The element carried by this event, if any.
    pub fn element(&self) -> Option<ElementId> {
        match self {
            Event::Add(id)
            | Event::Remove(id)
            | Event::Attach(id)
            | Event::Detach(id)
            | Event::Displace(id)
            | Event::Displaced(id)
            | Event::ReceiveDrop(id)
            | Event::Dropped(id)
            | Event::RevertDrop(id)
            | Event::RevertDropped(id)
            | Event::ReceiveRotation(id)
            | Event::RevertRotation(id)
            | Event::RevertRotated(id) => Some(*id),
            _ => None,
        }
    }
}

impl EventKind {
    /// Wire name of the event, as used in scripts and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Add => "add",
            EventKind::Remove => "remove",
            EventKind::Attach => "attach",
            EventKind::Detach => "detach",
            EventKind::Displace => "displace",
            EventKind::Displaced => "displaced",
            EventKind::Select => "select",
            EventKind::Unselect => "unselect",
            EventKind::Zoom => "zoom",
            EventKind::Geometry => "geometry",
            EventKind::DragStart => "drag-start",
            EventKind::DragMove => "drag-move",
            EventKind::DragDrop => "drag-drop",
            EventKind::DragRotated => "drag-rotated",
            EventKind::ReceiveDrop => "receive-drop",
            EventKind::Dropped => "dropped",
            EventKind::RevertDrop => "revert-drop",
            EventKind::RevertDropped => "revert-dropped",
            EventKind::ReceiveRotation => "receive-rotation",
            EventKind::Rotated => "rotated",
            EventKind::RevertRotation => "revert-rotation",
            EventKind::RevertRotated => "revert-rotated",
            EventKind::ScrollEnd => "scroll-end",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
