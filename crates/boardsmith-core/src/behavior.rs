//! Optional per-element hooks.
//!
//! Every hook has a permissive default: an element without a behaviour accepts every
//! drop, recovers as a no-op and ignores notifications.

use crate::element::ElementId;
use crate::event::Event;
use crate::memento::ElementMemento;
use crate::scene::Scene;
use std::fmt;

/// Strategy object attached to an element.
///
/// `me` is always the element the behaviour is attached to.
pub trait ElementBehavior: fmt::Debug + Send + Sync {
    /// Called for every event fired by an element `me` observes.
    fn notified(&self, _scene: &mut Scene, _me: ElementId, _source: ElementId, _event: &Event) {}

    /// Redirect drops aimed at `me` to another element (a cover to its content area).
    fn drop_target(&self, _scene: &Scene, _me: ElementId) -> Option<ElementId> {
        None
    }

    /// Whether `me` accepts `element` being dropped into it.
    fn accept_drop(&self, _scene: &Scene, _me: ElementId, _element: ElementId) -> bool {
        true
    }

    /// Whether `me` agrees to be dropped into `target`.
    fn accept_dropped(&self, _scene: &Scene, _me: ElementId, _target: ElementId) -> bool {
        true
    }

    fn receive_drop(&self, _scene: &mut Scene, _me: ElementId, _element: ElementId) {}

    fn dropped(&self, _scene: &mut Scene, _me: ElementId, _target: ElementId) {}

    /// Whether container `me` accepts `element` being rotated by `angle` radians.
    fn accept_rotation(&self, _scene: &Scene, _me: ElementId, _element: ElementId, _angle: f64) -> bool {
        true
    }

    /// Whether `me` agrees to keep a rotation of `angle` radians.
    fn accept_rotated(&self, _scene: &Scene, _me: ElementId, _angle: f64) -> bool {
        true
    }

    /// Post-revert fix-up, run after every entity of a transaction was reverted.
    fn recover(&self, _scene: &mut Scene, _me: ElementId, _record: &ElementMemento) {}
}
