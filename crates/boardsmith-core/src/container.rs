//! Parent/child structure of the scene.
//!
//! Every operation registers the container and the affected elements before mutating,
//! and fires the container's event before the element's.

use crate::element::ElementId;
use crate::error::{SceneError, SceneResult};
use crate::event::Event;
use crate::scene::Scene;

impl Scene {
    /// Append `element` as the topmost child of `container`.
    ///
    /// An element attached elsewhere is removed from its previous parent first. Adding an
    /// element to its current parent moves it to the top.
    pub fn add(&mut self, container: ElementId, element: ElementId) -> SceneResult<()> {
        self.check_attachable(container, element)?;
        self.leave_other_parent(container, element)?;

        self.register(container);
        self.register(element);
        self.link(container, element, None)?;

        self.fire(container, Event::Add(element));
        self.fire(element, Event::Attach(container));
        Ok(())
    }

    /// Place `element` just below `before`, which must be a child of `container`.
    ///
    /// Moving an existing child fires `displace`/`displaced` instead of `add`/`attach`.
    pub fn insert_before(&mut self, container: ElementId, element: ElementId, before: ElementId) -> SceneResult<()> {
        self.check_child(container, before)?;
        self.check_attachable(container, element)?;
        if element == before {
            return Ok(());
        }
        let displaced = self.parent(element) == Some(container);
        self.leave_other_parent(container, element)?;

        self.register(container);
        self.register(element);
        self.link(container, element, Some(before))?;

        if displaced {
            self.fire(container, Event::Displace(element));
            self.fire(element, Event::Displaced(container));
        } else {
            self.fire(container, Event::Add(element));
            self.fire(element, Event::Attach(container));
        }
        Ok(())
    }

    /// Put `new` at the place of `old`, a child of `container`, and unattach `old`.
    pub fn replace(&mut self, container: ElementId, old: ElementId, new: ElementId) -> SceneResult<()> {
        self.check_child(container, old)?;
        self.check_attachable(container, new)?;
        if old == new {
            return Ok(());
        }
        if let Some(previous) = self.parent(new) {
            self.remove(previous, new)?;
        }

        self.register(container);
        self.register(old);
        self.register(new);
        let children = self.element_mut(container)?.children.get_or_insert_with(Vec::new);
        if let Some(slot) = children.iter_mut().find(|c| **c == old) {
            *slot = new;
        }
        self.element_mut(old)?.parent = None;
        self.element_mut(new)?.parent = Some(container);

        self.fire(container, Event::Remove(old));
        self.fire(old, Event::Detach(container));
        self.fire(container, Event::Add(new));
        self.fire(new, Event::Attach(container));
        Ok(())
    }

    /// Unattach `element` from `container`.
    pub fn remove(&mut self, container: ElementId, element: ElementId) -> SceneResult<()> {
        self.check_child(container, element)?;

        self.register(container);
        self.register(element);
        if let Some(children) = self.element_mut(container)?.children.as_mut() {
            children.retain(|&c| c != element);
        }
        self.element_mut(element)?.parent = None;

        self.fire(container, Event::Remove(element));
        self.fire(element, Event::Detach(container));
        Ok(())
    }

    /// Remove `element` from its parent, if it has one.
    pub fn detach(&mut self, element: ElementId) -> SceneResult<()> {
        match self.element(element)?.parent {
            Some(parent) => self.remove(parent, element),
            None => Ok(()),
        }
    }

    fn check_child(&self, container: ElementId, element: ElementId) -> SceneResult<()> {
        self.check_container(container)?;
        if self.element(element)?.parent != Some(container) {
            return Err(SceneError::NotAChild {
                parent: container,
                child: element,
            });
        }
        Ok(())
    }

    fn check_container(&self, container: ElementId) -> SceneResult<()> {
        if !self.element(container)?.is_container() {
            return Err(SceneError::NotAContainer(container));
        }
        Ok(())
    }

    fn check_attachable(&self, container: ElementId, element: ElementId) -> SceneResult<()> {
        self.check_container(container)?;
        self.element(element)?;
        if container == element || self.is_ancestor(element, container) {
            return Err(SceneError::Cycle {
                parent: container,
                child: element,
            });
        }
        Ok(())
    }

    fn leave_other_parent(&mut self, container: ElementId, element: ElementId) -> SceneResult<()> {
        match self.parent(element) {
            Some(previous) if previous != container => self.remove(previous, element),
            _ => Ok(()),
        }
    }

    /// Put `element` in the children list of `container`, below `before` or on top.
    fn link(&mut self, container: ElementId, element: ElementId, before: Option<ElementId>) -> SceneResult<()> {
        let children = self.element_mut(container)?.children.get_or_insert_with(Vec::new);
        children.retain(|&c| c != element);
        let index = before
            .and_then(|b| children.iter().position(|&c| c == b))
            .unwrap_or(children.len());
        children.insert(index, element);
        self.element_mut(element)?.parent = Some(container);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::Element;
    use crate::event::EventKind;
    use crate::observable::tests::{Recorder, watch};
    use kurbo::Rect;
    use std::sync::Arc;

    fn board() -> (Scene, ElementId, ElementId, ElementId) {
        let mut scene = Scene::new();
        let map = scene.insert(Element::container("map", Rect::new(0.0, 0.0, 100.0, 100.0)));
        let a = scene.insert(Element::new("a", Rect::new(0.0, 0.0, 10.0, 10.0)));
        let b = scene.insert(Element::new("b", Rect::new(0.0, 0.0, 10.0, 10.0)));
        (scene, map, a, b)
    }

    #[test]
    fn test_add_fires_container_event_first() {
        let (mut scene, map, a, _) = board();
        let recorder = Arc::new(Recorder::default());
        watch(&mut scene, &recorder, &[map, a]);

        scene.add(map, a).unwrap();

        let log = recorder.log();
        assert_eq!(log.len(), 2);
        assert_eq!((log[0].1, log[0].2.clone()), (map, Event::Add(a)));
        assert_eq!((log[1].1, log[1].2.clone()), (a, Event::Attach(map)));
        assert_eq!(scene.parent(a), Some(map));
        assert_eq!(scene.children(map), &[a]);
    }

    #[test]
    fn test_remove_fires_remove_before_detach() {
        let (mut scene, map, a, _) = board();
        scene.add(map, a).unwrap();
        let recorder = Arc::new(Recorder::default());
        watch(&mut scene, &recorder, &[map, a]);

        scene.remove(map, a).unwrap();

        assert_eq!(recorder.kinds(), vec![EventKind::Remove, EventKind::Detach]);
        assert_eq!(scene.parent(a), None);
        assert!(scene.children(map).is_empty());
    }

    #[test]
    fn test_readd_moves_between_parents() {
        let (mut scene, map, a, _) = board();
        let tray = scene.insert(Element::container("tray", Rect::new(0.0, 0.0, 50.0, 50.0)));
        scene.add(map, a).unwrap();
        let recorder = Arc::new(Recorder::default());
        watch(&mut scene, &recorder, &[map, tray, a]);

        scene.add(tray, a).unwrap();

        assert_eq!(
            recorder.kinds(),
            vec![EventKind::Remove, EventKind::Detach, EventKind::Add, EventKind::Attach]
        );
        assert!(scene.children(map).is_empty());
        assert_eq!(scene.children(tray), &[a]);
    }

    #[test]
    fn test_readd_same_parent_moves_to_top() {
        let (mut scene, map, a, b) = board();
        scene.add(map, a).unwrap();
        scene.add(map, b).unwrap();

        scene.add(map, a).unwrap();
        assert_eq!(scene.children(map), &[b, a]);
    }

    #[test]
    fn test_insert_before_and_displace() {
        let (mut scene, map, a, b) = board();
        scene.add(map, a).unwrap();
        scene.insert_before(map, b, a).unwrap();
        assert_eq!(scene.children(map), &[b, a]);

        let recorder = Arc::new(Recorder::default());
        watch(&mut scene, &recorder, &[map, a]);
        scene.insert_before(map, a, b).unwrap();

        assert_eq!(scene.children(map), &[a, b]);
        assert_eq!(recorder.kinds(), vec![EventKind::Displace, EventKind::Displaced]);
    }

    #[test]
    fn test_replace_fires_both_pairs() {
        let (mut scene, map, a, b) = board();
        scene.add(map, a).unwrap();
        let recorder = Arc::new(Recorder::default());
        watch(&mut scene, &recorder, &[map]);

        scene.replace(map, a, b).unwrap();

        assert_eq!(recorder.kinds(), vec![EventKind::Remove, EventKind::Add]);
        assert_eq!(scene.children(map), &[b]);
        assert_eq!(scene.parent(a), None);
        assert_eq!(scene.parent(b), Some(map));
    }

    #[test]
    fn test_structural_preconditions() {
        let (mut scene, map, a, b) = board();

        assert_eq!(
            scene.remove(map, a),
            Err(SceneError::NotAChild { parent: map, child: a })
        );
        assert!(matches!(scene.insert_before(map, a, b), Err(SceneError::NotAChild { .. })));
        assert!(matches!(scene.replace(map, a, b), Err(SceneError::NotAChild { .. })));
        assert_eq!(scene.add(a, b), Err(SceneError::NotAContainer(a)));
        assert_eq!(scene.add(map, map), Err(SceneError::Cycle { parent: map, child: map }));

        let unknown = uuid::Uuid::new_v4();
        assert_eq!(scene.add(map, unknown), Err(SceneError::NotFound(unknown)));
    }

    #[test]
    fn test_add_under_descendant_is_refused() {
        let (mut scene, map, _, _) = board();
        let tray = scene.insert(Element::container("tray", Rect::new(0.0, 0.0, 50.0, 50.0)));
        scene.add(map, tray).unwrap();

        assert!(matches!(scene.add(tray, map), Err(SceneError::Cycle { .. })));
    }

    #[test]
    fn test_children_undo_round_trip() {
        let (mut scene, map, a, b) = board();
        scene.add(map, a).unwrap();
        scene.memento_mut().open();

        scene.add(map, b).unwrap();
        scene.remove(map, a).unwrap();
        assert_eq!(scene.children(map), &[b]);

        assert!(scene.undo());
        assert_eq!(scene.children(map), &[a]);
        assert_eq!(scene.parent(a), Some(map));
        assert_eq!(scene.parent(b), None);

        assert!(scene.redo());
        assert_eq!(scene.children(map), &[b]);
        assert_eq!(scene.parent(a), None);
    }

    #[test]
    fn test_detach_unattached_is_noop() {
        let (mut scene, _, a, _) = board();
        assert!(scene.detach(a).is_ok());
    }
}
