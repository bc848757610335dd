//! Publish/subscribe between elements.

use crate::element::ElementId;
use crate::event::Event;
use crate::scene::Scene;

impl Scene {
    /// Subscribe `observer` to the events fired by `subject`. Undoable.
    pub fn add_observer(&mut self, subject: ElementId, observer: ElementId) {
        if !self.contains(subject) || self.observers(subject).contains(&observer) {
            return;
        }
        self.register(subject);
        if let Some(element) = self.get_mut(subject) {
            element.observers.get_or_insert_with(Vec::new).push(observer);
        }
    }

    /// Unsubscribe `observer`. The observer set is dropped once empty. Undoable.
    pub fn remove_observer(&mut self, subject: ElementId, observer: ElementId) {
        if !self.observers(subject).contains(&observer) {
            return;
        }
        self.register(subject);
        if let Some(element) = self.get_mut(subject) {
            if let Some(observers) = element.observers.as_mut() {
                observers.retain(|&o| o != observer);
                if observers.is_empty() {
                    element.observers = None;
                }
            }
        }
    }

    pub fn observers(&self, subject: ElementId) -> &[ElementId] {
        self.get(subject).map(|e| e.observers()).unwrap_or(&[])
    }

    /// Notify every observer of `source`, in subscription order.
    ///
    /// Iterates over a copy of the observer list: observers may subscribe or unsubscribe
    /// while being notified.
    pub fn fire(&mut self, source: ElementId, event: Event) {
        let observers = self.observers(source).to_vec();
        for observer in observers {
            let behavior = self.get(observer).and_then(|e| e.behavior.clone());
            if let Some(behavior) = behavior {
                behavior.notified(self, observer, source, &event);
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::behavior::ElementBehavior;
    use crate::element::Element;
    use crate::event::EventKind;
    use kurbo::Rect;
    use std::sync::{Arc, Mutex};

    /// Behaviour that records every notification, shared with the test body.
    #[derive(Debug, Default)]
    pub(crate) struct Recorder {
        pub(crate) seen: Mutex<Vec<(ElementId, ElementId, Event)>>,
    }

    impl Recorder {
        pub(crate) fn kinds(&self) -> Vec<EventKind> {
            self.seen.lock().unwrap().iter().map(|(_, _, e)| e.kind()).collect()
        }

        pub(crate) fn log(&self) -> Vec<(ElementId, ElementId, Event)> {
            self.seen.lock().unwrap().clone()
        }
    }

    impl ElementBehavior for Recorder {
        fn notified(&self, _scene: &mut Scene, me: ElementId, source: ElementId, event: &Event) {
            self.seen.lock().unwrap().push((me, source, event.clone()));
        }
    }

    /// Insert an observer element that records into `recorder` and subscribe it to `subjects`.
    pub(crate) fn watch(scene: &mut Scene, recorder: &Arc<Recorder>, subjects: &[ElementId]) -> ElementId {
        let observer = scene.insert(Element::new("observer", Rect::ZERO).with_behavior(recorder.clone()));
        for &subject in subjects {
            scene.add_observer(subject, observer);
        }
        observer
    }

    #[derive(Debug)]
    struct Unsubscriber;

    impl ElementBehavior for Unsubscriber {
        fn notified(&self, scene: &mut Scene, me: ElementId, source: ElementId, _event: &Event) {
            scene.remove_observer(source, me);
        }
    }

    #[test]
    fn test_fire_in_subscription_order() {
        let mut scene = Scene::new();
        let subject = scene.insert(Element::new("subject", Rect::ZERO));
        let recorder = Arc::new(Recorder::default());
        let first = watch(&mut scene, &recorder, &[subject]);
        let second = watch(&mut scene, &recorder, &[subject]);

        scene.fire(subject, Event::Geometry);

        let log = recorder.log();
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].0, first);
        assert_eq!(log[1].0, second);
        assert_eq!(log[0].1, subject);
    }

    #[test]
    fn test_observer_may_unsubscribe_while_notified() {
        let mut scene = Scene::new();
        let subject = scene.insert(Element::new("subject", Rect::ZERO));
        let quitter = scene.insert(Element::new("quitter", Rect::ZERO).with_behavior(Arc::new(Unsubscriber)));
        scene.add_observer(subject, quitter);
        let recorder = Arc::new(Recorder::default());
        watch(&mut scene, &recorder, &[subject]);

        scene.fire(subject, Event::Select);

        assert_eq!(recorder.kinds(), vec![EventKind::Select]);
        assert_eq!(scene.observers(subject).len(), 1);
    }

    #[test]
    fn test_empty_observer_set_is_dropped() {
        let mut scene = Scene::new();
        let subject = scene.insert(Element::new("subject", Rect::ZERO));
        let observer = scene.insert(Element::new("observer", Rect::ZERO));

        scene.add_observer(subject, observer);
        assert!(scene.get(subject).unwrap().has_observer_set());

        scene.remove_observer(subject, observer);
        assert!(!scene.get(subject).unwrap().has_observer_set());
    }

    #[test]
    fn test_subscription_is_undoable() {
        let mut scene = Scene::new();
        let subject = scene.insert(Element::new("subject", Rect::ZERO));
        let observer = scene.insert(Element::new("observer", Rect::ZERO));

        scene.add_observer(subject, observer);
        assert!(scene.undo());
        assert!(scene.observers(subject).is_empty());
        assert!(!scene.get(subject).unwrap().has_observer_set());

        assert!(scene.redo());
        assert_eq!(scene.observers(subject), &[observer]);
    }
}
