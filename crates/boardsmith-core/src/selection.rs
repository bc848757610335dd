//! Selection of representative elements.

use crate::element::ElementId;
use crate::event::Event;
use crate::input::Modifiers;
use crate::scene::Scene;

/// Operations shared by selection models.
///
/// Every operation resolves the given element to its selectable representative first.
pub trait SelectionModel {
    /// Selected representatives, in selection order.
    fn selected(&self) -> &[ElementId];

    fn select(&mut self, scene: &mut Scene, element: ElementId);

    fn unselect(&mut self, scene: &mut Scene, element: ElementId);

    fn unselect_all(&mut self, scene: &mut Scene);

    /// Whether the representative of `element` is selected.
    fn is_selected(&self, scene: &Scene, element: ElementId) -> bool {
        scene
            .selectable_of(element)
            .is_some_and(|rep| self.selected().contains(&rep))
    }

    fn select_only(&mut self, scene: &mut Scene, element: ElementId) {
        self.unselect_all(scene);
        self.select(scene, element);
    }

    /// Apply click semantics: a plain click replaces the selection, a shift/ctrl/meta
    /// click toggles membership.
    ///
    /// With `unselect_allowed` false a click never removes an already selected element,
    /// so pressing on a member of a multi-selection keeps the whole selection.
    fn adjust_selection(&mut self, scene: &mut Scene, element: ElementId, modifiers: Modifiers, unselect_allowed: bool) {
        if scene.selectable_of(element).is_none() {
            return;
        }
        let selected = self.is_selected(scene, element);
        if modifiers.toggles_selection() {
            if !selected {
                self.select(scene, element);
            } else if unselect_allowed {
                self.unselect(scene, element);
            }
        } else if !selected || unselect_allowed {
            self.select_only(scene, element);
        }
    }
}

/// Flat set of selected elements.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    selected: Vec<ElementId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Drop elements that are no longer attached under `root`, without events.
    pub fn retain_under(&mut self, scene: &mut Scene, root: ElementId) {
        let (kept, dropped): (Vec<_>, Vec<_>) = std::mem::take(&mut self.selected)
            .into_iter()
            .partition(|&id| scene.root_of(id) == root);
        for id in dropped {
            scene.set_highlight(id, false);
        }
        self.selected = kept;
    }
}

impl SelectionModel for Selection {
    fn selected(&self) -> &[ElementId] {
        &self.selected
    }

    fn select(&mut self, scene: &mut Scene, element: ElementId) {
        let Some(rep) = scene.selectable_of(element) else {
            return;
        };
        if self.selected.contains(&rep) {
            return;
        }
        self.selected.push(rep);
        scene.set_highlight(rep, true);
        scene.fire(rep, Event::Select);
    }

    fn unselect(&mut self, scene: &mut Scene, element: ElementId) {
        let Some(rep) = scene.selectable_of(element) else {
            return;
        };
        let Some(index) = self.selected.iter().position(|&id| id == rep) else {
            return;
        };
        self.selected.remove(index);
        scene.set_highlight(rep, false);
        scene.fire(rep, Event::Unselect);
    }

    fn unselect_all(&mut self, scene: &mut Scene) {
        for rep in std::mem::take(&mut self.selected) {
            scene.set_highlight(rep, false);
            scene.fire(rep, Event::Unselect);
        }
    }
}
