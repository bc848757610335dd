//! Deep duplication of element subtrees.

use crate::element::{Element, ElementId};
use crate::scene::Scene;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// Identity map from original element to its duplicate.
#[derive(Debug, Clone, Default)]
pub struct DuplicateMap {
    map: HashMap<ElementId, ElementId>,
}

impl DuplicateMap {
    pub fn get(&self, original: ElementId) -> Option<ElementId> {
        self.map.get(&original).copied()
    }

    /// The duplicate of `id` if it is part of the duplicated set, else `id` itself.
    pub fn remap(&self, id: ElementId) -> ElementId {
        self.get(id).unwrap_or(id)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    fn assign(&mut self, original: ElementId) -> bool {
        if self.map.contains_key(&original) {
            return false;
        }
        self.map.insert(original, Uuid::new_v4());
        true
    }
}

impl Element {
    /// Copy of this element with every reference into the duplicated set remapped.
    ///
    /// Transient state (highlight, glass preview, drag session) is not copied.
    pub fn duplicate(&self, map: &DuplicateMap) -> Element {
        let mut copy = self.clone();
        copy.id = map.remap(self.id);
        copy.parent = self.parent.map(|p| map.remap(p));
        if let Some(children) = copy.children.as_mut() {
            for child in children.iter_mut() {
                *child = map.remap(*child);
            }
        }
        if let Some(observers) = copy.observers.as_mut() {
            for observer in observers.iter_mut() {
                *observer = map.remap(*observer);
            }
        }
        copy.highlighted = false;
        copy.glass = None;
        copy.session = None;
        copy
    }
}

impl Scene {
    /// Deep-copy the subtrees rooted at `roots` and return the copies of the roots.
    ///
    /// Roots nested inside another root are copied once, as part of the outer subtree.
    /// The returned copies are unattached.
    pub fn duplicate(&mut self, roots: &[ElementId]) -> Vec<ElementId> {
        let root_set: HashSet<ElementId> = roots.iter().copied().filter(|&id| self.contains(id)).collect();
        let mut top = Vec::new();
        for &root in roots {
            if root_set.contains(&root)
                && !top.contains(&root)
                && !self.ancestors(root).iter().any(|a| root_set.contains(a))
            {
                top.push(root);
            }
        }

        let mut map = DuplicateMap::default();
        let mut originals = Vec::new();
        for &root in &top {
            for id in self.descendants(root) {
                if map.assign(id) {
                    originals.push(id);
                }
            }
        }

        for original in originals {
            let Some(element) = self.get(original) else {
                continue;
            };
            let mut copy = element.duplicate(&map);
            if top.contains(&original) {
                copy.parent = None;
            }
            self.insert(copy);
        }
        log::debug!("duplicated {} elements from {} roots", map.len(), top.len());
        top.iter().map(|&root| map.remap(root)).collect()
    }
}
