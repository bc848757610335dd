//! Element groups and the group-aware selection.
//!
//! Groups nest: regrouping a selection that already contains groups makes them members
//! of the new group. Selecting any member selects every element of its topmost group.

use crate::element::ElementId;
use crate::scene::Scene;
use crate::selection::{Selection, SelectionModel};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Unique identifier for groups.
pub type GroupId = Uuid;

/// Direct member of a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GroupMember {
    Element(ElementId),
    Group(GroupId),
}

/// Many-to-one mapping of elements and groups to their owning group.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupTable {
    groups: HashMap<GroupId, Vec<GroupMember>>,
    owners: HashMap<GroupMember, GroupId>,
}

impl GroupTable {
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn members(&self, group: GroupId) -> &[GroupMember] {
        self.groups.get(&group).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn owner(&self, member: GroupMember) -> Option<GroupId> {
        self.owners.get(&member).copied()
    }

    /// Outermost unit containing `element`: its topmost group, or the element itself.
    pub fn top_unit(&self, element: ElementId) -> GroupMember {
        let mut unit = GroupMember::Element(element);
        while let Some(group) = self.owner(unit) {
            unit = GroupMember::Group(group);
        }
        unit
    }

    /// Every element of a unit, nested groups expanded.
    pub fn flatten(&self, unit: GroupMember) -> Vec<ElementId> {
        match unit {
            GroupMember::Element(id) => vec![id],
            GroupMember::Group(group) => self
                .members(group)
                .iter()
                .flat_map(|&member| self.flatten(member))
                .collect(),
        }
    }

    /// Distinct top units of a set of elements, in first-seen order.
    pub fn top_units(&self, elements: &[ElementId]) -> Vec<GroupMember> {
        let mut units = Vec::new();
        for &element in elements {
            let unit = self.top_unit(element);
            if !units.contains(&unit) {
                units.push(unit);
            }
        }
        units
    }

    /// Whether the elements span more than one top unit.
    pub fn groupable(&self, elements: &[ElementId]) -> bool {
        self.top_units(elements).len() > 1
    }

    /// Whether any of the elements belongs to a group.
    pub fn ungroupable(&self, elements: &[ElementId]) -> bool {
        self.top_units(elements)
            .iter()
            .any(|unit| matches!(unit, GroupMember::Group(_)))
    }

    /// Merge the top units of `elements` into a new group.
    pub fn regroup(&mut self, elements: &[ElementId]) -> Option<GroupId> {
        let units = self.top_units(elements);
        if units.len() < 2 {
            return None;
        }
        let group = Uuid::new_v4();
        for &unit in &units {
            self.owners.insert(unit, group);
        }
        self.groups.insert(group, units);
        Some(group)
    }

    /// Dissolve the topmost groups of `elements` one level, returning the freed members.
    pub fn ungroup(&mut self, elements: &[ElementId]) -> Vec<GroupMember> {
        let mut freed = Vec::new();
        for unit in self.top_units(elements) {
            let GroupMember::Group(group) = unit else {
                continue;
            };
            if let Some(members) = self.groups.remove(&group) {
                for member in &members {
                    self.owners.remove(member);
                }
                freed.extend(members);
            }
        }
        freed
    }
}

/// Selection that selects and unselects whole groups.
#[derive(Debug, Clone, Default)]
pub struct Groups {
    selection: Selection,
}

impl Groups {
    pub fn new() -> Self {
        Self::default()
    }

    /// Group the current selection. Undoable.
    pub fn regroup(&mut self, scene: &mut Scene) -> Option<GroupId> {
        if !self.groupable(scene) {
            return None;
        }
        scene.register_groups();
        let group = scene.groups.regroup(self.selection.selected());
        log::debug!("grouped {} elements into {:?}", self.selection.len(), group);
        group
    }

    /// Dissolve the groups of the current selection one level. Undoable.
    pub fn ungroup(&mut self, scene: &mut Scene) -> Vec<GroupMember> {
        if !self.ungroupable(scene) {
            return Vec::new();
        }
        scene.register_groups();
        scene.groups.ungroup(self.selection.selected())
    }

    pub fn groupable(&self, scene: &Scene) -> bool {
        scene.groups.groupable(self.selection.selected())
    }

    pub fn ungroupable(&self, scene: &Scene) -> bool {
        scene.groups.ungroupable(self.selection.selected())
    }

    pub fn len(&self) -> usize {
        self.selection.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selection.is_empty()
    }

    /// Drop elements that are no longer attached under `root`.
    pub fn retain_under(&mut self, scene: &mut Scene, root: ElementId) {
        self.selection.retain_under(scene, root);
    }

    fn group_of(scene: &Scene, element: ElementId) -> Vec<ElementId> {
        let Some(rep) = scene.selectable_of(element) else {
            return Vec::new();
        };
        scene.groups.flatten(scene.groups.top_unit(rep))
    }
}

impl SelectionModel for Groups {
    fn selected(&self) -> &[ElementId] {
        self.selection.selected()
    }

    fn select(&mut self, scene: &mut Scene, element: ElementId) {
        for member in Self::group_of(scene, element) {
            self.selection.select(scene, member);
        }
    }

    fn unselect(&mut self, scene: &mut Scene, element: ElementId) {
        for member in Self::group_of(scene, element) {
            self.selection.unselect(scene, member);
        }
    }

    fn unselect_all(&mut self, scene: &mut Scene) {
        self.selection.unselect_all(scene);
    }
}
