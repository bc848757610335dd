//! Transactional undo/redo log.
//!
//! The log records the state of an entity the first time it is registered inside the
//! open transaction. Undo reverts every entity of the most recent transaction to that
//! state; redo replays the inverse snapshot taken just before the undo.

use crate::element::{Element, ElementId};
use crate::groups::GroupTable;
use kurbo::{Affine, Rect};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Default number of transactions kept in the undo history.
pub const MAX_UNDO_HISTORY: usize = 50;

/// Identity of something the log can snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKey {
    Element(ElementId),
    /// The group table of the selection model.
    Groups,
}

/// One capability's share of an element snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Fragment {
    Geometry { matrix: Affine, bounds: Rect },
    Parent(Option<ElementId>),
    Children(Vec<ElementId>),
    Observers(Option<Vec<ElementId>>),
    Properties(BTreeMap<String, Value>),
}

/// Contributes one fragment to an element snapshot and restores it.
trait SnapshotProvider: Sync {
    fn capture(&self, element: &Element) -> Option<Fragment>;
    /// Returns false when the fragment belongs to another provider.
    fn restore(&self, element: &mut Element, fragment: &Fragment) -> bool;
}

struct GeometryProvider;
struct ParentProvider;
struct ContainerProvider;
struct ObservableProvider;
struct PropertiesProvider;

impl SnapshotProvider for GeometryProvider {
    fn capture(&self, element: &Element) -> Option<Fragment> {
        Some(Fragment::Geometry {
            matrix: element.matrix,
            bounds: element.bounds,
        })
    }

    fn restore(&self, element: &mut Element, fragment: &Fragment) -> bool {
        let Fragment::Geometry { matrix, bounds } = fragment else {
            return false;
        };
        element.matrix = *matrix;
        element.bounds = *bounds;
        true
    }
}

impl SnapshotProvider for ParentProvider {
    fn capture(&self, element: &Element) -> Option<Fragment> {
        Some(Fragment::Parent(element.parent))
    }

    fn restore(&self, element: &mut Element, fragment: &Fragment) -> bool {
        let Fragment::Parent(parent) = fragment else {
            return false;
        };
        element.parent = *parent;
        true
    }
}

impl SnapshotProvider for ContainerProvider {
    fn capture(&self, element: &Element) -> Option<Fragment> {
        element.children.clone().map(Fragment::Children)
    }

    fn restore(&self, element: &mut Element, fragment: &Fragment) -> bool {
        let Fragment::Children(children) = fragment else {
            return false;
        };
        element.children = Some(children.clone());
        true
    }
}

impl SnapshotProvider for ObservableProvider {
    fn capture(&self, element: &Element) -> Option<Fragment> {
        Some(Fragment::Observers(element.observers.clone()))
    }

    fn restore(&self, element: &mut Element, fragment: &Fragment) -> bool {
        let Fragment::Observers(observers) = fragment else {
            return false;
        };
        element.observers = observers.clone();
        true
    }
}

impl SnapshotProvider for PropertiesProvider {
    fn capture(&self, element: &Element) -> Option<Fragment> {
        if element.properties.is_empty() {
            None
        } else {
            Some(Fragment::Properties(element.properties.clone()))
        }
    }

    fn restore(&self, element: &mut Element, fragment: &Fragment) -> bool {
        let Fragment::Properties(properties) = fragment else {
            return false;
        };
        element.properties = properties.clone();
        true
    }
}

/// Providers in snapshot order.
static PROVIDERS: [&dyn SnapshotProvider; 5] = [
    &GeometryProvider,
    &ParentProvider,
    &ContainerProvider,
    &ObservableProvider,
    &PropertiesProvider,
];

/// Snapshot of an element's own mutable fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementMemento {
    fragments: Vec<Fragment>,
}

impl ElementMemento {
    /// Capture the current state of an element.
    pub fn capture(element: &Element) -> Self {
        Self {
            fragments: PROVIDERS.iter().filter_map(|p| p.capture(element)).collect(),
        }
    }

    /// Restore an element to this snapshot.
    pub fn restore(&self, element: &mut Element) {
        if !self
            .fragments
            .iter()
            .any(|f| matches!(f, Fragment::Properties(_)))
        {
            // Properties are only captured when present.
            element.properties.clear();
        }
        for fragment in &self.fragments {
            for provider in PROVIDERS.iter() {
                if provider.restore(element, fragment) {
                    break;
                }
            }
        }
    }

    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    pub fn matrix(&self) -> Option<Affine> {
        self.fragments.iter().find_map(|f| match f {
            Fragment::Geometry { matrix, .. } => Some(*matrix),
            _ => None,
        })
    }

    pub fn parent(&self) -> Option<ElementId> {
        self.fragments.iter().find_map(|f| match f {
            Fragment::Parent(parent) => *parent,
            _ => None,
        })
    }

    pub fn children(&self) -> Option<&[ElementId]> {
        self.fragments.iter().find_map(|f| match f {
            Fragment::Children(children) => Some(children.as_slice()),
            _ => None,
        })
    }
}

/// A snapshot held by a transaction.
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Element(ElementMemento),
    Groups(GroupTable),
}

/// Pre-mutation snapshots of one undoable batch, at most one per entity.
#[derive(Debug, Clone, Default)]
pub struct Transaction {
    records: Vec<(EntityKey, Record)>,
}

impl Transaction {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn contains(&self, key: EntityKey) -> bool {
        self.records.iter().any(|(k, _)| *k == key)
    }

    pub fn get(&self, key: EntityKey) -> Option<&Record> {
        self.records.iter().find(|(k, _)| *k == key).map(|(_, r)| r)
    }

    /// Insert a record unless the entity already has one. First registration wins.
    pub fn insert(&mut self, key: EntityKey, record: Record) -> bool {
        if self.contains(key) {
            return false;
        }
        self.records.push((key, record));
        true
    }

    /// Records in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (EntityKey, &Record)> {
        self.records.iter().map(|(k, r)| (*k, r))
    }

    pub fn keys(&self) -> impl Iterator<Item = EntityKey> + '_ {
        self.records.iter().map(|(k, _)| *k)
    }
}

/// The undo/redo log.
#[derive(Debug, Clone)]
pub struct Memento {
    /// The open transaction, accumulating registrations.
    current: Transaction,
    /// Closed transactions, oldest first. Never empty ones.
    undo_stack: Vec<Transaction>,
    redo_stack: Vec<Transaction>,
    /// Redo history invalidated by the open transaction, given back if it is cancelled.
    stashed_redo: Option<Vec<Transaction>>,
    /// Recording flag, lowered while a transaction is being replayed.
    opened: bool,
    max_history: usize,
}

impl Default for Memento {
    fn default() -> Self {
        Self::new()
    }
}

impl Memento {
    /// Create an empty log with the default history limit.
    pub fn new() -> Self {
        Self::with_history_limit(MAX_UNDO_HISTORY)
    }

    pub fn with_history_limit(max_history: usize) -> Self {
        Self {
            current: Transaction::default(),
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            stashed_redo: None,
            opened: true,
            max_history: max_history.max(1),
        }
    }

    /// Whether registrations are currently recorded.
    pub fn is_recording(&self) -> bool {
        self.opened
    }

    /// The open transaction.
    pub fn current(&self) -> &Transaction {
        &self.current
    }

    /// Record an entity in the open transaction.
    ///
    /// `capture` runs only when the entity has no record yet and recording is enabled.
    /// Returns true if a record was stored.
    pub fn register_with(&mut self, key: EntityKey, capture: impl FnOnce() -> Option<Record>) -> bool {
        if !self.opened || self.current.contains(key) {
            return false;
        }
        let Some(record) = capture() else {
            return false;
        };
        if self.current.is_empty() && !self.redo_stack.is_empty() {
            // New history after an undo: redo is no longer reachable.
            self.stashed_redo = Some(std::mem::take(&mut self.redo_stack));
        }
        self.current.insert(key, record)
    }

    /// Close the open transaction and start a new one.
    ///
    /// No-op while the open transaction is empty.
    pub fn open(&mut self) {
        if self.current.is_empty() {
            return;
        }
        let closed = std::mem::take(&mut self.current);
        self.undo_stack.push(closed);
        self.redo_stack.clear();
        self.stashed_redo = None;
        self.trim();
        log::debug!("memento: opened transaction #{}", self.undo_stack.len() + 1);
    }

    /// Discard the open transaction's bookkeeping without reverting anything.
    ///
    /// Redo history the transaction invalidated becomes reachable again.
    pub fn cancel(&mut self) {
        let discarded = std::mem::take(&mut self.current);
        if !discarded.is_empty() {
            log::debug!("memento: cancelled transaction of {} records", discarded.len());
        }
        if let Some(redo) = self.stashed_redo.take() {
            self.redo_stack = redo;
        }
    }

    /// Reset to a single empty transaction.
    pub fn clear(&mut self) {
        self.current = Transaction::default();
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.stashed_redo = None;
        self.opened = true;
    }

    pub fn can_undo(&self) -> bool {
        !self.current.is_empty() || !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Number of non-empty transactions that can be undone, the open one included.
    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len() + usize::from(!self.current.is_empty())
    }

    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    /// Take the most recent non-empty transaction and suspend recording.
    pub(crate) fn begin_undo(&mut self) -> Option<Transaction> {
        let tx = if self.current.is_empty() {
            self.undo_stack.pop()?
        } else {
            std::mem::take(&mut self.current)
        };
        self.stashed_redo = None;
        self.opened = false;
        Some(tx)
    }

    /// Store the inverse of an undone transaction and resume recording.
    pub(crate) fn end_undo(&mut self, redo: Transaction) {
        self.redo_stack.push(redo);
        self.current = Transaction::default();
        self.opened = true;
    }

    /// Take the most recent redo transaction and suspend recording.
    pub(crate) fn begin_redo(&mut self) -> Option<Transaction> {
        let tx = self.redo_stack.pop()?;
        self.opened = false;
        Some(tx)
    }

    /// Store the inverse of a redone transaction and resume recording.
    pub(crate) fn end_redo(&mut self, undo: Transaction) {
        if !self.current.is_empty() {
            let pending = std::mem::take(&mut self.current);
            self.undo_stack.push(pending);
        }
        self.undo_stack.push(undo);
        self.trim();
        self.opened = true;
    }

    fn trim(&mut self) {
        if self.undo_stack.len() > self.max_history {
            let excess = self.undo_stack.len() - self.max_history;
            self.undo_stack.drain(..excess);
        }
    }
}
