use super::{DragOperation, DragStart};
use crate::canvas::Layer;
use crate::editor::Editor;
use crate::element::ElementId;
use crate::event::Event;
use crate::input::PointerInput;
use crate::selection::SelectionModel;
use kurbo::{Point, Vec2};
use std::collections::{HashMap, HashSet};
use std::f64::consts::FRAC_PI_4;

/// Extra elements dragged along with the selection when a gesture starts on an element.
pub type SelectionExtension = Box<dyn Fn(&Editor, ElementId) -> Vec<ElementId>>;

/// Distance of the point the drag set is sorted against, along the direction of travel.
const LOOKAHEAD: f64 = 10_000.0;

/// Moves the selection, previewing it on the glass layer, and negotiates the drop of
/// every moved element with the container found beneath it.
#[derive(Default)]
pub struct DragMoveOperation {
    extension: Option<SelectionExtension>,
    moving: Vec<ElementId>,
    /// Copies made by an Alt-drag, removed again if the gesture comes to nothing.
    copies: Vec<ElementId>,
    last_point: Point,
    /// Canvas position of every moving element.
    positions: HashMap<ElementId, Point>,
    /// Move order for the last direction octant.
    order: Option<(u8, Vec<ElementId>)>,
    /// Set when the gesture started in readonly mode: the drag does nothing.
    frozen: bool,
}

impl DragMoveOperation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn extending<F>(mut self, extension: F) -> Self
    where
        F: Fn(&Editor, ElementId) -> Vec<ElementId> + 'static,
    {
        self.extension = Some(Box::new(extension));
        self
    }

    /// Elements a gesture on `element` moves.
    ///
    /// The selection plus the extension, restricted to attached moveable elements, with
    /// every element whose ancestor is also in the set left out. An element without a
    /// selectable representative moves alone.
    pub fn drag_set(&self, editor: &Editor, element: ElementId) -> Vec<ElementId> {
        let scene = &editor.scene;
        let mut set = if scene.selectable_of(element).is_some() {
            editor.selection.selected().to_vec()
        } else {
            vec![element]
        };
        if let Some(extension) = &self.extension {
            for id in extension(editor, element) {
                if !set.contains(&id) {
                    set.push(id);
                }
            }
        }
        set.retain(|&id| scene.get(id).is_some_and(|e| e.moveable && e.parent().is_some()));
        let members: HashSet<ElementId> = set.iter().copied().collect();
        set.retain(|&id| !scene.ancestors(id).iter().any(|a| members.contains(a)));
        set
    }

    pub fn moving(&self) -> &[ElementId] {
        &self.moving
    }

    /// Replace the drag set by attached copies and select them.
    fn duplicate_moving(&mut self, editor: &mut Editor) {
        let copies = editor.scene.duplicate(&self.moving);
        for (&original, &copy) in self.moving.iter().zip(&copies) {
            let Some(parent) = editor.scene.parent(original) else {
                continue;
            };
            if let Err(err) = editor.scene.add(parent, copy) {
                log::warn!("cannot place copy of {}: {}", original, err);
            }
        }
        editor.selection.unselect_all(&mut editor.scene);
        for &copy in &copies {
            editor.selection.select(&mut editor.scene, copy);
        }
        log::debug!("alt-drag: dragging {} copies", copies.len());
        self.moving = copies.clone();
        self.copies = copies;
    }

    /// Drag set ordered so that elements furthest ahead in the direction of travel move
    /// first. Cached per direction octant.
    fn ordered(&mut self, delta: Vec2) -> Vec<ElementId> {
        let octant = (delta.y.atan2(delta.x) / FRAC_PI_4).round().rem_euclid(8.0) as u8;
        if let Some((cached, order)) = &self.order {
            if *cached == octant {
                return order.clone();
            }
        }
        let angle = f64::from(octant) * FRAC_PI_4;
        let ahead = Point::new(angle.cos() * LOOKAHEAD, angle.sin() * LOOKAHEAD);
        let distance = |id: &ElementId| self.positions.get(id).map_or(f64::MAX, |p| p.distance(ahead));
        let mut order = self.moving.clone();
        order.sort_by(|a, b| distance(a).total_cmp(&distance(b)));
        self.order = Some((octant, order.clone()));
        order
    }

    /// Container beneath a moving element that would receive it.
    fn find_target(editor: &Editor, element: ElementId) -> Option<ElementId> {
        let scene = &editor.scene;
        let canvas = &editor.canvas;
        let exclude: HashSet<ElementId> = [element].into_iter().collect();
        let hit = canvas
            .get_element_from_point(scene, scene.global_position(element), &exclude)
            .or_else(|| canvas.get_element_from_point(scene, scene.gbox(element).center(), &exclude));
        let container = match hit {
            Some(hit) => scene.nearest_container(hit)?,
            None => canvas.base_root(),
        };
        let target = match scene.drop_target_of(container) {
            Some(substitute) => {
                if canvas.layer_of(scene, substitute) != Some(Layer::Base) {
                    log::warn!("drop target {} of {} is not on the base layer", substitute, container);
                    return None;
                }
                substitute
            }
            None => container,
        };
        if canvas.layer_of(scene, target) != Some(Layer::Base) {
            log::debug!("drop of {} over {:?} layer refused", element, canvas.layer_of(scene, target));
            return None;
        }
        if target == element || scene.is_ancestor(element, target) {
            return None;
        }
        Some(target)
    }

    /// Drag set in the order of the last move.
    fn current_order(&self) -> Vec<ElementId> {
        match &self.order {
            Some((_, order)) => order.clone(),
            None => self.moving.clone(),
        }
    }

    /// Roll every moving element back to its drag-start state.
    fn revert_all(&mut self, editor: &mut Editor) {
        for id in std::mem::take(&mut self.moving) {
            editor.canvas.take_element_off_glass(&mut editor.scene, id);
            if let Some(session) = editor.scene.end_drag_session(id) {
                editor.scene.revert(id, &session.origin);
                editor.scene.recover(id, &session.origin);
            }
        }
        self.discard_copies(editor);
    }

    fn discard_copies(&mut self, editor: &mut Editor) {
        for copy in std::mem::take(&mut self.copies) {
            editor.selection.unselect(&mut editor.scene, copy);
            if let Err(err) = editor.scene.detach(copy) {
                log::warn!("cannot discard copy {}: {}", copy, err);
            }
        }
    }

    fn finish(&mut self, editor: &mut Editor) {
        editor.canvas.clear_glass(&mut editor.scene);
        editor.canvas.show_glass();
        self.moving.clear();
        self.copies.clear();
        self.positions.clear();
        self.order = None;
        self.frozen = false;
    }
}

impl DragOperation for DragMoveOperation {
    fn accept(&mut self, editor: &Editor, element: ElementId, _point: Point, _input: &PointerInput) -> bool {
        editor.scene.get(element).is_some_and(|e| e.moveable)
    }

    fn do_drag_start(&mut self, editor: &mut Editor, element: ElementId, start: &DragStart) {
        if editor.settings.readonly {
            log::debug!("readonly: move of {} ignored", element);
            self.frozen = true;
            return;
        }
        editor.scene.memento_mut().open();
        editor
            .selection
            .adjust_selection(&mut editor.scene, element, start.input.modifiers, false);
        editor.canvas.prepare_glass_for_drag_start(&mut editor.scene);

        self.moving = self.drag_set(editor, element);
        if start.input.modifiers.alt {
            self.duplicate_moving(editor);
        }
        self.last_point = start.point;
        self.order = None;

        let scene = &mut editor.scene;
        for &id in &self.moving {
            scene.register(id);
            if let Some(parent) = scene.parent(id) {
                scene.register(parent);
            }
            scene.begin_drag_session(id);
            editor.canvas.put_element_on_glass(scene, id);
            self.positions.insert(id, scene.global_position(id));
            scene.fire(id, Event::DragStart(start.point));
        }
        log::debug!("drag start: moving {} elements", self.moving.len());
    }

    fn do_drag_move(&mut self, editor: &mut Editor, _element: ElementId, point: Point, _input: &PointerInput) {
        if self.frozen {
            return;
        }
        editor.canvas.prepare_glass_for_drag_move();
        let delta = point - self.last_point;
        if delta == Vec2::ZERO {
            return;
        }
        self.last_point = point;
        for id in self.ordered(delta) {
            editor.canvas.move_element_on_glass(&mut editor.scene, id, delta);
            if let Some(position) = self.positions.get_mut(&id) {
                *position += delta;
            }
            editor.scene.fire(id, Event::DragMove(point));
        }
    }

    fn do_drop(&mut self, editor: &mut Editor, _element: ElementId, point: Point, _input: &PointerInput) {
        if self.frozen {
            self.finish(editor);
            return;
        }
        editor.canvas.hide_glass();

        // Decide every outcome while the elements are still on the glass.
        let order = self.current_order();
        let mut outcomes = Vec::with_capacity(order.len());
        for id in order {
            let target = Self::find_target(editor, id).filter(|&target| {
                let scene = &mut editor.scene;
                let local = scene.global_matrix(target).inverse() * scene.global_matrix(id);
                if let Some(e) = scene.get_mut(id) {
                    e.matrix = local;
                }
                scene.accepts_drop(target, id) && scene.accepts_dropped(id, target) && !scene.is_drop_cancelled(id)
            });
            outcomes.push((id, target));
        }

        // Outcomes are final from here on.
        let mut accepted = 0;
        for (id, target) in outcomes {
            let session = editor.scene.end_drag_session(id);
            editor.canvas.take_element_off_glass(&mut editor.scene, id);
            match target {
                Some(target) => {
                    accepted += 1;
                    if let Err(err) = editor.scene.add(target, id) {
                        log::warn!("cannot attach {} to {}: {}", id, target, err);
                    }
                    editor.scene.fire(id, Event::DragDrop(point));
                    editor.scene.receive_drop(target, id);
                    editor.scene.dropped(id, target);
                }
                None if self.copies.contains(&id) => {
                    self.copies.retain(|&copy| copy != id);
                    editor.selection.unselect(&mut editor.scene, id);
                    if let Err(err) = editor.scene.detach(id) {
                        log::warn!("cannot discard copy {}: {}", id, err);
                    }
                    log::debug!("refused copy {} discarded", id);
                }
                None => {
                    let Some(session) = session else {
                        continue;
                    };
                    editor.scene.revert(id, &session.origin);
                    editor.scene.recover(id, &session.origin);
                    if let Some(parent) = session.origin_parent {
                        if let Err(err) = editor.scene.add(parent, id) {
                            log::warn!("cannot restore {} to {}: {}", id, parent, err);
                        }
                        editor.scene.fire(parent, Event::RevertDrop(id));
                        editor.scene.fire(id, Event::RevertDropped(parent));
                    }
                }
            }
        }
        log::debug!("drop: {} of {} elements accepted", accepted, self.positions.len());

        if accepted == 0 {
            self.discard_copies(editor);
            editor.scene.memento_mut().cancel();
        }
        self.finish(editor);
    }

    fn do_click(&mut self, editor: &mut Editor, element: ElementId, _point: Point, input: &PointerInput) {
        editor
            .selection
            .adjust_selection(&mut editor.scene, element, input.modifiers, true);
    }

    fn do_abort(&mut self, editor: &mut Editor, _element: ElementId) {
        if self.frozen {
            self.finish(editor);
            return;
        }
        self.revert_all(editor);
        editor.scene.memento_mut().cancel();
        self.finish(editor);
    }
}
