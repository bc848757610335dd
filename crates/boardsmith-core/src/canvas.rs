//! Canvas layers, viewport and the glass drag-preview layer.

use crate::element::{Element, ElementId, Selectability};
use crate::event::Event;
use crate::scene::Scene;
use crate::settings::EditorSettings;
use kurbo::{Affine, Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Canvas layers, bottom to top.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Layer {
    /// The board itself. Only elements on this layer can receive drops.
    Base,
    /// Tool palettes and handles.
    Tools,
    /// Transient drag previews.
    Glass,
    /// Dialogs and popups.
    Modals,
}

impl Layer {
    pub const ALL: [Layer; 4] = [Layer::Base, Layer::Tools, Layer::Glass, Layer::Modals];
}

/// Viewport manages the page-to-canvas transform.
///
/// It handles panning (translation) and zooming (scaling) operations,
/// converting between page coordinates and canvas coordinates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Viewport {
    /// Current translation offset (pan)
    pub offset: Vec2,
    /// Current zoom level
    pub zoom: f64,
    /// Minimum allowed zoom level
    pub min_zoom: f64,
    /// Maximum allowed zoom level
    pub max_zoom: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            zoom: 1.0,
            min_zoom: 0.1,
            max_zoom: 10.0,
        }
    }
}

impl Viewport {
    pub fn from_settings(settings: &EditorSettings) -> Self {
        Self {
            min_zoom: settings.min_zoom,
            max_zoom: settings.max_zoom,
            ..Self::default()
        }
    }

    /// Transform from canvas coordinates to page coordinates.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.offset) * Affine::scale(self.zoom)
    }

    /// Transform from page coordinates to canvas coordinates.
    pub fn inverse_transform(&self) -> Affine {
        Affine::scale(1.0 / self.zoom) * Affine::translate(-self.offset)
    }

    pub fn page_to_canvas(&self, page: Point) -> Point {
        self.inverse_transform() * page
    }

    pub fn canvas_to_page(&self, canvas: Point) -> Point {
        self.transform() * canvas
    }

    /// Pan by a delta in page coordinates.
    pub fn pan(&mut self, delta: Vec2) {
        self.offset += delta;
    }

    /// Zoom, keeping the given page point fixed. Returns false when the zoom is clamped
    /// to its current value.
    pub fn zoom_at(&mut self, page: Point, factor: f64) -> bool {
        let new_zoom = (self.zoom * factor).clamp(self.min_zoom, self.max_zoom);
        if (new_zoom - self.zoom).abs() < f64::EPSILON {
            return false;
        }
        let anchor = self.page_to_canvas(page);
        self.zoom = new_zoom;
        self.offset += page - self.canvas_to_page(anchor);
        true
    }
}

/// Layer roots, viewport and transient preview state of one editor.
#[derive(Debug, Clone)]
pub struct Canvas {
    roots: [ElementId; 4],
    pub viewport: Viewport,
    glass_items: Vec<ElementId>,
    glass_visible: bool,
    rubber_band: Option<Rect>,
}

impl Canvas {
    /// Create the four layer roots in `scene`.
    pub fn new(scene: &mut Scene, settings: &EditorSettings) -> Self {
        let roots = Layer::ALL.map(|layer| {
            scene.insert(
                Element::container(format!("{layer:?}").to_lowercase(), Rect::ZERO)
                    .selectable(Selectability::None),
            )
        });
        Self {
            roots,
            viewport: Viewport::from_settings(settings),
            glass_items: Vec::new(),
            glass_visible: true,
            rubber_band: None,
        }
    }

    pub fn root(&self, layer: Layer) -> ElementId {
        match layer {
            Layer::Base => self.roots[0],
            Layer::Tools => self.roots[1],
            Layer::Glass => self.roots[2],
            Layer::Modals => self.roots[3],
        }
    }

    pub fn base_root(&self) -> ElementId {
        self.root(Layer::Base)
    }

    /// Layer an element currently shows on. Unattached elements have none.
    pub fn layer_of(&self, scene: &Scene, element: ElementId) -> Option<Layer> {
        if scene.get(element).is_some_and(Element::is_on_glass) {
            return Some(Layer::Glass);
        }
        let root = scene.root_of(element);
        Layer::ALL.into_iter().find(|&layer| self.root(layer) == root)
    }

    // --- coordinates ---

    pub fn canvas_x(&self, page: Point) -> f64 {
        self.canvas_point(page).x
    }

    pub fn canvas_y(&self, page: Point) -> f64 {
        self.canvas_point(page).y
    }

    /// Map a page point to canvas coordinates.
    pub fn canvas_point(&self, page: Point) -> Point {
        self.viewport.page_to_canvas(page)
    }

    /// Zoom around a page point and fire `zoom` on the base layer root.
    pub fn zoom_at(&mut self, scene: &mut Scene, page: Point, factor: f64) {
        if self.viewport.zoom_at(page, factor) {
            scene.fire(self.base_root(), Event::Zoom(self.viewport.zoom));
        }
    }

    /// Topmost element under a canvas point, searching modals, then tools, then the base.
    ///
    /// Layer roots themselves and glass previews are never returned.
    pub fn get_element_from_point(&self, scene: &Scene, point: Point, exclude: &HashSet<ElementId>) -> Option<ElementId> {
        [Layer::Modals, Layer::Tools, Layer::Base]
            .into_iter()
            .flat_map(|layer| scene.children(self.root(layer)).iter().rev())
            .find_map(|&child| scene.element_at(point, child, exclude))
    }

    // --- glass ---

    pub fn prepare_glass_for_drag_start(&mut self, scene: &mut Scene) {
        self.clear_glass(scene);
        self.glass_visible = true;
    }

    pub fn prepare_glass_for_drag_move(&mut self) {
        self.glass_visible = true;
    }

    /// Preview an element on the glass at its current canvas position.
    pub fn put_element_on_glass(&mut self, scene: &mut Scene, element: ElementId) {
        let global = scene.global_matrix(element);
        if let Some(e) = scene.get_mut(element) {
            e.glass = Some(global);
            if !self.glass_items.contains(&element) {
                self.glass_items.push(element);
            }
        }
    }

    /// Translate a glass preview by a canvas delta.
    pub fn move_element_on_glass(&mut self, scene: &mut Scene, element: ElementId, delta: Vec2) {
        if let Some(glass) = scene.get_mut(element).and_then(|e| e.glass.as_mut()) {
            *glass = Affine::translate(delta) * *glass;
        }
    }

    pub fn take_element_off_glass(&mut self, scene: &mut Scene, element: ElementId) {
        if let Some(e) = scene.get_mut(element) {
            e.glass = None;
        }
        self.glass_items.retain(|&id| id != element);
    }

    /// Take every preview off the glass and drop the rubber band.
    pub fn clear_glass(&mut self, scene: &mut Scene) {
        for element in std::mem::take(&mut self.glass_items) {
            if let Some(e) = scene.get_mut(element) {
                e.glass = None;
            }
        }
        self.rubber_band = None;
    }

    pub fn glass_items(&self) -> &[ElementId] {
        &self.glass_items
    }

    pub fn hide_glass(&mut self) {
        self.glass_visible = false;
    }

    pub fn show_glass(&mut self) {
        self.glass_visible = true;
    }

    pub fn is_glass_visible(&self) -> bool {
        self.glass_visible
    }

    pub fn set_rubber_band(&mut self, rect: Option<Rect>) {
        self.rubber_band = rect;
    }

    pub fn rubber_band(&self) -> Option<Rect> {
        self.rubber_band
    }
}
