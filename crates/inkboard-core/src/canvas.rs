//! Element store and persisted canvas state.
//!
//! The store owns the live element list plus view state. Every mutating operation builds
//! the new element list and swaps it in as a whole, then notifies subscribers
//! synchronously before returning.

use crate::camera::{Camera, clamp_zoom};
use crate::element::{DrawingElement, ElementId, ElementPatch, FontStyle, FontWeight};
use crate::error::{CanvasError, CanvasResult};
use crate::geometry::{FREEDRAW_TOLERANCE, point_in_element};
use crate::snap::{GRID_SIZE, GridSettings, clamp_grid_size};
use crate::text::TextMeasure;
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

fn default_zoom() -> f64 {
    1.0
}

fn default_grid_size() -> f64 {
    GRID_SIZE
}

/// Snapshot of the whole board: the unit of undo/redo, import/export and sync.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasState {
    pub elements: Vec<DrawingElement>,
    #[serde(default = "default_zoom")]
    pub zoom: f64,
    #[serde(default)]
    pub pan_x: f64,
    #[serde(default)]
    pub pan_y: f64,
    #[serde(default)]
    pub snap_to_grid: bool,
    #[serde(default = "default_grid_size")]
    pub grid_size: f64,
}

impl Default for CanvasState {
    fn default() -> Self {
        Self {
            elements: Vec::new(),
            zoom: 1.0,
            pan_x: 0.0,
            pan_y: 0.0,
            snap_to_grid: false,
            grid_size: GRID_SIZE,
        }
    }
}

impl CanvasState {
    /// Parse and validate a JSON snapshot.
    pub fn from_json(json: &str) -> CanvasResult<Self> {
        let state: CanvasState = serde_json::from_str(json)?;
        state.validate()?;
        Ok(state)
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> CanvasResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Structural checks serde cannot express.
    pub fn validate(&self) -> CanvasResult<()> {
        let mut seen = HashSet::new();
        for element in &self.elements {
            if element.id.is_empty() {
                return Err(CanvasError::InvalidState("element with empty id".to_string()));
            }
            if !seen.insert(element.id.as_str()) {
                return Err(CanvasError::InvalidState(format!(
                    "duplicate element id {}",
                    element.id
                )));
            }
        }
        if !self.pan_x.is_finite() || !self.pan_y.is_finite() {
            return Err(CanvasError::InvalidState("non-finite pan offset".to_string()));
        }
        Ok(())
    }
}

/// What part of the store a notification concerns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// Element list changed.
    Elements,
    /// Zoom, pan or grid changed.
    View,
    /// Whole state replaced (undo, redo, import, clear, remote snapshot).
    Replaced,
}

/// Who caused a change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeOrigin {
    Local,
    /// Applied from another instance; must not be re-broadcast.
    Remote,
}

/// Notification delivered to store subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreChange {
    pub kind: ChangeKind,
    pub origin: ChangeOrigin,
}

/// Handle returned by [`ElementStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Observer = Box<dyn FnMut(&ElementStore, &StoreChange)>;

/// Text style applied to selected text-bearing elements.
#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub font_size: f64,
    pub font_family: String,
    pub font_weight: FontWeight,
    pub font_style: FontStyle,
    pub color: String,
}

/// Live drawing state.
pub struct ElementStore {
    elements: Vec<DrawingElement>,
    camera: Camera,
    grid: GridSettings,
    observers: Vec<(SubscriptionId, Observer)>,
    next_subscription: u64,
}

impl fmt::Debug for ElementStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementStore")
            .field("elements", &self.elements.len())
            .field("camera", &self.camera)
            .field("grid", &self.grid)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl Default for ElementStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ElementStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            elements: Vec::new(),
            camera: Camera::default(),
            grid: GridSettings::default(),
            observers: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Register an observer called after every mutation.
    pub fn subscribe(&mut self, observer: impl FnMut(&ElementStore, &StoreChange) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Remove an observer. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(sub, _)| *sub != id);
        self.observers.len() != before
    }

    fn notify(&mut self, kind: ChangeKind, origin: ChangeOrigin) {
        let change = StoreChange { kind, origin };
        let mut observers = std::mem::take(&mut self.observers);
        for (_, observer) in observers.iter_mut() {
            observer(self, &change);
        }
        self.observers = observers;
    }

    /// Swap in a new element list and notify.
    pub(crate) fn replace_elements(&mut self, elements: Vec<DrawingElement>) {
        self.elements = elements;
        self.notify(ChangeKind::Elements, ChangeOrigin::Local);
    }

    /// Elements in insertion order.
    pub fn elements(&self) -> &[DrawingElement] {
        &self.elements
    }

    /// Elements in ascending z order. Ties keep insertion order.
    pub fn ordered(&self) -> Vec<&DrawingElement> {
        let mut ordered: Vec<&DrawingElement> = self.elements.iter().collect();
        ordered.sort_by_key(|element| element.z());
        ordered
    }

    pub fn get(&self, id: &str) -> Option<&DrawingElement> {
        self.elements.iter().find(|element| element.id == id)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Selected elements in insertion order.
    pub fn selected(&self) -> impl Iterator<Item = &DrawingElement> {
        self.elements.iter().filter(|element| element.is_selected)
    }

    pub fn selected_count(&self) -> usize {
        self.selected().count()
    }

    /// First selected element in insertion order; the one that carries resize handles.
    pub fn primary_selection(&self) -> Option<&DrawingElement> {
        self.selected().next()
    }

    pub fn max_z(&self) -> Option<i64> {
        self.elements.iter().map(DrawingElement::z).max()
    }

    /// Topmost element under a plane point.
    pub fn topmost_at(&self, point: Point, measure: &dyn TextMeasure) -> Option<&DrawingElement> {
        self.topmost_at_with_tolerance(point, measure, FREEDRAW_TOLERANCE)
    }

    pub fn topmost_at_with_tolerance(
        &self,
        point: Point,
        measure: &dyn TextMeasure,
        tolerance: f64,
    ) -> Option<&DrawingElement> {
        self.ordered()
            .into_iter()
            .rev()
            .find(|element| point_in_element(point, element, measure, tolerance))
    }

    /// Append an element, assigning the next z-index if it has none.
    pub fn add(&mut self, mut element: DrawingElement) -> ElementId {
        if element.z_index.is_none() {
            element.z_index = Some(self.max_z().map_or(0, |z| z + 1));
        }
        let id = element.id.clone();
        log::debug!("Adding {:?} element {}", element.kind, id);
        let mut elements = self.elements.clone();
        elements.push(element);
        self.replace_elements(elements);
        id
    }

    /// Append several elements above the current maximum z-index, notifying once.
    pub fn add_many(&mut self, new_elements: Vec<DrawingElement>) -> Vec<ElementId> {
        if new_elements.is_empty() {
            return Vec::new();
        }
        let base = self.max_z().map_or(0, |z| z + 1);
        let mut elements = self.elements.clone();
        let mut ids = Vec::with_capacity(new_elements.len());
        for (offset, mut element) in new_elements.into_iter().enumerate() {
            element.z_index = Some(base + offset as i64);
            ids.push(element.id.clone());
            elements.push(element);
        }
        self.replace_elements(elements);
        ids
    }

    /// Merge a patch into one element. No-op if the id is absent.
    pub fn update(&mut self, id: &str, patch: &ElementPatch) -> bool {
        if self.get(id).is_none() {
            return false;
        }
        let elements = self
            .elements
            .iter()
            .map(|element| {
                let mut element = element.clone();
                if element.id == id {
                    element.apply(patch);
                }
                element
            })
            .collect();
        self.replace_elements(elements);
        true
    }

    /// Unconditional bulk replace.
    pub fn set_all(&mut self, elements: Vec<DrawingElement>) {
        self.replace_elements(elements);
    }

    /// Remove one element.
    pub fn delete(&mut self, id: &str) -> bool {
        if self.get(id).is_none() {
            return false;
        }
        let elements = self
            .elements
            .iter()
            .filter(|element| element.id != id)
            .cloned()
            .collect();
        self.replace_elements(elements);
        true
    }

    /// Select an element, optionally keeping the current selection.
    pub fn select(&mut self, id: &str, additive: bool) {
        if self.get(id).is_none() {
            return;
        }
        let elements = self
            .elements
            .iter()
            .map(|element| {
                let mut element = element.clone();
                element.is_selected = if element.id == id {
                    true
                } else {
                    additive && element.is_selected
                };
                element
            })
            .collect();
        self.replace_elements(elements);
    }

    pub fn clear_selection(&mut self) {
        let elements = self
            .elements
            .iter()
            .map(|element| {
                let mut element = element.clone();
                element.is_selected = false;
                element
            })
            .collect();
        self.replace_elements(elements);
    }

    /// Remove every selected element and re-normalize z-indices. Returns the number removed.
    pub fn delete_selected(&mut self) -> usize {
        let removed = self.selected_count();
        if removed == 0 {
            return 0;
        }
        let kept: Vec<DrawingElement> = self
            .elements
            .iter()
            .filter(|element| !element.is_selected)
            .cloned()
            .collect();
        self.replace_elements(normalize_z(kept));
        removed
    }

    /// Apply a text style to every selected element that carries text.
    pub fn update_selected_text_style(&mut self, style: &TextStyle) -> bool {
        if !self.selected().any(DrawingElement::has_text) {
            return false;
        }
        let elements = self
            .elements
            .iter()
            .map(|element| {
                let mut element = element.clone();
                if element.is_selected && element.has_text() {
                    element.apply(&ElementPatch {
                        font_size: Some(style.font_size),
                        font_family: Some(style.font_family.clone()),
                        font_weight: Some(style.font_weight),
                        font_style: Some(style.font_style),
                        stroke_color: Some(style.color.clone()),
                        ..Default::default()
                    });
                }
                element
            })
            .collect();
        self.replace_elements(elements);
        true
    }

    /// Set width and/or height of every selected element.
    pub fn update_selected_dimensions(&mut self, width: Option<f64>, height: Option<f64>) -> bool {
        if self.selected_count() == 0 || (width.is_none() && height.is_none()) {
            return false;
        }
        let patch = ElementPatch {
            width,
            height,
            ..Default::default()
        };
        let elements = self
            .elements
            .iter()
            .map(|element| {
                let mut element = element.clone();
                if element.is_selected {
                    element.apply(&patch);
                }
                element
            })
            .collect();
        self.replace_elements(elements);
        true
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn zoom(&self) -> f64 {
        self.camera.zoom
    }

    pub fn pan(&self) -> Vec2 {
        self.camera.offset
    }

    pub fn grid(&self) -> &GridSettings {
        &self.grid
    }

    pub fn snap_to_grid(&self) -> bool {
        self.grid.snap_to_grid
    }

    pub fn grid_size(&self) -> f64 {
        self.grid.grid_size
    }

    /// Set zoom, clamped to [0.1, 5].
    pub fn set_zoom(&mut self, zoom: f64) {
        self.camera.set_zoom(zoom);
        self.notify(ChangeKind::View, ChangeOrigin::Local);
    }

    pub fn set_pan(&mut self, pan: Vec2) {
        self.camera.offset = pan;
        self.notify(ChangeKind::View, ChangeOrigin::Local);
    }

    pub fn set_snap_to_grid(&mut self, enabled: bool) {
        self.grid.snap_to_grid = enabled;
        self.notify(ChangeKind::View, ChangeOrigin::Local);
    }

    /// Set grid size, clamped to [5, 200].
    pub fn set_grid_size(&mut self, size: f64) {
        self.grid.set_grid_size(size);
        self.notify(ChangeKind::View, ChangeOrigin::Local);
    }

    /// Reset zoom and pan.
    pub fn reset_view(&mut self) {
        self.camera.reset();
        self.notify(ChangeKind::View, ChangeOrigin::Local);
    }

    /// Remove all elements and reset view and grid settings.
    pub fn clear(&mut self) {
        self.elements = Vec::new();
        self.camera = Camera::default();
        self.grid = GridSettings::default();
        self.notify(ChangeKind::Replaced, ChangeOrigin::Local);
    }

    /// Deep copy of the full state.
    pub fn snapshot(&self) -> CanvasState {
        CanvasState {
            elements: self.elements.clone(),
            zoom: self.camera.zoom,
            pan_x: self.camera.offset.x,
            pan_y: self.camera.offset.y,
            snap_to_grid: self.grid.snap_to_grid,
            grid_size: self.grid.grid_size,
        }
    }

    /// Replace the full state. Zoom and grid size are clamped.
    pub fn restore(&mut self, state: CanvasState) {
        self.restore_with_origin(state, ChangeOrigin::Local);
    }

    /// Replace the full state with a snapshot received from another instance.
    pub fn apply_remote(&mut self, state: CanvasState) {
        self.restore_with_origin(state, ChangeOrigin::Remote);
    }

    fn restore_with_origin(&mut self, state: CanvasState, origin: ChangeOrigin) {
        self.elements = state.elements;
        self.camera = Camera {
            offset: Vec2::new(state.pan_x, state.pan_y),
            zoom: clamp_zoom(state.zoom),
        };
        self.grid = GridSettings {
            snap_to_grid: state.snap_to_grid,
            grid_size: clamp_grid_size(state.grid_size),
        };
        self.notify(ChangeKind::Replaced, origin);
    }

    /// Serialize the current state to pretty JSON.
    pub fn to_json(&self) -> CanvasResult<String> {
        self.snapshot().to_json()
    }
}

/// Reassign dense z-indices `0..n` following the current draw order.
pub(crate) fn normalize_z(mut elements: Vec<DrawingElement>) -> Vec<DrawingElement> {
    elements.sort_by_key(DrawingElement::z);
    for (index, element) in elements.iter_mut().enumerate() {
        element.z_index = Some(index as i64);
    }
    elements
}
