//! Drawing element model.
//!
//! Elements are flat records rather than a type hierarchy: every element carries the same
//! field set and `kind` decides which of them geometry and rendering look at. The serialized
//! form uses camelCase keys so that saved boards stay readable by other tools.

use kurbo::Point;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for elements.
pub type ElementId = String;

/// Generate a fresh process-unique element id.
pub fn generate_id() -> ElementId {
    Uuid::new_v4().to_string()
}

/// Shape type of a drawing element. Immutable after creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Rectangle,
    Circle,
    Ellipse,
    Line,
    Arrow,
    Triangle,
    Star,
    Polygon,
    Freedraw,
    Text,
}

impl ElementKind {
    /// Whether the element is drawn as a closed, fillable outline.
    pub fn is_closed(self) -> bool {
        matches!(
            self,
            ElementKind::Rectangle
                | ElementKind::Circle
                | ElementKind::Ellipse
                | ElementKind::Triangle
                | ElementKind::Star
                | ElementKind::Polygon
        )
    }
}

/// Font slant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
}

impl FontStyle {
    pub fn toggled(self) -> Self {
        match self {
            FontStyle::Normal => FontStyle::Italic,
            FontStyle::Italic => FontStyle::Normal,
        }
    }
}

/// Font weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    #[default]
    Normal,
    Bold,
}

impl FontWeight {
    pub fn toggled(self) -> Self {
        match self {
            FontWeight::Normal => FontWeight::Bold,
            FontWeight::Bold => FontWeight::Normal,
        }
    }
}

/// A single shape on the board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawingElement {
    pub id: ElementId,
    #[serde(rename = "type")]
    pub kind: ElementKind,
    /// Anchor: top-left for box shapes, start point for line, arrow and freedraw.
    pub x: f64,
    pub y: f64,
    /// Signed extents. Negative values mean the shape was drawn leftward or upward.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    /// Stroke samples, only populated for freedraw.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub points: Vec<Point>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_style: Option<FontStyle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<FontWeight>,
    pub stroke_color: String,
    pub fill_color: String,
    pub stroke_width: f64,
    /// Rotation in degrees about the box center.
    #[serde(default)]
    pub rotation: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z_index: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    #[serde(default)]
    pub is_selected: bool,
    /// Point count of a star.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spikes: Option<usize>,
    /// Side count of a polygon.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sides: Option<usize>,
}

/// Fallback font size for text-bearing elements without one.
pub const DEFAULT_FONT_SIZE: f64 = 16.0;

impl DrawingElement {
    /// Create a new element with a fresh id at the given anchor.
    pub fn new(kind: ElementKind, x: f64, y: f64) -> Self {
        Self {
            id: generate_id(),
            kind,
            x,
            y,
            width: None,
            height: None,
            points: Vec::new(),
            text: None,
            font_size: None,
            font_family: None,
            font_style: None,
            font_weight: None,
            stroke_color: "#000000".to_string(),
            fill_color: "#ffffff".to_string(),
            stroke_width: 2.0,
            rotation: 0.0,
            z_index: None,
            group_id: None,
            is_selected: false,
            spikes: None,
            sides: None,
        }
    }

    /// Builder: set width and height.
    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    /// Builder: set stroke and fill colors.
    pub fn with_colors(mut self, stroke: impl Into<String>, fill: impl Into<String>) -> Self {
        self.stroke_color = stroke.into();
        self.fill_color = fill.into();
        self
    }

    /// Builder: set stroke width.
    pub fn with_stroke_width(mut self, width: f64) -> Self {
        self.stroke_width = width;
        self
    }

    /// Builder: attach a text label.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Builder: set the font size.
    pub fn with_font_size(mut self, size: f64) -> Self {
        self.font_size = Some(size);
        self
    }

    pub fn width_or_zero(&self) -> f64 {
        self.width.unwrap_or(0.0)
    }

    pub fn height_or_zero(&self) -> f64 {
        self.height.unwrap_or(0.0)
    }

    /// Font size, falling back to the default.
    pub fn font_size_or_default(&self) -> f64 {
        self.font_size.unwrap_or(DEFAULT_FONT_SIZE)
    }

    /// Whether the element carries a label (text type or annotated shape).
    pub fn has_text(&self) -> bool {
        self.text.is_some()
    }

    /// Z-index used for ordering; unset sorts as 0.
    pub fn z(&self) -> i64 {
        self.z_index.unwrap_or(0)
    }

    /// Apply a partial update.
    pub fn apply(&mut self, patch: &ElementPatch) {
        if let Some(x) = patch.x {
            self.x = x;
        }
        if let Some(y) = patch.y {
            self.y = y;
        }
        if let Some(width) = patch.width {
            self.width = Some(width);
        }
        if let Some(height) = patch.height {
            self.height = Some(height);
        }
        if let Some(points) = &patch.points {
            self.points = points.clone();
        }
        if let Some(text) = &patch.text {
            self.text = Some(text.clone());
        }
        if let Some(size) = patch.font_size {
            self.font_size = Some(size);
        }
        if let Some(family) = &patch.font_family {
            self.font_family = Some(family.clone());
        }
        if let Some(style) = patch.font_style {
            self.font_style = Some(style);
        }
        if let Some(weight) = patch.font_weight {
            self.font_weight = Some(weight);
        }
        if let Some(color) = &patch.stroke_color {
            self.stroke_color = color.clone();
        }
        if let Some(color) = &patch.fill_color {
            self.fill_color = color.clone();
        }
        if let Some(width) = patch.stroke_width {
            self.stroke_width = width;
        }
        if let Some(rotation) = patch.rotation {
            self.rotation = rotation;
        }
        if let Some(z) = patch.z_index {
            self.z_index = Some(z);
        }
        if let Some(group) = &patch.group_id {
            self.group_id = group.clone();
        }
        if let Some(selected) = patch.is_selected {
            self.is_selected = selected;
        }
    }
}

/// Partial field set merged into an element by `ElementStore::update`.
///
/// `None` leaves a field untouched. `group_id` is doubly optional so a patch can clear it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ElementPatch {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub points: Option<Vec<Point>>,
    pub text: Option<String>,
    pub font_size: Option<f64>,
    pub font_family: Option<String>,
    pub font_style: Option<FontStyle>,
    pub font_weight: Option<FontWeight>,
    pub stroke_color: Option<String>,
    pub fill_color: Option<String>,
    pub stroke_width: Option<f64>,
    pub rotation: Option<f64>,
    pub z_index: Option<i64>,
    pub group_id: Option<Option<String>>,
    pub is_selected: Option<bool>,
}

impl ElementPatch {
    /// Patch that moves the anchor.
    pub fn position(x: f64, y: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Default::default()
        }
    }

    /// Patch that replaces anchor and extents.
    pub fn frame(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            width: Some(width),
            height: Some(height),
            ..Default::default()
        }
    }
}
