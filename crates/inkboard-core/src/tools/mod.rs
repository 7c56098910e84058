//! Tool system for the whiteboard.

use crate::element::{DrawingElement, ElementKind, FontStyle, FontWeight};
use crate::shapes::{DEFAULT_POLYGON_SIDES, DEFAULT_STAR_SPIKES};
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Smallest selectable font size.
pub const MIN_FONT_SIZE: f64 = 8.0;
/// Largest selectable font size.
pub const MAX_FONT_SIZE: f64 = 72.0;
/// Font family used when none is set.
pub const DEFAULT_FONT_FAMILY: &str = "Arial";
/// Initial width of a text box created with the text tool.
pub const TEXT_BOX_WIDTH: f64 = 100.0;

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    #[default]
    Select,
    Pan,
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

impl ToolKind {
    /// Element kind created by this tool, if it is a drawing tool.
    pub fn element_kind(self) -> Option<ElementKind> {
        match self {
            ToolKind::Select | ToolKind::Pan => None,
            ToolKind::Rectangle => Some(ElementKind::Rectangle),
            ToolKind::Circle => Some(ElementKind::Circle),
            ToolKind::Ellipse => Some(ElementKind::Ellipse),
            ToolKind::Line => Some(ElementKind::Line),
            ToolKind::Arrow => Some(ElementKind::Arrow),
            ToolKind::Triangle => Some(ElementKind::Triangle),
            ToolKind::Star => Some(ElementKind::Star),
            ToolKind::Polygon => Some(ElementKind::Polygon),
            ToolKind::Freedraw => Some(ElementKind::Freedraw),
            ToolKind::Text => Some(ElementKind::Text),
        }
    }

    /// Whether pointer-down with this tool creates an element.
    pub fn is_drawing(self) -> bool {
        self.element_kind().is_some()
    }
}

fn default_stroke_color() -> String {
    "#000000".to_string()
}

fn default_fill_color() -> String {
    "#ffffff".to_string()
}

fn default_stroke_width() -> f64 {
    2.0
}

fn default_font_size() -> f64 {
    16.0
}

fn default_font_family() -> String {
    DEFAULT_FONT_FAMILY.to_string()
}

fn default_star_spikes() -> usize {
    DEFAULT_STAR_SPIKES
}

fn default_polygon_sides() -> usize {
    DEFAULT_POLYGON_SIDES
}

/// Current tool and the style defaults applied to newly created elements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolSettings {
    #[serde(default)]
    pub tool: ToolKind,
    #[serde(default = "default_stroke_color")]
    pub stroke_color: String,
    #[serde(default = "default_fill_color")]
    pub fill_color: String,
    #[serde(default = "default_stroke_width")]
    pub stroke_width: f64,
    #[serde(default = "default_font_size")]
    font_size: f64,
    #[serde(default = "default_font_family")]
    font_family: String,
    #[serde(default)]
    pub font_weight: FontWeight,
    #[serde(default)]
    pub font_style: FontStyle,
    #[serde(default = "default_star_spikes")]
    pub star_spikes: usize,
    #[serde(default = "default_polygon_sides")]
    pub polygon_sides: usize,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            tool: ToolKind::default(),
            stroke_color: default_stroke_color(),
            fill_color: default_fill_color(),
            stroke_width: default_stroke_width(),
            font_size: default_font_size(),
            font_family: default_font_family(),
            font_weight: FontWeight::default(),
            font_style: FontStyle::default(),
            star_spikes: default_star_spikes(),
            polygon_sides: default_polygon_sides(),
        }
    }
}

impl ToolSettings {
    /// Create settings with default style.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse settings from JSON, normalizing font fields.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut settings: ToolSettings = serde_json::from_str(json)?;
        settings.set_font_size(settings.font_size);
        let family = std::mem::take(&mut settings.font_family);
        settings.set_font_family(&family);
        Ok(settings)
    }

    pub fn font_size(&self) -> f64 {
        self.font_size
    }

    /// Set the font size, clamped to [8, 72].
    pub fn set_font_size(&mut self, size: f64) {
        self.font_size = if size.is_finite() {
            size.clamp(MIN_FONT_SIZE, MAX_FONT_SIZE)
        } else {
            default_font_size()
        };
    }

    pub fn font_family(&self) -> &str {
        &self.font_family
    }

    /// Set the font family. Blank names fall back to Arial.
    pub fn set_font_family(&mut self, family: &str) {
        let family = family.trim();
        self.font_family = if family.is_empty() {
            DEFAULT_FONT_FAMILY.to_string()
        } else {
            family.to_string()
        };
    }

    pub fn toggle_bold(&mut self) {
        self.font_weight = self.font_weight.toggled();
    }

    pub fn toggle_italic(&mut self) {
        self.font_style = self.font_style.toggled();
    }

    /// Text style snapshot of the current font settings.
    pub fn text_style(&self) -> crate::canvas::TextStyle {
        crate::canvas::TextStyle {
            font_size: self.font_size,
            font_family: self.font_family.clone(),
            font_weight: self.font_weight,
            font_style: self.font_style,
            color: self.stroke_color.clone(),
        }
    }

    /// New element of `kind` anchored at `anchor`, styled with the current defaults.
    ///
    /// Freedraw strokes are seeded with the anchor; text starts empty in a
    /// [`TEXT_BOX_WIDTH`]-wide box one font size tall.
    pub fn create_element(&self, kind: ElementKind, anchor: Point) -> DrawingElement {
        let mut element = DrawingElement::new(kind, anchor.x, anchor.y)
            .with_colors(self.stroke_color.clone(), self.fill_color.clone())
            .with_stroke_width(self.stroke_width);
        element.font_size = Some(self.font_size);
        element.font_family = Some(self.font_family.clone());
        element.font_style = Some(self.font_style);
        element.font_weight = Some(self.font_weight);
        match kind {
            ElementKind::Freedraw => element.points = vec![anchor],
            ElementKind::Text => {
                element.text = Some(String::new());
                element.width = Some(TEXT_BOX_WIDTH);
                element.height = Some(self.font_size);
            }
            ElementKind::Star => element.spikes = Some(self.star_spikes),
            ElementKind::Polygon => element.sides = Some(self.polygon_sides),
            _ => {}
        }
        element
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = ToolSettings::default();
        assert_eq!(settings.tool, ToolKind::Select);
        assert_eq!(settings.stroke_color, "#000000");
        assert_eq!(settings.fill_color, "#ffffff");
        assert!((settings.stroke_width - 2.0).abs() < f64::EPSILON);
        assert!((settings.font_size() - 16.0).abs() < f64::EPSILON);
        assert_eq!(settings.font_family(), "Arial");
    }

    #[test]
    fn test_font_size_clamped() {
        let mut settings = ToolSettings::default();
        settings.set_font_size(200.0);
        assert!((settings.font_size() - MAX_FONT_SIZE).abs() < f64::EPSILON);
        settings.set_font_size(1.0);
        assert!((settings.font_size() - MIN_FONT_SIZE).abs() < f64::EPSILON);
    }

    #[test]
    fn test_blank_family_falls_back() {
        let mut settings = ToolSettings::default();
        settings.set_font_family("Georgia");
        assert_eq!(settings.font_family(), "Georgia");
        settings.set_font_family("   ");
        assert_eq!(settings.font_family(), "Arial");
    }

    #[test]
    fn test_toggles() {
        let mut settings = ToolSettings::default();
        settings.toggle_bold();
        settings.toggle_italic();
        assert_eq!(settings.font_weight, FontWeight::Bold);
        assert_eq!(settings.font_style, FontStyle::Italic);
        settings.toggle_bold();
        assert_eq!(settings.font_weight, FontWeight::Normal);
    }

    #[test]
    fn test_create_freedraw_seeds_points() {
        let settings = ToolSettings::default();
        let element = settings.create_element(ElementKind::Freedraw, Point::new(3.0, 4.0));
        assert_eq!(element.points, vec![Point::new(3.0, 4.0)]);
        assert!(element.width.is_none());
        assert!((element.rotation - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_create_text_box() {
        let mut settings = ToolSettings::default();
        settings.set_font_size(24.0);
        let element = settings.create_element(ElementKind::Text, Point::ZERO);
        assert_eq!(element.text.as_deref(), Some(""));
        assert_eq!(element.width, Some(TEXT_BOX_WIDTH));
        assert_eq!(element.height, Some(24.0));
    }

    #[test]
    fn test_create_records_point_counts() {
        let mut settings = ToolSettings::default();
        settings.star_spikes = 7;
        settings.polygon_sides = 8;
        let star = settings.create_element(ElementKind::Star, Point::ZERO);
        let polygon = settings.create_element(ElementKind::Polygon, Point::ZERO);
        let rect = settings.create_element(ElementKind::Rectangle, Point::ZERO);
        assert_eq!(star.spikes, Some(7));
        assert_eq!(polygon.sides, Some(8));
        assert_eq!((rect.spikes, rect.sides), (None, None));
    }

    #[test]
    fn test_settings_from_json() {
        let settings = ToolSettings::from_json(r#"{"tool":"star","fontSize":500,"fontFamily":""}"#).unwrap();
        assert_eq!(settings.tool, ToolKind::Star);
        assert!((settings.font_size() - MAX_FONT_SIZE).abs() < f64::EPSILON);
        assert_eq!(settings.font_family(), "Arial");
        assert_eq!(settings.stroke_color, "#000000");
    }

    #[test]
    fn test_tool_element_kinds() {
        assert_eq!(ToolKind::Pan.element_kind(), None);
        assert_eq!(ToolKind::Freedraw.element_kind(), Some(ElementKind::Freedraw));
        assert!(ToolKind::Text.is_drawing());
        assert!(!ToolKind::Select.is_drawing());
    }
}
