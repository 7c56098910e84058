//! Geometry kernel: element boxes, hit-testing and rotation.
//!
//! All functions are pure. Boxes keep their sign: a rectangle drawn up and to the left has a
//! negative width, and tests compare against the min/max of its edges instead of assuming
//! the anchor is the top-left corner.

use crate::element::{DrawingElement, ElementKind};
use crate::text::{FontSpec, TextMeasure};
use kurbo::{Affine, Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// Default hit radius around freedraw samples, in plane units.
pub const FREEDRAW_TOLERANCE: f64 = 10.0;

/// Raw element box. Width and height may be negative.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn min_x(&self) -> f64 {
        self.x.min(self.x + self.width)
    }

    pub fn max_x(&self) -> f64 {
        self.x.max(self.x + self.width)
    }

    pub fn min_y(&self) -> f64 {
        self.y.min(self.y + self.height)
    }

    pub fn max_y(&self) -> f64 {
        self.y.max(self.y + self.height)
    }

    /// Center of the box, independent of sign.
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Normalized axis-aligned rectangle.
    pub fn to_rect(&self) -> Rect {
        Rect::new(self.min_x(), self.min_y(), self.max_x(), self.max_y())
    }

    /// Inclusive containment test on the normalized box.
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.min_x()
            && point.x <= self.max_x()
            && point.y >= self.min_y()
            && point.y <= self.max_y()
    }

    pub fn translate(&self, delta: Vec2) -> Self {
        Self::new(self.x + delta.x, self.y + delta.y, self.width, self.height)
    }
}

/// Box of an element.
///
/// Text elements fall back to the measured label width and one font size of height; all
/// other kinds treat missing extents as zero.
pub fn bounds_of(element: &DrawingElement, measure: &dyn TextMeasure) -> Bounds {
    if element.kind == ElementKind::Text {
        let font = FontSpec::of(element);
        let width = element.width.unwrap_or_else(|| {
            measure.text_width(element.text.as_deref().unwrap_or_default(), &font)
        });
        let height = element.height.unwrap_or(font.size);
        return Bounds::new(element.x, element.y, width, height);
    }
    Bounds::new(
        element.x,
        element.y,
        element.width_or_zero(),
        element.height_or_zero(),
    )
}

/// Whether a plane point hits an element. Rotation is ignored: the unrotated box is tested.
pub fn point_in_element(
    point: Point,
    element: &DrawingElement,
    measure: &dyn TextMeasure,
    tolerance: f64,
) -> bool {
    match element.kind {
        ElementKind::Freedraw => element
            .points
            .iter()
            .any(|sample| sample.distance(point) <= tolerance),
        _ => bounds_of(element, measure).contains(point),
    }
}

/// Rotation about the element's box center. Negative degrees rotate counter-clockwise.
pub fn rotation_transform(element: &DrawingElement) -> Affine {
    if element.rotation == 0.0 {
        return Affine::IDENTITY;
    }
    let center = Point::new(
        element.x + element.width_or_zero() / 2.0,
        element.y + element.height_or_zero() / 2.0,
    );
    Affine::rotate_about(element.rotation.to_radians(), center)
}

/// Combined horizontal and vertical extent of several elements, using `x..x+width` and
/// `y..y+height` of each. Returns `None` for an empty input.
pub fn combined_extent<'a>(elements: impl IntoIterator<Item = &'a DrawingElement>) -> Option<Rect> {
    let mut iter = elements.into_iter().peekable();
    iter.peek()?;
    let mut min_x = f64::INFINITY;
    let mut min_y = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for element in iter {
        let x2 = element.x + element.width_or_zero();
        let y2 = element.y + element.height_or_zero();
        min_x = min_x.min(element.x).min(x2);
        max_x = max_x.max(element.x).max(x2);
        min_y = min_y.min(element.y).min(y2);
        max_y = max_y.max(element.y).max(y2);
    }
    Some(Rect::new(min_x, min_y, max_x, max_y))
}
