//! Shape path builders.
//!
//! Every builder is a pure function from an element box to a `BezPath` in plane
//! coordinates. Rotation is applied separately by the caller.

mod arrow;
mod freehand;
mod polygon;

pub use arrow::{ARROW_HEAD_ANGLE, ARROW_HEAD_LENGTH, arrow_head, arrow_path};
pub use freehand::freedraw_path;
pub use polygon::{polygon_vertices, star_vertices, triangle_vertices};

use crate::element::{DrawingElement, ElementKind};
use crate::geometry::Bounds;
use kurbo::{BezPath, Ellipse, Point, Shape, Vec2};

/// Curve flattening tolerance used when converting circles and ellipses to paths.
const CURVE_TOLERANCE: f64 = 0.1;

pub const DEFAULT_STAR_SPIKES: usize = 5;
pub const DEFAULT_POLYGON_SIDES: usize = 6;

/// Drawable outline of an element.
#[derive(Debug, Clone)]
pub struct ShapeOutline {
    pub path: BezPath,
    /// Closed outlines are filled before stroking.
    pub closed: bool,
}

/// Outline of a non-text element. Text has no outline and yields `None`, as does a
/// freedraw stroke without samples.
pub fn outline_of(element: &DrawingElement) -> Option<ShapeOutline> {
    let bounds = Bounds::new(
        element.x,
        element.y,
        element.width_or_zero(),
        element.height_or_zero(),
    );
    let path = match element.kind {
        ElementKind::Rectangle => rectangle_path(&bounds),
        ElementKind::Circle => circle_path(&bounds),
        ElementKind::Ellipse => ellipse_path(&bounds),
        ElementKind::Line => line_path(&bounds),
        ElementKind::Arrow => arrow_path(&bounds),
        ElementKind::Triangle => closed_path(&triangle_vertices(&bounds)),
        ElementKind::Star => closed_path(&star_vertices(
            &bounds,
            element.spikes.unwrap_or(DEFAULT_STAR_SPIKES),
        )),
        ElementKind::Polygon => closed_path(&polygon_vertices(
            &bounds,
            element.sides.unwrap_or(DEFAULT_POLYGON_SIDES),
        )),
        ElementKind::Freedraw => freedraw_path(&element.points)?,
        ElementKind::Text => return None,
    };
    Some(ShapeOutline {
        path,
        closed: element.kind.is_closed(),
    })
}

/// Rectangle on the raw box, keeping the drawing direction.
pub fn rectangle_path(bounds: &Bounds) -> BezPath {
    let Bounds {
        x,
        y,
        width,
        height,
    } = *bounds;
    closed_path(&[
        Point::new(x, y),
        Point::new(x + width, y),
        Point::new(x + width, y + height),
        Point::new(x, y + height),
    ])
}

/// Circle inscribed in the box width, centered on the box.
pub fn circle_path(bounds: &Bounds) -> BezPath {
    let radius = bounds.width.abs() / 2.0;
    kurbo::Circle::new(bounds.center(), radius).to_path(CURVE_TOLERANCE)
}

pub fn ellipse_path(bounds: &Bounds) -> BezPath {
    let radii = Vec2::new(bounds.width.abs() / 2.0, bounds.height.abs() / 2.0);
    Ellipse::new(bounds.center(), radii, 0.0).to_path(CURVE_TOLERANCE)
}

/// Straight segment from the anchor to the opposite corner.
pub fn line_path(bounds: &Bounds) -> BezPath {
    let mut path = BezPath::new();
    path.move_to(Point::new(bounds.x, bounds.y));
    path.line_to(Point::new(bounds.x + bounds.width, bounds.y + bounds.height));
    path
}

/// Closed polyline through the given vertices.
pub fn closed_path(vertices: &[Point]) -> BezPath {
    let mut path = BezPath::new();
    let Some((first, rest)) = vertices.split_first() else {
        return path;
    };
    path.move_to(*first);
    for vertex in rest {
        path.line_to(*vertex);
    }
    path.close_path();
    path
}
