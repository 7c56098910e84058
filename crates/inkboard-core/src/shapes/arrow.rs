//! Arrow geometry.

use crate::geometry::Bounds;
use kurbo::{BezPath, Point};
use std::f64::consts::PI;

/// Length of each arrowhead stroke.
pub const ARROW_HEAD_LENGTH: f64 = 15.0;
/// Angle between the shaft and each arrowhead stroke, in radians.
pub const ARROW_HEAD_ANGLE: f64 = PI / 6.0;

/// End points of the two head strokes for a shaft from `start` to `end`.
///
/// The strokes leave `end` backwards along the shaft's exact angle, rotated by
/// plus and minus [`ARROW_HEAD_ANGLE`].
pub fn arrow_head(start: Point, end: Point) -> [Point; 2] {
    let angle = (end.y - start.y).atan2(end.x - start.x);
    [angle - ARROW_HEAD_ANGLE, angle + ARROW_HEAD_ANGLE].map(|a| {
        Point::new(
            end.x - ARROW_HEAD_LENGTH * a.cos(),
            end.y - ARROW_HEAD_LENGTH * a.sin(),
        )
    })
}

/// Shaft plus both head strokes.
pub fn arrow_path(bounds: &Bounds) -> BezPath {
    let start = Point::new(bounds.x, bounds.y);
    let end = Point::new(bounds.x + bounds.width, bounds.y + bounds.height);
    let mut path = BezPath::new();
    path.move_to(start);
    path.line_to(end);
    for tip in arrow_head(start, end) {
        path.move_to(end);
        path.line_to(tip);
    }
    path
}
