//! Vertex builders for triangles, stars and regular polygons.

use crate::geometry::Bounds;
use kurbo::Point;
use std::f64::consts::PI;

/// Star inner radius as a fraction of the outer radius.
const STAR_INNER_RATIO: f64 = 2.5;

/// Apex at top center, base along the bottom edge.
pub fn triangle_vertices(bounds: &Bounds) -> [Point; 3] {
    let Bounds {
        x,
        y,
        width,
        height,
    } = *bounds;
    [
        Point::new(x + width / 2.0, y),
        Point::new(x + width, y + height),
        Point::new(x, y + height),
    ]
}

/// Alternating outer and inner vertices, starting straight up.
pub fn star_vertices(bounds: &Bounds, spikes: usize) -> Vec<Point> {
    if spikes < 2 {
        return Vec::new();
    }
    let center = bounds.center();
    let outer = bounds.width.abs().max(bounds.height.abs()) / 2.0;
    let inner = outer / STAR_INNER_RATIO;
    let step = PI / spikes as f64;
    (0..spikes * 2)
        .map(|i| {
            let radius = if i % 2 == 0 { outer } else { inner };
            let angle = step * i as f64 - PI / 2.0;
            Point::new(center.x + radius * angle.cos(), center.y + radius * angle.sin())
        })
        .collect()
}

/// Regular polygon inscribed in the smaller box extent, first vertex straight up.
pub fn polygon_vertices(bounds: &Bounds, sides: usize) -> Vec<Point> {
    if sides < 3 {
        return Vec::new();
    }
    let center = bounds.center();
    let radius = bounds.width.abs().min(bounds.height.abs()) / 2.0;
    let step = 2.0 * PI / sides as f64;
    (0..sides)
        .map(|i| {
            let angle = step * i as f64 - PI / 2.0;
            Point::new(center.x + radius * angle.cos(), center.y + radius * angle.sin())
        })
        .collect()
}
