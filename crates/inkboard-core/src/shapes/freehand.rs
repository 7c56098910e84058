//! Freedraw stroke geometry.

use kurbo::{BezPath, Point};

/// Polyline through the recorded samples.
///
/// A single sample becomes a zero-length segment so that a click still leaves a dot once
/// stroked with round caps. Returns `None` when there are no samples.
pub fn freedraw_path(points: &[Point]) -> Option<BezPath> {
    let (first, rest) = points.split_first()?;
    let mut path = BezPath::new();
    path.move_to(*first);
    if rest.is_empty() {
        path.line_to(*first);
    }
    for point in rest {
        path.line_to(*point);
    }
    Some(path)
}
