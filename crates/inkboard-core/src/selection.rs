//! Resize handles: layout, hit-testing and the resize rule.

use crate::geometry::Bounds;
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// Handle size in plane units.
pub const HANDLE_SIZE: f64 = 10.0;
/// Smallest width or height a resize can produce.
pub const MIN_RESIZE_EXTENT: f64 = 10.0;

/// Compass position of a resize handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizeHandle {
    Nw,
    N,
    Ne,
    W,
    E,
    Sw,
    S,
    Se,
}

impl ResizeHandle {
    /// All handles in drawing order.
    pub const ALL: [ResizeHandle; 8] = [
        ResizeHandle::Nw,
        ResizeHandle::N,
        ResizeHandle::Ne,
        ResizeHandle::W,
        ResizeHandle::E,
        ResizeHandle::Sw,
        ResizeHandle::S,
        ResizeHandle::Se,
    ];

    /// Anchor point of this handle on a box.
    pub fn anchor(self, bounds: &Bounds) -> Point {
        let Bounds {
            x,
            y,
            width: w,
            height: h,
        } = *bounds;
        match self {
            ResizeHandle::Nw => Point::new(x, y),
            ResizeHandle::N => Point::new(x + w / 2.0, y),
            ResizeHandle::Ne => Point::new(x + w, y),
            ResizeHandle::W => Point::new(x, y + h / 2.0),
            ResizeHandle::E => Point::new(x + w, y + h / 2.0),
            ResizeHandle::Sw => Point::new(x, y + h),
            ResizeHandle::S => Point::new(x + w / 2.0, y + h),
            ResizeHandle::Se => Point::new(x + w, y + h),
        }
    }
}

/// A resize handle placed on a box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Handle {
    pub kind: ResizeHandle,
    /// Center of the handle in plane coordinates.
    pub position: Point,
    pub size: f64,
}

impl Handle {
    /// Square hit region centered on the anchor.
    pub fn rect(&self) -> Rect {
        Rect::from_center_size(self.position, (self.size, self.size))
    }

    pub fn hit_test(&self, point: Point) -> bool {
        let half = self.size / 2.0;
        (point.x - self.position.x).abs() <= half && (point.y - self.position.y).abs() <= half
    }
}

/// The eight handles of a box.
pub fn resize_handles(bounds: &Bounds, size: f64) -> [Handle; 8] {
    ResizeHandle::ALL.map(|kind| Handle {
        kind,
        position: kind.anchor(bounds),
        size,
    })
}

/// First handle of `bounds` under `point`, if any.
pub fn hit_test_handles(bounds: &Bounds, point: Point, size: f64) -> Option<ResizeHandle> {
    resize_handles(bounds, size)
        .into_iter()
        .find(|handle| handle.hit_test(point))
        .map(|handle| handle.kind)
}

/// New box after dragging `handle` by `delta` from `initial`.
///
/// Always computed from the pre-resize box. Extents are floor-clamped to `min_extent`; the
/// origin still follows the pointer on the dragged edges.
pub fn apply_resize(handle: ResizeHandle, initial: &Bounds, delta: Vec2, min_extent: f64) -> Bounds {
    let Bounds {
        x,
        y,
        width: w,
        height: h,
    } = *initial;
    let (dx, dy) = (delta.x, delta.y);
    let clamp = |v: f64| v.max(min_extent);
    match handle {
        ResizeHandle::Nw => Bounds::new(x + dx, y + dy, clamp(w - dx), clamp(h - dy)),
        ResizeHandle::N => Bounds::new(x, y + dy, w, clamp(h - dy)),
        ResizeHandle::Ne => Bounds::new(x, y + dy, clamp(w + dx), clamp(h - dy)),
        ResizeHandle::W => Bounds::new(x + dx, y, clamp(w - dx), h),
        ResizeHandle::E => Bounds::new(x, y, clamp(w + dx), h),
        ResizeHandle::Sw => Bounds::new(x + dx, y, clamp(w - dx), clamp(h + dy)),
        ResizeHandle::S => Bounds::new(x, y, w, clamp(h + dy)),
        ResizeHandle::Se => Bounds::new(x, y, clamp(w + dx), clamp(h + dy)),
    }
}
