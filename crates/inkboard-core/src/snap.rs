//! Grid snapping.

use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Default grid size.
pub const GRID_SIZE: f64 = 20.0;
/// Smallest allowed grid size.
pub const MIN_GRID_SIZE: f64 = 5.0;
/// Largest allowed grid size.
pub const MAX_GRID_SIZE: f64 = 200.0;

/// Grid snapping configuration stored with the board.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridSettings {
    pub snap_to_grid: bool,
    pub grid_size: f64,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            snap_to_grid: false,
            grid_size: GRID_SIZE,
        }
    }
}

impl GridSettings {
    /// Set the grid size, clamped to the allowed range.
    pub fn set_grid_size(&mut self, size: f64) {
        self.grid_size = clamp_grid_size(size);
    }

    /// Snap a point if snapping is enabled, otherwise return it unchanged.
    pub fn apply(&self, point: Point) -> Point {
        if self.snap_to_grid {
            snap_to_grid(point, self.grid_size)
        } else {
            point
        }
    }

    /// Snap a single coordinate if snapping is enabled.
    pub fn apply_value(&self, value: f64) -> f64 {
        if self.snap_to_grid {
            snap_value(value, self.grid_size)
        } else {
            value
        }
    }
}

/// Clamp a grid size to [`MIN_GRID_SIZE`, `MAX_GRID_SIZE`]. Non-finite input maps to the default.
pub fn clamp_grid_size(size: f64) -> f64 {
    if size.is_finite() {
        size.clamp(MIN_GRID_SIZE, MAX_GRID_SIZE)
    } else {
        GRID_SIZE
    }
}

/// Round a coordinate to the nearest grid multiple.
pub fn snap_value(value: f64, grid_size: f64) -> f64 {
    (value / grid_size).round() * grid_size
}

/// Snap a point to the nearest grid intersection.
pub fn snap_to_grid(point: Point, grid_size: f64) -> Point {
    Point::new(snap_value(point.x, grid_size), snap_value(point.y, grid_size))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snap_to_grid() {
        let snapped = snap_to_grid(Point::new(23.0, 47.0), 20.0);
        assert!((snapped.x - 20.0).abs() < f64::EPSILON);
        assert!((snapped.y - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_snap_round_up() {
        let snapped = snap_to_grid(Point::new(31.0, -29.0), 20.0);
        assert!((snapped.x - 40.0).abs() < f64::EPSILON);
        assert!((snapped.y + 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_grid_disabled_passthrough() {
        let grid = GridSettings::default();
        assert_eq!(grid.apply(Point::new(3.0, 7.0)), Point::new(3.0, 7.0));
    }

    #[test]
    fn test_grid_size_clamp() {
        let mut grid = GridSettings::default();
        grid.set_grid_size(1.0);
        assert!((grid.grid_size - MIN_GRID_SIZE).abs() < f64::EPSILON);
        grid.set_grid_size(1000.0);
        assert!((grid.grid_size - MAX_GRID_SIZE).abs() < f64::EPSILON);
        grid.set_grid_size(50.0);
        assert!((grid.grid_size - 50.0).abs() < f64::EPSILON);
    }
}
