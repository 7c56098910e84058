//! Engine tuning parameters.

use crate::geometry::FREEDRAW_TOLERANCE;
use crate::history::MAX_UNDO_HISTORY;
use crate::input::{DOUBLE_CLICK_DISTANCE, DOUBLE_CLICK_TIME_MS};
use crate::selection::{HANDLE_SIZE, MIN_RESIZE_EXTENT};
use serde::{Deserialize, Serialize};

/// Fixed sizes and thresholds used by the interaction engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    pub history_capacity: usize,
    /// Side of the square resize handles, in plane units.
    pub handle_size: f64,
    pub freedraw_tolerance: f64,
    pub min_resize_extent: f64,
    pub double_click_ms: u64,
    pub double_click_distance: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            history_capacity: MAX_UNDO_HISTORY,
            handle_size: HANDLE_SIZE,
            freedraw_tolerance: FREEDRAW_TOLERANCE,
            min_resize_extent: MIN_RESIZE_EXTENT,
            double_click_ms: DOUBLE_CLICK_TIME_MS,
            double_click_distance: DOUBLE_CLICK_DISTANCE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: EngineConfig = serde_json::from_str(r#"{"handleSize":14}"#).unwrap();
        assert!((config.handle_size - 14.0).abs() < f64::EPSILON);
        assert_eq!(config.history_capacity, 50);
        assert_eq!(config.double_click_ms, 500);
    }
}
