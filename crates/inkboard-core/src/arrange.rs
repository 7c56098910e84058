//! Alignment, distribution, grouping, z-order and rotation of the selection.
//!
//! Each operation returns whether it changed anything so callers can skip history commits
//! for no-ops (too few elements selected).

use crate::canvas::{ElementStore, normalize_z};
use crate::element::DrawingElement;
use crate::geometry::combined_extent;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Minimum selection size for [`ElementStore::align`].
pub const MIN_ALIGN_SELECTION: usize = 2;
/// Minimum selection size for [`ElementStore::distribute`].
pub const MIN_DISTRIBUTE_SELECTION: usize = 3;
/// Minimum selection size for [`ElementStore::group`].
pub const MIN_GROUP_SELECTION: usize = 2;

/// Alignment target within the selection's combined box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlignDirection {
    Left,
    Right,
    Top,
    Bottom,
    /// Horizontal center.
    Center,
    /// Vertical center.
    Middle,
}

/// Distribution axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistributeAxis {
    Horizontal,
    Vertical,
}

impl ElementStore {
    /// Map every selected element through `f`, keeping the rest untouched.
    fn map_selected(&self, mut f: impl FnMut(&mut DrawingElement)) -> Vec<DrawingElement> {
        self.elements()
            .iter()
            .map(|element| {
                let mut element = element.clone();
                if element.is_selected {
                    f(&mut element);
                }
                element
            })
            .collect()
    }

    /// Align the selection to an edge or center of its combined box.
    pub fn align(&mut self, direction: AlignDirection) -> bool {
        if self.selected_count() < MIN_ALIGN_SELECTION {
            return false;
        }
        let Some(extent) = combined_extent(self.selected()) else {
            return false;
        };
        let elements = self.map_selected(|element| {
            let w = element.width_or_zero();
            let h = element.height_or_zero();
            match direction {
                AlignDirection::Left => element.x = extent.x0,
                AlignDirection::Right => element.x = extent.x1 - w,
                AlignDirection::Center => element.x = extent.x0 + (extent.width() - w) / 2.0,
                AlignDirection::Top => element.y = extent.y0,
                AlignDirection::Bottom => element.y = extent.y1 - h,
                AlignDirection::Middle => element.y = extent.y0 + (extent.height() - h) / 2.0,
            }
        });
        log::debug!("Aligned selection {direction:?}");
        self.replace_elements(elements);
        true
    }

    /// Spread the selection with equal gaps along an axis, keeping its outer extent.
    pub fn distribute(&mut self, axis: DistributeAxis) -> bool {
        let mut selected: Vec<&DrawingElement> = self.selected().collect();
        if selected.len() < MIN_DISTRIBUTE_SELECTION {
            return false;
        }
        let Some(extent) = combined_extent(selected.iter().copied()) else {
            return false;
        };
        let (span, start) = match axis {
            DistributeAxis::Horizontal => (extent.width(), extent.x0),
            DistributeAxis::Vertical => (extent.height(), extent.y0),
        };
        let extent_of = |element: &DrawingElement| match axis {
            DistributeAxis::Horizontal => element.width_or_zero().abs(),
            DistributeAxis::Vertical => element.height_or_zero().abs(),
        };
        let anchor_of = |element: &DrawingElement| match axis {
            DistributeAxis::Horizontal => element.x,
            DistributeAxis::Vertical => element.y,
        };
        selected.sort_by(|a, b| anchor_of(*a).total_cmp(&anchor_of(*b)));

        let occupied: f64 = selected.iter().map(|element| extent_of(*element)).sum();
        let gap = (span - occupied) / (selected.len() - 1) as f64;
        let mut cursor = start;
        let mut positions = Vec::with_capacity(selected.len());
        for element in &selected {
            positions.push((element.id.clone(), cursor));
            cursor += extent_of(*element) + gap;
        }

        let elements = self
            .elements()
            .iter()
            .map(|element| {
                let mut element = element.clone();
                if let Some((_, position)) = positions.iter().find(|(id, _)| *id == element.id) {
                    match axis {
                        DistributeAxis::Horizontal => element.x = *position,
                        DistributeAxis::Vertical => element.y = *position,
                    }
                }
                element
            })
            .collect();
        log::debug!("Distributed {} elements {axis:?}", positions.len());
        self.replace_elements(elements);
        true
    }

    /// Tag the selection with a fresh shared group id.
    pub fn group(&mut self) -> Option<String> {
        if self.selected_count() < MIN_GROUP_SELECTION {
            return None;
        }
        let group_id = format!("group-{}", Uuid::new_v4());
        let elements = self.map_selected(|element| element.group_id = Some(group_id.clone()));
        log::debug!("Created group {group_id}");
        self.replace_elements(elements);
        Some(group_id)
    }

    /// Clear the group tag on the selection.
    pub fn ungroup(&mut self) -> bool {
        if !self.selected().any(|element| element.group_id.is_some()) {
            return false;
        }
        let elements = self.map_selected(|element| element.group_id = None);
        self.replace_elements(elements);
        true
    }

    /// Move the selection above everything else.
    pub fn bring_to_front(&mut self) -> bool {
        self.restack_selection(true)
    }

    /// Move the selection below everything else.
    pub fn send_to_back(&mut self) -> bool {
        self.restack_selection(false)
    }

    fn restack_selection(&mut self, to_front: bool) -> bool {
        if self.selected_count() == 0 {
            return false;
        }
        let mut elements = normalize_z(self.elements().to_vec());
        let top = elements.len() as i64;
        for element in elements.iter_mut().filter(|element| element.is_selected) {
            element.z_index = Some(if to_front { top } else { -1 });
        }
        self.replace_elements(normalize_z(elements));
        true
    }

    /// Add `delta` degrees to the rotation of every selected element, modulo 360.
    pub fn rotate(&mut self, delta: f64) -> bool {
        if self.selected_count() == 0 {
            return false;
        }
        let elements = self.map_selected(|element| element.rotation = (element.rotation + delta) % 360.0);
        self.replace_elements(elements);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{ElementId, ElementKind};

    fn add_rect(store: &mut ElementStore, x: f64, y: f64, w: f64, h: f64) -> ElementId {
        store.add(DrawingElement::new(ElementKind::Rectangle, x, y).with_size(w, h))
    }

    fn x_of(store: &ElementStore, id: &str) -> f64 {
        store.get(id).unwrap().x
    }

    #[test]
    fn test_align_left() {
        let mut store = ElementStore::new();
        let a = add_rect(&mut store, 40.0, 0.0, 10.0, 10.0);
        let b = add_rect(&mut store, 15.0, 30.0, 10.0, 10.0);
        let c = add_rect(&mut store, 90.0, 60.0, 10.0, 10.0);
        let untouched = add_rect(&mut store, 5.0, 90.0, 10.0, 10.0);
        store.select(&a, false);
        store.select(&b, true);
        store.select(&c, true);

        assert!(store.align(AlignDirection::Left));
        for id in [&a, &b, &c] {
            assert!((x_of(&store, id) - 15.0).abs() < f64::EPSILON);
        }
        assert!((x_of(&store, &untouched) - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_align_right_and_middle() {
        let mut store = ElementStore::new();
        let a = add_rect(&mut store, 0.0, 0.0, 20.0, 20.0);
        let b = add_rect(&mut store, 50.0, 80.0, 50.0, 20.0);
        store.select(&a, false);
        store.select(&b, true);

        store.align(AlignDirection::Right);
        assert!((x_of(&store, &a) - 80.0).abs() < f64::EPSILON);
        assert!((x_of(&store, &b) - 50.0).abs() < f64::EPSILON);

        store.align(AlignDirection::Middle);
        assert!((store.get(&a).unwrap().y - 40.0).abs() < f64::EPSILON);
        assert!((store.get(&b).unwrap().y - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_align_needs_two() {
        let mut store = ElementStore::new();
        let a = add_rect(&mut store, 40.0, 0.0, 10.0, 10.0);
        store.select(&a, false);
        let before = store.snapshot();
        assert!(!store.align(AlignDirection::Left));
        assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn test_distribute_horizontal_equal_gaps() {
        let mut store = ElementStore::new();
        let a = add_rect(&mut store, 0.0, 0.0, 20.0, 10.0);
        let c = add_rect(&mut store, 180.0, 0.0, 20.0, 10.0);
        let b = add_rect(&mut store, 30.0, 0.0, 40.0, 10.0);
        for id in [&a, &b, &c] {
            store.select(id, true);
        }

        assert!(store.distribute(DistributeAxis::Horizontal));
        let a_x = x_of(&store, &a);
        let b_x = x_of(&store, &b);
        let c_x = x_of(&store, &c);
        let gap_ab = b_x - (a_x + 20.0);
        let gap_bc = c_x - (b_x + 40.0);
        assert!((gap_ab - gap_bc).abs() < 1e-9);
        assert!((a_x - 0.0).abs() < f64::EPSILON);
        assert!((c_x - 180.0).abs() < 1e-9);
    }

    #[test]
    fn test_distribute_needs_three() {
        let mut store = ElementStore::new();
        let a = add_rect(&mut store, 0.0, 0.0, 20.0, 10.0);
        let b = add_rect(&mut store, 50.0, 0.0, 20.0, 10.0);
        store.select(&a, false);
        store.select(&b, true);
        assert!(!store.distribute(DistributeAxis::Horizontal));
    }

    #[test]
    fn test_group_and_ungroup() {
        let mut store = ElementStore::new();
        let a = add_rect(&mut store, 0.0, 0.0, 20.0, 10.0);
        let b = add_rect(&mut store, 50.0, 0.0, 20.0, 10.0);
        store.select(&a, false);
        assert!(store.group().is_none());
        store.select(&b, true);

        let group = store.group().unwrap();
        assert_eq!(store.get(&a).unwrap().group_id.as_ref(), Some(&group));
        assert_eq!(store.get(&b).unwrap().group_id.as_ref(), Some(&group));

        assert!(store.ungroup());
        assert!(store.get(&a).unwrap().group_id.is_none());
        assert!(!store.ungroup());
    }

    #[test]
    fn test_bring_to_front_and_back() {
        let mut store = ElementStore::new();
        let a = add_rect(&mut store, 0.0, 0.0, 10.0, 10.0);
        let b = add_rect(&mut store, 0.0, 0.0, 10.0, 10.0);
        let c = add_rect(&mut store, 0.0, 0.0, 10.0, 10.0);
        store.select(&a, false);

        assert!(store.bring_to_front());
        assert_eq!(store.get(&a).unwrap().z_index, Some(2));
        assert_eq!(store.get(&b).unwrap().z_index, Some(0));
        assert_eq!(store.get(&c).unwrap().z_index, Some(1));

        let before = store.snapshot();
        store.bring_to_front();
        assert_eq!(store.snapshot(), before);

        store.select(&c, false);
        store.send_to_back();
        assert_eq!(store.get(&c).unwrap().z_index, Some(0));
        assert_eq!(store.get(&b).unwrap().z_index, Some(1));
        assert_eq!(store.get(&a).unwrap().z_index, Some(2));
    }

    #[test]
    fn test_restack_without_selection_is_noop() {
        let mut store = ElementStore::new();
        add_rect(&mut store, 0.0, 0.0, 10.0, 10.0);
        assert!(!store.bring_to_front());
        assert!(!store.send_to_back());
    }

    #[test]
    fn test_rotate_wraps() {
        let mut store = ElementStore::new();
        let a = add_rect(&mut store, 0.0, 0.0, 10.0, 10.0);
        assert!(!store.rotate(15.0));
        store.select(&a, false);
        for _ in 0..25 {
            store.rotate(15.0);
        }
        assert!((store.get(&a).unwrap().rotation - 15.0).abs() < 1e-9);
        store.rotate(-30.0);
        assert!((store.get(&a).unwrap().rotation + 15.0).abs() < 1e-9);
    }
}
