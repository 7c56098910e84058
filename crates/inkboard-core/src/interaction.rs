//! Interaction state machine.
//!
//! Turns pointer and keyboard events into store mutations and decides when a history entry
//! is committed. One gesture is active at a time; every state has an exit path back to
//! [`InteractionState::Idle`] that drops the gesture's transient data.
//!
//! Commit points: pointer-up after a draw, drag or resize; Enter while editing text; the
//! delete shortcut when something was removed. Panning, zooming, undo and redo never commit.

use crate::canvas::ElementStore;
use crate::config::EngineConfig;
use crate::element::{DrawingElement, ElementId, ElementKind, ElementPatch};
use crate::geometry::{Bounds, bounds_of};
use crate::history::History;
use crate::input::{KeyEvent, Modifiers, MouseButton, PointerEvent, Shortcut};
use crate::selection::{ResizeHandle, apply_resize, hit_test_handles};
use crate::text::{FontSpec, TextMeasure};
use crate::text_edit::{TextEditResult, TextEditState};
use crate::tools::{TEXT_BOX_WIDTH, ToolKind, ToolSettings};
use kurbo::{Point, Rect, Vec2};
use std::collections::HashMap;

/// Zoom multiplier per wheel step toward the user.
const WHEEL_ZOOM_OUT: f64 = 0.9;
/// Zoom multiplier per wheel step away from the user.
const WHEEL_ZOOM_IN: f64 = 1.1;
/// Extra height added below the inline editor box, in screen pixels.
const OVERLAY_PADDING: f64 = 8.0;

/// Everything the state machine reads or writes while handling one event.
pub struct InteractionContext<'a> {
    pub store: &'a mut ElementStore,
    pub history: &'a mut History,
    pub tools: &'a ToolSettings,
    pub config: &'a EngineConfig,
    pub measure: &'a dyn TextMeasure,
}

impl InteractionContext<'_> {
    /// Push the current store state onto the history.
    pub fn commit(&mut self) {
        self.history.add_state(&self.store.snapshot());
    }

    fn to_plane(&self, screen: Point) -> Point {
        self.store.camera().screen_to_world(screen)
    }
}

/// Current gesture.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum InteractionState {
    #[default]
    Idle,
    Panning {
        /// Last pointer position in screen coordinates.
        last: Point,
    },
    /// A new element is being sized. It is not in the store until pointer-up.
    Drawing {
        element: DrawingElement,
        anchor: Point,
    },
    DraggingSelection {
        /// Pointer position at drag start, plane coordinates.
        start: Point,
        /// Pre-drag anchor of every selected element.
        origins: HashMap<ElementId, Point>,
    },
    Resizing {
        id: ElementId,
        handle: ResizeHandle,
        start: Point,
        initial: Bounds,
    },
    EditingText {
        id: ElementId,
        editor: TextEditState,
    },
}

/// Screen-space placement of the inline text editor.
#[derive(Debug, Clone, PartialEq)]
pub struct TextOverlay {
    pub element_id: ElementId,
    pub rect: Rect,
    pub text: String,
    /// Caret line and column.
    pub caret: (usize, usize),
    /// Font size already scaled by the zoom.
    pub font_size: f64,
    pub color: String,
}

/// Pointer/keyboard driven interaction engine.
#[derive(Debug, Clone, Default)]
pub struct InteractionMachine {
    state: InteractionState,
}

impl InteractionMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == InteractionState::Idle
    }

    pub fn is_editing_text(&self) -> bool {
        matches!(self.state, InteractionState::EditingText { .. })
    }

    /// Element being drawn, not yet in the store.
    pub fn preview(&self) -> Option<&DrawingElement> {
        match &self.state {
            InteractionState::Drawing { element, .. } => Some(element),
            _ => None,
        }
    }

    /// Dispatch a pointer event.
    pub fn handle_pointer(&mut self, ctx: &mut InteractionContext<'_>, event: PointerEvent) {
        match event {
            PointerEvent::Down {
                position,
                button,
                modifiers,
            } => {
                if button == MouseButton::Left {
                    self.pointer_down(ctx, position, modifiers);
                }
            }
            PointerEvent::Move { position } => self.pointer_move(ctx, position),
            PointerEvent::Up { position, button } => {
                if button == MouseButton::Left {
                    self.pointer_up(ctx, position);
                }
            }
            PointerEvent::DoubleClick { position } => self.double_click(ctx, position),
            PointerEvent::Wheel {
                delta, modifiers, ..
            } => {
                self.wheel(ctx, delta, modifiers);
            }
        }
    }

    /// Start a gesture according to the active tool and what lies under the pointer.
    pub fn pointer_down(&mut self, ctx: &mut InteractionContext<'_>, position: Point, modifiers: Modifiers) {
        if self.is_editing_text() {
            self.commit_text_edit(ctx);
        } else if !self.is_idle() {
            log::debug!("Pointer down during unfinished gesture, cancelling it");
            self.cancel(ctx);
        }

        match ctx.tools.tool {
            ToolKind::Pan => {
                log::debug!("Pan started");
                self.state = InteractionState::Panning { last: position };
            }
            ToolKind::Select => {
                let point = ctx.to_plane(position);
                self.select_down(ctx, point, modifiers.shift);
            }
            ToolKind::Text => self.text_down(ctx, position),
            tool => {
                let Some(kind) = tool.element_kind() else {
                    return;
                };
                let anchor = ctx.store.grid().apply(ctx.to_plane(position));
                if ctx.store.selected_count() > 0 {
                    ctx.store.clear_selection();
                }
                log::debug!("Drawing {kind:?} at {anchor:?}");
                self.state = InteractionState::Drawing {
                    element: ctx.tools.create_element(kind, anchor),
                    anchor,
                };
            }
        }
    }

    fn select_down(&mut self, ctx: &mut InteractionContext<'_>, point: Point, additive: bool) {
        let handle = ctx.store.primary_selection().and_then(|primary| {
            let bounds = bounds_of(primary, ctx.measure);
            hit_test_handles(&bounds, point, ctx.config.handle_size)
                .map(|handle| (primary.id.clone(), handle, bounds))
        });
        if let Some((id, handle, initial)) = handle {
            log::debug!("Resize started on {id} via {handle:?}");
            self.state = InteractionState::Resizing {
                id,
                handle,
                start: point,
                initial,
            };
            return;
        }

        let target = ctx
            .store
            .topmost_at_with_tolerance(point, ctx.measure, ctx.config.freedraw_tolerance)
            .map(|element| element.id.clone());
        let Some(target) = target else {
            if !additive {
                ctx.store.clear_selection();
            }
            return;
        };

        ctx.store.select(&target, additive);
        let origins = ctx
            .store
            .selected()
            .map(|element| (element.id.clone(), Point::new(element.x, element.y)))
            .collect::<HashMap<_, _>>();
        log::debug!("Drag started with {} selected", origins.len());
        self.state = InteractionState::DraggingSelection {
            start: point,
            origins,
        };
    }

    fn text_down(&mut self, ctx: &mut InteractionContext<'_>, position: Point) {
        let anchor = ctx.store.grid().apply(ctx.to_plane(position));
        let element = ctx.tools.create_element(ElementKind::Text, anchor);
        let id = ctx.store.add(element);
        ctx.store.select(&id, false);
        self.begin_text_edit(ctx, &id);
    }

    /// Continue the active gesture.
    pub fn pointer_move(&mut self, ctx: &mut InteractionContext<'_>, position: Point) {
        match &mut self.state {
            InteractionState::Idle | InteractionState::EditingText { .. } => {
                log::trace!("Pointer move without active gesture ignored");
            }
            InteractionState::Panning { last } => {
                let delta = position - *last;
                *last = position;
                let pan = ctx.store.pan() + delta;
                ctx.store.set_pan(pan);
            }
            InteractionState::Drawing { element, anchor } => {
                let point = ctx.store.grid().apply(ctx.to_plane(position));
                if element.kind == ElementKind::Freedraw {
                    element.points.push(point);
                } else {
                    element.width = Some(point.x - anchor.x);
                    element.height = Some(point.y - anchor.y);
                }
            }
            InteractionState::DraggingSelection { start, origins } => {
                let delta = ctx.to_plane(position) - *start;
                let grid = *ctx.store.grid();
                let elements = ctx
                    .store
                    .elements()
                    .iter()
                    .map(|element| {
                        let mut element = element.clone();
                        if let Some(origin) = origins.get(&element.id) {
                            element.x = grid.apply_value(origin.x + delta.x);
                            element.y = grid.apply_value(origin.y + delta.y);
                        }
                        element
                    })
                    .collect();
                ctx.store.set_all(elements);
            }
            InteractionState::Resizing {
                id,
                handle,
                start,
                initial,
            } => {
                let delta = ctx.to_plane(position) - *start;
                let resized = apply_resize(*handle, initial, delta, ctx.config.min_resize_extent);
                ctx.store.update(
                    id,
                    &ElementPatch::frame(resized.x, resized.y, resized.width, resized.height),
                );
            }
        }
    }

    /// Finish the active gesture, committing history where it changed the document.
    pub fn pointer_up(&mut self, ctx: &mut InteractionContext<'_>, _position: Point) {
        if self.is_editing_text() {
            return;
        }
        match std::mem::take(&mut self.state) {
            InteractionState::Idle => log::trace!("Pointer up without active gesture ignored"),
            InteractionState::Panning { .. } => log::debug!("Pan finished"),
            InteractionState::Drawing { element, .. } => {
                log::debug!("Drawing finished: {:?} {}", element.kind, element.id);
                ctx.store.add(element);
                ctx.commit();
            }
            InteractionState::DraggingSelection { .. } => {
                log::debug!("Drag finished");
                ctx.commit();
            }
            InteractionState::Resizing { id, .. } => {
                log::debug!("Resize of {id} finished");
                ctx.commit();
            }
            InteractionState::EditingText { .. } => {}
        }
    }

    /// Enter inline editing for the topmost text-bearing element under the pointer.
    pub fn double_click(&mut self, ctx: &mut InteractionContext<'_>, position: Point) {
        let point = ctx.to_plane(position);
        let target = ctx
            .store
            .topmost_at_with_tolerance(point, ctx.measure, ctx.config.freedraw_tolerance)
            .filter(|element| element.has_text())
            .map(|element| element.id.clone());
        if let Some(id) = target {
            if !self.is_idle() {
                self.cancel(ctx);
            }
            self.begin_text_edit(ctx, &id);
        }
    }

    /// Start editing the text of an element.
    pub fn begin_text_edit(&mut self, ctx: &InteractionContext<'_>, id: &str) {
        let Some(element) = ctx.store.get(id) else {
            return;
        };
        log::debug!("Editing text of {id}");
        self.state = InteractionState::EditingText {
            id: id.to_string(),
            editor: TextEditState::new(element.text.as_deref().unwrap_or_default()),
        };
    }

    /// Zoom on modifier + wheel. Returns true if the event was consumed.
    pub fn wheel(&mut self, ctx: &mut InteractionContext<'_>, delta: Vec2, modifiers: Modifiers) -> bool {
        if !modifiers.command() {
            return false;
        }
        let factor = if delta.y > 0.0 {
            WHEEL_ZOOM_OUT
        } else {
            WHEEL_ZOOM_IN
        };
        let zoom = ctx.store.zoom() * factor;
        ctx.store.set_zoom(zoom);
        true
    }

    /// Handle a key press. Returns true if it was consumed.
    pub fn handle_key(&mut self, ctx: &mut InteractionContext<'_>, event: &KeyEvent) -> bool {
        if let InteractionState::EditingText { editor, .. } = &mut self.state {
            return match editor.handle_key(event) {
                TextEditResult::Handled => true,
                TextEditResult::Commit => {
                    self.commit_text_edit(ctx);
                    true
                }
                TextEditResult::Cancel => {
                    log::debug!("Text edit cancelled");
                    self.state = InteractionState::Idle;
                    true
                }
                TextEditResult::NotHandled => false,
            };
        }

        match event.shortcut() {
            Some(Shortcut::Undo) => {
                self.cancel(ctx);
                if let Some(state) = ctx.history.undo() {
                    ctx.store.restore(state);
                }
                true
            }
            Some(Shortcut::Redo) => {
                self.cancel(ctx);
                if let Some(state) = ctx.history.redo() {
                    ctx.store.restore(state);
                }
                true
            }
            Some(Shortcut::DeleteSelection) => {
                self.cancel(ctx);
                if ctx.store.delete_selected() > 0 {
                    ctx.commit();
                }
                true
            }
            None => false,
        }
    }

    fn commit_text_edit(&mut self, ctx: &mut InteractionContext<'_>) {
        let InteractionState::EditingText { id, editor } = std::mem::take(&mut self.state) else {
            return;
        };
        let Some(element) = ctx.store.get(&id) else {
            return;
        };
        let text = editor.text().to_string();
        let mut patch = ElementPatch {
            text: Some(text.clone()),
            ..Default::default()
        };
        if element.kind == ElementKind::Text {
            let font = FontSpec::of(element);
            patch.width = Some(ctx.measure.text_width(&text, &font));
            patch.height = Some(ctx.measure.text_height(&text, &font));
        }
        ctx.store.update(&id, &patch);
        log::debug!("Text edit of {id} committed");
        ctx.commit();
    }

    /// Abandon the active gesture without committing history.
    ///
    /// Drags and resizes restore the pre-gesture geometry; an element being drawn is
    /// discarded; a text edit is dropped unchanged.
    pub fn cancel(&mut self, ctx: &mut InteractionContext<'_>) {
        match std::mem::take(&mut self.state) {
            InteractionState::Idle => {}
            InteractionState::DraggingSelection { origins, .. } => {
                let elements = ctx
                    .store
                    .elements()
                    .iter()
                    .map(|element| {
                        let mut element = element.clone();
                        if let Some(origin) = origins.get(&element.id) {
                            element.x = origin.x;
                            element.y = origin.y;
                        }
                        element
                    })
                    .collect();
                ctx.store.set_all(elements);
                log::debug!("Drag cancelled");
            }
            InteractionState::Resizing { id, initial, .. } => {
                ctx.store.update(
                    &id,
                    &ElementPatch::frame(initial.x, initial.y, initial.width, initial.height),
                );
                log::debug!("Resize cancelled");
            }
            state => log::debug!("Cancelled {state:?}"),
        }
    }

    /// Screen-space box of the inline editor while editing text.
    pub fn text_overlay(&self, store: &ElementStore, measure: &dyn TextMeasure) -> Option<TextOverlay> {
        let InteractionState::EditingText { id, editor } = &self.state else {
            return None;
        };
        let element = store.get(id)?;
        let bounds = bounds_of(element, measure);
        let zoom = store.zoom();
        let pan = store.pan();
        let font_size = element.font_size_or_default();
        let left = bounds.x * zoom + pan.x;
        let top = bounds.y * zoom + pan.y;
        let width = bounds.width.max(TEXT_BOX_WIDTH) * zoom;
        let height = bounds.height.max(font_size) * zoom + OVERLAY_PADDING;
        Some(TextOverlay {
            element_id: id.clone(),
            rect: Rect::new(left, top, left + width, top + height),
            text: editor.text().to_string(),
            caret: editor.caret_line_column(),
            font_size: font_size * zoom,
            color: element.stroke_color.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Key;
    use crate::text::ApproxTextMeasure;

    struct Harness {
        store: ElementStore,
        history: History,
        tools: ToolSettings,
        config: EngineConfig,
        machine: InteractionMachine,
    }

    impl Harness {
        fn new() -> Self {
            let store = ElementStore::new();
            let mut history = History::new();
            history.add_state(&store.snapshot());
            Self {
                store,
                history,
                tools: ToolSettings::default(),
                config: EngineConfig::default(),
                machine: InteractionMachine::new(),
            }
        }

        fn with<R>(&mut self, f: impl FnOnce(&mut InteractionMachine, &mut InteractionContext<'_>) -> R) -> R {
            let mut ctx = InteractionContext {
                store: &mut self.store,
                history: &mut self.history,
                tools: &self.tools,
                config: &self.config,
                measure: &ApproxTextMeasure,
            };
            f(&mut self.machine, &mut ctx)
        }

        fn down(&mut self, x: f64, y: f64) {
            self.down_with(x, y, Modifiers::NONE);
        }

        fn down_with(&mut self, x: f64, y: f64, modifiers: Modifiers) {
            self.with(|m, ctx| m.pointer_down(ctx, Point::new(x, y), modifiers));
        }

        fn drag_to(&mut self, x: f64, y: f64) {
            self.with(|m, ctx| m.pointer_move(ctx, Point::new(x, y)));
        }

        fn up(&mut self, x: f64, y: f64) {
            self.with(|m, ctx| m.pointer_up(ctx, Point::new(x, y)));
        }

        fn key(&mut self, event: KeyEvent) -> bool {
            self.with(|m, ctx| m.handle_key(ctx, &event))
        }

        fn draw(&mut self, tool: ToolKind, from: (f64, f64), to: (f64, f64)) -> ElementId {
            self.tools.tool = tool;
            self.down(from.0, from.1);
            self.drag_to(to.0, to.1);
            self.up(to.0, to.1);
            self.store.elements().last().unwrap().id.clone()
        }
    }

    #[test]
    fn test_draw_rectangle_commits_once() {
        let mut h = Harness::new();
        let id = h.draw(ToolKind::Rectangle, (0.0, 0.0), (100.0, 50.0));
        let element = h.store.get(&id).unwrap();
        assert_eq!(element.kind, ElementKind::Rectangle);
        assert!((element.x - 0.0).abs() < f64::EPSILON);
        assert_eq!(element.width, Some(100.0));
        assert_eq!(element.height, Some(50.0));
        assert_eq!(element.z_index, Some(0));
        assert_eq!(h.history.len(), 2);
        assert!(h.machine.is_idle());
    }

    #[test]
    fn test_preview_not_in_store_until_up() {
        let mut h = Harness::new();
        h.tools.tool = ToolKind::Ellipse;
        h.down(10.0, 10.0);
        h.drag_to(-20.0, 40.0);
        assert!(h.store.is_empty());
        let preview = h.machine.preview().unwrap();
        assert_eq!(preview.width, Some(-30.0));
        assert_eq!(preview.height, Some(30.0));
        h.up(-20.0, 40.0);
        assert_eq!(h.store.len(), 1);
        assert!(h.machine.preview().is_none());
    }

    #[test]
    fn test_freedraw_appends_points() {
        let mut h = Harness::new();
        h.tools.tool = ToolKind::Freedraw;
        h.down(0.0, 0.0);
        h.drag_to(5.0, 5.0);
        h.drag_to(10.0, 0.0);
        h.up(10.0, 0.0);
        let element = &h.store.elements()[0];
        assert_eq!(element.points.len(), 3);
        assert!(element.width.is_none());
    }

    #[test]
    fn test_drawing_snaps_to_grid() {
        let mut h = Harness::new();
        h.store.set_snap_to_grid(true);
        let id = h.draw(ToolKind::Rectangle, (12.0, 9.0), (97.0, 51.0));
        let element = h.store.get(&id).unwrap();
        assert!((element.x - 20.0).abs() < f64::EPSILON);
        assert!((element.y - 0.0).abs() < f64::EPSILON);
        assert_eq!(element.width, Some(80.0));
        assert_eq!(element.height, Some(60.0));
    }

    #[test]
    fn test_drawing_uses_zoom_and_pan() {
        let mut h = Harness::new();
        h.store.set_zoom(2.0);
        h.store.set_pan(Vec2::new(100.0, 0.0));
        let id = h.draw(ToolKind::Rectangle, (100.0, 0.0), (300.0, 100.0));
        let element = h.store.get(&id).unwrap();
        assert!((element.x - 0.0).abs() < f64::EPSILON);
        assert_eq!(element.width, Some(100.0));
        assert_eq!(element.height, Some(50.0));
    }

    #[test]
    fn test_select_and_drag() {
        let mut h = Harness::new();
        let id = h.draw(ToolKind::Rectangle, (0.0, 0.0), (100.0, 100.0));
        h.tools.tool = ToolKind::Select;
        h.down(50.0, 50.0);
        assert!(h.store.get(&id).unwrap().is_selected);
        h.drag_to(60.0, 70.0);
        h.drag_to(80.0, 90.0);
        h.up(80.0, 90.0);
        let element = h.store.get(&id).unwrap();
        assert!((element.x - 30.0).abs() < f64::EPSILON);
        assert!((element.y - 40.0).abs() < f64::EPSILON);
        assert_eq!(h.history.len(), 3);
    }

    #[test]
    fn test_drag_moves_whole_selection_with_snapping() {
        let mut h = Harness::new();
        let a = h.draw(ToolKind::Rectangle, (0.0, 0.0), (40.0, 40.0));
        let b = h.draw(ToolKind::Rectangle, (100.0, 100.0), (140.0, 140.0));
        h.store.set_snap_to_grid(true);
        h.tools.tool = ToolKind::Select;
        h.down(20.0, 20.0);
        h.down_with(120.0, 120.0, Modifiers::SHIFT);
        assert_eq!(h.store.selected_count(), 2);
        h.drag_to(127.0, 118.0);
        h.up(127.0, 118.0);
        assert!((h.store.get(&a).unwrap().x - 0.0).abs() < f64::EPSILON);
        assert!((h.store.get(&b).unwrap().x - 100.0).abs() < f64::EPSILON);

        h.down(120.0, 120.0);
        assert_eq!(h.store.selected_count(), 1);
        h.up(120.0, 120.0);
    }

    #[test]
    fn test_click_on_empty_clears_selection_unless_shift() {
        let mut h = Harness::new();
        let id = h.draw(ToolKind::Rectangle, (0.0, 0.0), (40.0, 40.0));
        h.tools.tool = ToolKind::Select;
        h.down(10.0, 10.0);
        h.up(10.0, 10.0);
        h.down_with(300.0, 300.0, Modifiers::SHIFT);
        assert!(h.store.get(&id).unwrap().is_selected);
        assert!(h.machine.is_idle());
        h.down(300.0, 300.0);
        assert!(!h.store.get(&id).unwrap().is_selected);
    }

    #[test]
    fn test_resize_from_handle() {
        let mut h = Harness::new();
        let id = h.draw(ToolKind::Rectangle, (0.0, 0.0), (100.0, 100.0));
        h.tools.tool = ToolKind::Select;
        h.down(50.0, 50.0);
        h.up(50.0, 50.0);
        let entries = h.history.len();

        h.down(100.0, 100.0);
        assert!(matches!(
            h.machine.state(),
            InteractionState::Resizing {
                handle: ResizeHandle::Se,
                ..
            }
        ));
        h.drag_to(110.0, 110.0);
        h.drag_to(120.0, 120.0);
        h.up(120.0, 120.0);
        let element = h.store.get(&id).unwrap();
        assert_eq!(element.width, Some(120.0));
        assert_eq!(element.height, Some(120.0));
        assert_eq!(h.history.len(), entries + 1);
    }

    #[test]
    fn test_pan_tool_moves_view_without_history() {
        let mut h = Harness::new();
        h.store.set_zoom(2.0);
        h.tools.tool = ToolKind::Pan;
        h.down(10.0, 10.0);
        h.drag_to(30.0, 15.0);
        h.drag_to(40.0, 25.0);
        h.up(40.0, 25.0);
        assert_eq!(h.store.pan(), Vec2::new(30.0, 15.0));
        assert_eq!(h.history.len(), 1);
    }

    #[test]
    fn test_moves_and_ups_without_gesture_are_ignored() {
        let mut h = Harness::new();
        h.drag_to(10.0, 10.0);
        h.up(10.0, 10.0);
        assert!(h.machine.is_idle());
        assert_eq!(h.history.len(), 1);
    }

    #[test]
    fn test_wheel_zoom_requires_modifier() {
        let mut h = Harness::new();
        let consumed = h.with(|m, ctx| m.wheel(ctx, Vec2::new(0.0, 1.0), Modifiers::NONE));
        assert!(!consumed);
        h.with(|m, ctx| m.wheel(ctx, Vec2::new(0.0, 1.0), Modifiers::CTRL));
        assert!((h.store.zoom() - 0.9).abs() < 1e-12);
        h.with(|m, ctx| m.wheel(ctx, Vec2::new(0.0, -1.0), Modifiers::CTRL));
        assert!((h.store.zoom() - 0.99).abs() < 1e-12);
    }

    #[test]
    fn test_text_tool_enters_editing() {
        let mut h = Harness::new();
        h.tools.tool = ToolKind::Text;
        h.down(10.0, 20.0);
        assert!(h.machine.is_editing_text());
        let id = h.store.elements()[0].id.clone();
        assert!(h.store.get(&id).unwrap().is_selected);
        assert_eq!(h.history.len(), 1);

        for c in "Hi".chars() {
            h.key(KeyEvent::plain(Key::Character(c)));
        }
        let overlay = h.machine.text_overlay(&h.store, &ApproxTextMeasure).unwrap();
        assert_eq!(overlay.text, "Hi");
        assert!((overlay.rect.width() - TEXT_BOX_WIDTH).abs() < f64::EPSILON);

        h.key(KeyEvent::plain(Key::Enter));
        assert!(h.machine.is_idle());
        let element = h.store.get(&id).unwrap();
        assert_eq!(element.text.as_deref(), Some("Hi"));
        let expected = ApproxTextMeasure.text_width("Hi", &FontSpec::of(element));
        assert_eq!(element.width, Some(expected));
        assert_eq!(h.history.len(), 2);
    }

    #[test]
    fn test_escape_cancels_text_edit() {
        let mut h = Harness::new();
        let mut labelled = DrawingElement::new(ElementKind::Rectangle, 0.0, 0.0)
            .with_size(100.0, 50.0)
            .with_text("Old");
        labelled.font_size = Some(16.0);
        let id = h.store.add(labelled);
        h.with(|m, ctx| m.double_click(ctx, Point::new(20.0, 20.0)));
        assert!(h.machine.is_editing_text());
        h.key(KeyEvent::plain(Key::Character('x')));
        h.key(KeyEvent::plain(Key::Escape));
        assert!(h.machine.is_idle());
        assert_eq!(h.store.get(&id).unwrap().text.as_deref(), Some("Old"));
        assert_eq!(h.history.len(), 1);
    }

    #[test]
    fn test_labelled_shape_keeps_size_after_edit() {
        let mut h = Harness::new();
        let id = h.store.add(
            DrawingElement::new(ElementKind::Ellipse, 0.0, 0.0)
                .with_size(160.0, 80.0)
                .with_text("a"),
        );
        h.with(|m, ctx| m.double_click(ctx, Point::new(80.0, 40.0)));
        h.key(KeyEvent::plain(Key::Character('b')));
        h.key(KeyEvent::plain(Key::Enter));
        let element = h.store.get(&id).unwrap();
        assert_eq!(element.text.as_deref(), Some("ab"));
        assert_eq!(element.width, Some(160.0));
    }

    #[test]
    fn test_double_click_ignores_plain_shapes() {
        let mut h = Harness::new();
        h.draw(ToolKind::Rectangle, (0.0, 0.0), (50.0, 50.0));
        h.with(|m, ctx| m.double_click(ctx, Point::new(10.0, 10.0)));
        assert!(h.machine.is_idle());
    }

    #[test]
    fn test_delete_key_commits_only_when_something_removed() {
        let mut h = Harness::new();
        h.draw(ToolKind::Rectangle, (0.0, 0.0), (50.0, 50.0));
        let entries = h.history.len();
        h.key(KeyEvent::plain(Key::Delete));
        assert_eq!(h.history.len(), entries);

        h.tools.tool = ToolKind::Select;
        h.down(10.0, 10.0);
        h.up(10.0, 10.0);
        let entries = h.history.len();
        h.key(KeyEvent::plain(Key::Delete));
        assert!(h.store.is_empty());
        assert_eq!(h.history.len(), entries + 1);
    }

    #[test]
    fn test_delete_during_drag_cancels_then_deletes() {
        let mut h = Harness::new();
        let id = h.draw(ToolKind::Rectangle, (0.0, 0.0), (50.0, 50.0));
        h.tools.tool = ToolKind::Select;
        let entries = h.history.len();
        h.down(10.0, 10.0);
        h.drag_to(40.0, 40.0);
        assert!(!h.machine.is_idle());

        assert!(h.key(KeyEvent::plain(Key::Delete)));
        assert!(h.machine.is_idle());
        assert!(h.store.get(&id).is_none());
        assert_eq!(h.history.len(), entries + 1);

        let previous = h.history.undo().unwrap();
        h.store.restore(previous);
        let restored = h.store.get(&id).unwrap();
        assert!((restored.x - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_undo_redo_shortcuts() {
        let mut h = Harness::new();
        h.draw(ToolKind::Rectangle, (0.0, 0.0), (50.0, 50.0));
        h.draw(ToolKind::Circle, (60.0, 0.0), (90.0, 30.0));
        let undo = KeyEvent::new(Key::Character('z'), Modifiers::CTRL);
        let redo = KeyEvent::new(Key::Character('y'), Modifiers::CTRL);
        h.key(undo);
        assert_eq!(h.store.len(), 1);
        h.key(undo);
        assert!(h.store.is_empty());
        h.key(undo);
        assert!(h.store.is_empty());
        h.key(redo);
        h.key(redo);
        assert_eq!(h.store.len(), 2);
        assert_eq!(h.history.len(), 3);
    }

    #[test]
    fn test_undo_keys_ignored_while_editing() {
        let mut h = Harness::new();
        h.draw(ToolKind::Rectangle, (0.0, 0.0), (50.0, 50.0));
        h.tools.tool = ToolKind::Text;
        h.down(200.0, 200.0);
        let consumed = h.key(KeyEvent::new(Key::Character('z'), Modifiers::CTRL));
        assert!(!consumed);
        assert_eq!(h.store.len(), 2);
    }

    #[test]
    fn test_cancel_restores_drag() {
        let mut h = Harness::new();
        let id = h.draw(ToolKind::Rectangle, (0.0, 0.0), (50.0, 50.0));
        h.tools.tool = ToolKind::Select;
        h.down(10.0, 10.0);
        h.drag_to(110.0, 110.0);
        h.with(|m, ctx| m.cancel(ctx));
        assert!(h.machine.is_idle());
        let element = h.store.get(&id).unwrap();
        assert!((element.x - 0.0).abs() < f64::EPSILON);
        assert_eq!(h.history.len(), 2);
    }

    #[test]
    fn test_cancel_discards_drawing() {
        let mut h = Harness::new();
        h.tools.tool = ToolKind::Star;
        h.down(0.0, 0.0);
        h.drag_to(30.0, 30.0);
        h.with(|m, ctx| m.cancel(ctx));
        assert!(h.machine.is_idle());
        assert!(h.store.is_empty());
        h.up(30.0, 30.0);
        assert!(h.store.is_empty());
    }

    #[test]
    fn test_pointer_down_during_gesture_resets() {
        let mut h = Harness::new();
        h.tools.tool = ToolKind::Rectangle;
        h.down(0.0, 0.0);
        h.drag_to(30.0, 30.0);
        h.down(100.0, 100.0);
        h.drag_to(150.0, 120.0);
        h.up(150.0, 120.0);
        assert_eq!(h.store.len(), 1);
        assert!((h.store.elements()[0].x - 100.0).abs() < f64::EPSILON);
    }
}
