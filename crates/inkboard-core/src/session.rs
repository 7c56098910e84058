//! Whiteboard session context.
//!
//! [`Whiteboard`] owns one board's store, history, tool settings and interaction machine and
//! is the entry point hosts drive. Discrete commands (align, rotate, template insertion, ...)
//! commit a history entry only when they changed something.

use crate::arrange::{AlignDirection, DistributeAxis};
use crate::camera::ZOOM_STEP;
use crate::canvas::{CanvasState, ChangeOrigin, ElementStore, StoreChange, SubscriptionId};
use crate::config::EngineConfig;
use crate::element::{DrawingElement, ElementId};
use crate::error::CanvasResult;
use crate::history::History;
use crate::input::{ClickTracker, KeyEvent, MouseButton, PointerEvent};
use crate::interaction::{InteractionContext, InteractionMachine, TextOverlay};
use crate::sync::{SyncChannel, SyncMessage};
use crate::templates::Template;
use crate::text::{ApproxTextMeasure, TextMeasure};
use crate::tools::{ToolKind, ToolSettings};
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Rotation step of the rotate left/right commands, in degrees.
pub const ROTATION_STEP: f64 = 15.0;

struct SyncLink {
    channel: Rc<dyn SyncChannel>,
    subscription: SubscriptionId,
}

/// A single board: document state plus the machinery that edits it.
pub struct Whiteboard {
    store: ElementStore,
    history: History,
    tools: ToolSettings,
    config: EngineConfig,
    machine: InteractionMachine,
    clicks: ClickTracker,
    /// Set when the last pointer-down completed a double click; fired on the next release.
    pending_double_click: bool,
    measure: Box<dyn TextMeasure>,
    sync: Option<SyncLink>,
}

impl Default for Whiteboard {
    fn default() -> Self {
        Self::new()
    }
}

impl Whiteboard {
    /// Create an empty board with default settings.
    pub fn new() -> Self {
        Self::with_settings(ToolSettings::default(), EngineConfig::default())
    }

    /// Create an empty board. History is seeded with the empty state.
    pub fn with_settings(tools: ToolSettings, config: EngineConfig) -> Self {
        let store = ElementStore::new();
        let mut history = History::with_capacity(config.history_capacity);
        history.add_state(&store.snapshot());
        Self {
            store,
            history,
            tools,
            config,
            machine: InteractionMachine::new(),
            clicks: ClickTracker::new(
                Duration::from_millis(config.double_click_ms),
                config.double_click_distance,
            ),
            pending_double_click: false,
            measure: Box::new(ApproxTextMeasure),
            sync: None,
        }
    }

    /// Replace the text measurement used for hit-testing and text commits.
    pub fn with_measure(mut self, measure: Box<dyn TextMeasure>) -> Self {
        self.measure = measure;
        self
    }

    pub fn store(&self) -> &ElementStore {
        &self.store
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn tools(&self) -> &ToolSettings {
        &self.tools
    }

    /// Mutable access to style defaults. Use [`Whiteboard::set_tool`] to switch tools.
    pub fn tools_mut(&mut self) -> &mut ToolSettings {
        &mut self.tools
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn machine(&self) -> &InteractionMachine {
        &self.machine
    }

    pub fn measure(&self) -> &dyn TextMeasure {
        self.measure.as_ref()
    }

    /// Element currently being drawn.
    pub fn preview(&self) -> Option<&DrawingElement> {
        self.machine.preview()
    }

    /// Inline editor placement while editing text.
    pub fn text_overlay(&self) -> Option<TextOverlay> {
        self.machine.text_overlay(&self.store, self.measure.as_ref())
    }

    pub fn subscribe(&mut self, observer: impl FnMut(&ElementStore, &StoreChange) + 'static) -> SubscriptionId {
        self.store.subscribe(observer)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.store.unsubscribe(id)
    }

    fn with_ctx<R>(&mut self, f: impl FnOnce(&mut InteractionMachine, &mut InteractionContext<'_>) -> R) -> R {
        let mut ctx = InteractionContext {
            store: &mut self.store,
            history: &mut self.history,
            tools: &self.tools,
            config: &self.config,
            measure: self.measure.as_ref(),
        };
        f(&mut self.machine, &mut ctx)
    }

    /// Feed a pointer event to the interaction machine.
    ///
    /// Two left presses within the configured window and distance produce a
    /// [`PointerEvent::DoubleClick`] after the second release, so hosts only forward raw
    /// presses and releases.
    pub fn handle_pointer(&mut self, event: PointerEvent) {
        self.handle_pointer_at(event, Instant::now());
    }

    /// [`Whiteboard::handle_pointer`] with an explicit event timestamp.
    pub fn handle_pointer_at(&mut self, event: PointerEvent, at: Instant) {
        if let PointerEvent::Down {
            position,
            button: MouseButton::Left,
            ..
        } = event
        {
            self.pending_double_click = self.clicks.register(position, at);
        }
        self.with_ctx(|machine, ctx| machine.handle_pointer(ctx, event));

        if let PointerEvent::Up {
            position,
            button: MouseButton::Left,
        } = event
        {
            if std::mem::take(&mut self.pending_double_click) {
                log::debug!("Double click at {position:?}");
                self.with_ctx(|machine, ctx| {
                    machine.handle_pointer(ctx, PointerEvent::DoubleClick { position })
                });
            }
        }
    }

    /// Feed a key event. Returns true if it was consumed.
    pub fn handle_key(&mut self, event: &KeyEvent) -> bool {
        self.with_ctx(|machine, ctx| machine.handle_key(ctx, event))
    }

    /// Abandon any in-flight gesture, e.g. when the window loses focus.
    pub fn cancel_gesture(&mut self) {
        self.with_ctx(|machine, ctx| machine.cancel(ctx));
    }

    /// Switch tools, cancelling any in-flight gesture.
    pub fn set_tool(&mut self, tool: ToolKind) {
        self.cancel_gesture();
        log::debug!("Tool changed to {tool:?}");
        self.tools.tool = tool;
    }

    /// Push the current state onto the history.
    pub fn commit(&mut self) {
        self.history.add_state(&self.store.snapshot());
    }

    fn commit_if(&mut self, changed: bool) -> bool {
        if changed {
            self.commit();
        }
        changed
    }

    /// Restore the previous history entry. Returns false at the start of history.
    pub fn undo(&mut self) -> bool {
        self.cancel_gesture();
        match self.history.undo() {
            Some(state) => {
                self.store.restore(state);
                true
            }
            None => false,
        }
    }

    /// Restore the next history entry. Returns false at the end of history.
    pub fn redo(&mut self) -> bool {
        self.cancel_gesture();
        match self.history.redo() {
            Some(state) => {
                self.store.restore(state);
                true
            }
            None => false,
        }
    }

    pub fn delete_selected(&mut self) -> bool {
        let changed = self.store.delete_selected() > 0;
        self.commit_if(changed)
    }

    pub fn select(&mut self, id: &str, additive: bool) {
        self.store.select(id, additive);
    }

    pub fn clear_selection(&mut self) {
        self.store.clear_selection();
    }

    pub fn align(&mut self, direction: AlignDirection) -> bool {
        let changed = self.store.align(direction);
        self.commit_if(changed)
    }

    pub fn distribute(&mut self, axis: DistributeAxis) -> bool {
        let changed = self.store.distribute(axis);
        self.commit_if(changed)
    }

    pub fn group(&mut self) -> Option<String> {
        let group = self.store.group();
        self.commit_if(group.is_some());
        group
    }

    pub fn ungroup(&mut self) -> bool {
        let changed = self.store.ungroup();
        self.commit_if(changed)
    }

    pub fn bring_to_front(&mut self) -> bool {
        let changed = self.store.bring_to_front();
        self.commit_if(changed)
    }

    pub fn send_to_back(&mut self) -> bool {
        let changed = self.store.send_to_back();
        self.commit_if(changed)
    }

    pub fn rotate(&mut self, degrees: f64) -> bool {
        let changed = self.store.rotate(degrees);
        self.commit_if(changed)
    }

    pub fn rotate_left(&mut self) -> bool {
        self.rotate(-ROTATION_STEP)
    }

    pub fn rotate_right(&mut self) -> bool {
        self.rotate(ROTATION_STEP)
    }

    /// Change font settings and apply them to selected text-bearing elements.
    pub fn update_text_style(&mut self, edit: impl FnOnce(&mut ToolSettings)) -> bool {
        edit(&mut self.tools);
        let style = self.tools.text_style();
        let changed = self.store.update_selected_text_style(&style);
        self.commit_if(changed)
    }

    /// Set width and/or height of the selection. Non-positive values are ignored.
    pub fn set_selected_dimensions(&mut self, width: Option<f64>, height: Option<f64>) -> bool {
        let valid = |value: Option<f64>| value.filter(|v| v.is_finite() && *v > 0.0);
        let changed = self
            .store
            .update_selected_dimensions(valid(width), valid(height));
        self.commit_if(changed)
    }

    /// Add several elements above everything else with a single history entry.
    pub fn add_elements(&mut self, elements: Vec<DrawingElement>) -> Vec<ElementId> {
        let ids = self.store.add_many(elements);
        self.commit_if(!ids.is_empty());
        ids
    }

    pub fn insert_template(&mut self, template: Template) -> Vec<ElementId> {
        log::info!("Inserting template {template}");
        self.add_elements(template.elements())
    }

    pub fn zoom_in(&mut self) {
        let zoom = self.store.zoom() * ZOOM_STEP;
        self.store.set_zoom(zoom);
    }

    pub fn zoom_out(&mut self) {
        let zoom = self.store.zoom() / ZOOM_STEP;
        self.store.set_zoom(zoom);
    }

    pub fn reset_view(&mut self) {
        self.store.reset_view();
    }

    pub fn set_snap_to_grid(&mut self, enabled: bool) {
        self.store.set_snap_to_grid(enabled);
    }

    pub fn set_grid_size(&mut self, size: f64) {
        self.store.set_grid_size(size);
    }

    /// Empty the board and restart history from the empty state.
    pub fn clear_canvas(&mut self) {
        self.cancel_gesture();
        self.store.clear();
        self.history.clear();
        self.commit();
    }

    pub fn snapshot(&self) -> CanvasState {
        self.store.snapshot()
    }

    pub fn export_json(&self) -> CanvasResult<String> {
        self.store.to_json()
    }

    /// Replace the board with a JSON snapshot. On failure nothing changes.
    pub fn try_import_json(&mut self, json: &str) -> CanvasResult<()> {
        let state = CanvasState::from_json(json)?;
        self.cancel_gesture();
        log::info!("Importing {} elements", state.elements.len());
        self.store.restore(state);
        self.history.clear();
        self.commit();
        Ok(())
    }

    /// Boolean form of [`Whiteboard::try_import_json`].
    pub fn import_json(&mut self, json: &str) -> bool {
        match self.try_import_json(json) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Import failed: {e}");
                false
            }
        }
    }

    /// Publish every local change to `channel` and accept remote snapshots from it.
    pub fn connect_sync(&mut self, channel: Rc<dyn SyncChannel>) {
        self.disconnect_sync();
        let publisher = Rc::clone(&channel);
        let subscription = self.store.subscribe(move |store, change| {
            if change.origin == ChangeOrigin::Remote {
                return;
            }
            let message = SyncMessage {
                origin_id: publisher.origin_id().to_string(),
                state: store.snapshot(),
            };
            if let Err(e) = publisher.publish(&message) {
                log::warn!("Failed to publish sync message: {e}");
            }
        });
        log::info!("Sync connected as {}", channel.origin_id());
        self.sync = Some(SyncLink {
            channel,
            subscription,
        });
    }

    pub fn disconnect_sync(&mut self) {
        if let Some(link) = self.sync.take() {
            self.store.unsubscribe(link.subscription);
            log::info!("Sync disconnected");
        }
    }

    /// Apply pending remote snapshots. Returns how many were applied.
    pub fn poll_sync(&mut self) -> usize {
        let Some(link) = &self.sync else {
            return 0;
        };
        let own_origin = link.channel.origin_id().to_string();
        let messages = link.channel.poll();
        let mut applied = 0;
        for message in messages {
            if message.origin_id == own_origin {
                log::debug!("Skipping self-originated sync message");
                continue;
            }
            if let Err(e) = message.state.validate() {
                log::warn!("Rejecting remote snapshot from {}: {e}", message.origin_id);
                continue;
            }
            self.cancel_gesture();
            log::debug!("Applying remote snapshot from {}", message.origin_id);
            self.store.apply_remote(message.state);
            applied += 1;
        }
        applied
    }
}
