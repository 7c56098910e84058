//! Pointer and keyboard events consumed by the interaction engine.
//!
//! Positions are screen coordinates; the engine converts them to plane coordinates with the
//! store's camera.

use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Double-click detection constants.
pub const DOUBLE_CLICK_TIME_MS: u64 = 500;
pub const DOUBLE_CLICK_DISTANCE: f64 = 5.0;

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MouseButton {
    #[default]
    Left,
    Right,
    Middle,
}

/// Modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    pub const SHIFT: Modifiers = Modifiers {
        shift: true,
        ..Modifiers::NONE
    };

    pub const CTRL: Modifiers = Modifiers {
        ctrl: true,
        ..Modifiers::NONE
    };

    /// Ctrl on most platforms, Cmd on macOS.
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// Pointer event type for unified mouse/touch handling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    Down {
        position: Point,
        #[serde(default)]
        button: MouseButton,
        #[serde(default)]
        modifiers: Modifiers,
    },
    Up {
        position: Point,
        #[serde(default)]
        button: MouseButton,
    },
    Move {
        position: Point,
    },
    DoubleClick {
        position: Point,
    },
    /// Wheel or trackpad scroll. Positive `delta.y` is wheel forward.
    Wheel {
        position: Point,
        delta: Vec2,
        #[serde(default)]
        modifiers: Modifiers,
    },
}

/// Keys the engine reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Key {
    Character(char),
    Backspace,
    Delete,
    Enter,
    Escape,
    Left,
    Right,
    Home,
    End,
}

/// Keyboard event type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEvent {
    pub key: Key,
    #[serde(default)]
    pub modifiers: Modifiers,
}

impl KeyEvent {
    pub fn new(key: Key, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }

    /// Plain key press without modifiers.
    pub fn plain(key: Key) -> Self {
        Self::new(key, Modifiers::NONE)
    }

    /// Global shortcut bound to this key, if any.
    pub fn shortcut(&self) -> Option<Shortcut> {
        match self.key {
            Key::Character(c) if self.modifiers.command() => match c.to_ascii_lowercase() {
                'z' if self.modifiers.shift => Some(Shortcut::Redo),
                'z' => Some(Shortcut::Undo),
                'y' => Some(Shortcut::Redo),
                _ => None,
            },
            Key::Delete | Key::Backspace => Some(Shortcut::DeleteSelection),
            _ => None,
        }
    }
}

/// Global keyboard actions handled outside text editing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Shortcut {
    Undo,
    Redo,
    DeleteSelection,
}

/// Detects double clicks from a stream of pointer-down events.
#[derive(Debug, Clone)]
pub struct ClickTracker {
    last_click: Option<(Instant, Point)>,
    max_interval: Duration,
    max_distance: f64,
}

impl Default for ClickTracker {
    fn default() -> Self {
        Self::new(Duration::from_millis(DOUBLE_CLICK_TIME_MS), DOUBLE_CLICK_DISTANCE)
    }
}

impl ClickTracker {
    pub fn new(max_interval: Duration, max_distance: f64) -> Self {
        Self {
            last_click: None,
            max_interval,
            max_distance,
        }
    }

    /// Record a click. Returns true if it completes a double click.
    pub fn register(&mut self, position: Point, at: Instant) -> bool {
        if let Some((last_time, last_position)) = self.last_click {
            let elapsed = at.saturating_duration_since(last_time);
            if elapsed < self.max_interval && position.distance(last_position) < self.max_distance {
                // Reset so a triple click is not reported as a second double click
                self.last_click = None;
                return true;
            }
        }
        self.last_click = Some((at, position));
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_undo_redo_shortcuts() {
        let undo = KeyEvent::new(Key::Character('z'), Modifiers::CTRL);
        assert_eq!(undo.shortcut(), Some(Shortcut::Undo));

        let redo = KeyEvent::new(Key::Character('y'), Modifiers::CTRL);
        assert_eq!(redo.shortcut(), Some(Shortcut::Redo));

        let shift_redo = KeyEvent::new(
            Key::Character('Z'),
            Modifiers {
                shift: true,
                meta: true,
                ..Modifiers::NONE
            },
        );
        assert_eq!(shift_redo.shortcut(), Some(Shortcut::Redo));

        assert_eq!(KeyEvent::plain(Key::Character('z')).shortcut(), None);
    }

    #[test]
    fn test_delete_shortcut() {
        assert_eq!(KeyEvent::plain(Key::Delete).shortcut(), Some(Shortcut::DeleteSelection));
        assert_eq!(KeyEvent::plain(Key::Backspace).shortcut(), Some(Shortcut::DeleteSelection));
        assert_eq!(KeyEvent::plain(Key::Enter).shortcut(), None);
    }

    #[test]
    fn test_double_click_detection() {
        let mut tracker = ClickTracker::default();
        let start = Instant::now();
        assert!(!tracker.register(Point::new(100.0, 100.0), start));
        assert!(tracker.register(Point::new(101.0, 101.0), start + Duration::from_millis(200)));
        // third click starts a new sequence
        assert!(!tracker.register(Point::new(101.0, 101.0), start + Duration::from_millis(300)));
    }

    #[test]
    fn test_double_click_too_far_or_slow() {
        let mut tracker = ClickTracker::default();
        let start = Instant::now();
        tracker.register(Point::new(0.0, 0.0), start);
        assert!(!tracker.register(Point::new(50.0, 0.0), start + Duration::from_millis(100)));
        assert!(!tracker.register(Point::new(50.0, 0.0), start + Duration::from_millis(900)));
    }

    #[test]
    fn test_pointer_event_json() {
        let event: PointerEvent =
            serde_json::from_str(r#"{"Down":{"position":{"x":1.0,"y":2.0}}}"#).unwrap();
        assert_eq!(
            event,
            PointerEvent::Down {
                position: Point::new(1.0, 2.0),
                button: MouseButton::Left,
                modifiers: Modifiers::NONE,
            }
        );
    }
}
