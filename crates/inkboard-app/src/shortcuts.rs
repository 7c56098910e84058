//! Key bindings, derived from the engine's own key decoding.

use inkboard_core::input::{Key, KeyEvent, Modifiers, Shortcut as Action};

/// Every action the engine handles outside text editing.
pub const ACTIONS: [Action; 3] = [Action::Undo, Action::Redo, Action::DeleteSelection];

const CANDIDATE_KEYS: [Key; 4] = [
    Key::Character('z'),
    Key::Character('y'),
    Key::Delete,
    Key::Backspace,
];

const CTRL_SHIFT: Modifiers = Modifiers {
    ctrl: true,
    shift: true,
    ..Modifiers::NONE
};

/// Checked from fewest to most modifiers; only the first chord per key and action is listed.
const CANDIDATE_MODIFIERS: [Modifiers; 3] = [Modifiers::NONE, Modifiers::CTRL, CTRL_SHIFT];

/// Pointer and editing gestures handled by the interaction machine rather than key decoding.
const GESTURES: [(&str, &str); 6] = [
    ("Enter", "Commit text while editing"),
    ("Shift+Enter", "New line while editing"),
    ("Escape", "Cancel text editing"),
    ("Ctrl+Wheel", "Zoom in or out"),
    ("Shift+Click", "Add to selection"),
    ("Double-click", "Edit element text"),
];

/// An engine action and the chords that trigger it.
#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    pub action: Action,
    pub chords: Vec<KeyEvent>,
}

impl Binding {
    pub fn description(&self) -> &'static str {
        match self.action {
            Action::Undo => "Undo",
            Action::Redo => "Redo",
            Action::DeleteSelection => "Delete selected elements",
        }
    }

    /// Chords joined for display, e.g. "Ctrl+Shift+Z, Ctrl+Y".
    pub fn chord_labels(&self) -> String {
        self.chords.iter().map(chord_label).collect::<Vec<_>>().join(", ")
    }
}

/// Display form of a chord. Ctrl stands for Cmd on macOS.
pub fn chord_label(event: &KeyEvent) -> String {
    let key = match event.key {
        Key::Character(c) => c.to_ascii_uppercase().to_string(),
        other => format!("{other:?}"),
    };
    let mut label = String::new();
    if event.modifiers.command() {
        label.push_str("Ctrl+");
    }
    if event.modifiers.shift {
        label.push_str("Shift+");
    }
    label.push_str(&key);
    label
}

/// Registry of all keyboard shortcuts.
pub struct ShortcutRegistry;

impl ShortcutRegistry {
    /// One binding per engine action, in [`ACTIONS`] order.
    pub fn bindings() -> Vec<Binding> {
        let mut bindings: Vec<Binding> = ACTIONS
            .iter()
            .map(|&action| Binding {
                action,
                chords: Vec::new(),
            })
            .collect();
        for key in CANDIDATE_KEYS {
            let mut seen = Vec::new();
            for modifiers in CANDIDATE_MODIFIERS {
                let event = KeyEvent::new(key, modifiers);
                let Some(action) = event.shortcut() else {
                    continue;
                };
                if seen.contains(&action) {
                    continue;
                }
                seen.push(action);
                if let Some(binding) = bindings.iter_mut().find(|b| b.action == action) {
                    binding.chords.push(event);
                }
            }
        }
        bindings
    }

    /// Print all shortcuts to console.
    pub fn print_all() {
        println!("\n=== Keyboard Shortcuts ===");
        for binding in Self::bindings() {
            println!("  {:24} {}", binding.chord_labels(), binding.description());
        }
        for (gesture, description) in GESTURES {
            println!("  {gesture:24} {description}");
        }
        println!();
    }
}
