//! Inline text editing buffer.

use crate::input::{Key, KeyEvent};

/// Result of handling a text editing event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEditResult {
    /// Event was handled, text may have changed.
    Handled,
    /// User confirmed the edit.
    Commit,
    /// User abandoned the edit.
    Cancel,
    /// Event was not handled (pass to other handlers).
    NotHandled,
}

/// Text buffer with a caret, pre-filled from the element being edited.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TextEditState {
    text: String,
    /// Caret as a byte offset, always on a char boundary.
    cursor: usize,
}

impl TextEditState {
    /// Start editing `text` with the caret at the end.
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            cursor: text.len(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Line index and char column of the caret.
    pub fn caret_line_column(&self) -> (usize, usize) {
        let before = &self.text[..self.cursor];
        let line = before.matches('\n').count();
        let column = before.rsplit('\n').next().map_or(0, |tail| tail.chars().count());
        (line, column)
    }

    pub fn handle_key(&mut self, event: &KeyEvent) -> TextEditResult {
        if event.modifiers.command() {
            return TextEditResult::NotHandled;
        }
        match event.key {
            Key::Enter if event.modifiers.shift => {
                self.insert('\n');
                TextEditResult::Handled
            }
            Key::Enter => TextEditResult::Commit,
            Key::Escape => TextEditResult::Cancel,
            Key::Character(c) => {
                self.insert(c);
                TextEditResult::Handled
            }
            Key::Backspace => {
                if let Some(prev) = self.prev_boundary() {
                    self.text.replace_range(prev..self.cursor, "");
                    self.cursor = prev;
                }
                TextEditResult::Handled
            }
            Key::Delete => {
                if let Some(next) = self.next_boundary() {
                    self.text.replace_range(self.cursor..next, "");
                }
                TextEditResult::Handled
            }
            Key::Left => {
                if let Some(prev) = self.prev_boundary() {
                    self.cursor = prev;
                }
                TextEditResult::Handled
            }
            Key::Right => {
                if let Some(next) = self.next_boundary() {
                    self.cursor = next;
                }
                TextEditResult::Handled
            }
            Key::Home => {
                self.cursor = 0;
                TextEditResult::Handled
            }
            Key::End => {
                self.cursor = self.text.len();
                TextEditResult::Handled
            }
        }
    }

    fn insert(&mut self, c: char) {
        self.text.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    fn prev_boundary(&self) -> Option<usize> {
        self.text[..self.cursor].char_indices().next_back().map(|(i, _)| i)
    }

    fn next_boundary(&self) -> Option<usize> {
        self.text[self.cursor..]
            .chars()
            .next()
            .map(|c| self.cursor + c.len_utf8())
    }
}
