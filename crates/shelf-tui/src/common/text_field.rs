//! Single-line text field for form input.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// A line of editable text with a char-indexed cursor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextField {
    value: String,
    cursor: usize,
}

impl TextField {
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        let cursor = value.chars().count();
        Self { value, cursor }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn set(&mut self, value: impl Into<String>) {
        *self = Self::new(value);
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn insert_str(&mut self, text: &str) {
        for ch in text.chars().filter(|c| !c.is_control()) {
            self.insert_char(ch);
        }
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.value
            .char_indices()
            .nth(char_index)
            .map_or(self.value.len(), |(i, _)| i)
    }

    fn insert_char(&mut self, ch: char) {
        let at = self.byte_index(self.cursor);
        self.value.insert(at, ch);
        self.cursor += 1;
    }

    /// Applies an editing key. Returns `false` for keys the field does not
    /// handle so the caller can treat them as navigation.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('u') if ctrl => {
                self.clear();
                true
            }
            KeyCode::Char(_) if ctrl => false,
            KeyCode::Char(ch) => {
                self.insert_char(ch);
                true
            }
            KeyCode::Backspace => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                    let at = self.byte_index(self.cursor);
                    self.value.remove(at);
                }
                true
            }
            KeyCode::Delete => {
                if self.cursor < self.value.chars().count() {
                    let at = self.byte_index(self.cursor);
                    self.value.remove(at);
                }
                true
            }
            KeyCode::Left => {
                self.cursor = self.cursor.saturating_sub(1);
                true
            }
            KeyCode::Right => {
                self.cursor = (self.cursor + 1).min(self.value.chars().count());
                true
            }
            KeyCode::Home => {
                self.cursor = 0;
                true
            }
            KeyCode::End => {
                self.cursor = self.value.chars().count();
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_typing_and_backspace() {
        let mut field = TextField::default();
        for ch in "héllo".chars() {
            field.handle_key(key(KeyCode::Char(ch)));
        }
        field.handle_key(key(KeyCode::Backspace));
        assert_eq!(field.value(), "héll");
        assert_eq!(field.cursor(), 4);
    }

    #[test]
    fn test_insert_mid_line() {
        let mut field = TextField::new("ac");
        field.handle_key(key(KeyCode::Left));
        field.handle_key(key(KeyCode::Char('b')));
        assert_eq!(field.value(), "abc");
    }

    #[test]
    fn test_paste_drops_control_chars() {
        let mut field = TextField::default();
        field.insert_str("a\nb\tc");
        assert_eq!(field.value(), "abc");
    }

    #[test]
    fn test_navigation_keys_are_not_consumed() {
        let mut field = TextField::default();
        assert!(!field.handle_key(key(KeyCode::Enter)));
        assert!(!field.handle_key(key(KeyCode::Tab)));
        assert!(!field.handle_key(KeyEvent::new(KeyCode::Char('n'), KeyModifiers::CONTROL)));
    }
}
