//! Labelled text fields with a shared focus ring.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use super::text_field::TextField;
use crate::overlays::render_utils::{InputLine, render_input_line};

/// Rows one field occupies when rendered (label + input).
pub const FIELD_HEIGHT: u16 = 2;

#[derive(Debug, Clone)]
pub struct FormField {
    pub label: &'static str,
    pub placeholder: &'static str,
    pub secret: bool,
    pub input: TextField,
}

impl FormField {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            placeholder: "",
            secret: false,
            input: TextField::default(),
        }
    }

    #[must_use]
    pub fn placeholder(mut self, placeholder: &'static str) -> Self {
        self.placeholder = placeholder;
        self
    }

    #[must_use]
    pub fn secret(mut self) -> Self {
        self.secret = true;
        self
    }

    #[must_use]
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.input.set(value);
        self
    }
}

/// Outcome of a key press on a form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKey {
    Submit,
    Cancel,
    Consumed,
    /// The key belongs to a non-text slot (see [`Form::with_extra_slots`]).
    Ignored,
}

#[derive(Debug, Clone)]
pub struct Form {
    fields: Vec<FormField>,
    /// Focusable slots after the text fields, owned by the screen.
    extra_slots: usize,
    focus: usize,
}

impl Form {
    pub fn new(fields: Vec<FormField>) -> Self {
        Self {
            fields,
            extra_slots: 0,
            focus: 0,
        }
    }

    #[must_use]
    pub fn with_extra_slots(mut self, extra_slots: usize) -> Self {
        self.extra_slots = extra_slots;
        self
    }

    pub fn value(&self, index: usize) -> &str {
        self.fields.get(index).map_or("", |f| f.input.value())
    }

    pub fn set_value(&mut self, index: usize, value: impl Into<String>) {
        if let Some(field) = self.fields.get_mut(index) {
            field.input.set(value);
        }
    }

    pub fn clear(&mut self) {
        for field in &mut self.fields {
            field.input.clear();
        }
        self.focus = 0;
    }

    pub fn focus(&self) -> usize {
        self.focus
    }

    /// Index of the focused extra slot, if focus is past the text fields.
    pub fn focused_extra(&self) -> Option<usize> {
        self.focus.checked_sub(self.fields.len())
    }

    fn slots(&self) -> usize {
        self.fields.len() + self.extra_slots
    }

    fn focus_next(&mut self) {
        self.focus = (self.focus + 1) % self.slots().max(1);
    }

    fn focus_prev(&mut self) {
        let slots = self.slots().max(1);
        self.focus = (self.focus + slots - 1) % slots;
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> FormKey {
        match key.code {
            KeyCode::Esc => FormKey::Cancel,
            KeyCode::Enter => FormKey::Submit,
            KeyCode::Tab | KeyCode::Down => {
                self.focus_next();
                FormKey::Consumed
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.focus_prev();
                FormKey::Consumed
            }
            _ => match self.fields.get_mut(self.focus) {
                Some(field) => {
                    if field.input.handle_key(key) {
                        FormKey::Consumed
                    } else {
                        FormKey::Ignored
                    }
                }
                None => FormKey::Ignored,
            },
        }
    }

    pub fn paste(&mut self, text: &str) {
        if let Some(field) = self.fields.get_mut(self.focus) {
            field.input.insert_str(text);
        }
    }

    /// Rows needed to render the text fields.
    pub fn height(&self) -> u16 {
        self.fields.len() as u16 * FIELD_HEIGHT
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, disabled: bool) {
        for (i, field) in self.fields.iter().enumerate() {
            let y = area.y + i as u16 * FIELD_HEIGHT;
            if y + 1 >= area.y + area.height {
                break;
            }
            let focused = i == self.focus && !disabled;
            let label_style = if focused {
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            };
            frame.render_widget(
                Paragraph::new(Line::from(Span::styled(field.label, label_style))),
                Rect::new(area.x, y, area.width, 1),
            );

            let masked;
            let value = if field.secret {
                masked = "•".repeat(field.input.value().chars().count());
                masked.as_str()
            } else {
                field.input.value()
            };
            let input_area = Rect::new(area.x, y + 1, area.width, 1);
            if focused {
                render_input_line(
                    frame,
                    input_area,
                    &InputLine {
                        value,
                        placeholder: Some(field.placeholder).filter(|p| !p.is_empty()),
                        prompt: "> ",
                        prompt_color: Color::Cyan,
                        text_color: Color::White,
                        placeholder_color: Color::DarkGray,
                        cursor_color: Color::Cyan,
                    },
                );
            } else {
                let (text, color) = if value.is_empty() {
                    (field.placeholder, Color::DarkGray)
                } else {
                    (value, Color::White)
                };
                frame.render_widget(
                    Paragraph::new(Line::from(vec![
                        Span::raw("  "),
                        Span::styled(text.to_string(), Style::default().fg(color)),
                    ])),
                    input_area,
                );
            }
        }
    }
}
