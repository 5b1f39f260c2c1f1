//! Confirmation before deleting a book.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Wrap};

use super::render_utils::{InputHint, OverlayConfig, render_overlay};
use super::{OverlayAction, OverlayUpdate};
use crate::common::truncate_with_ellipsis;

#[derive(Debug, Clone)]
pub struct ConfirmDeleteState {
    pub id: String,
    pub title: String,
}

impl ConfirmDeleteState {
    pub fn handle_key(&mut self, key: KeyEvent) -> OverlayUpdate {
        match key.code {
            KeyCode::Char('y' | 'Y') | KeyCode::Enter => {
                OverlayUpdate::close().with_action(OverlayAction::DeleteBook {
                    id: self.id.clone(),
                })
            }
            KeyCode::Char('n' | 'N' | 'q') | KeyCode::Esc => OverlayUpdate::close(),
            _ => OverlayUpdate::stay(),
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let hints = [InputHint::new("y", "delete"), InputHint::new("n", "cancel")];
        let layout = render_overlay(
            frame,
            area,
            &OverlayConfig {
                title: "Delete book",
                border_color: Color::Red,
                width: 50,
                height: 7,
                hints: &hints,
            },
        );
        let max = usize::from(layout.body.width).saturating_sub(4);
        let lines = vec![
            Line::from(vec![
                Span::raw("Delete "),
                Span::styled(
                    format!("\"{}\"", truncate_with_ellipsis(&self.title, max)),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::raw("?"),
            ]),
            Line::from(Span::styled(
                "Its reviews go with it. This cannot be undone.",
                Style::default().fg(Color::Gray),
            )),
        ];
        frame.render_widget(
            Paragraph::new(lines).wrap(Wrap { trim: false }),
            layout.body,
        );
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::KeyModifiers;

    use super::*;
    use crate::overlays::OverlayTransition;

    fn state() -> ConfirmDeleteState {
        ConfirmDeleteState {
            id: "b1".to_string(),
            title: "Dune".to_string(),
        }
    }

    #[test]
    fn test_yes_closes_with_delete() {
        let update = state().handle_key(KeyEvent::new(KeyCode::Char('y'), KeyModifiers::NONE));
        assert_eq!(update.transition, OverlayTransition::Close);
        assert_eq!(
            update.actions,
            vec![OverlayAction::DeleteBook {
                id: "b1".to_string()
            }]
        );
    }

    #[test]
    fn test_escape_closes_without_delete() {
        let update = state().handle_key(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE));
        assert_eq!(update.transition, OverlayTransition::Close);
        assert!(update.actions.is_empty());
    }
}
