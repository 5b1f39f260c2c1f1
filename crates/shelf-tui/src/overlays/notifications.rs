//! Notification panel.
//!
//! Lists the feed newest first. Opening the panel does not mark anything
//! read; `m` does.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use super::render_utils::{InputHint, OverlayConfig, render_overlay, render_separator};
use super::{OverlayAction, OverlayUpdate};
use crate::common::truncate_with_ellipsis;
use crate::state::{ChannelStatus, TuiState};

const PANEL_WIDTH: u16 = 64;
const PANEL_HEIGHT: u16 = 18;
// Status line, separator and hint footer.
const CHROME_ROWS: u16 = 3;

#[derive(Debug, Clone, Default)]
pub struct NotificationsState {
    /// Index of the first visible record.
    pub offset: usize,
}

impl NotificationsState {
    pub fn handle_key(&mut self, tui: &TuiState, key: KeyEvent) -> OverlayUpdate {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc | KeyCode::Char('q' | 'n') => OverlayUpdate::close(),
            KeyCode::Char('m') if !ctrl => OverlayUpdate::stay().with_action(OverlayAction::MarkAllRead),
            KeyCode::Up | KeyCode::Char('k') => {
                self.offset = self.offset.saturating_sub(1);
                OverlayUpdate::stay()
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.offset + 1 < tui.notifications.len() {
                    self.offset += 1;
                }
                OverlayUpdate::stay()
            }
            _ => OverlayUpdate::stay(),
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, tui: &TuiState) {
        let unread = tui.notifications.unread_count();
        let title = if unread > 0 {
            format!("Notifications ({unread} unread)")
        } else {
            "Notifications".to_string()
        };
        let hints = [
            InputHint::new("m", "mark all read"),
            InputHint::new("↑↓", "scroll"),
            InputHint::new("Esc", "close"),
        ];
        let layout = render_overlay(
            frame,
            area,
            &OverlayConfig {
                title: &title,
                border_color: Color::Yellow,
                width: PANEL_WIDTH,
                height: PANEL_HEIGHT,
                hints: &hints,
            },
        );
        let body = layout.body;
        if body.height == 0 {
            return;
        }

        frame.render_widget(
            Paragraph::new(status_line(tui)),
            Rect::new(body.x, body.y, body.width, 1),
        );
        render_separator(frame, body, 1);

        let list = Rect::new(
            body.x,
            body.y + body.height.min(2),
            body.width,
            body.height.saturating_sub(CHROME_ROWS - 1),
        );
        if tui.notifications.is_empty() {
            frame.render_widget(
                Paragraph::new(Span::styled(
                    "No notifications yet.",
                    Style::default().fg(Color::DarkGray),
                )),
                list,
            );
            return;
        }

        let max = usize::from(list.width).saturating_sub(13);
        let lines: Vec<Line> = tui
            .notifications
            .iter()
            .skip(self.offset)
            .take(usize::from(list.height))
            .map(|record| {
                let (marker, text_style) = if record.unread {
                    (
                        Span::styled("● ", Style::default().fg(Color::Yellow)),
                        Style::default().add_modifier(Modifier::BOLD),
                    )
                } else {
                    (Span::raw("  "), Style::default().fg(Color::Gray))
                };
                Line::from(vec![
                    marker,
                    Span::styled(
                        record.received_at.format("%H:%M:%S ").to_string(),
                        Style::default().fg(Color::DarkGray),
                    ),
                    Span::styled(truncate_with_ellipsis(&record.message, max), text_style),
                ])
            })
            .collect();
        frame.render_widget(Paragraph::new(lines), list);
    }
}

fn status_line(tui: &TuiState) -> Line<'static> {
    let (text, color) = match (&tui.session, &tui.channel) {
        (None, _) => ("Log in to receive notifications.".to_string(), Color::DarkGray),
        (Some(_), ChannelStatus::Live) => ("Listening for new reviews.".to_string(), Color::Green),
        (Some(_), ChannelStatus::Connecting) => ("Connecting…".to_string(), Color::Yellow),
        (Some(_), ChannelStatus::Off) => ("Not connected.".to_string(), Color::DarkGray),
        (Some(_), ChannelStatus::Closed { error: None }) => {
            ("Connection closed.".to_string(), Color::Gray)
        }
        (Some(_), ChannelStatus::Closed { error: Some(error) }) => {
            (format!("Connection lost: {error}"), Color::Red)
        }
    };
    Line::from(Span::styled(text, Style::default().fg(color)))
}
