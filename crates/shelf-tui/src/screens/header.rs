//! Top bar: app name, current user, unread badge and channel state.

use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::state::{ChannelStatus, TuiState};

pub fn render(frame: &mut Frame, area: Rect, tui: &TuiState) {
    let left = Line::from(vec![
        Span::styled(
            " Shelf ",
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::styled(tui.screen_title(), Style::default().fg(Color::Gray)),
    ]);
    frame.render_widget(Paragraph::new(left), area);

    let mut right = Vec::new();
    let unread = tui.notifications.unread_count();
    if unread > 0 {
        right.push(Span::styled(
            format!("● {unread} new "),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ));
    }
    match &tui.session {
        Some(session) => {
            let channel_color = match tui.channel {
                ChannelStatus::Live => Color::Green,
                ChannelStatus::Connecting => Color::Yellow,
                ChannelStatus::Off => Color::DarkGray,
                ChannelStatus::Closed { .. } => Color::Red,
            };
            right.push(Span::styled("◆ ", Style::default().fg(channel_color)));
            right.push(Span::styled(
                session.user.username.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            ));
        }
        None => right.push(Span::styled(
            "not logged in",
            Style::default().fg(Color::DarkGray),
        )),
    }
    right.push(Span::raw(" "));
    frame.render_widget(
        Paragraph::new(Line::from(right)).alignment(Alignment::Right),
        area,
    );
}
