//! Pure view/render functions for the TUI.
//!
//! Functions here take `&AppState`, draw to a ratatui Frame, and never
//! mutate state or return effects.

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Color;

use crate::overlays::OverlayExt;
use crate::overlays::render_utils::{InputHint, render_hints, render_separator};
use crate::screens::header;
use crate::state::AppState;

/// Spinner frames for loading indicators.
const SPINNER_FRAMES: &[&str] = &["◐", "◓", "◑", "◒"];

/// Ticks per spinner frame.
const SPINNER_SPEED_DIVISOR: usize = 6;

/// Horizontal padding around the screen body.
const BODY_MARGIN: u16 = 1;

pub fn spinner(spinner_frame: usize) -> &'static str {
    SPINNER_FRAMES[(spinner_frame / SPINNER_SPEED_DIVISOR) % SPINNER_FRAMES.len()]
}

/// Renders the entire TUI to the frame.
pub fn render(app: &AppState, frame: &mut Frame) {
    let area = frame.area();
    let state = &app.tui;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(area);

    header::render(frame, chunks[0], state);
    render_separator(frame, chunks[1], 0);

    let body = Rect::new(
        chunks[2].x + BODY_MARGIN,
        chunks[2].y,
        chunks[2].width.saturating_sub(BODY_MARGIN * 2),
        chunks[2].height,
    );
    state
        .screen
        .render(frame, body, state.viewer(), spinner(state.spinner_frame));

    let mut hints = state.screen.hints(state.viewer());
    if !state.screen.captures_text() {
        hints.push(InputHint::new("n", "notifications"));
    }
    render_hints(frame, chunks[3], &hints, Color::Cyan);

    app.overlay.render(frame, area, state);
}
