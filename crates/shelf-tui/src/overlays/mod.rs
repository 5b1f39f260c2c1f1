//! Overlay modules for the TUI.
//!
//! Overlays are modal UI components that temporarily take over keyboard input.
//! Each overlay is self-contained: it owns its state, key handler, and render function.
//!
//! ## Module Structure
//!
//! - `notifications.rs`: Notification panel (`n` or Ctrl+N)
//! - `confirm.rs`: Delete confirmation for a book
//! - `render_utils.rs`: Shared rendering utilities for overlays

pub mod confirm;
pub mod notifications;
pub mod render_utils;

pub use confirm::ConfirmDeleteState;
use crossterm::event::KeyEvent;
pub use notifications::NotificationsState;
use ratatui::Frame;
use ratatui::layout::Rect;

use crate::state::TuiState;

// ============================================================================
// OverlayRequest / OverlayTransition / OverlayUpdate
// ============================================================================

/// Requests to open a new overlay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverlayRequest {
    Notifications,
    ConfirmDeleteBook { id: String, title: String },
}

/// Transition returned by overlay key handlers.
#[derive(Debug, PartialEq, Eq)]
pub enum OverlayTransition {
    Stay,
    Close,
}

/// Changes an overlay asks the reducer to make outside its own state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverlayAction {
    MarkAllRead,
    DeleteBook { id: String },
}

/// Update returned by overlay key handlers.
#[derive(Debug)]
pub struct OverlayUpdate {
    pub transition: OverlayTransition,
    pub actions: Vec<OverlayAction>,
}

impl OverlayUpdate {
    fn new(transition: OverlayTransition) -> Self {
        Self {
            transition,
            actions: Vec::new(),
        }
    }

    pub fn stay() -> Self {
        Self::new(OverlayTransition::Stay)
    }

    pub fn close() -> Self {
        Self::new(OverlayTransition::Close)
    }

    #[must_use]
    pub fn with_action(mut self, action: OverlayAction) -> Self {
        self.actions.push(action);
        self
    }
}

// ============================================================================
// Overlay
// ============================================================================

#[derive(Debug)]
pub enum Overlay {
    Notifications(NotificationsState),
    ConfirmDelete(ConfirmDeleteState),
}

impl Overlay {
    pub fn open(request: OverlayRequest) -> Self {
        match request {
            OverlayRequest::Notifications => Overlay::Notifications(NotificationsState::default()),
            OverlayRequest::ConfirmDeleteBook { id, title } => {
                Overlay::ConfirmDelete(ConfirmDeleteState { id, title })
            }
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, tui: &TuiState) {
        match self {
            Overlay::Notifications(n) => n.render(frame, area, tui),
            Overlay::ConfirmDelete(c) => c.render(frame, area),
        }
    }

    pub fn handle_key(&mut self, tui: &TuiState, key: KeyEvent) -> OverlayUpdate {
        match self {
            Overlay::Notifications(n) => n.handle_key(tui, key),
            Overlay::ConfirmDelete(c) => c.handle_key(key),
        }
    }
}

// ============================================================================
// OverlayExt - Extension trait for Option<Overlay>
// ============================================================================

/// Extension trait for `Option<Overlay>` providing convenience render helpers.
pub trait OverlayExt {
    /// Renders the overlay if one is active.
    fn render(&self, frame: &mut Frame, area: Rect, tui: &TuiState);
}

impl OverlayExt for Option<Overlay> {
    fn render(&self, frame: &mut Frame, area: Rect, tui: &TuiState) {
        if let Some(overlay) = self {
            overlay.render(frame, area, tui);
        }
    }
}
