//! Application state composition.
//!
//! ```text
//! AppState
//! ├── tui: TuiState
//! │   ├── screen: Screen             (current page and its reads)
//! │   ├── session: Option<Session>   (mirror of the session store)
//! │   ├── notifications: NotificationFeed
//! │   ├── channel: ChannelStatus     (live socket state)
//! │   └── task_seq: TaskSeq          (write task id generator)
//! └── overlay: Option<Overlay>       (modal overlays)
//! ```
//!
//! State is split between `TuiState` and `Option<Overlay>` so overlay
//! handlers can get `&mut self` and `&TuiState` at the same time.

use shelf_core::models::{Session, User};
use shelf_core::notifications::NotificationFeed;

use crate::common::TaskSeq;
use crate::overlays::Overlay;
use crate::screens::{HomeState, Screen};

// ============================================================================
// AppState (Combined State)
// ============================================================================

pub struct AppState {
    pub tui: TuiState,
    pub overlay: Option<Overlay>,
}

impl AppState {
    /// Starts logged out on an empty home screen. The runtime follows up
    /// with [`crate::update::start`] to load the session and the book list.
    pub fn new(notification_limit: usize) -> Self {
        Self {
            tui: TuiState::new(notification_limit),
            overlay: None,
        }
    }
}

// ============================================================================
// TuiState
// ============================================================================

/// State of the live notification socket as the views see it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelStatus {
    Off,
    /// Opened but the socket handshake has not finished.
    Connecting,
    Live,
    Closed { error: Option<String> },
}

pub struct TuiState {
    pub screen: Screen,
    pub session: Option<Session>,
    pub notifications: NotificationFeed,
    pub channel: ChannelStatus,
    pub task_seq: TaskSeq,
    pub should_quit: bool,
    pub spinner_frame: usize,
    pub terminal_size: (u16, u16),
}

impl TuiState {
    fn new(notification_limit: usize) -> Self {
        Self {
            screen: Screen::Home(HomeState::default()),
            session: None,
            notifications: NotificationFeed::new(notification_limit),
            channel: ChannelStatus::Off,
            task_seq: TaskSeq::default(),
            should_quit: false,
            spinner_frame: 0,
            terminal_size: (0, 0),
        }
    }

    pub fn viewer(&self) -> Option<&User> {
        self.session.as_ref().map(|s| &s.user)
    }

    pub fn is_logged_in(&self) -> bool {
        self.session.is_some()
    }

    /// Whether the runtime should poll fast to keep the spinner moving.
    pub fn is_busy(&self) -> bool {
        self.screen.is_busy()
    }

    pub fn screen_title(&self) -> &'static str {
        match &self.screen {
            Screen::Home(_) => "Books",
            Screen::Book(_) => "Book",
            Screen::BookForm(s) => match s.mode {
                crate::screens::book_form::BookFormMode::Create => "Publish",
                crate::screens::book_form::BookFormMode::Edit { .. } => "Edit",
            },
            Screen::CategoryForm(_) => "Categories",
            Screen::Auth(s) => match s.mode {
                crate::screens::AuthMode::Login => "Login",
                crate::screens::AuthMode::Register => "Register",
            },
        }
    }
}
