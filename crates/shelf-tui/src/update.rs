//! TUI reducer (update function).
//!
//! All state mutations happen here. The runtime calls `update(app, event)`
//! and executes the returned effects.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use shelf_core::models::Session;
use shelf_core::notifications::{ChannelEvent, REVIEW_CREATED_MESSAGE};

use crate::effects::UiEffect;
use crate::events::UiEvent;
use crate::overlays::{Overlay, OverlayAction, OverlayRequest, OverlayTransition, OverlayUpdate};
use crate::screens::{Route, Screen, ScreenCtx, ScreenUpdate};
use crate::state::{AppState, ChannelStatus, TuiState};

/// First effects after launch: adopt the restored session and load the
/// book list.
pub fn start(app: &mut AppState, session: Option<Session>) -> Vec<UiEffect> {
    let mut effects = update(app, UiEvent::SessionChanged(session));
    effects.extend(navigate(app, Route::Home));
    effects
}

/// The main reducer function.
///
/// Takes the current state and an event, mutates state, and returns effects
/// for the runtime to execute.
pub fn update(app: &mut AppState, event: UiEvent) -> Vec<UiEffect> {
    match event {
        UiEvent::Tick => {
            app.tui.spinner_frame = app.tui.spinner_frame.wrapping_add(1);
            vec![]
        }
        UiEvent::Frame { width, height } => {
            app.tui.terminal_size = (width, height);
            vec![]
        }
        UiEvent::Terminal(term_event) => handle_terminal_event(app, term_event),
        UiEvent::QueryLoaded { key, result } => app.tui.screen.on_query(&key, &result),
        UiEvent::CacheUpdated(key) => match app.tui.screen.watched(&key) {
            Some(query) => vec![UiEffect::ReadCached { query }],
            None => vec![],
        },
        UiEvent::MutationFinished { task, kind, result } => {
            let update = app.tui.screen.on_mutation(task, kind, &result);
            apply_screen_update(app, update)
        }
        UiEvent::SessionChanged(session) => handle_session_changed(&mut app.tui, session),
        UiEvent::NotificationsConnected { user_id } => {
            // A watcher for a previous user may report late.
            if app.tui.viewer().is_some_and(|u| u.id == user_id)
                && app.tui.channel == ChannelStatus::Connecting
            {
                app.tui.channel = ChannelStatus::Live;
            }
            vec![]
        }
        UiEvent::Notification(ChannelEvent::Message) => {
            if app.tui.is_logged_in() {
                app.tui.notifications.push(REVIEW_CREATED_MESSAGE);
            }
            vec![]
        }
        UiEvent::Notification(ChannelEvent::Closed { error }) => {
            if app.tui.is_logged_in() {
                app.tui.channel = ChannelStatus::Closed { error };
            }
            vec![]
        }
        UiEvent::NotificationsFailed { error } => {
            if app.tui.is_logged_in() {
                app.tui.channel = ChannelStatus::Closed { error: Some(error) };
            }
            vec![]
        }
    }
}

// ============================================================================
// Session
// ============================================================================

/// Follows the session store. A different user gets a fresh feed and a new
/// channel; logging out closes the channel and drops the feed.
fn handle_session_changed(tui: &mut TuiState, session: Option<Session>) -> Vec<UiEffect> {
    let previous = tui.session.as_ref().map(|s| s.user.id.clone());
    let next = session.as_ref().map(|s| s.user.id.clone());
    tui.session = session;
    if previous == next {
        return vec![];
    }

    let mut effects = Vec::new();
    if previous.is_some() {
        effects.push(UiEffect::CloseNotifications);
    }
    tui.notifications.clear();
    tui.channel = ChannelStatus::Off;
    if let Some(user_id) = next {
        tui.channel = ChannelStatus::Connecting;
        effects.push(UiEffect::OpenNotifications { user_id });
    }
    effects
}

// ============================================================================
// Navigation
// ============================================================================

pub fn navigate(app: &mut AppState, route: Route) -> Vec<UiEffect> {
    tracing::debug!(?route, "navigate");
    let (screen, effects) = Screen::open(route);
    app.tui.screen = screen;
    effects
}

fn apply_screen_update(app: &mut AppState, update: ScreenUpdate) -> Vec<UiEffect> {
    let ScreenUpdate {
        mut effects,
        navigate: route,
        overlay,
    } = update;
    if let Some(request) = overlay {
        open_overlay(app, request);
    }
    if let Some(route) = route {
        effects.extend(navigate(app, route));
    }
    effects
}

// ============================================================================
// Overlays
// ============================================================================

fn open_overlay(app: &mut AppState, request: OverlayRequest) {
    app.overlay = Some(Overlay::open(request));
}

fn apply_overlay_update(app: &mut AppState, update: OverlayUpdate) -> Vec<UiEffect> {
    let mut effects = Vec::new();
    for action in update.actions {
        match action {
            OverlayAction::MarkAllRead => app.tui.notifications.mark_all_read(),
            OverlayAction::DeleteBook { id } => {
                let TuiState {
                    screen,
                    session,
                    task_seq,
                    ..
                } = &mut app.tui;
                if let Screen::Book(book) = screen
                    && book.id() == id
                {
                    let mut ctx = ScreenCtx {
                        viewer: session.as_ref().map(|s| &s.user),
                        tasks: task_seq,
                    };
                    effects.extend(book.delete_book(&mut ctx));
                }
            }
        }
    }
    if update.transition == OverlayTransition::Close {
        app.overlay = None;
    }
    effects
}

// ============================================================================
// Terminal input
// ============================================================================

fn handle_terminal_event(app: &mut AppState, event: Event) -> Vec<UiEffect> {
    match event {
        Event::Key(key) if key.kind != KeyEventKind::Release => handle_key(app, key),
        Event::Paste(text) => {
            if app.overlay.is_none() {
                app.tui.screen.handle_paste(&text);
            }
            vec![]
        }
        _ => vec![],
    }
}

fn handle_key(app: &mut AppState, key: KeyEvent) -> Vec<UiEffect> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    if ctrl && key.code == KeyCode::Char('c') {
        return vec![UiEffect::Quit];
    }

    if let Some(overlay) = app.overlay.as_mut() {
        let update = overlay.handle_key(&app.tui, key);
        return apply_overlay_update(app, update);
    }

    if ctrl && key.code == KeyCode::Char('n') {
        open_overlay(app, OverlayRequest::Notifications);
        return vec![];
    }

    if !app.tui.screen.captures_text()
        && let Some(effects) = handle_global_key(app, key)
    {
        return effects;
    }

    let TuiState {
        screen,
        session,
        task_seq,
        ..
    } = &mut app.tui;
    let mut ctx = ScreenCtx {
        viewer: session.as_ref().map(|s| &s.user),
        tasks: task_seq,
    };
    let update = screen.handle_key(&mut ctx, key);
    apply_screen_update(app, update)
}

/// Shortcuts available whenever no text field has focus. Returns `None`
/// for keys the screen should handle.
fn handle_global_key(app: &mut AppState, key: KeyEvent) -> Option<Vec<UiEffect>> {
    if key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) {
        return None;
    }
    let logged_in = app.tui.is_logged_in();
    let effects = match key.code {
        KeyCode::Char('q') => vec![UiEffect::Quit],
        KeyCode::Char('n') => {
            open_overlay(app, OverlayRequest::Notifications);
            vec![]
        }
        KeyCode::Char('h') => navigate(app, Route::Home),
        KeyCode::Char('b') if logged_in => navigate(app, Route::NewBook),
        KeyCode::Char('b') => navigate(app, Route::Login),
        KeyCode::Char('c') => navigate(app, Route::NewCategory),
        KeyCode::Char('l') if logged_in => vec![UiEffect::Logout],
        KeyCode::Char('l') => navigate(app, Route::Login),
        KeyCode::Char('g') => navigate(app, Route::Register),
        _ => return None,
    };
    Some(effects)
}
