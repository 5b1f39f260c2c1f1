//! Screens of the TUI.
//!
//! Each screen owns its state, its key handler and its render function, and
//! declares the reads it watches. Screens never do I/O: they return
//! [`ScreenUpdate`]s whose effects the runtime executes.

pub mod auth;
pub mod book;
pub mod book_form;
pub mod category_form;
pub mod header;
pub mod home;

use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::Rect;
use serde_json::Value;
use shelf_core::ApiError;
use shelf_core::api::queries::{NamedQuery, QueryKey};
use shelf_core::cache::QueryResult;
use shelf_core::models::User;

pub use self::auth::{AuthMode, AuthState};
pub use self::book::BookState;
pub use self::book_form::BookFormState;
pub use self::category_form::CategoryFormState;
pub use self::home::HomeState;
use crate::common::{TaskId, TaskKind, TaskSeq};
use crate::effects::UiEffect;
use crate::overlays::OverlayRequest;
use crate::overlays::render_utils::InputHint;

/// Where a screen asks to go next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Book { id: String },
    NewBook,
    EditBook { id: String },
    NewCategory,
    Login,
    Register,
}

/// Update returned by screen handlers.
#[derive(Debug, Default)]
pub struct ScreenUpdate {
    pub effects: Vec<UiEffect>,
    pub navigate: Option<Route>,
    pub overlay: Option<OverlayRequest>,
}

impl ScreenUpdate {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn effects(effects: Vec<UiEffect>) -> Self {
        Self {
            effects,
            ..Self::default()
        }
    }

    pub fn navigate(route: Route) -> Self {
        Self {
            navigate: Some(route),
            ..Self::default()
        }
    }

    pub fn overlay(request: OverlayRequest) -> Self {
        Self {
            overlay: Some(request),
            ..Self::default()
        }
    }
}

/// What a screen may read from the rest of the state while handling a key.
pub struct ScreenCtx<'a> {
    pub viewer: Option<&'a User>,
    pub tasks: &'a mut TaskSeq,
}

#[derive(Debug)]
pub enum Screen {
    Home(HomeState),
    Book(BookState),
    BookForm(BookFormState),
    CategoryForm(CategoryFormState),
    Auth(AuthState),
}

impl Screen {
    /// Builds the screen for `route` along with the reads it starts.
    pub fn open(route: Route) -> (Self, Vec<UiEffect>) {
        match route {
            Route::Home => {
                let (state, effects) = HomeState::open();
                (Screen::Home(state), effects)
            }
            Route::Book { id } => {
                let (state, effects) = BookState::open(id);
                (Screen::Book(state), effects)
            }
            Route::NewBook => {
                let (state, effects) = BookFormState::create();
                (Screen::BookForm(state), effects)
            }
            Route::EditBook { id } => {
                let (state, effects) = BookFormState::edit(id);
                (Screen::BookForm(state), effects)
            }
            Route::NewCategory => (Screen::CategoryForm(CategoryFormState::new()), vec![]),
            Route::Login => (Screen::Auth(AuthState::new(AuthMode::Login)), vec![]),
            Route::Register => (Screen::Auth(AuthState::new(AuthMode::Register)), vec![]),
        }
    }

    /// Reads the screen currently shows. Skipped reads are included so the
    /// caller can tell them apart.
    pub fn queries(&self) -> Vec<NamedQuery> {
        match self {
            Screen::Home(s) => s.queries(),
            Screen::Book(s) => s.queries(),
            Screen::BookForm(s) => s.queries(),
            Screen::CategoryForm(_) | Screen::Auth(_) => vec![],
        }
    }

    /// Returns the watched, non-skipped read stored under `key`.
    pub fn watched(&self, key: &QueryKey) -> Option<NamedQuery> {
        self.queries()
            .into_iter()
            .find(|q| !q.skip && q.key() == *key)
    }

    /// Applies a read result. Returns effects for reads that depend on it.
    pub fn on_query(&mut self, key: &QueryKey, result: &QueryResult) -> Vec<UiEffect> {
        match self {
            Screen::Home(s) => {
                s.on_query(key, result);
                vec![]
            }
            Screen::Book(s) => s.on_query(key, result),
            Screen::BookForm(s) => {
                s.on_query(key, result);
                vec![]
            }
            Screen::CategoryForm(_) | Screen::Auth(_) => vec![],
        }
    }

    /// Applies the result of a write this screen started. Results for
    /// tasks the screen no longer tracks are ignored.
    pub fn on_mutation(
        &mut self,
        task: TaskId,
        kind: TaskKind,
        result: &Result<Value, ApiError>,
    ) -> ScreenUpdate {
        match self {
            Screen::Home(_) => ScreenUpdate::none(),
            Screen::Book(s) => s.on_mutation(task, kind, result),
            Screen::BookForm(s) => s.on_mutation(task, result),
            Screen::CategoryForm(s) => s.on_mutation(task, result),
            Screen::Auth(s) => s.on_mutation(task, result),
        }
    }

    pub fn handle_key(&mut self, ctx: &mut ScreenCtx<'_>, key: KeyEvent) -> ScreenUpdate {
        match self {
            Screen::Home(s) => s.handle_key(key),
            Screen::Book(s) => s.handle_key(ctx, key),
            Screen::BookForm(s) => s.handle_key(ctx, key),
            Screen::CategoryForm(s) => s.handle_key(ctx, key),
            Screen::Auth(s) => s.handle_key(ctx, key),
        }
    }

    pub fn handle_paste(&mut self, text: &str) {
        match self {
            Screen::Home(_) => {}
            Screen::Book(s) => s.handle_paste(text),
            Screen::BookForm(s) => s.form.paste(text),
            Screen::CategoryForm(s) => s.form.paste(text),
            Screen::Auth(s) => s.form.paste(text),
        }
    }

    /// Whether printable keys go to a text field instead of global shortcuts.
    pub fn captures_text(&self) -> bool {
        match self {
            Screen::Home(_) => false,
            Screen::Book(s) => s.is_composing(),
            Screen::BookForm(_) | Screen::CategoryForm(_) | Screen::Auth(_) => true,
        }
    }

    /// Whether anything on screen is waiting on the network.
    pub fn is_busy(&self) -> bool {
        match self {
            Screen::Home(s) => s.books.loading,
            Screen::Book(s) => s.is_busy(),
            Screen::BookForm(s) => s.is_busy(),
            Screen::CategoryForm(s) => s.task.is_running(),
            Screen::Auth(s) => s.task.is_running(),
        }
    }

    pub fn hints(&self, viewer: Option<&User>) -> Vec<InputHint<'static>> {
        match self {
            Screen::Home(_) => home::hints(viewer),
            Screen::Book(s) => s.hints(viewer),
            Screen::BookForm(_) => book_form::hints(),
            Screen::CategoryForm(_) | Screen::Auth(_) => form_hints(),
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, viewer: Option<&User>, spinner: &str) {
        match self {
            Screen::Home(s) => s.render(frame, area, spinner),
            Screen::Book(s) => s.render(frame, area, viewer, spinner),
            Screen::BookForm(s) => s.render(frame, area, spinner),
            Screen::CategoryForm(s) => s.render(frame, area, spinner),
            Screen::Auth(s) => s.render(frame, area, spinner),
        }
    }
}

pub(crate) fn form_hints() -> Vec<InputHint<'static>> {
    vec![
        InputHint::new("Tab", "next field"),
        InputHint::new("Enter", "submit"),
        InputHint::new("Esc", "back"),
    ]
}
