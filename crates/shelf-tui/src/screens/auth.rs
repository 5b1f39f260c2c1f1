//! Login and register forms.

use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Span;
use ratatui::widgets::Paragraph;
use serde_json::Value;
use shelf_core::ApiError;
use shelf_core::api::decode;
use shelf_core::api::queries::{self, LoginUserData, RegisterUserData};
use shelf_core::models::{AuthPayload, LoginUserInput, RegisterUserInput};

use super::{Route, ScreenCtx, ScreenUpdate};
use crate::common::{Form, FormField, FormKey, TaskId, TaskKind, TaskState};
use crate::effects::UiEffect;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    Login,
    Register,
}

impl AuthMode {
    fn title(self) -> &'static str {
        match self {
            AuthMode::Login => "Login",
            AuthMode::Register => "Register",
        }
    }

    fn pending_label(self) -> &'static str {
        match self {
            AuthMode::Login => "Logging in...",
            AuthMode::Register => "Registering...",
        }
    }
}

#[derive(Debug)]
pub struct AuthState {
    pub mode: AuthMode,
    pub form: Form,
    pub task: TaskState,
    pub error: Option<String>,
}

impl AuthState {
    pub fn new(mode: AuthMode) -> Self {
        let mut fields = vec![
            FormField::new("Username"),
            FormField::new("Password").secret(),
        ];
        if mode == AuthMode::Register {
            fields.extend([
                FormField::new("Bio"),
                FormField::new("Birth Date").placeholder("YYYY-MM-DD"),
                FormField::new("Nationality"),
            ]);
        }
        Self {
            mode,
            form: Form::new(fields),
            task: TaskState::default(),
            error: None,
        }
    }

    pub fn handle_key(&mut self, ctx: &mut ScreenCtx<'_>, key: KeyEvent) -> ScreenUpdate {
        match self.form.handle_key(key) {
            FormKey::Cancel => ScreenUpdate::navigate(Route::Home),
            FormKey::Submit => self.submit(ctx),
            FormKey::Consumed | FormKey::Ignored => ScreenUpdate::none(),
        }
    }

    fn submit(&mut self, ctx: &mut ScreenCtx<'_>) -> ScreenUpdate {
        if self.task.is_running() {
            return ScreenUpdate::none();
        }
        let (kind, mutation) = match self.mode {
            AuthMode::Login => (
                TaskKind::Login,
                queries::login_user(&LoginUserInput {
                    username: self.form.value(0).to_string(),
                    password: self.form.value(1).to_string(),
                }),
            ),
            AuthMode::Register => (
                TaskKind::Register,
                queries::register_user(&RegisterUserInput {
                    username: self.form.value(0).to_string(),
                    password: self.form.value(1).to_string(),
                    bio: self.form.value(2).to_string(),
                    birth_date: self.form.value(3).to_string(),
                    nationality: self.form.value(4).to_string(),
                }),
            ),
        };
        let task = ctx.tasks.next_id();
        self.task.start(task);
        self.error = None;
        ScreenUpdate::effects(vec![UiEffect::Mutate {
            task,
            kind,
            mutation,
        }])
    }

    fn payload(&self, data: &Value) -> Result<AuthPayload, ApiError> {
        match self.mode {
            AuthMode::Login => decode::<LoginUserData>(data).map(|d| d.payload),
            AuthMode::Register => decode::<RegisterUserData>(data).map(|d| d.payload),
        }
    }

    /// On success stores the session and goes home; on failure shows the
    /// message inline.
    pub fn on_mutation(&mut self, task: TaskId, result: &Result<Value, ApiError>) -> ScreenUpdate {
        if !self.task.finish_if_active(task) {
            return ScreenUpdate::none();
        }
        match result.clone().and_then(|data| self.payload(&data)) {
            Ok(payload) => ScreenUpdate {
                effects: vec![UiEffect::SetSession {
                    user: payload.user,
                    token: payload.token,
                }],
                navigate: Some(Route::Home),
                overlay: None,
            },
            Err(error) => {
                self.error = Some(error.to_string());
                ScreenUpdate::none()
            }
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, spinner: &str) {
        if area.height < 3 {
            return;
        }
        frame.render_widget(
            Paragraph::new(Span::styled(
                self.mode.title(),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Rect::new(area.x, area.y, area.width, 1),
        );
        let body = Rect::new(area.x, area.y + 2, area.width.min(60), area.height - 2);
        let disabled = self.task.is_running();
        self.form.render(frame, body, disabled);

        let status_y = self.form.height() + 1;
        if status_y >= body.height {
            return;
        }
        let status = if disabled {
            Some(Span::styled(
                format!("{spinner} {}", self.mode.pending_label()),
                Style::default().fg(Color::Gray),
            ))
        } else {
            self.error
                .as_ref()
                .map(|e| Span::styled(e.clone(), Style::default().fg(Color::Red)))
        };
        if let Some(status) = status {
            frame.render_widget(
                Paragraph::new(status),
                Rect::new(body.x, body.y + status_y, body.width, 1),
            );
        }
    }
}
