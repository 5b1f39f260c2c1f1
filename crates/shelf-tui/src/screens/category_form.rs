//! Create-category form.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Span;
use ratatui::widgets::Paragraph;
use serde_json::Value;
use shelf_core::ApiError;
use shelf_core::api::queries;
use shelf_core::models::CreateCategoryInput;

use super::{Route, ScreenCtx, ScreenUpdate};
use crate::common::{Form, FormField, FormKey, TaskId, TaskKind, TaskState};
use crate::effects::UiEffect;

pub const CREATED_MESSAGE: &str = "Category created!";

#[derive(Debug)]
pub struct CategoryFormState {
    pub form: Form,
    pub task: TaskState,
    pub error: Option<String>,
    /// Confirmation shown after a successful create.
    pub notice: Option<&'static str>,
}

impl Default for CategoryFormState {
    fn default() -> Self {
        Self::new()
    }
}

impl CategoryFormState {
    pub fn new() -> Self {
        Self {
            form: Form::new(vec![
                FormField::new("Title"),
                FormField::new("Description"),
                FormField::new("Icon URL"),
                FormField::new("Parent Category ID").placeholder("optional"),
            ]),
            task: TaskState::default(),
            error: None,
            notice: None,
        }
    }

    pub fn handle_key(
        &mut self,
        ctx: &mut ScreenCtx<'_>,
        key: crossterm::event::KeyEvent,
    ) -> ScreenUpdate {
        match self.form.handle_key(key) {
            FormKey::Cancel => ScreenUpdate::navigate(Route::Home),
            FormKey::Submit => {
                if self.task.is_running() {
                    return ScreenUpdate::none();
                }
                let input = CreateCategoryInput::new(
                    self.form.value(0),
                    self.form.value(1),
                    self.form.value(2),
                    self.form.value(3),
                );
                let task = ctx.tasks.next_id();
                self.task.start(task);
                self.error = None;
                self.notice = None;
                ScreenUpdate::effects(vec![UiEffect::Mutate {
                    task,
                    kind: TaskKind::CreateCategory,
                    mutation: queries::create_category(&input),
                }])
            }
            FormKey::Consumed | FormKey::Ignored => ScreenUpdate::none(),
        }
    }

    pub fn on_mutation(&mut self, task: TaskId, result: &Result<Value, ApiError>) -> ScreenUpdate {
        if !self.task.finish_if_active(task) {
            return ScreenUpdate::none();
        }
        match result {
            Ok(_) => {
                self.notice = Some(CREATED_MESSAGE);
                self.form.clear();
            }
            Err(error) => self.error = Some(error.to_string()),
        }
        ScreenUpdate::none()
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, spinner: &str) {
        if area.height < 3 {
            return;
        }
        frame.render_widget(
            Paragraph::new(Span::styled(
                "Create Category",
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Rect::new(area.x, area.y, area.width, 1),
        );
        let body = Rect::new(area.x, area.y + 2, area.width, area.height - 2);
        let disabled = self.task.is_running();
        self.form.render(frame, body, disabled);

        let status_y = self.form.height() + 1;
        if status_y >= body.height {
            return;
        }
        let status = if disabled {
            Some(Span::styled(
                format!("{spinner} Creating…"),
                Style::default().fg(Color::Gray),
            ))
        } else if let Some(error) = &self.error {
            Some(Span::styled(error.clone(), Style::default().fg(Color::Red)))
        } else {
            self.notice
                .map(|notice| Span::styled(notice, Style::default().fg(Color::Green)))
        };
        if let Some(status) = status {
            frame.render_widget(
                Paragraph::new(status),
                Rect::new(body.x, body.y + status_y, body.width, 1),
            );
        }
    }
}
