//! Create and edit form for books.

use chrono::Datelike;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Wrap};
use serde_json::Value;
use shelf_core::ApiError;
use shelf_core::api::queries::{self, BookData, CategoriesData, NamedQuery, QueryKey};
use shelf_core::cache::QueryResult;
use shelf_core::models::{Book, BookInput, Category, parse_publish_year};

use super::{Route, ScreenCtx, ScreenUpdate};
use crate::common::{Form, FormField, FormKey, TaskId, TaskKind, TaskState};
use crate::effects::UiEffect;
use crate::overlays::render_utils::InputHint;

const TITLE: usize = 0;
const DESCRIPTION: usize = 1;
const PUBLISH_YEAR: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookFormMode {
    Create,
    Edit { id: String },
}

#[derive(Debug)]
pub struct BookFormState {
    pub mode: BookFormMode,
    pub form: Form,
    pub categories: QueryResult<Vec<Category>>,
    /// Ids of the toggled categories, in toggle order.
    pub selected: Vec<String>,
    category_cursor: usize,
    /// The book being edited (edit mode only).
    pub book: QueryResult<Option<Book>>,
    /// Set once the fields were filled from the loaded book.
    pub populated: bool,
    pub task: TaskState,
    pub error: Option<String>,
}

fn fields(year: i32) -> Form {
    Form::new(vec![
        FormField::new("Title"),
        FormField::new("Description"),
        FormField::new("Publish Year").with_value(year.to_string()),
    ])
    .with_extra_slots(1)
}

impl BookFormState {
    fn new(mode: BookFormMode) -> (Self, Vec<UiEffect>) {
        let book = match mode {
            BookFormMode::Create => QueryResult::default(),
            BookFormMode::Edit { .. } => QueryResult::pending(),
        };
        let state = Self {
            mode,
            form: fields(chrono::Local::now().year()),
            categories: QueryResult::pending(),
            selected: Vec::new(),
            category_cursor: 0,
            book,
            populated: false,
            task: TaskState::default(),
            error: None,
        };
        let effects = state
            .queries()
            .into_iter()
            .map(|query| UiEffect::Fetch { query })
            .collect();
        (state, effects)
    }

    pub fn create() -> (Self, Vec<UiEffect>) {
        Self::new(BookFormMode::Create)
    }

    pub fn edit(id: String) -> (Self, Vec<UiEffect>) {
        Self::new(BookFormMode::Edit { id })
    }

    pub fn queries(&self) -> Vec<NamedQuery> {
        let mut queries = vec![queries::get_categories()];
        if let BookFormMode::Edit { id } = &self.mode {
            queries.push(queries::get_book(id));
        }
        queries
    }

    pub fn on_query(&mut self, key: &QueryKey, result: &QueryResult) {
        if *key == queries::get_categories().key() {
            self.categories = result.decode::<CategoriesData>().map(|d| d.categories);
            let len = self.category_list().len();
            self.category_cursor = self.category_cursor.min(len.saturating_sub(1));
            return;
        }
        let BookFormMode::Edit { id } = &self.mode else {
            return;
        };
        if *key != queries::get_book(id).key() {
            return;
        }
        self.book = result.decode::<BookData>().map(|d| d.book);
        // Fill once; later refreshes must not clobber what the user typed.
        if !self.populated
            && let Some(Some(book)) = &self.book.data
        {
            self.form.set_value(TITLE, book.title.clone());
            self.form.set_value(DESCRIPTION, book.description.clone());
            self.form
                .set_value(PUBLISH_YEAR, book.publish_year.to_string());
            self.selected = book.categories.clone();
            self.populated = true;
        }
    }

    fn category_list(&self) -> &[Category] {
        self.categories.data.as_deref().unwrap_or_default()
    }

    pub fn is_busy(&self) -> bool {
        self.task.is_running() || self.categories.loading || self.book.loading
    }

    fn back(&self) -> Route {
        match &self.mode {
            BookFormMode::Create => Route::Home,
            BookFormMode::Edit { id } => Route::Book { id: id.clone() },
        }
    }

    /// Whether the form can be shown: always for create, once the book is
    /// known for edit.
    fn ready(&self) -> bool {
        match self.mode {
            BookFormMode::Create => true,
            BookFormMode::Edit { .. } => self.populated,
        }
    }

    pub fn toggle_category(&mut self, id: &str) {
        if let Some(pos) = self.selected.iter().position(|c| c == id) {
            self.selected.remove(pos);
        } else {
            self.selected.push(id.to_string());
        }
    }

    pub fn handle_key(&mut self, ctx: &mut ScreenCtx<'_>, key: KeyEvent) -> ScreenUpdate {
        if !self.ready() {
            return match key.code {
                KeyCode::Esc => ScreenUpdate::navigate(self.back()),
                _ => ScreenUpdate::none(),
            };
        }
        match self.form.handle_key(key) {
            FormKey::Cancel => ScreenUpdate::navigate(self.back()),
            FormKey::Submit => self.submit(ctx),
            FormKey::Consumed => ScreenUpdate::none(),
            FormKey::Ignored => {
                if self.form.focused_extra().is_some() {
                    self.handle_category_key(key);
                }
                ScreenUpdate::none()
            }
        }
    }

    fn handle_category_key(&mut self, key: KeyEvent) {
        let len = self.category_list().len();
        match key.code {
            KeyCode::Left => self.category_cursor = self.category_cursor.saturating_sub(1),
            KeyCode::Right => {
                if self.category_cursor + 1 < len {
                    self.category_cursor += 1;
                }
            }
            KeyCode::Char(' ') => {
                if let Some(id) = self
                    .category_list()
                    .get(self.category_cursor)
                    .map(|c| c.id.clone())
                {
                    self.toggle_category(&id);
                }
            }
            _ => {}
        }
    }

    fn submit(&mut self, ctx: &mut ScreenCtx<'_>) -> ScreenUpdate {
        if self.task.is_running() {
            return ScreenUpdate::none();
        }
        let year = match parse_publish_year(self.form.value(PUBLISH_YEAR)) {
            Ok(year) => year,
            Err(message) => {
                self.error = Some(message);
                return ScreenUpdate::none();
            }
        };
        let input = BookInput::new(
            self.form.value(TITLE),
            self.form.value(DESCRIPTION),
            year,
            &self.selected,
        );
        let (kind, mutation) = match &self.mode {
            BookFormMode::Create => (TaskKind::CreateBook, queries::create_book(&input)),
            BookFormMode::Edit { id } => (TaskKind::UpdateBook, queries::update_book(id, &input)),
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

    pub fn on_mutation(&mut self, task: TaskId, result: &Result<Value, ApiError>) -> ScreenUpdate {
        if !self.task.finish_if_active(task) {
            return ScreenUpdate::none();
        }
        match result {
            Ok(_) => ScreenUpdate::navigate(self.back()),
            Err(error) => {
                self.error = Some(error.to_string());
                ScreenUpdate::none()
            }
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, spinner: &str) {
        let heading = match self.mode {
            BookFormMode::Create => "Publish a Book",
            BookFormMode::Edit { .. } => "Edit Book",
        };
        if area.height < 3 {
            return;
        }
        frame.render_widget(
            Paragraph::new(Span::styled(
                heading,
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Rect::new(area.x, area.y, area.width, 1),
        );
        let body = Rect::new(area.x, area.y + 2, area.width, area.height - 2);

        if !self.ready() {
            let text = match (&self.book.data, &self.book.error) {
                (None, Some(error)) => Span::styled(error.to_string(), Style::default().fg(Color::Red)),
                (Some(None), _) => Span::styled("Book not found", Style::default().fg(Color::Gray)),
                _ => Span::styled(
                    format!("{spinner} Loading…"),
                    Style::default().fg(Color::Gray),
                ),
            };
            frame.render_widget(Paragraph::new(text), body);
            return;
        }

        let disabled = self.task.is_running();
        let form_height = self.form.height();
        self.form.render(frame, body, disabled);

        let mut lines = vec![self.category_label_line(), self.category_line()];
        lines.push(Line::default());
        if disabled {
            let label = match self.mode {
                BookFormMode::Create => "Publishing…",
                BookFormMode::Edit { .. } => "Saving…",
            };
            lines.push(Line::from(Span::styled(
                format!("{spinner} {label}"),
                Style::default().fg(Color::Gray),
            )));
        } else if let Some(error) = &self.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        }
        let rest = Rect::new(
            body.x,
            body.y + form_height.min(body.height),
            body.width,
            body.height.saturating_sub(form_height),
        );
        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), rest);
    }

    fn category_label_line(&self) -> Line<'static> {
        let style = if self.form.focused_extra().is_some() {
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        Line::from(Span::styled("Categories", style))
    }

    fn category_line(&self) -> Line<'static> {
        let categories = self.category_list();
        if categories.is_empty() {
            let text = if self.categories.loading {
                "  Loading categories…"
            } else {
                "  No categories yet."
            };
            return Line::from(Span::styled(text, Style::default().fg(Color::DarkGray)));
        }
        let focused = self.form.focused_extra().is_some();
        let mut spans = vec![Span::raw("  ")];
        for (i, category) in categories.iter().enumerate() {
            let on = self.selected.contains(&category.id);
            let mut style = if on {
                Style::default().fg(Color::Black).bg(Color::Magenta)
            } else {
                Style::default().fg(Color::Magenta)
            };
            if focused && i == self.category_cursor {
                style = style.add_modifier(Modifier::UNDERLINED | Modifier::BOLD);
            }
            spans.push(Span::styled(format!("[{}]", category.title), style));
            spans.push(Span::raw(" "));
        }
        Line::from(spans)
    }
}

pub fn hints() -> Vec<InputHint<'static>> {
    vec![
        InputHint::new("Tab", "next field"),
        InputHint::new("←→ Space", "toggle category"),
        InputHint::new("Enter", "submit"),
        InputHint::new("Esc", "back"),
    ]
}
