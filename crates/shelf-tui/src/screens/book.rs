//! Book detail screen: the book, its reviews and the review composer.

use std::collections::HashMap;

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use serde_json::Value;
use shelf_core::ApiError;
use shelf_core::api::queries::{
    self, BookData, CategoriesData, NamedQuery, QueryKey, ReviewsByBookData, UserData, UsersData,
};
use shelf_core::cache::QueryResult;
use shelf_core::eligibility::{
    ReviewEligibility, can_delete_review, can_manage_book, review_eligibility,
};
use shelf_core::models::{Book, Category, CreateReviewInput, Review, User};

use super::{Route, ScreenCtx, ScreenUpdate};
use crate::common::{TaskId, TaskKind, TaskState, TextField, stars};
use crate::effects::UiEffect;
use crate::overlays::OverlayRequest;
use crate::overlays::render_utils::{InputHint, InputLine, render_input_line};

const COMPOSER_HEIGHT: u16 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ComposerFocus {
    Rating,
    Comment,
}

/// The review being written.
#[derive(Debug)]
pub struct Composer {
    pub rating: u8,
    pub comment: TextField,
    focus: ComposerFocus,
    task: TaskState,
    error: Option<String>,
}

impl Composer {
    fn new() -> Self {
        Self {
            rating: CreateReviewInput::MAX_RATING,
            comment: TextField::default(),
            focus: ComposerFocus::Rating,
            task: TaskState::default(),
            error: None,
        }
    }

    fn set_rating(&mut self, rating: u8) {
        self.rating = rating.clamp(CreateReviewInput::MIN_RATING, CreateReviewInput::MAX_RATING);
    }
}

#[derive(Debug)]
pub struct BookState {
    id: String,
    pub book: QueryResult<Option<Book>>,
    pub reviews: QueryResult<Vec<Review>>,
    categories: QueryResult<Vec<Category>>,
    users: QueryResult<Vec<User>>,
    pub author: QueryResult<Option<User>>,
    selected_review: usize,
    pub composer: Option<Composer>,
    /// Delete of a review or of the book itself.
    delete_task: TaskState,
    /// Last failed action on this screen.
    pub error: Option<String>,
}

impl BookState {
    pub fn open(id: String) -> (Self, Vec<UiEffect>) {
        let state = Self {
            id,
            book: QueryResult::pending(),
            reviews: QueryResult::pending(),
            categories: QueryResult::pending(),
            users: QueryResult::pending(),
            author: QueryResult::default(),
            selected_review: 0,
            composer: None,
            delete_task: TaskState::default(),
            error: None,
        };
        let effects = state
            .queries()
            .into_iter()
            .filter(|q| !q.skip)
            .map(|query| UiEffect::Fetch { query })
            .collect();
        (state, effects)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    fn loaded_book(&self) -> Option<&Book> {
        self.book.data.as_ref()?.as_ref()
    }

    /// Author lookup; skipped until the book has arrived.
    fn author_query(&self) -> NamedQuery {
        queries::get_user(self.loaded_book().map(|b| b.author_id.as_str()))
    }

    pub fn queries(&self) -> Vec<NamedQuery> {
        vec![
            queries::get_book(&self.id),
            queries::reviews_by_book(&self.id),
            queries::get_categories(),
            queries::get_users(),
            self.author_query(),
        ]
    }

    pub fn on_query(&mut self, key: &QueryKey, result: &QueryResult) -> Vec<UiEffect> {
        if *key == queries::get_book(&self.id).key() {
            let previous_author = self.author_query().key();
            self.book = result.decode::<BookData>().map(|d| d.book);
            let author = self.author_query();
            if !author.skip && author.key() != previous_author {
                self.author = QueryResult::pending();
                return vec![UiEffect::Fetch { query: author }];
            }
        } else if *key == queries::reviews_by_book(&self.id).key() {
            self.reviews = result.decode::<ReviewsByBookData>().map(|d| d.reviews);
            let len = self.reviews.data.as_ref().map_or(0, Vec::len);
            self.selected_review = self.selected_review.min(len.saturating_sub(1));
        } else if *key == queries::get_categories().key() {
            self.categories = result.decode::<CategoriesData>().map(|d| d.categories);
        } else if *key == queries::get_users().key() {
            self.users = result.decode::<UsersData>().map(|d| d.users);
        } else {
            let author = self.author_query();
            if !author.skip && *key == author.key() {
                self.author = result.decode::<UserData>().map(|d| d.user);
            }
        }
        vec![]
    }

    fn review_list(&self) -> &[Review] {
        self.reviews.data.as_deref().unwrap_or_default()
    }

    /// `None` until both the book and its reviews have arrived.
    pub fn eligibility(&self, viewer: Option<&User>) -> Option<ReviewEligibility> {
        let book = self.loaded_book()?;
        let reviews = self.reviews.data.as_deref()?;
        Some(review_eligibility(book, viewer, reviews))
    }

    pub fn is_composing(&self) -> bool {
        self.composer.is_some()
    }

    pub fn is_busy(&self) -> bool {
        self.book.loading
            || self.reviews.loading
            || self.delete_task.is_running()
            || self
                .composer
                .as_ref()
                .is_some_and(|c| c.task.is_running())
    }

    pub fn handle_paste(&mut self, text: &str) {
        if let Some(composer) = &mut self.composer {
            composer.comment.insert_str(text);
            composer.focus = ComposerFocus::Comment;
        }
    }

    pub fn handle_key(&mut self, ctx: &mut ScreenCtx<'_>, key: KeyEvent) -> ScreenUpdate {
        if self.composer.is_some() {
            return self.handle_composer_key(ctx, key);
        }

        match key.code {
            KeyCode::Esc | KeyCode::Backspace => ScreenUpdate::navigate(Route::Home),
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected_review = self.selected_review.saturating_sub(1);
                ScreenUpdate::none()
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.selected_review + 1 < self.review_list().len() {
                    self.selected_review += 1;
                }
                ScreenUpdate::none()
            }
            KeyCode::Char('r') => {
                self.book.loading = true;
                self.reviews.loading = true;
                ScreenUpdate::effects(vec![
                    UiEffect::Refetch {
                        query: queries::get_book(&self.id),
                    },
                    UiEffect::Refetch {
                        query: queries::reviews_by_book(&self.id),
                    },
                ])
            }
            KeyCode::Char('w') => {
                if self.eligibility(ctx.viewer) == Some(ReviewEligibility::Allowed) {
                    self.composer = Some(Composer::new());
                    self.error = None;
                }
                ScreenUpdate::none()
            }
            KeyCode::Char('d') => self.delete_selected_review(ctx),
            KeyCode::Char('e') => match self.loaded_book() {
                Some(book) if can_manage_book(book, ctx.viewer) => {
                    ScreenUpdate::navigate(Route::EditBook {
                        id: self.id.clone(),
                    })
                }
                _ => ScreenUpdate::none(),
            },
            KeyCode::Char('x') => match self.loaded_book() {
                Some(book) if can_manage_book(book, ctx.viewer) && !self.delete_task.is_running() => {
                    ScreenUpdate::overlay(OverlayRequest::ConfirmDeleteBook {
                        id: book.id.clone(),
                        title: book.title.clone(),
                    })
                }
                _ => ScreenUpdate::none(),
            },
            _ => ScreenUpdate::none(),
        }
    }

    fn handle_composer_key(&mut self, ctx: &mut ScreenCtx<'_>, key: KeyEvent) -> ScreenUpdate {
        let Some(composer) = self.composer.as_mut() else {
            return ScreenUpdate::none();
        };
        match key.code {
            KeyCode::Esc => {
                self.composer = None;
                return ScreenUpdate::none();
            }
            KeyCode::Tab | KeyCode::BackTab => {
                composer.focus = match composer.focus {
                    ComposerFocus::Rating => ComposerFocus::Comment,
                    ComposerFocus::Comment => ComposerFocus::Rating,
                };
            }
            KeyCode::Enter => {
                if composer.task.is_running() {
                    return ScreenUpdate::none();
                }
                let input =
                    match CreateReviewInput::new(&self.id, composer.rating, composer.comment.value())
                    {
                        Ok(input) => input,
                        Err(message) => {
                            composer.error = Some(message);
                            return ScreenUpdate::none();
                        }
                    };
                let task = ctx.tasks.next_id();
                composer.task.start(task);
                composer.error = None;
                return ScreenUpdate::effects(vec![UiEffect::Mutate {
                    task,
                    kind: TaskKind::CreateReview,
                    mutation: queries::create_review(&input),
                }]);
            }
            _ => match composer.focus {
                ComposerFocus::Rating => match key.code {
                    KeyCode::Left | KeyCode::Char('-') => {
                        composer.set_rating(composer.rating.saturating_sub(1));
                    }
                    KeyCode::Right | KeyCode::Char('+') => {
                        composer.set_rating(composer.rating.saturating_add(1));
                    }
                    KeyCode::Char(ch @ '1'..='5') => {
                        composer.set_rating(ch as u8 - b'0');
                    }
                    _ => {}
                },
                ComposerFocus::Comment => {
                    composer.comment.handle_key(key);
                }
            },
        }
        ScreenUpdate::none()
    }

    fn delete_selected_review(&mut self, ctx: &mut ScreenCtx<'_>) -> ScreenUpdate {
        if self.delete_task.is_running() {
            return ScreenUpdate::none();
        }
        let Some(review) = self.review_list().get(self.selected_review) else {
            return ScreenUpdate::none();
        };
        if !can_delete_review(review, ctx.viewer) {
            return ScreenUpdate::none();
        }
        let mutation = queries::delete_review(&review.id, &self.id);
        let task = ctx.tasks.next_id();
        self.delete_task.start(task);
        self.error = None;
        ScreenUpdate::effects(vec![UiEffect::Mutate {
            task,
            kind: TaskKind::DeleteReview,
            mutation,
        }])
    }

    /// Starts the delete after the user confirmed it.
    pub fn delete_book(&mut self, ctx: &mut ScreenCtx<'_>) -> Vec<UiEffect> {
        let Some(book) = self.loaded_book() else {
            return vec![];
        };
        if !can_manage_book(book, ctx.viewer) || self.delete_task.is_running() {
            return vec![];
        }
        let mutation = queries::delete_book(&book.id);
        let task = ctx.tasks.next_id();
        self.delete_task.start(task);
        self.error = None;
        vec![UiEffect::Mutate {
            task,
            kind: TaskKind::DeleteBook,
            mutation,
        }]
    }

    pub fn on_mutation(
        &mut self,
        task: TaskId,
        kind: TaskKind,
        result: &Result<Value, ApiError>,
    ) -> ScreenUpdate {
        if kind == TaskKind::CreateReview {
            let Some(composer) = self.composer.as_mut() else {
                return ScreenUpdate::none();
            };
            if !composer.task.finish_if_active(task) {
                return ScreenUpdate::none();
            }
            match result {
                Ok(_) => self.composer = None,
                Err(error) => composer.error = Some(error.to_string()),
            }
            return ScreenUpdate::none();
        }

        if !self.delete_task.finish_if_active(task) {
            return ScreenUpdate::none();
        }
        match (kind, result) {
            (TaskKind::DeleteBook, Ok(_)) => ScreenUpdate::navigate(Route::Home),
            (_, Err(error)) => {
                self.error = Some(error.to_string());
                ScreenUpdate::none()
            }
            _ => ScreenUpdate::none(),
        }
    }

    pub fn hints(&self, viewer: Option<&User>) -> Vec<InputHint<'static>> {
        if self.composer.is_some() {
            return vec![
                InputHint::new("←→", "rating"),
                InputHint::new("Tab", "comment"),
                InputHint::new("Enter", "post"),
                InputHint::new("Esc", "cancel"),
            ];
        }
        let mut hints = vec![InputHint::new("Esc", "back"), InputHint::new("r", "refresh")];
        if self.eligibility(viewer) == Some(ReviewEligibility::Allowed) {
            hints.push(InputHint::new("w", "write review"));
        }
        if self
            .review_list()
            .iter()
            .any(|r| can_delete_review(r, viewer))
        {
            hints.push(InputHint::new("d", "delete review"));
        }
        if self
            .loaded_book()
            .is_some_and(|b| can_manage_book(b, viewer))
        {
            hints.push(InputHint::new("e", "edit"));
            hints.push(InputHint::new("x", "delete book"));
        }
        hints
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, viewer: Option<&User>, spinner: &str) {
        let message = match (&self.book.data, &self.book.error) {
            (None, _) if self.book.loading => {
                Some((format!("{spinner} Loading book..."), Color::Gray))
            }
            (None, Some(error)) => Some((format!("Error loading book: {error}"), Color::Red)),
            (None, None) => Some((format!("{spinner} Loading book..."), Color::Gray)),
            (Some(None), _) => Some(("Book not found".to_string(), Color::Gray)),
            (Some(Some(_)), _) => None,
        };
        if let Some((text, color)) = message {
            frame.render_widget(
                Paragraph::new(Span::styled(text, Style::default().fg(color))),
                area,
            );
            return;
        }
        let Some(book) = self.loaded_book() else {
            return;
        };

        let book_lines = self.book_lines(book);
        let book_height = (book_lines.len() as u16 + 1).min(area.height / 2);
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(book_height),
                Constraint::Min(3),
                Constraint::Length(COMPOSER_HEIGHT),
            ])
            .split(area);

        frame.render_widget(
            Paragraph::new(book_lines).wrap(Wrap { trim: false }),
            chunks[0],
        );
        self.render_reviews(frame, chunks[1], viewer, spinner);
        self.render_composer(frame, chunks[2], viewer);
    }

    fn book_lines(&self, book: &Book) -> Vec<Line<'static>> {
        let mut lines = vec![
            Line::from(Span::styled(
                book.title.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                format!("Published: {}", book.publish_year),
                Style::default().fg(Color::Gray),
            )),
        ];
        if let Some(Some(author)) = &self.author.data {
            lines.push(Line::from(Span::styled(
                format!("By: {}", author.username),
                Style::default().fg(Color::Gray),
            )));
        }
        for paragraph in book.description.lines() {
            lines.push(Line::from(paragraph.to_string()));
        }
        if !book.categories.is_empty() {
            let titles: HashMap<&str, &str> = self
                .categories
                .data
                .iter()
                .flatten()
                .map(|c| (c.id.as_str(), c.title.as_str()))
                .collect();
            let mut spans = Vec::new();
            for id in &book.categories {
                let title = titles.get(id.as_str()).copied().unwrap_or(id.as_str());
                spans.push(Span::styled(
                    format!("[{title}]"),
                    Style::default().fg(Color::Magenta),
                ));
                spans.push(Span::raw(" "));
            }
            lines.push(Line::from(spans));
        }
        if let Some(error) = &self.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        }
        lines
    }

    fn render_reviews(&self, frame: &mut Frame, area: Rect, viewer: Option<&User>, spinner: &str) {
        let block = Block::default()
            .borders(Borders::TOP)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(Span::styled(
                " Reviews ",
                Style::default().add_modifier(Modifier::BOLD),
            ));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let reviews = self.review_list();
        if reviews.is_empty() {
            let text = if self.reviews.loading {
                Span::styled(
                    format!("{spinner} Loading reviews..."),
                    Style::default().fg(Color::Gray),
                )
            } else if let Some(error) = &self.reviews.error {
                Span::styled(error.to_string(), Style::default().fg(Color::Red))
            } else {
                Span::styled("No reviews yet.", Style::default().fg(Color::Gray))
            };
            frame.render_widget(Paragraph::new(text), inner);
            return;
        }

        let usernames: HashMap<&str, &str> = self
            .users
            .data
            .iter()
            .flatten()
            .map(|u| (u.id.as_str(), u.username.as_str()))
            .collect();

        let mut lines = Vec::new();
        for (i, review) in reviews.iter().enumerate() {
            let selected = i == self.selected_review;
            let marker = if selected { "▸ " } else { "  " };
            let mut header = vec![
                Span::styled(marker, Style::default().fg(Color::Cyan)),
                Span::styled(
                    format!("Rating: {}/5 ", review.rating),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::styled(stars(review.rating), Style::default().fg(Color::Yellow)),
                Span::styled(
                    format!("  {}", review.created_at_display()),
                    Style::default().fg(Color::DarkGray),
                ),
            ];
            if can_delete_review(review, viewer) {
                header.push(Span::styled("  (yours)", Style::default().fg(Color::Cyan)));
            }
            lines.push(Line::from(header));
            if let Some(comment) = review.visible_comment() {
                lines.push(Line::from(format!("  {comment}")));
            }
            let username = usernames
                .get(review.user_id.as_str())
                .copied()
                .unwrap_or(review.user_id.as_str());
            lines.push(Line::from(Span::styled(
                format!("  User: {username}"),
                Style::default().fg(Color::DarkGray),
            )));
        }

        // Keep the selected review on screen.
        let selected_line: usize = reviews
            .iter()
            .take(self.selected_review)
            .map(|r| 2 + usize::from(r.visible_comment().is_some()))
            .sum();
        let scroll = selected_line.saturating_sub(usize::from(inner.height) / 2) as u16;
        frame.render_widget(
            Paragraph::new(lines)
                .wrap(Wrap { trim: false })
                .scroll((scroll, 0)),
            inner,
        );
    }

    fn render_composer(&self, frame: &mut Frame, area: Rect, viewer: Option<&User>) {
        let block = Block::default()
            .borders(Borders::TOP)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(" Write a review ");
        let inner = block.inner(area);
        frame.render_widget(block, area);
        if inner.height == 0 {
            return;
        }

        let Some(composer) = &self.composer else {
            let text = match self.eligibility(viewer) {
                Some(ReviewEligibility::Allowed) => {
                    Span::styled("Press w to write a review.", Style::default().fg(Color::Gray))
                }
                Some(other) => Span::styled(
                    other.reason().unwrap_or_default(),
                    Style::default().fg(Color::Gray),
                ),
                None => match &self.reviews.error {
                    Some(error) if !self.reviews.loading => Span::styled(
                        format!("Can't load reviews: {error}"),
                        Style::default().fg(Color::Red),
                    ),
                    _ => Span::styled("Loading reviews…", Style::default().fg(Color::Gray)),
                },
            };
            frame.render_widget(Paragraph::new(text), inner);
            return;
        };

        let rating_style = if composer.focus == ComposerFocus::Rating {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Yellow)
        };
        frame.render_widget(
            Paragraph::new(Line::from(vec![
                Span::raw("Rating: "),
                Span::styled(stars(i64::from(composer.rating)), rating_style),
                Span::styled(
                    format!(" {}/5", composer.rating),
                    Style::default().fg(Color::Gray),
                ),
            ])),
            Rect::new(inner.x, inner.y, inner.width, 1),
        );

        if inner.height > 1 {
            let comment_area = Rect::new(inner.x, inner.y + 1, inner.width, 1);
            if composer.focus == ComposerFocus::Comment {
                render_input_line(
                    frame,
                    comment_area,
                    &InputLine {
                        value: composer.comment.value(),
                        placeholder: Some("Comment (optional)"),
                        prompt: "> ",
                        prompt_color: Color::Cyan,
                        text_color: Color::White,
                        placeholder_color: Color::DarkGray,
                        cursor_color: Color::Cyan,
                    },
                );
            } else {
                let text = if composer.comment.value().is_empty() {
                    Span::styled("  Comment (optional)", Style::default().fg(Color::DarkGray))
                } else {
                    Span::raw(format!("  {}", composer.comment.value()))
                };
                frame.render_widget(Paragraph::new(text), comment_area);
            }
        }

        if inner.height > 2 {
            let status = if composer.task.is_running() {
                Some(Span::styled("Posting…", Style::default().fg(Color::Gray)))
            } else {
                composer
                    .error
                    .as_ref()
                    .map(|e| Span::styled(e.clone(), Style::default().fg(Color::Red)))
            };
            if let Some(status) = status {
                frame.render_widget(
                    Paragraph::new(status),
                    Rect::new(inner.x, inner.y + 2, inner.width, 1),
                );
            }
        }
    }
}
