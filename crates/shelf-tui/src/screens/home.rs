//! Home screen: the book list.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use shelf_core::api::queries::{self, BooksData, NamedQuery, QueryKey};
use shelf_core::cache::QueryResult;
use shelf_core::models::{Book, User};

use super::{Route, ScreenUpdate};
use crate::common::truncate_with_ellipsis;
use crate::effects::UiEffect;
use crate::overlays::render_utils::InputHint;

/// Rows per book entry.
const ITEM_HEIGHT: u16 = 3;

#[derive(Debug, Default)]
pub struct HomeState {
    pub books: QueryResult<Vec<Book>>,
    selected: usize,
}

impl HomeState {
    pub fn open() -> (Self, Vec<UiEffect>) {
        let state = Self {
            books: QueryResult::pending(),
            selected: 0,
        };
        (
            state,
            vec![UiEffect::Fetch {
                query: queries::get_books(),
            }],
        )
    }

    pub fn queries(&self) -> Vec<NamedQuery> {
        vec![queries::get_books()]
    }

    pub fn on_query(&mut self, key: &QueryKey, result: &QueryResult) {
        if *key == queries::get_books().key() {
            self.books = result.decode::<BooksData>().map(|d| d.books);
            let len = self.books.data.as_ref().map_or(0, Vec::len);
            self.selected = self.selected.min(len.saturating_sub(1));
        }
    }

    pub fn selected_book(&self) -> Option<&Book> {
        self.books.data.as_ref()?.get(self.selected)
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> ScreenUpdate {
        let len = self.books.data.as_ref().map_or(0, Vec::len);
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = self.selected.saturating_sub(1);
                ScreenUpdate::none()
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.selected + 1 < len {
                    self.selected += 1;
                }
                ScreenUpdate::none()
            }
            KeyCode::Enter => match self.selected_book() {
                Some(book) => ScreenUpdate::navigate(Route::Book {
                    id: book.id.clone(),
                }),
                None => ScreenUpdate::none(),
            },
            KeyCode::Char('r') => {
                self.books.loading = true;
                ScreenUpdate::effects(vec![UiEffect::Refetch {
                    query: queries::get_books(),
                }])
            }
            _ => ScreenUpdate::none(),
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, spinner: &str) {
        if area.height < 2 {
            return;
        }
        let title = Line::from(vec![
            Span::styled("Books", Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(
                if self.books.loading {
                    format!("  {spinner}")
                } else {
                    String::new()
                },
                Style::default().fg(Color::Cyan),
            ),
        ]);
        frame.render_widget(
            Paragraph::new(title),
            Rect::new(area.x, area.y, area.width, 1),
        );
        let body = Rect::new(area.x, area.y + 2, area.width, area.height.saturating_sub(2));

        let status = match (&self.books.data, &self.books.error) {
            (None, _) if self.books.loading => Some(("Loading books…".to_string(), Color::Gray)),
            (None, Some(error)) => Some((error.to_string(), Color::Red)),
            (Some(books), _) if books.is_empty() && !self.books.loading => {
                Some(("No books available.".to_string(), Color::Gray))
            }
            _ => None,
        };
        if let Some((text, color)) = status {
            frame.render_widget(
                Paragraph::new(Span::styled(text, Style::default().fg(color))),
                body,
            );
            return;
        }

        let Some(books) = &self.books.data else {
            return;
        };
        let visible = usize::from((body.height / ITEM_HEIGHT).max(1));
        let offset = (self.selected + 1).saturating_sub(visible);
        let width = body.width.saturating_sub(2) as usize;

        let mut lines = Vec::new();
        for (i, book) in books.iter().enumerate().skip(offset).take(visible) {
            let selected = i == self.selected;
            let marker = if selected { "▸ " } else { "  " };
            let title_style = if selected {
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().add_modifier(Modifier::BOLD)
            };
            lines.push(Line::from(vec![
                Span::styled(marker, Style::default().fg(Color::Cyan)),
                Span::styled(truncate_with_ellipsis(&book.title, width), title_style),
            ]));
            lines.push(Line::from(vec![
                Span::raw("  "),
                Span::styled(
                    truncate_with_ellipsis(book.description.lines().next().unwrap_or(""), width),
                    Style::default().fg(Color::Gray),
                ),
            ]));
            lines.push(Line::from(vec![
                Span::raw("  "),
                Span::styled(
                    format!("Published {}", book.publish_year),
                    Style::default().fg(Color::DarkGray),
                ),
            ]));
        }
        frame.render_widget(Paragraph::new(lines), body);
    }
}

pub fn hints(viewer: Option<&User>) -> Vec<InputHint<'static>> {
    let mut hints = vec![
        InputHint::new("↑↓", "select"),
        InputHint::new("Enter", "open"),
        InputHint::new("r", "refresh"),
        InputHint::new("b", "new book"),
        InputHint::new("c", "new category"),
    ];
    if viewer.is_some() {
        hints.push(InputHint::new("l", "logout"));
    } else {
        hints.push(InputHint::new("l", "login"));
        hints.push(InputHint::new("g", "register"));
    }
    hints.push(InputHint::new("q", "quit"));
    hints
}
