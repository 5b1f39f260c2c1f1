//! Plain-text rendering for command output.

use comfy_table::{ContentArrangement, Table};
use shelf_core::models::{Category, User};

/// Table with a header row that wraps to the terminal width.
pub fn table(header: &[&str]) -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(header.to_vec());
    table
}

/// Username for `id`, or the raw id when the user is unknown.
pub fn username<'a>(users: &'a [User], id: &'a str) -> &'a str {
    users
        .iter()
        .find(|u| u.id == id)
        .map_or(id, |u| u.username.as_str())
}

/// Category titles for `ids`, falling back to the raw id.
pub fn category_titles(categories: &[Category], ids: &[String]) -> String {
    ids.iter()
        .map(|id| {
            categories
                .iter()
                .find(|c| &c.id == id)
                .map_or(id.as_str(), |c| c.title.as_str())
        })
        .collect::<Vec<_>>()
        .join(", ")
}
