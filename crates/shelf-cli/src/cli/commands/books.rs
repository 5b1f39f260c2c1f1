//! Book commands.

use anyhow::{Context, Result, bail};
use chrono::Datelike;
use shelf_core::AppContext;
use shelf_core::api::decode;
use shelf_core::api::queries::{
    self, BookData, BooksData, CategoriesData, CreateBookData, ReviewsByBookData, UpdateBookData,
    UsersData,
};
use shelf_core::eligibility::can_manage_book;
use shelf_core::models::{Book, BookInput, parse_publish_year};

use super::{read, require_login, write};
use crate::cli::output;

/// Fields to change on `books update`; `None` keeps the current value.
pub struct BookChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub year: Option<String>,
    pub categories: Option<Vec<String>>,
}

async fn load_book(ctx: &AppContext, id: &str) -> Result<Book> {
    read::<BookData>(ctx, &queries::get_book(id))
        .await?
        .book
        .context("Book not found")
}

fn publish_year(year: Option<&str>) -> Result<i32> {
    match year {
        Some(year) => parse_publish_year(year).map_err(anyhow::Error::msg),
        None => Ok(chrono::Local::now().year()),
    }
}

pub async fn list(ctx: &AppContext) -> Result<()> {
    let (books_query, users_query) = (queries::get_books(), queries::get_users());
    let (books, users) = tokio::join!(
        read::<BooksData>(ctx, &books_query),
        read::<UsersData>(ctx, &users_query),
    );
    let books = books?.books;
    // Names are a nicety; ids still identify the author.
    let users = users.map(|d| d.users).unwrap_or_default();

    if books.is_empty() {
        println!("No books available.");
        return Ok(());
    }
    let mut table = output::table(&["ID", "Title", "Year", "Author"]);
    for book in &books {
        table.add_row(vec![
            book.id.clone(),
            book.title.clone(),
            book.publish_year.to_string(),
            output::username(&users, &book.author_id).to_string(),
        ]);
    }
    println!("{table}");
    Ok(())
}

pub async fn show(ctx: &AppContext, id: &str) -> Result<()> {
    let book = load_book(ctx, id).await?;
    let reviews_query = queries::reviews_by_book(id);
    let categories_query = queries::get_categories();
    let users_query = queries::get_users();
    let (reviews, categories, users) = tokio::join!(
        read::<ReviewsByBookData>(ctx, &reviews_query),
        read::<CategoriesData>(ctx, &categories_query),
        read::<UsersData>(ctx, &users_query),
    );
    let reviews = reviews?.reviews;
    let categories = categories.map(|d| d.categories).unwrap_or_default();
    let users = users.map(|d| d.users).unwrap_or_default();

    println!("{} ({})", book.title, book.publish_year);
    println!("By: {}", output::username(&users, &book.author_id));
    if !book.categories.is_empty() {
        println!(
            "Categories: {}",
            output::category_titles(&categories, &book.categories)
        );
    }
    if !book.description.is_empty() {
        println!();
        println!("{}", book.description);
    }

    println!();
    if reviews.is_empty() {
        println!("No reviews yet.");
        return Ok(());
    }
    println!("Reviews ({})", reviews.len());
    let mut table = output::table(&["ID", "Rating", "User", "Date", "Comment"]);
    for review in &reviews {
        table.add_row(vec![
            review.id.clone(),
            format!("{}/5", review.rating),
            output::username(&users, &review.user_id).to_string(),
            review.created_at_display(),
            review.visible_comment().unwrap_or("").to_string(),
        ]);
    }
    println!("{table}");
    Ok(())
}

pub async fn create(
    ctx: &AppContext,
    title: &str,
    description: &str,
    year: Option<&str>,
    categories: &[String],
) -> Result<()> {
    require_login(ctx)?;
    let input = BookInput::new(title, description, publish_year(year)?, categories);
    let data = write(ctx, &queries::create_book(&input)).await?;
    let book = decode::<CreateBookData>(&data)?.book;
    println!("Created book {} ({})", book.title, book.id);
    Ok(())
}

pub async fn update(ctx: &AppContext, id: &str, changes: BookChanges) -> Result<()> {
    let viewer = require_login(ctx)?;
    let book = load_book(ctx, id).await?;
    if !can_manage_book(&book, Some(&viewer)) {
        bail!("Only the author can edit this book.");
    }

    let year = match changes.year.as_deref() {
        Some(year) => publish_year(Some(year))?,
        None => book.publish_year,
    };
    let input = BookInput::new(
        changes.title.as_deref().unwrap_or(&book.title),
        changes.description.as_deref().unwrap_or(&book.description),
        year,
        changes.categories.as_deref().unwrap_or(&book.categories),
    );
    let data = write(ctx, &queries::update_book(id, &input)).await?;
    let book = decode::<UpdateBookData>(&data)?.book;
    println!("Updated book {} ({})", book.title, book.id);
    Ok(())
}

pub async fn delete(ctx: &AppContext, id: &str) -> Result<()> {
    let viewer = require_login(ctx)?;
    let book = load_book(ctx, id).await?;
    if !can_manage_book(&book, Some(&viewer)) {
        bail!("Only the author can delete this book.");
    }
    write(ctx, &queries::delete_book(id)).await?;
    println!("Deleted book {} ({})", book.title, book.id);
    Ok(())
}
