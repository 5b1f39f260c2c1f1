//! Review commands.

use anyhow::{Context, Result, bail};
use shelf_core::AppContext;
use shelf_core::api::decode;
use shelf_core::api::queries::{self, BookData, CreateReviewData, ReviewsByBookData, UsersData};
use shelf_core::eligibility::{can_delete_review, review_eligibility};
use shelf_core::models::CreateReviewInput;

use super::{read, require_login, write};
use crate::cli::output;

pub async fn list(ctx: &AppContext, book_id: &str) -> Result<()> {
    let (reviews_query, users_query) = (queries::reviews_by_book(book_id), queries::get_users());
    let (reviews, users) = tokio::join!(
        read::<ReviewsByBookData>(ctx, &reviews_query),
        read::<UsersData>(ctx, &users_query),
    );
    let reviews = reviews?.reviews;
    let users = users.map(|d| d.users).unwrap_or_default();

    if reviews.is_empty() {
        println!("No reviews yet.");
        return Ok(());
    }
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

pub async fn add(ctx: &AppContext, book_id: &str, rating: u8, comment: &str) -> Result<()> {
    let viewer = require_login(ctx)?;
    let input = CreateReviewInput::new(book_id, rating, comment).map_err(anyhow::Error::msg)?;

    let book = read::<BookData>(ctx, &queries::get_book(book_id))
        .await?
        .book
        .context("Book not found")?;
    let reviews = read::<ReviewsByBookData>(ctx, &queries::reviews_by_book(book_id))
        .await?
        .reviews;
    if let Some(reason) = review_eligibility(&book, Some(&viewer), &reviews).reason() {
        bail!("{reason}");
    }

    let data = write(ctx, &queries::create_review(&input)).await?;
    let review = decode::<CreateReviewData>(&data)?.review;
    tracing::debug!(review = %review.id, book = %book.id, "review posted");
    println!("Review posted. ({})", review.id);
    Ok(())
}

pub async fn delete(ctx: &AppContext, id: &str, book_id: &str) -> Result<()> {
    let viewer = require_login(ctx)?;
    let reviews = read::<ReviewsByBookData>(ctx, &queries::reviews_by_book(book_id))
        .await?
        .reviews;
    let review = reviews
        .iter()
        .find(|r| r.id == id)
        .context("Review not found")?;
    if !can_delete_review(review, Some(&viewer)) {
        bail!("You can only delete your own reviews.");
    }

    write(ctx, &queries::delete_review(id, book_id)).await?;
    println!("Deleted review {id}");
    Ok(())
}
