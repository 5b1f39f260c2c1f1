//! Advisory checks deciding which controls a viewer is offered.
//!
//! The service is the authority; these only keep the UI from offering
//! actions it would reject.

use crate::models::{Book, Review, User};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewEligibility {
    Allowed,
    NotLoggedIn,
    OwnBook,
    AlreadyReviewed,
}

impl ReviewEligibility {
    pub fn is_allowed(self) -> bool {
        self == ReviewEligibility::Allowed
    }

    /// Short explanation shown in place of the composer.
    pub fn reason(self) -> Option<&'static str> {
        match self {
            ReviewEligibility::Allowed => None,
            ReviewEligibility::NotLoggedIn => Some("Log in to write a review."),
            ReviewEligibility::OwnBook => Some("You can't review your own book."),
            ReviewEligibility::AlreadyReviewed => Some("You have already reviewed this book."),
        }
    }
}

pub fn review_eligibility(
    book: &Book,
    viewer: Option<&User>,
    reviews: &[Review],
) -> ReviewEligibility {
    let Some(viewer) = viewer else {
        return ReviewEligibility::NotLoggedIn;
    };
    if book.author_id == viewer.id {
        return ReviewEligibility::OwnBook;
    }
    if reviews
        .iter()
        .any(|r| r.book_id == book.id && r.user_id == viewer.id)
    {
        return ReviewEligibility::AlreadyReviewed;
    }
    ReviewEligibility::Allowed
}

/// Only the author may edit or delete a book.
pub fn can_manage_book(book: &Book, viewer: Option<&User>) -> bool {
    viewer.is_some_and(|v| v.id == book.author_id)
}

/// Only the reviewer may delete a review.
pub fn can_delete_review(review: &Review, viewer: Option<&User>) -> bool {
    viewer.is_some_and(|v| v.id == review.user_id)
}
