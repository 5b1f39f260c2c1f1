//! Records mirrored from the book service.
//!
//! These are plain data: the client neither owns nor validates them beyond
//! the advisory checks in [`crate::eligibility`].

use chrono::{DateTime, Local};
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub birth_date: String,
    #[serde(default)]
    pub nationality: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub publish_year: i32,
    pub author_id: String,
    /// Category ids (unique, order-insignificant).
    #[serde(default)]
    pub categories: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub parent_category_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: String,
    pub book_id: String,
    pub user_id: String,
    /// As sent by the service; not range-checked.
    #[serde(default, deserialize_with = "lenient_rating")]
    pub rating: i64,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub created_at: String,
}

/// Accepts any JSON number (fractions are rounded) or null.
fn lenient_rating<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    let rating = Option::<f64>::deserialize(deserializer)?;
    Ok(rating.map_or(0, |r| r.round() as i64))
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl Review {
    /// Formats `created_at` as local time when it parses as RFC 3339,
    /// otherwise returns it verbatim.
    pub fn created_at_display(&self) -> String {
        DateTime::parse_from_rfc3339(&self.created_at).map_or_else(
            |_| self.created_at.clone(),
            |ts| {
                ts.with_timezone(&Local)
                    .format("%Y-%m-%d %H:%M")
                    .to_string()
            },
        )
    }

    /// Returns the comment when it carries visible text.
    pub fn visible_comment(&self) -> Option<&str> {
        self.comment
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }
}

/// Authenticated actor: the user plus the bearer token issued for them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user: User,
    pub token: String,
}

/// Payload returned by `registerUser` and `loginUser`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AuthPayload {
    pub user: User,
    pub token: String,
}

impl From<AuthPayload> for Session {
    fn from(payload: AuthPayload) -> Self {
        Session {
            user: payload.user,
            token: payload.token,
        }
    }
}

// ============================================================================
// Mutation inputs
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUserInput {
    pub username: String,
    pub password: String,
    pub bio: String,
    pub birth_date: String,
    pub nationality: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoginUserInput {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategoryInput {
    pub title: String,
    pub description: String,
    pub icon: String,
    pub parent_category_id: Option<String>,
}

impl CreateCategoryInput {
    /// Builds the input, sending a blank parent id as `null`.
    pub fn new(title: &str, description: &str, icon: &str, parent_category_id: &str) -> Self {
        let parent = parent_category_id.trim();
        Self {
            title: title.to_string(),
            description: description.to_string(),
            icon: icon.to_string(),
            parent_category_id: (!parent.is_empty()).then(|| parent.to_string()),
        }
    }
}

/// Input shared by `createBook` and `updateBook`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookInput {
    pub title: String,
    pub description: String,
    pub publish_year: i32,
    pub categories: Vec<String>,
}

impl BookInput {
    /// Builds the input, dropping duplicate category ids while keeping the
    /// first occurrence of each.
    pub fn new(title: &str, description: &str, publish_year: i32, categories: &[String]) -> Self {
        let mut unique: Vec<String> = Vec::with_capacity(categories.len());
        for id in categories {
            if !unique.contains(id) {
                unique.push(id.clone());
            }
        }
        Self {
            title: title.to_string(),
            description: description.to_string(),
            publish_year,
            categories: unique,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReviewInput {
    pub book_id: String,
    pub rating: u8,
    pub comment: Option<String>,
}

impl CreateReviewInput {
    pub const MIN_RATING: u8 = 1;
    pub const MAX_RATING: u8 = 5;

    /// Builds a review input, rejecting ratings outside 1..=5.
    /// A blank comment is sent as `null`.
    ///
    /// # Errors
    /// Returns a message suitable for inline display when the rating is out of range.
    pub fn new(book_id: &str, rating: u8, comment: &str) -> Result<Self, String> {
        if !(Self::MIN_RATING..=Self::MAX_RATING).contains(&rating) {
            return Err(format!(
                "Rating must be between {} and {}",
                Self::MIN_RATING,
                Self::MAX_RATING
            ));
        }
        let comment = comment.trim();
        Ok(Self {
            book_id: book_id.to_string(),
            rating,
            comment: (!comment.is_empty()).then(|| comment.to_string()),
        })
    }
}

/// Parses a publish year typed by the user.
///
/// # Errors
/// Returns a message suitable for inline display when the text is not a number.
pub fn parse_publish_year(text: &str) -> Result<i32, String> {
    text.trim()
        .parse::<i32>()
        .map_err(|_| format!("Publish year must be a number, got '{}'", text.trim()))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_book_deserializes_camel_case() {
        let book: Book = serde_json::from_value(json!({
            "id": "b1",
            "title": "Dune",
            "description": "Spice",
            "publishYear": 1965,
            "authorId": "u1",
            "categories": ["c1", "c2"]
        }))
        .unwrap();
        assert_eq!(book.publish_year, 1965);
        assert_eq!(book.author_id, "u1");
        assert_eq!(book.categories, vec!["c1", "c2"]);
    }

    #[test]
    fn test_category_input_blank_parent_is_null() {
        let input = CreateCategoryInput::new("Sci-Fi", "Space", "rocket.png", "   ");
        let value = serde_json::to_value(&input).unwrap();
        assert_eq!(value["parentCategoryId"], serde_json::Value::Null);

        let input = CreateCategoryInput::new("Space Opera", "", "", "c1");
        assert_eq!(input.parent_category_id.as_deref(), Some("c1"));
    }

    #[test]
    fn test_book_input_dedupes_categories() {
        let cats = vec!["c1".to_string(), "c2".to_string(), "c1".to_string()];
        let input = BookInput::new("T", "D", 2020, &cats);
        assert_eq!(input.categories, vec!["c1", "c2"]);
        let value = serde_json::to_value(&input).unwrap();
        assert_eq!(value["publishYear"], 2020);
    }

    #[test]
    fn test_review_input_rejects_out_of_range_rating() {
        assert!(CreateReviewInput::new("b1", 0, "").is_err());
        assert!(CreateReviewInput::new("b1", 6, "").is_err());

        let input = CreateReviewInput::new("b1", 4, "  Great read ").unwrap();
        assert_eq!(input.comment.as_deref(), Some("Great read"));
        let input = CreateReviewInput::new("b1", 5, "   ").unwrap();
        assert!(input.comment.is_none());
    }

    #[test]
    fn test_parse_publish_year() {
        assert_eq!(parse_publish_year(" 1999 ").unwrap(), 1999);
        assert!(parse_publish_year("nineteen").is_err());
    }

    #[test]
    fn test_odd_review_records_still_decode() {
        let reviews: Vec<Review> = serde_json::from_value(json!([
            { "id": "r1", "bookId": "b1", "userId": "u1", "rating": 4.6, "createdAt": null },
            { "id": "r2", "bookId": "b1", "userId": "u2", "rating": -2 },
            { "id": "r3", "bookId": "b1", "userId": "u3", "rating": null,
              "createdAt": "2024-05-01T10:00:00Z" },
        ]))
        .unwrap();

        let ratings: Vec<i64> = reviews.iter().map(|r| r.rating).collect();
        assert_eq!(ratings, vec![5, -2, 0]);
        assert_eq!(reviews[0].created_at, "");
        assert_eq!(reviews[1].created_at, "");
        assert_eq!(reviews[2].created_at, "2024-05-01T10:00:00Z");
    }

    #[test]
    fn test_review_created_at_falls_back_to_raw_text() {
        let review = Review {
            id: "r1".into(),
            book_id: "b1".into(),
            user_id: "u1".into(),
            rating: 3,
            comment: Some("  ".into()),
            created_at: "1700000000000".into(),
        };
        assert_eq!(review.created_at_display(), "1700000000000");
        assert!(review.visible_comment().is_none());
    }
}
