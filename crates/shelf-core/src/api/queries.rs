//! Typed builders for named reads and writes, plus their response shapes.
//!
//! Each write declares the reads it invalidates; the cache refetches those
//! after the write succeeds.

use serde::Deserialize;
use serde_json::{Value, json};

use super::operations::{self, Operation};
use crate::models::{
    AuthPayload, Book, BookInput, Category, CreateCategoryInput, CreateReviewInput, LoginUserInput,
    RegisterUserInput, Review, User,
};

/// Cache identity of a read: operation name plus canonical variables.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryKey {
    pub operation: &'static str,
    pub variables: String,
}

impl std::fmt::Display for QueryKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.operation, self.variables)
    }
}

/// A read request. A skipped read never reaches the network or the cache.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedQuery {
    pub operation: Operation,
    pub variables: Value,
    pub skip: bool,
}

impl NamedQuery {
    pub fn new(operation: Operation, variables: Value) -> Self {
        Self {
            operation,
            variables,
            skip: false,
        }
    }

    pub fn skipped(operation: Operation) -> Self {
        Self {
            operation,
            variables: Value::Null,
            skip: true,
        }
    }

    pub fn key(&self) -> QueryKey {
        let mut variables = String::new();
        write_canonical(&self.variables, &mut variables);
        QueryKey {
            operation: self.operation.name,
            variables,
        }
    }
}

/// Serializes `value` with object keys sorted at every level, so equal
/// variables always produce the same key.
fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<_> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            out.push('{');
            for (i, (key, value)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::from(key.as_str()).to_string());
                out.push(':');
                write_canonical(value, out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}

/// A write plus the reads to refetch once it succeeds.
#[derive(Debug, Clone, PartialEq)]
pub struct Mutation {
    pub operation: Operation,
    pub variables: Value,
    pub refetch: Vec<NamedQuery>,
}

fn id_query(operation: Operation, name: &str, id: &str) -> NamedQuery {
    if id.is_empty() {
        NamedQuery::skipped(operation)
    } else {
        let mut variables = serde_json::Map::new();
        variables.insert(name.to_string(), Value::from(id));
        NamedQuery::new(operation, Value::Object(variables))
    }
}

// ============================================================================
// Reads
// ============================================================================

pub fn get_books() -> NamedQuery {
    NamedQuery::new(operations::GET_BOOKS, json!({}))
}

/// Skipped when `id` is empty.
pub fn get_book(id: &str) -> NamedQuery {
    id_query(operations::GET_BOOK, "id", id)
}

pub fn reviews_by_book(book_id: &str) -> NamedQuery {
    id_query(operations::REVIEWS_BY_BOOK, "bookId", book_id)
}

pub fn get_categories() -> NamedQuery {
    NamedQuery::new(operations::GET_CATEGORIES, json!({}))
}

pub fn get_users() -> NamedQuery {
    NamedQuery::new(operations::GET_USERS, json!({}))
}

/// Skipped until the id is known (e.g. the author of a book still loading).
pub fn get_user(id: Option<&str>) -> NamedQuery {
    id_query(operations::GET_USER, "id", id.unwrap_or_default())
}

#[derive(Debug, Clone, Deserialize)]
pub struct BooksData {
    pub books: Vec<Book>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BookData {
    pub book: Option<Book>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReviewsByBookData {
    #[serde(rename = "reviewsByBook")]
    pub reviews: Vec<Review>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CategoriesData {
    pub categories: Vec<Category>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UsersData {
    pub users: Vec<User>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserData {
    pub user: Option<User>,
}

// ============================================================================
// Writes
// ============================================================================

fn input_value<T: serde::Serialize>(input: &T) -> Value {
    serde_json::to_value(input).unwrap_or(Value::Null)
}

pub fn register_user(input: &RegisterUserInput) -> Mutation {
    Mutation {
        operation: operations::REGISTER_USER,
        variables: json!({ "input": input_value(input) }),
        refetch: vec![get_users()],
    }
}

pub fn login_user(input: &LoginUserInput) -> Mutation {
    Mutation {
        operation: operations::LOGIN_USER,
        variables: json!({ "input": input_value(input) }),
        refetch: Vec::new(),
    }
}

pub fn create_category(input: &CreateCategoryInput) -> Mutation {
    Mutation {
        operation: operations::CREATE_CATEGORY,
        variables: json!({ "input": input_value(input) }),
        refetch: vec![get_categories()],
    }
}

pub fn create_book(input: &BookInput) -> Mutation {
    Mutation {
        operation: operations::CREATE_BOOK,
        variables: json!({ "input": input_value(input) }),
        refetch: vec![get_books()],
    }
}

pub fn update_book(id: &str, input: &BookInput) -> Mutation {
    Mutation {
        operation: operations::UPDATE_BOOK,
        variables: json!({ "id": id, "input": input_value(input) }),
        refetch: vec![get_books(), get_book(id)],
    }
}

pub fn delete_book(id: &str) -> Mutation {
    Mutation {
        operation: operations::DELETE_BOOK,
        variables: json!({ "id": id }),
        refetch: vec![get_books()],
    }
}

pub fn create_review(input: &CreateReviewInput) -> Mutation {
    Mutation {
        operation: operations::CREATE_REVIEW,
        variables: json!({ "input": input_value(input) }),
        refetch: vec![reviews_by_book(&input.book_id)],
    }
}

/// `book_id` names the reviews list to refresh.
pub fn delete_review(id: &str, book_id: &str) -> Mutation {
    Mutation {
        operation: operations::DELETE_REVIEW,
        variables: json!({ "id": id }),
        refetch: vec![reviews_by_book(book_id)],
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterUserData {
    #[serde(rename = "registerUser")]
    pub payload: AuthPayload,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginUserData {
    #[serde(rename = "loginUser")]
    pub payload: AuthPayload,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateCategoryData {
    #[serde(rename = "createCategory")]
    pub category: Category,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateBookData {
    #[serde(rename = "createBook")]
    pub book: Book,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateBookData {
    #[serde(rename = "updateBook")]
    pub book: Book,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateReviewData {
    #[serde(rename = "createReview")]
    pub review: Review,
}
