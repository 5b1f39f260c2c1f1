//! In-memory stand-in for the book service, served through wiremock.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde_json::{Value, json};
use wiremock::{Request, Respond, ResponseTemplate};

pub const CREATED_AT: &str = "2024-05-01T10:00:00Z";

pub fn can_bind_localhost() -> bool {
    std::net::TcpListener::bind("127.0.0.1:0").is_ok()
}

/// One request as the fake saw it.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub operation: String,
    pub authorization: Option<String>,
    pub variables: Value,
}

#[derive(Default)]
struct State {
    users: Vec<Value>,
    books: Vec<Value>,
    reviews: Vec<Value>,
    categories: Vec<Value>,
    tokens: HashMap<String, String>,
    next_id: u64,
    requests: Vec<Recorded>,
}

impl State {
    fn id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}{}", self.next_id)
    }

    fn user_for(&self, authorization: Option<&str>) -> Option<String> {
        let token = authorization?.strip_prefix("Bearer ")?;
        self.tokens.get(token).cloned()
    }
}

/// Fake GraphQL backend dispatching on `operationName`.
#[derive(Clone, Default)]
pub struct FakeBookService {
    state: Arc<Mutex<State>>,
}

impl FakeBookService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_user(&self, id: &str, username: &str) -> &Self {
        let mut state = self.state.lock().unwrap();
        state.users.push(json!({
            "id": id,
            "username": username,
            "bio": "",
            "birthDate": "1990-01-01",
            "nationality": "PT",
        }));
        state.tokens.insert(format!("token-{id}"), id.to_string());
        self
    }

    pub fn add_book(&self, id: &str, title: &str, author_id: &str) -> &Self {
        self.state.lock().unwrap().books.push(json!({
            "id": id,
            "title": title,
            "description": format!("About {title}"),
            "publishYear": 2001,
            "authorId": author_id,
            "categories": [],
        }));
        self
    }

    pub fn add_review(&self, id: &str, book_id: &str, user_id: &str, rating: u8) -> &Self {
        self.state.lock().unwrap().reviews.push(json!({
            "id": id,
            "bookId": book_id,
            "userId": user_id,
            "rating": rating,
            "comment": null,
            "createdAt": CREATED_AT,
        }));
        self
    }

    pub fn add_category(&self, id: &str, title: &str) -> &Self {
        self.state.lock().unwrap().categories.push(json!({
            "id": id,
            "title": title,
            "description": "",
            "icon": "",
            "parentCategoryId": null,
        }));
        self
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn requests_for(&self, operation: &str) -> Vec<Recorded> {
        self.requests()
            .into_iter()
            .filter(|r| r.operation == operation)
            .collect()
    }

    pub fn reviews(&self) -> Vec<Value> {
        self.state.lock().unwrap().reviews.clone()
    }

    fn handle(&self, operation: &str, variables: &Value, auth: Option<&str>) -> Result<Value, String> {
        let mut state = self.state.lock().unwrap();
        let var = |name: &str| variables[name].as_str().unwrap_or_default().to_string();
        let input = &variables["input"];

        match operation {
            "GetBooks" => Ok(json!({ "books": state.books })),
            "GetBook" => {
                let id = var("id");
                let book = state.books.iter().find(|b| b["id"] == id).cloned();
                Ok(json!({ "book": book }))
            }
            "ReviewsByBook" => {
                let book_id = var("bookId");
                let reviews: Vec<_> = state
                    .reviews
                    .iter()
                    .filter(|r| r["bookId"] == book_id)
                    .cloned()
                    .collect();
                Ok(json!({ "reviewsByBook": reviews }))
            }
            "GetCategories" => Ok(json!({ "categories": state.categories })),
            "GetUsers" => Ok(json!({ "users": state.users })),
            "GetUser" => {
                let id = var("id");
                let user = state.users.iter().find(|u| u["id"] == id).cloned();
                Ok(json!({ "user": user }))
            }
            "LoginUser" => {
                let username = input["username"].as_str().unwrap_or_default();
                let user = state
                    .users
                    .iter()
                    .find(|u| u["username"] == username)
                    .cloned()
                    .ok_or_else(|| "Invalid username or password".to_string())?;
                let token = format!("token-{}", user["id"].as_str().unwrap_or_default());
                Ok(json!({ "loginUser": { "user": user, "token": token } }))
            }
            "RegisterUser" => {
                let username = input["username"].as_str().unwrap_or_default().to_string();
                if state.users.iter().any(|u| u["username"] == username) {
                    return Err("Username already taken".to_string());
                }
                let id = state.id("u");
                let user = json!({
                    "id": id,
                    "username": username,
                    "bio": input["bio"],
                    "birthDate": input["birthDate"],
                    "nationality": input["nationality"],
                });
                state.users.push(user.clone());
                let token = format!("token-{id}");
                state.tokens.insert(token.clone(), id);
                Ok(json!({ "registerUser": { "user": user, "token": token } }))
            }
            "CreateCategory" => {
                let id = state.id("c");
                let category = json!({
                    "id": id,
                    "title": input["title"],
                    "description": input["description"],
                    "icon": input["icon"],
                    "parentCategoryId": input["parentCategoryId"],
                });
                state.categories.push(category.clone());
                Ok(json!({ "createCategory": category }))
            }
            "CreateBook" => {
                let author = state
                    .user_for(auth)
                    .ok_or_else(|| "Not authenticated".to_string())?;
                let id = state.id("b");
                let book = json!({
                    "id": id,
                    "title": input["title"],
                    "description": input["description"],
                    "publishYear": input["publishYear"],
                    "authorId": author,
                    "categories": input["categories"],
                });
                state.books.push(book.clone());
                Ok(json!({ "createBook": book }))
            }
            "UpdateBook" => {
                let user = state
                    .user_for(auth)
                    .ok_or_else(|| "Not authenticated".to_string())?;
                let id = var("id");
                let book = state
                    .books
                    .iter_mut()
                    .find(|b| b["id"] == id)
                    .ok_or_else(|| "Book not found".to_string())?;
                if book["authorId"] != user {
                    return Err("Only the author can edit this book".to_string());
                }
                for field in ["title", "description", "publishYear", "categories"] {
                    book[field] = input[field].clone();
                }
                Ok(json!({ "updateBook": book.clone() }))
            }
            "DeleteBook" => {
                let id = var("id");
                state.books.retain(|b| b["id"] != id);
                state.reviews.retain(|r| r["bookId"] != id);
                Ok(json!({ "deleteBook": true }))
            }
            "CreateReview" => {
                let user = state
                    .user_for(auth)
                    .ok_or_else(|| "Not authenticated".to_string())?;
                let book_id = input["bookId"].as_str().unwrap_or_default().to_string();
                if state
                    .reviews
                    .iter()
                    .any(|r| r["bookId"] == book_id && r["userId"] == user)
                {
                    return Err("You have already reviewed this book".to_string());
                }
                let id = state.id("r");
                let review = json!({
                    "id": id,
                    "bookId": book_id,
                    "userId": user,
                    "rating": input["rating"],
                    "comment": input["comment"],
                    "createdAt": CREATED_AT,
                });
                state.reviews.push(review.clone());
                Ok(json!({ "createReview": review }))
            }
            "DeleteReview" => {
                let id = var("id");
                state.reviews.retain(|r| r["id"] != id);
                Ok(json!({ "deleteReview": true }))
            }
            other => Err(format!("Unknown operation {other}")),
        }
    }
}

impl Respond for FakeBookService {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let body: Value = serde_json::from_slice(&request.body).unwrap_or(Value::Null);
        let operation = body["operationName"].as_str().unwrap_or_default().to_string();
        let variables = body["variables"].clone();
        let authorization = request
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        self.state.lock().unwrap().requests.push(Recorded {
            operation: operation.clone(),
            authorization: authorization.clone(),
            variables: variables.clone(),
        });

        match self.handle(&operation, &variables, authorization.as_deref()) {
            Ok(data) => ResponseTemplate::new(200).set_body_json(json!({ "data": data })),
            Err(message) => ResponseTemplate::new(200)
                .set_body_json(json!({ "data": null, "errors": [{ "message": message }] })),
        }
    }
}
