//! Errors surfaced by the API boundary.
//!
//! Every variant renders as a short, human-readable message: views show
//! `to_string()` verbatim next to the control that triggered the request.
//! The type is `Clone` so one failed in-flight request can be handed to
//! every consumer waiting on it.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The request never produced a response (DNS, connect, reset).
    #[error("{0}")]
    Transport(String),

    /// The server answered with a non-success HTTP status.
    #[error("Request failed (HTTP {status}): {body}")]
    Status { status: u16, body: String },

    /// The API rejected the operation (validation, authorization, ...).
    /// Displays the first message verbatim.
    #[error("{}", .messages.first().map_or("Unknown API error", String::as_str))]
    Graphql { messages: Vec<String> },

    /// The response body did not match the expected shape.
    #[error("Unexpected response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode(err.to_string())
    }
}
