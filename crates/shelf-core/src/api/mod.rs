//! The single request pipeline to the book service.
//!
//! Every request reads the bearer token from the [`SessionStore`] at call
//! time. There is no retry and no timeout policy: a failure surfaces once.

pub mod operations;
pub mod queries;

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

pub use operations::Operation;

use crate::error::ApiError;
use crate::session::SessionStore;

#[derive(Debug, Deserialize)]
struct GraphqlResponse {
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    errors: Option<Vec<GraphqlError>>,
}

#[derive(Debug, Deserialize)]
struct GraphqlError {
    message: String,
}

/// GraphQL-over-HTTP client. Cloning shares the connection pool and session.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    url: String,
    session: SessionStore,
}

impl ApiClient {
    pub fn new(url: impl Into<String>, session: SessionStore) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: url.into(),
            session,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Runs one operation and returns its `data` object.
    ///
    /// # Errors
    /// Returns `ApiError::Graphql` when the response carries an `errors`
    /// array, `ApiError::Status` for other non-success responses,
    /// `ApiError::Transport` when no response arrived, and
    /// `ApiError::Decode` when the body is not a GraphQL response.
    pub async fn execute(&self, operation: Operation, variables: Value) -> Result<Value, ApiError> {
        let body = json!({
            "operationName": operation.name,
            "query": operation.document,
            "variables": variables,
        });

        tracing::debug!(operation = operation.name, "request");

        let response = self
            .http
            .post(&self.url)
            .headers(self.auth_headers())
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(operation = operation.name, "transport error: {e}");
                ApiError::from(e)
            })?;

        let status = response.status();
        let text = response.text().await?;
        let parsed = serde_json::from_str::<GraphqlResponse>(&text);

        if let Ok(GraphqlResponse {
            errors: Some(errors),
            ..
        }) = &parsed
            && !errors.is_empty()
        {
            let messages: Vec<String> = errors.iter().map(|e| e.message.clone()).collect();
            tracing::debug!(operation = operation.name, ?messages, "graphql errors");
            return Err(ApiError::Graphql { messages });
        }

        if !status.is_success() {
            tracing::warn!(operation = operation.name, status = status.as_u16(), "request failed");
            return Err(ApiError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        let response = parsed?;
        response
            .data
            .ok_or_else(|| ApiError::Decode("response has no data".to_string()))
    }

    /// Headers for the next request. A token that is not a valid header
    /// value degrades to an unauthenticated request.
    fn auth_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        let Some(token) = self.session.token() else {
            return headers;
        };
        match HeaderValue::from_str(&format!("Bearer {token}")) {
            Ok(mut value) => {
                value.set_sensitive(true);
                headers.insert(AUTHORIZATION, value);
            }
            Err(_) => {
                tracing::warn!("Session token is not a valid header value; sending without it");
            }
        }
        headers
    }
}

/// Decodes a `data` object (or one of its fields) into a typed value.
///
/// # Errors
/// Returns `ApiError::Decode` when the value does not match `T`.
pub fn decode<T: DeserializeOwned>(data: &Value) -> Result<T, ApiError> {
    T::deserialize(data).map_err(ApiError::from)
}
