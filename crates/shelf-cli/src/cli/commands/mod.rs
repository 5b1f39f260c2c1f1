//! CLI command handlers.

pub mod auth;
pub mod books;
pub mod categories;
pub mod config;
pub mod notifications;
pub mod reviews;
pub mod users;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;
use shelf_core::AppContext;
use shelf_core::api::decode;
use shelf_core::api::queries::{Mutation, NamedQuery};
use shelf_core::models::User;

/// Runs one read through the cache and decodes its data.
async fn read<T: DeserializeOwned>(ctx: &AppContext, query: &NamedQuery) -> Result<T> {
    let result = ctx.cache.fetch(query).await;
    if let Some(error) = result.error {
        return Err(error).with_context(|| format!("{} failed", query.operation.name));
    }
    let data = result
        .data
        .with_context(|| format!("{} returned no data", query.operation.name))?;
    decode(&data).with_context(|| format!("{} returned unexpected data", query.operation.name))
}

/// Runs one write and returns its raw data.
async fn write(ctx: &AppContext, mutation: &Mutation) -> Result<Value> {
    ctx.cache
        .mutate(mutation)
        .await
        .with_context(|| format!("{} failed", mutation.operation.name))
}

fn require_login(ctx: &AppContext) -> Result<User> {
    ctx.session
        .user()
        .context("Not logged in. Run `shelf login` first.")
}
