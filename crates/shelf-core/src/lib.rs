//! Core library for the Shelf book client.
//!
//! Holds everything below the views: configuration, the session store, the
//! GraphQL client, the query cache and the notification feed.

pub mod api;
pub mod cache;
pub mod config;
pub mod context;
pub mod eligibility;
pub mod error;
pub mod logging;
pub mod models;
pub mod notifications;
pub mod session;

pub use context::AppContext;
pub use error::ApiError;
