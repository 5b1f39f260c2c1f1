//! Query cache keyed by request identity.
//!
//! Reads are cache-first: a stored value is served without a request and a
//! request already in flight for the same key is shared. Writes go through
//! [`QueryCache::mutate`], which refetches the reads the write declares once
//! it succeeds. There is no optimistic update and no eviction policy beyond
//! [`QueryCache::evict_all`].

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures_util::future::{self, BoxFuture, FutureExt, Shared};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::broadcast;

use crate::api::queries::{Mutation, NamedQuery, QueryKey};
use crate::api::{self, ApiClient};
use crate::error::ApiError;

type Request = Shared<BoxFuture<'static, Result<Arc<Value>, ApiError>>>;

/// Snapshot of one read.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult<T = Arc<Value>> {
    pub data: Option<T>,
    pub loading: bool,
    pub error: Option<ApiError>,
}

impl<T> Default for QueryResult<T> {
    fn default() -> Self {
        Self {
            data: None,
            loading: false,
            error: None,
        }
    }
}

impl<T> QueryResult<T> {
    /// State of a read that has been started but not answered.
    pub fn pending() -> Self {
        Self {
            loading: true,
            ..Self::default()
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> QueryResult<U> {
        QueryResult {
            data: self.data.map(f),
            loading: self.loading,
            error: self.error,
        }
    }
}

impl QueryResult<Arc<Value>> {
    /// Decodes the raw `data` object. A shape mismatch becomes the error.
    pub fn decode<T: DeserializeOwned>(&self) -> QueryResult<T> {
        let mut error = self.error.clone();
        let data = self.data.as_deref().and_then(|raw| match api::decode::<T>(raw) {
            Ok(value) => Some(value),
            Err(e) => {
                error.get_or_insert(e);
                None
            }
        });
        QueryResult {
            data,
            loading: self.loading,
            error,
        }
    }
}

#[derive(Default)]
struct Entry {
    data: Option<Arc<Value>>,
    error: Option<ApiError>,
    in_flight: Option<Request>,
    /// Id of the latest request started on this key; only that request
    /// may write its result.
    generation: u64,
}

impl Entry {
    fn snapshot(&self) -> QueryResult {
        QueryResult {
            data: self.data.clone(),
            loading: self.in_flight.is_some(),
            error: self.error.clone(),
        }
    }
}

struct Inner {
    api: ApiClient,
    entries: Mutex<HashMap<QueryKey, Entry>>,
    updates: broadcast::Sender<QueryKey>,
    next_request: AtomicU64,
}

/// Shared cache handle. Cloning is cheap; all clones see the same entries.
#[derive(Clone)]
pub struct QueryCache {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for QueryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryCache")
            .field("entries", &self.entries().len())
            .finish_non_exhaustive()
    }
}

impl QueryCache {
    pub fn new(api: ApiClient) -> Self {
        let (updates, _) = broadcast::channel(64);
        Self {
            inner: Arc::new(Inner {
                api,
                entries: Mutex::new(HashMap::new()),
                updates,
                next_request: AtomicU64::new(1),
            }),
        }
    }

    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<QueryKey, Entry>> {
        self.inner
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Cache-first read. Returns the stored value without a request, joins
    /// a request already in flight for the same key, or starts one.
    pub async fn fetch(&self, query: &NamedQuery) -> QueryResult {
        if query.skip {
            return QueryResult::default();
        }

        let key = query.key();
        let (request, generation) = {
            let mut entries = self.entries();
            let entry = entries.entry(key.clone()).or_default();
            if entry.data.is_some() {
                return entry.snapshot();
            }
            match &entry.in_flight {
                Some(request) => (request.clone(), entry.generation),
                None => self.start(entry, query),
            }
        };

        let result = request.await;
        self.complete(&key, generation, result)
    }

    /// Network-only read: always starts a request and replaces the entry.
    pub async fn refetch(&self, query: &NamedQuery) -> QueryResult {
        if query.skip {
            return QueryResult::default();
        }

        let key = query.key();
        let (request, generation) = {
            let mut entries = self.entries();
            let entry = entries.entry(key.clone()).or_default();
            self.start(entry, query)
        };

        let result = request.await;
        self.complete(&key, generation, result)
    }

    /// Current snapshot without starting anything.
    pub fn read(&self, query: &NamedQuery) -> QueryResult {
        if query.skip {
            return QueryResult::default();
        }
        self.entries()
            .get(&query.key())
            .map(Entry::snapshot)
            .unwrap_or_default()
    }

    /// Runs a write. On success every declared read is refetched before
    /// this returns; on failure nothing is refetched.
    ///
    /// # Errors
    /// Returns the write's own error. Refetch failures are recorded on
    /// their entries, not returned here.
    pub async fn mutate(&self, mutation: &Mutation) -> Result<Value, ApiError> {
        let data = self
            .inner
            .api
            .execute(mutation.operation, mutation.variables.clone())
            .await?;

        tracing::debug!(
            operation = mutation.operation.name,
            refetch = mutation.refetch.len(),
            "mutation succeeded"
        );
        future::join_all(mutation.refetch.iter().map(|query| self.refetch(query))).await;
        Ok(data)
    }

    /// Drops every entry. Requests still in flight finish without writing.
    pub fn evict_all(&self) {
        let keys: Vec<QueryKey> = {
            let mut entries = self.entries();
            entries.drain().map(|(key, _)| key).collect()
        };
        tracing::debug!(count = keys.len(), "cache evicted");
        for key in keys {
            let _ = self.inner.updates.send(key);
        }
    }

    /// Receives the key of every entry that was replaced or evicted.
    pub fn subscribe(&self) -> broadcast::Receiver<QueryKey> {
        self.inner.updates.subscribe()
    }

    fn start(&self, entry: &mut Entry, query: &NamedQuery) -> (Request, u64) {
        let api = self.inner.api.clone();
        let operation = query.operation;
        let variables = query.variables.clone();
        let request: Request = async move { api.execute(operation, variables).await.map(Arc::new) }
            .boxed()
            .shared();

        entry.generation = self.inner.next_request.fetch_add(1, Ordering::Relaxed);
        entry.in_flight = Some(request.clone());
        entry.error = None;
        (request, entry.generation)
    }

    /// Stores `result` when it belongs to the latest request on `key` and
    /// nobody stored it yet, then returns the entry's snapshot.
    fn complete(
        &self,
        key: &QueryKey,
        generation: u64,
        result: Result<Arc<Value>, ApiError>,
    ) -> QueryResult {
        let mut replaced = false;
        let snapshot = {
            let mut entries = self.entries();
            match entries.get_mut(key) {
                Some(entry) if entry.generation == generation && entry.in_flight.is_some() => {
                    entry.in_flight = None;
                    match result {
                        Ok(data) => {
                            entry.data = Some(data);
                            entry.error = None;
                        }
                        Err(e) => {
                            tracing::debug!(%key, "query failed: {e}");
                            entry.error = Some(e);
                        }
                    }
                    replaced = true;
                    entry.snapshot()
                }
                Some(entry) if entry.generation == generation => entry.snapshot(),
                // Superseded or evicted: answer this caller from its own result.
                _ => match result {
                    Ok(data) => QueryResult {
                        data: Some(data),
                        ..QueryResult::default()
                    },
                    Err(e) => QueryResult {
                        error: Some(e),
                        ..QueryResult::default()
                    },
                },
            }
        };

        if replaced {
            let _ = self.inner.updates.send(key.clone());
        }
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::queries;
    use crate::session::SessionStore;

    fn cache() -> QueryCache {
        // Nothing listens here; any request would fail with a transport error.
        QueryCache::new(ApiClient::new(
            "http://127.0.0.1:9/graphql",
            SessionStore::in_memory(),
        ))
    }

    #[tokio::test]
    async fn test_skipped_query_never_touches_cache() {
        let cache = cache();
        let result = cache.fetch(&queries::get_user(None)).await;
        assert!(!result.loading);
        assert!(result.data.is_none());
        assert!(result.error.is_none());
        assert!(cache.entries().is_empty());
    }

    #[test]
    fn test_read_of_unknown_query_is_empty() {
        let cache = cache();
        let result = cache.read(&queries::get_books());
        assert_eq!(result, QueryResult::default());
    }

    #[test]
    fn test_decode_reports_shape_mismatch() {
        let raw = QueryResult {
            data: Some(Arc::new(serde_json::json!({ "books": "nope" }))),
            loading: false,
            error: None,
        };
        let typed = raw.decode::<queries::BooksData>();
        assert!(typed.data.is_none());
        assert!(matches!(typed.error, Some(ApiError::Decode(_))));
    }
}
