//! Effect handlers.
//!
//! Each handler is a plain async function returning the `UiEvent` that
//! carries its result. Long-lived watchers push into the inbox instead.

use shelf_core::api::queries::{Mutation, NamedQuery, QueryKey};
use shelf_core::cache::QueryCache;
use shelf_core::notifications::{ChannelEvent, NotificationChannel};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tokio_util::sync::CancellationToken;

use super::inbox::UiEventSender;
use crate::common::{TaskId, TaskKind};
use crate::events::UiEvent;

pub async fn fetch_query(cache: QueryCache, query: NamedQuery) -> UiEvent {
    let result = cache.fetch(&query).await;
    UiEvent::QueryLoaded {
        key: query.key(),
        result,
    }
}

pub async fn refetch_query(cache: QueryCache, query: NamedQuery) -> UiEvent {
    let result = cache.refetch(&query).await;
    UiEvent::QueryLoaded {
        key: query.key(),
        result,
    }
}

pub async fn run_mutation(
    cache: QueryCache,
    task: TaskId,
    kind: TaskKind,
    mutation: Mutation,
) -> UiEvent {
    let result = cache.mutate(&mutation).await;
    if let Err(error) = &result {
        tracing::warn!(operation = mutation.operation.name, %error, "mutation failed");
    }
    UiEvent::MutationFinished { task, kind, result }
}

/// Forwards cache change notices into the inbox until either side closes.
pub async fn forward_cache_updates(mut updates: broadcast::Receiver<QueryKey>, tx: UiEventSender) {
    loop {
        match updates.recv().await {
            Ok(key) => {
                if tx.send(UiEvent::CacheUpdated(key)).is_err() {
                    break;
                }
            }
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "cache updates lagged");
            }
            Err(RecvError::Closed) => break,
        }
    }
}

/// Connects the notification channel for `user_id` and relays its events
/// until the channel closes or `cancel` fires.
pub async fn watch_notifications(
    url: String,
    user_id: String,
    cancel: CancellationToken,
    tx: UiEventSender,
) {
    let connected = tokio::select! {
        () = cancel.cancelled() => return,
        result = NotificationChannel::connect(&url, &user_id) => result,
    };
    let mut channel = match connected {
        Ok(channel) => channel,
        Err(error) => {
            tracing::warn!(%user_id, error = format!("{error:#}"), "notification channel failed");
            let _ = tx.send(UiEvent::NotificationsFailed {
                error: format!("{error:#}"),
            });
            return;
        }
    };
    tracing::debug!(%user_id, "notification channel connected");
    if tx
        .send(UiEvent::NotificationsConnected {
            user_id: user_id.clone(),
        })
        .is_err()
    {
        channel.close();
        return;
    }

    loop {
        tokio::select! {
            () = cancel.cancelled() => {
                channel.close();
                break;
            }
            event = channel.recv() => {
                let Some(event) = event else { break };
                let closed = matches!(event, ChannelEvent::Closed { .. });
                if tx.send(UiEvent::Notification(event)).is_err() || closed {
                    break;
                }
            }
        }
    }
    tracing::debug!(%user_id, "notification watcher stopped");
}
