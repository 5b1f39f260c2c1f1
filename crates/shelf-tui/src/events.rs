//! UI event types.
//!
//! Everything the reducer reacts to arrives as a `UiEvent`: terminal input,
//! the runtime's frame clock, and results sent back by spawned tasks.

use crossterm::event::Event;
use serde_json::Value;
use shelf_core::ApiError;
use shelf_core::api::queries::QueryKey;
use shelf_core::cache::QueryResult;
use shelf_core::models::Session;
use shelf_core::notifications::ChannelEvent;

use crate::common::{TaskId, TaskKind};

#[derive(Debug)]
pub enum UiEvent {
    /// Frame clock; advances the spinner and triggers a render.
    Tick,
    /// Current terminal size, sent before each batch of events.
    Frame { width: u16, height: u16 },
    Terminal(Event),

    /// Snapshot of one read, either from a fetch or a cache re-read.
    QueryLoaded { key: QueryKey, result: QueryResult },
    /// The cache changed the entry under `key`.
    CacheUpdated(QueryKey),

    MutationFinished {
        task: TaskId,
        kind: TaskKind,
        result: Result<Value, ApiError>,
    },

    /// The session store now holds this session.
    SessionChanged(Option<Session>),

    /// The socket for `user_id` finished its handshake.
    NotificationsConnected { user_id: String },
    Notification(ChannelEvent),
    NotificationsFailed { error: String },
}

