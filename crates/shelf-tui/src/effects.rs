//! UI effect types.
//!
//! Effects are commands returned by the reducer that the runtime executes.
//! They represent I/O and task spawning only; the reducer never touches the
//! network, the session file or the socket itself.

use shelf_core::api::queries::{Mutation, NamedQuery};
use shelf_core::models::User;

use crate::common::{TaskId, TaskKind};

/// Effects returned by the reducer for the runtime to execute.
#[derive(Debug)]
pub enum UiEffect {
    /// Quit the application.
    Quit,

    /// Cache-first read. The result arrives as `UiEvent::QueryLoaded`.
    Fetch { query: NamedQuery },

    /// Network-only read, bypassing any stored value.
    Refetch { query: NamedQuery },

    /// Re-read the stored snapshot of a key the cache reported as changed.
    /// An evicted entry is fetched again.
    ReadCached { query: NamedQuery },

    /// Run a write through the cache. The result arrives as
    /// `UiEvent::MutationFinished` after the declared reads were refetched.
    Mutate {
        task: TaskId,
        kind: TaskKind,
        mutation: Mutation,
    },

    /// Store the logged-in user and token.
    SetSession { user: User, token: String },

    /// Clear the session and every cached read.
    Logout,

    /// Open the live notification channel for `user_id`.
    OpenNotifications { user_id: String },

    /// Close the live notification channel if open.
    CloseNotifications,
}
