//! Session store: the authenticated user and bearer token.
//!
//! The store always starts empty. `restore_session` repopulates it from the
//! persisted record when one exists. Storage failures are logged and never
//! surfaced: a failed save keeps the in-memory session, a failed or corrupt
//! load leaves the store logged out.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::config::paths;
use crate::models::{Session, User};

/// Durable home of the session record.
pub trait SessionStorage: Send + Sync {
    /// Reads the persisted record. `Ok(None)` when nothing is stored.
    ///
    /// # Errors
    /// Returns an error when the record exists but cannot be read or parsed.
    fn load(&self) -> Result<Option<Session>>;

    /// Replaces the persisted record.
    ///
    /// # Errors
    /// Returns an error when the record cannot be written.
    fn save(&self, session: &Session) -> Result<()>;

    /// Removes the persisted record. Removing a missing record is not an error.
    ///
    /// # Errors
    /// Returns an error when an existing record cannot be removed.
    fn clear(&self) -> Result<()>;
}

/// On-disk record. Both fields are optional so a half-written record is
/// read as "logged out" rather than as a parse failure.
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoredSession {
    user: Option<User>,
    token: Option<String>,
}

/// JSON file storage (`<SHELF_HOME>/auth.json`), written with 0600 permissions.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Storage at the default location under `SHELF_HOME`.
    pub fn default_location() -> Self {
        Self::new(paths::session_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStorage for FileStorage {
    fn load(&self) -> Result<Option<Session>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read session from {}", self.path.display()))?;
        let stored: StoredSession = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse session from {}", self.path.display()))?;

        match (stored.user, stored.token) {
            (Some(user), Some(token)) if !token.is_empty() => Ok(Some(Session { user, token })),
            _ => Ok(None),
        }
    }

    fn save(&self, session: &Session) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let stored = StoredSession {
            user: Some(session.user.clone()),
            token: Some(session.token.clone()),
        };
        let contents =
            serde_json::to_string_pretty(&stored).context("Failed to serialize session")?;

        // Written beside the record, then renamed over it.
        let tmp_path = self.path.with_extension("json.tmp");
        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options
            .open(&tmp_path)
            .with_context(|| format!("Failed to open {} for writing", tmp_path.display()))?;
        // `mode` only applies on create; a leftover temp file keeps its bits.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(fs::Permissions::from_mode(0o600))
                .with_context(|| format!("Failed to restrict {}", tmp_path.display()))?;
        }
        file.write_all(contents.as_bytes())
            .with_context(|| format!("Failed to write to {}", tmp_path.display()))?;
        drop(file);

        fs::rename(&tmp_path, &self.path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                tmp_path.display(),
                self.path.display()
            )
        })?;

        Ok(())
    }

    fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => {
                Err(e).with_context(|| format!("Failed to remove {}", self.path.display()))
            }
        }
    }
}

/// In-memory storage for tests and ephemeral runs.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    slot: Mutex<Option<Session>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-seeded with a record, as if a previous run had logged in.
    pub fn with_session(session: Session) -> Self {
        Self {
            slot: Mutex::new(Some(session)),
        }
    }
}

impl SessionStorage for MemoryStorage {
    fn load(&self) -> Result<Option<Session>> {
        let slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(slot.clone())
    }

    fn save(&self, session: &Session) -> Result<()> {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        *slot = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        *slot = None;
        Ok(())
    }
}

struct Inner {
    storage: Box<dyn SessionStorage>,
    current: watch::Sender<Option<Session>>,
}

/// Shared handle to the current session. Cloning is cheap; all clones see
/// the same state.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("user", &self.current().map(|s| s.user.username))
            .finish_non_exhaustive()
    }
}

impl SessionStore {
    /// Creates an empty store backed by `storage`.
    pub fn new(storage: impl SessionStorage + 'static) -> Self {
        let (current, _) = watch::channel(None);
        Self {
            inner: Arc::new(Inner {
                storage: Box::new(storage),
                current,
            }),
        }
    }

    /// Store backed by an in-memory slot.
    pub fn in_memory() -> Self {
        Self::new(MemoryStorage::new())
    }

    /// Stores the session in memory and in durable storage.
    pub fn set_session(&self, user: User, token: String) {
        let session = Session { user, token };
        if let Err(e) = self.inner.storage.save(&session) {
            tracing::warn!("Failed to persist session: {e:#}");
        }
        tracing::info!(user = %session.user.username, "session set");
        self.inner.current.send_replace(Some(session));
    }

    /// Removes the session from memory and durable storage.
    pub fn clear_session(&self) {
        if let Err(e) = self.inner.storage.clear() {
            tracing::warn!("Failed to remove persisted session: {e:#}");
        }
        tracing::info!("session cleared");
        self.inner.current.send_replace(None);
    }

    /// Repopulates memory from durable storage when a complete record
    /// exists. Returns whether a session was restored.
    pub fn restore_session(&self) -> bool {
        match self.inner.storage.load() {
            Ok(Some(session)) => {
                tracing::debug!(user = %session.user.username, "session restored");
                self.inner.current.send_replace(Some(session));
                true
            }
            Ok(None) => false,
            Err(e) => {
                tracing::warn!("Failed to restore session: {e:#}");
                false
            }
        }
    }

    pub fn current(&self) -> Option<Session> {
        self.inner.current.borrow().clone()
    }

    pub fn user(&self) -> Option<User> {
        self.inner.current.borrow().as_ref().map(|s| s.user.clone())
    }

    /// Token for the next request, read at call time.
    pub fn token(&self) -> Option<String> {
        self.inner.current.borrow().as_ref().map(|s| s.token.clone())
    }

    pub fn is_logged_in(&self) -> bool {
        self.inner.current.borrow().is_some()
    }

    /// Observers receive every change made through `set_session`,
    /// `clear_session` and `restore_session`.
    pub fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.inner.current.subscribe()
    }
}
