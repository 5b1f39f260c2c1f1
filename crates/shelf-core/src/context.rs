use anyhow::Result;

use crate::api::ApiClient;
use crate::cache::QueryCache;
use crate::config::Config;
use crate::session::{FileStorage, SessionStorage, SessionStore};

/// Everything a view needs to talk to the service, owned in one place and
/// passed down explicitly.
#[derive(Debug, Clone)]
pub struct AppContext {
    pub config: Config,
    pub session: SessionStore,
    pub api: ApiClient,
    pub cache: QueryCache,
}

impl AppContext {
    /// Wires the layers together for `config` using the session file under
    /// `SHELF_HOME`, then restores any persisted session.
    ///
    /// # Errors
    /// Returns an error if the configured API URL is malformed.
    pub fn from_config(config: Config) -> Result<Self> {
        let ctx = Self::with_storage(config, FileStorage::default_location())?;
        ctx.session.restore_session();
        Ok(ctx)
    }

    /// Wires the layers together over `storage`. The session starts empty.
    ///
    /// # Errors
    /// Returns an error if the configured API URL is malformed.
    pub fn with_storage(config: Config, storage: impl SessionStorage + 'static) -> Result<Self> {
        let api_url = config.effective_api_url()?;
        let session = SessionStore::new(storage);
        let api = ApiClient::new(api_url, session.clone());
        let cache = QueryCache::new(api.clone());
        Ok(Self {
            config,
            session,
            api,
            cache,
        })
    }

    /// Clears the session and every cached read so the next user never
    /// sees the previous user's results.
    pub fn logout(&self) {
        self.session.clear_session();
        self.cache.evict_all();
    }
}
