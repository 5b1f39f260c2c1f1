//! Configuration management for Shelf.
//!
//! Loads configuration from ${SHELF_HOME}/config.toml with sensible defaults.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Env var overriding the GraphQL endpoint.
pub const API_URL_ENV: &str = "SHELF_API_URL";

/// Env var overriding the notifications websocket endpoint.
pub const NOTIFICATIONS_URL_ENV: &str = "SHELF_NOTIFICATIONS_URL";

/// Returns the default config template with comments.
///
/// This is embedded from default_config.toml at compile time.
fn default_config_template() -> &'static str {
    include_str!("../default_config.toml")
}

/// Merges user config values into the default template.
///
/// This ensures new comments/sections from the template are always present,
/// while preserving user's customized values.
fn merge_with_template(user_config: &str) -> Result<String> {
    use toml_edit::DocumentMut;

    let mut doc: DocumentMut = default_config_template()
        .parse()
        .context("Failed to parse default config template")?;
    let user_doc: DocumentMut = user_config.parse().context("Failed to parse user config")?;

    merge_items(doc.as_table_mut(), user_doc.as_table());

    Ok(doc.to_string())
}

/// Recursively merges items from source table into target table.
fn merge_items(target: &mut toml_edit::Table, source: &toml_edit::Table) {
    use toml_edit::Item;

    for (key, value) in source.iter() {
        match value {
            Item::Value(v) => {
                target[key] = Item::Value(v.clone());
            }
            Item::Table(src_table) => {
                if let Some(Item::Table(target_table)) = target.get_mut(key) {
                    merge_items(target_table, src_table);
                } else {
                    target[key] = Item::Table(src_table.clone());
                }
            }
            Item::ArrayOfTables(src_arr) => {
                target[key] = Item::ArrayOfTables(src_arr.clone());
            }
            Item::None => {}
        }
    }
}

pub mod paths {
    //! Path resolution for Shelf configuration and data directories.
    //!
    //! SHELF_HOME resolution order:
    //! 1. SHELF_HOME environment variable (if set)
    //! 2. ~/.config/shelf (default)
    //! 3. ./.shelf when no home directory can be determined

    use std::path::PathBuf;

    /// Returns the Shelf home directory.
    pub fn shelf_home() -> PathBuf {
        if let Ok(home) = std::env::var("SHELF_HOME")
            && !home.trim().is_empty()
        {
            return PathBuf::from(home);
        }

        dirs::home_dir().map_or_else(
            || PathBuf::from(".shelf"),
            |h| h.join(".config").join("shelf"),
        )
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        shelf_home().join("config.toml")
    }

    /// Returns the path to the persisted session record.
    pub fn session_path() -> PathBuf {
        shelf_home().join("auth.json")
    }

    /// Returns the directory log files are written to.
    pub fn logs_dir() -> PathBuf {
        shelf_home().join("logs")
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// GraphQL endpoint of the book service.
    pub api_url: String,

    /// Websocket endpoint for live notifications (derived from `api_url` when unset).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notifications_url: Option<String>,

    /// Maximum notifications kept in memory.
    pub notification_limit: usize,

    /// Log filter directive.
    pub log_level: String,
}

impl Config {
    pub const DEFAULT_API_URL: &str = "http://book-app:4000/graphql";
    pub const DEFAULT_NOTIFICATION_LIMIT: usize = 50;
    const DEFAULT_LOG_LEVEL: &str = "info";
    const NOTIFICATIONS_PATH: &str = "/notifications";

    /// Loads configuration from the default config path.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if file doesn't exist.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))
        } else {
            Ok(Config::default())
        }
    }

    /// Returns the effective GraphQL endpoint.
    ///
    /// Resolution order: `SHELF_API_URL` > config > default.
    ///
    /// # Errors
    /// Returns an error if the chosen URL is malformed.
    pub fn effective_api_url(&self) -> Result<String> {
        resolve_url(
            std::env::var(API_URL_ENV).ok().as_deref(),
            Some(&self.api_url),
            Self::DEFAULT_API_URL,
            "API",
        )
    }

    /// Returns the effective websocket endpoint for notifications.
    ///
    /// Resolution order: `SHELF_NOTIFICATIONS_URL` > config > derived from
    /// the effective API URL.
    ///
    /// # Errors
    /// Returns an error if the chosen URL is malformed.
    pub fn effective_notifications_url(&self) -> Result<String> {
        let derived = derive_notifications_url(&self.effective_api_url()?)?;
        resolve_url(
            std::env::var(NOTIFICATIONS_URL_ENV).ok().as_deref(),
            self.notifications_url.as_deref(),
            &derived,
            "notifications",
        )
    }

    /// Returns the configured notification cap (at least one).
    pub fn notification_limit(&self) -> usize {
        self.notification_limit.max(1)
    }

    /// Creates a default config file at the given path.
    ///
    /// # Errors
    /// Returns an error if the file already exists or cannot be written.
    pub fn init(path: &Path) -> Result<()> {
        if path.exists() {
            anyhow::bail!("Config file already exists at {}", path.display());
        }

        Self::write_config(path, default_config_template())
    }

    /// Saves only the `api_url` field to the default config file.
    ///
    /// # Errors
    /// Returns an error if the config cannot be read, parsed or written.
    pub fn save_api_url(url: &str) -> Result<()> {
        Self::save_api_url_to(&paths::config_path(), url)
    }

    /// Saves only the `api_url` field to a specific config file path.
    ///
    /// Creates the file with default template if it doesn't exist.
    /// If file exists, merges user values into the latest template.
    ///
    /// # Errors
    /// Returns an error if the URL is malformed or the file cannot be written.
    pub fn save_api_url_to(path: &Path, url: &str) -> Result<()> {
        use toml_edit::{DocumentMut, value};

        url::Url::parse(url).with_context(|| format!("Invalid API URL: {url}"))?;

        let contents = if path.exists() {
            let user_config = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            merge_with_template(&user_config)?
        } else {
            default_config_template().to_string()
        };

        let mut doc: DocumentMut = contents
            .parse()
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;
        doc["api_url"] = value(url);

        Self::write_config(path, &doc.to_string())
    }

    /// Writes config content to a file, creating parent directories as needed.
    /// Uses atomic write (temp file + rename) to prevent corruption.
    fn write_config(path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let tmp_path = path.with_extension("toml.tmp");
        fs::write(&tmp_path, content)
            .with_context(|| format!("Failed to write config to {}", tmp_path.display()))?;
        fs::rename(&tmp_path, path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                tmp_path.display(),
                path.display()
            )
        })?;

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: Self::DEFAULT_API_URL.to_string(),
            notifications_url: None,
            notification_limit: Self::DEFAULT_NOTIFICATION_LIMIT,
            log_level: Self::DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

/// Resolves a URL with precedence: env > config > default.
fn resolve_url(
    env_value: Option<&str>,
    config_value: Option<&str>,
    default_url: &str,
    label: &str,
) -> Result<String> {
    for candidate in [env_value, config_value].into_iter().flatten() {
        let trimmed = candidate.trim();
        if !trimmed.is_empty() {
            url::Url::parse(trimmed).with_context(|| format!("Invalid {label} URL: {trimmed}"))?;
            return Ok(trimmed.to_string());
        }
    }
    Ok(default_url.to_string())
}

/// Derives the websocket notifications URL from the GraphQL endpoint.
fn derive_notifications_url(api_url: &str) -> Result<String> {
    let mut url = url::Url::parse(api_url).with_context(|| format!("Invalid API URL: {api_url}"))?;
    let scheme = if url.scheme() == "https" { "wss" } else { "ws" };
    url.set_scheme(scheme)
        .map_err(|()| anyhow::anyhow!("Cannot derive websocket URL from {api_url}"))?;
    url.set_path(Config::NOTIFICATIONS_PATH);
    url.set_query(None);
    Ok(url.to_string())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_load_missing_file_returns_defaults() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("nonexistent.toml");

        let config = Config::load_from(&config_path).unwrap();
        assert_eq!(config.api_url, "http://book-app:4000/graphql");
        assert_eq!(config.notification_limit, 50);
        assert!(config.notifications_url.is_none());
    }

    #[test]
    fn test_load_partial_config_merges_defaults() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.toml");

        fs::write(&config_path, "api_url = \"http://localhost:4000/graphql\"\n").unwrap();

        let config = Config::load_from(&config_path).unwrap();
        assert_eq!(config.api_url, "http://localhost:4000/graphql");
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_init_creates_config_with_defaults() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("subdir").join("config.toml");

        Config::init(&config_path).unwrap();

        let contents = fs::read_to_string(&config_path).unwrap();
        assert!(contents.contains("# Shelf Configuration"));
        assert!(contents.contains("api_url = \"http://book-app:4000/graphql\""));

        let config = Config::load_from(&config_path).unwrap();
        assert_eq!(config.notification_limit, 50);
    }

    #[test]
    fn test_init_fails_if_exists() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.toml");
        fs::write(&config_path, "# existing").unwrap();

        let err = Config::init(&config_path).unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }

    #[test]
    fn test_save_api_url_preserves_other_fields_and_comments() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.toml");
        fs::write(&config_path, "notification_limit = 7\n").unwrap();

        Config::save_api_url_to(&config_path, "https://books.example/graphql").unwrap();

        let contents = fs::read_to_string(&config_path).unwrap();
        assert!(contents.contains("# Shelf Configuration"));
        let config = Config::load_from(&config_path).unwrap();
        assert_eq!(config.api_url, "https://books.example/graphql");
        assert_eq!(config.notification_limit, 7);
    }

    #[test]
    fn test_save_api_url_rejects_malformed_url() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.toml");

        assert!(Config::save_api_url_to(&config_path, "not a url").is_err());
        assert!(!config_path.exists());
    }

    #[test]
    fn test_resolve_url_precedence() {
        let resolved = resolve_url(
            Some("http://env/graphql"),
            Some("http://config/graphql"),
            "http://default/graphql",
            "API",
        )
        .unwrap();
        assert_eq!(resolved, "http://env/graphql");

        let resolved =
            resolve_url(Some("  "), Some("http://config/graphql"), "http://d/", "API").unwrap();
        assert_eq!(resolved, "http://config/graphql");

        let resolved = resolve_url(None, None, "http://default/graphql", "API").unwrap();
        assert_eq!(resolved, "http://default/graphql");
    }

    #[test]
    fn test_derive_notifications_url() {
        assert_eq!(
            derive_notifications_url("http://book-app:4000/graphql").unwrap(),
            "ws://book-app:4000/notifications"
        );
        assert_eq!(
            derive_notifications_url("https://books.example/api/graphql?x=1").unwrap(),
            "wss://books.example/notifications"
        );
    }

    #[test]
    fn test_notification_limit_never_zero() {
        let config = Config {
            notification_limit: 0,
            ..Config::default()
        };
        assert_eq!(config.notification_limit(), 1);
    }
}
