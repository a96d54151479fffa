//! Configuration types for booru-scrape
//!
//! The pipeline never reads files on its own. Database settings and API
//! credentials come from a [`ConfigProvider`]; [`HomeConfigProvider`] is the
//! default one and reads JSON files from `$HOME/.config/scrapedbooru`.

use crate::error::{Error, Result, config_file_error};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Directory below the home directory holding the configuration files
pub const CONFIG_DIR: &str = ".config/scrapedbooru";
/// File name of the API credentials
pub const AUTH_FILENAME: &str = "auth.json";
/// File name of the database settings
pub const DATABASE_FILENAME: &str = "database.json";

/// API login used for HTTP Basic authentication
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Account name
    pub login: String,
    /// API key of the account
    pub api_key: String,
}

/// Database settings
///
/// This is the descriptor of the relational store: the store is an SQLite
/// file, so a path and a pool size take the place of host, port, user,
/// password and database name.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file (created if missing)
    pub path: PathBuf,

    /// Maximum number of pooled connections (default: 10)
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl DatabaseConfig {
    /// Settings for a database file with the default pool size
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            max_connections: default_max_connections(),
        }
    }
}

/// Remote API settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the image board (default: "https://danbooru.donmai.us")
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Per-request timeout in seconds (default: 10)
    #[serde(default = "default_timeout", with = "duration_serde")]
    pub timeout: Duration,

    /// User agent sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            timeout: default_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

/// Worker pool and output settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScrapeConfig {
    /// Number of concurrent workers (default: 10)
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Directory receiving `<id>.<ext>` files (None = do not download files)
    #[serde(default = "default_save_dir")]
    pub save_dir: Option<PathBuf>,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            save_dir: default_save_dir(),
        }
    }
}

/// Complete configuration of a scrape run
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Remote API settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Database settings
    pub database: DatabaseConfig,

    /// Worker pool and output settings
    #[serde(default)]
    pub scrape: ScrapeConfig,

    /// API credentials (None = anonymous requests)
    #[serde(default)]
    pub credentials: Option<Credentials>,
}

impl Config {
    /// Assemble a configuration from a provider
    ///
    /// The database settings are mandatory: a provider error is returned as is.
    /// Credentials are optional: if they cannot be loaded the run falls back to
    /// anonymous requests and a warning is logged.
    pub fn load(
        provider: &dyn ConfigProvider,
        api: ApiConfig,
        scrape: ScrapeConfig,
    ) -> Result<Self> {
        let database = provider.database_config()?;

        let credentials = match provider.credentials() {
            Ok(Some(credentials)) => {
                info!(login = %credentials.login, "Using API credentials");
                Some(credentials)
            }
            Ok(None) => {
                info!("No API credentials configured, using anonymous requests");
                None
            }
            Err(e) => {
                warn!(error = %e, "Could not load API credentials");
                warn!("Authentication not possible, falling back to anonymous requests");
                None
            }
        };

        let config = Self {
            api,
            database,
            scrape,
            credentials,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check settings that would otherwise fail deep inside the pipeline
    pub fn validate(&self) -> Result<()> {
        if self.scrape.workers == 0 {
            return Err(Error::Config {
                message: "worker count must be at least 1".to_string(),
                key: Some("workers".to_string()),
            });
        }
        if self.api.timeout.is_zero() {
            return Err(Error::Config {
                message: "request timeout must be greater than zero".to_string(),
                key: Some("timeout".to_string()),
            });
        }
        url::Url::parse(&self.api.endpoint).map_err(|e| Error::Config {
            message: format!("invalid API endpoint {}: {}", self.api.endpoint, e),
            key: Some("endpoint".to_string()),
        })?;
        Ok(())
    }
}

/// Source of the settings the pipeline cannot run without
pub trait ConfigProvider: Send + Sync {
    /// Database settings; failing here is fatal
    fn database_config(&self) -> Result<DatabaseConfig>;

    /// API credentials; `Ok(None)` means anonymous access
    fn credentials(&self) -> Result<Option<Credentials>>;
}

/// Reads `database.json` and `auth.json` from a configuration directory
#[derive(Clone, Debug)]
pub struct HomeConfigProvider {
    dir: PathBuf,
}

impl HomeConfigProvider {
    /// Provider for `$HOME/.config/scrapedbooru`
    pub fn new() -> Result<Self> {
        let home = dirs::home_dir().ok_or_else(|| Error::Config {
            message: "could not determine the home directory".to_string(),
            key: None,
        })?;
        Ok(Self::with_dir(home.join(CONFIG_DIR)))
    }

    /// Provider for an explicit configuration directory
    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory the files are read from
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ConfigProvider for HomeConfigProvider {
    fn database_config(&self) -> Result<DatabaseConfig> {
        let path = self.dir.join(DATABASE_FILENAME);
        let mut config: DatabaseConfig = read_json(&path)?;

        // Relative database paths are resolved against the config directory
        if config.path.is_relative() {
            config.path = self.dir.join(&config.path);
        }
        Ok(config)
    }

    fn credentials(&self) -> Result<Option<Credentials>> {
        let path = self.dir.join(AUTH_FILENAME);
        if !path.exists() {
            return Ok(None);
        }
        read_json(&path).map(Some)
    }
}

/// Provider holding settings built in code
#[derive(Clone, Debug)]
pub struct StaticConfigProvider {
    /// Database settings to hand out
    pub database: DatabaseConfig,
    /// Credentials to hand out
    pub credentials: Option<Credentials>,
}

impl ConfigProvider for StaticConfigProvider {
    fn database_config(&self) -> Result<DatabaseConfig> {
        Ok(self.database.clone())
    }

    fn credentials(&self) -> Result<Option<Credentials>> {
        Ok(self.credentials.clone())
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path).map_err(|e| config_file_error(path, e))?;
    serde_json::from_str(&content).map_err(|e| config_file_error(path, e))
}

fn default_endpoint() -> String {
    "https://danbooru.donmai.us".to_string()
}

fn default_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_user_agent() -> String {
    concat!("booru-scrape/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_workers() -> usize {
    10
}

fn default_save_dir() -> Option<PathBuf> {
    Some(PathBuf::from("."))
}

fn default_max_connections() -> u32 {
    10
}

// Duration serialization helper (whole seconds)
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
