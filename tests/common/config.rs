//! Test configuration helpers writing a scratch configuration directory

use booru_scrape::{ApiConfig, Config, HomeConfigProvider, ScrapeConfig};
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::MockServer;

/// Scratch directories for one test run
pub struct TestEnv {
    /// Holds database.json, auth.json and the database file
    pub config_dir: TempDir,
    /// Receives downloaded post files
    pub save_dir: TempDir,
}

impl TestEnv {
    /// Config directory with a database.json pointing at `booru.db`
    pub fn new() -> Self {
        let config_dir = TempDir::new().unwrap();
        std::fs::write(
            config_dir.path().join("database.json"),
            r#"{ "path": "booru.db", "max_connections": 5 }"#,
        )
        .unwrap();

        Self {
            config_dir,
            save_dir: TempDir::new().unwrap(),
        }
    }

    /// Same as [`TestEnv::new`] with an auth.json as well
    pub fn with_credentials(login: &str, api_key: &str) -> Self {
        let env = Self::new();
        let auth = serde_json::json!({ "login": login, "api_key": api_key });
        std::fs::write(env.config_dir.path().join("auth.json"), auth.to_string()).unwrap();
        env
    }

    /// Provider reading this environment's config directory
    pub fn provider(&self) -> HomeConfigProvider {
        HomeConfigProvider::with_dir(self.config_dir.path())
    }

    /// Load a full configuration against `server`
    pub fn load(&self, server: &MockServer, workers: usize, save_files: bool) -> Config {
        let api = ApiConfig {
            endpoint: server.uri(),
            timeout: Duration::from_secs(5),
            ..Default::default()
        };
        let scrape = ScrapeConfig {
            workers,
            save_dir: save_files.then(|| self.save_dir.path().to_path_buf()),
        };
        Config::load(&self.provider(), api, scrape).unwrap()
    }

    /// Number of files in the save directory
    pub fn saved_files(&self) -> usize {
        count_files(self.save_dir.path())
    }
}

fn count_files(dir: &Path) -> usize {
    std::fs::read_dir(dir)
        .map(|entries| entries.filter_map(|e| e.ok()).count())
        .unwrap_or(0)
}
