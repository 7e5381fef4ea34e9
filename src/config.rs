//! Configuration Management
//!
//! Handles persistent configuration storage for the stackdio CLI.
//! Passwords are never written to disk; they come from the environment.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable overriding the API base URL
pub const ENV_URL: &str = "STACKDIO_URL";
pub const ENV_USERNAME: &str = "STACKDIO_USERNAME";
pub const ENV_PASSWORD: &str = "STACKDIO_PASSWORD";
pub const ENV_ADMIN_USERNAME: &str = "STACKDIO_ADMIN_USERNAME";
pub const ENV_ADMIN_PASSWORD: &str = "STACKDIO_ADMIN_PASSWORD";

/// User configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    /// API base URL, e.g. `https://stackdio.example.com/api/`
    #[serde(default)]
    pub url: Option<String>,
    /// Username for regular calls
    #[serde(default)]
    pub username: Option<String>,
    /// Username for admin-only calls
    #[serde(default)]
    pub admin_username: Option<String>,
    /// Per-request timeout in seconds; unset means wait indefinitely
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Config {
    /// Directory holding the config file and the CLI log
    pub fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("stackdio"))
    }

    /// Get the config file path
    fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join("config.json"))
    }

    /// Load configuration from disk
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    /// Load configuration from a specific file. A missing or unreadable file
    /// yields the default configuration.
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("Ignoring invalid config file {:?}: {}", path, e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        let Some(path) = Self::config_path() else {
            return Ok(());
        };
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create parent directory
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {:?}", parent))?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content).with_context(|| format!("Failed to write {:?}", path))?;

        Ok(())
    }

    /// Apply environment overrides (environment > config file)
    pub fn with_env(mut self) -> Self {
        if let Ok(url) = std::env::var(ENV_URL) {
            self.url = Some(url);
        }
        if let Ok(username) = std::env::var(ENV_USERNAME) {
            self.username = Some(username);
        }
        if let Ok(username) = std::env::var(ENV_ADMIN_USERNAME) {
            self.admin_username = Some(username);
        }
        self
    }

    /// Set the API URL and save
    pub fn set_url(&mut self, url: &str) -> Result<()> {
        url::Url::parse(url).with_context(|| format!("Invalid URL '{}'", url))?;
        self.url = Some(url.to_string());
        self.save()
    }

    /// Set the username and save
    pub fn set_username(&mut self, username: &str) -> Result<()> {
        self.username = Some(username.to_string());
        self.save()
    }
}
