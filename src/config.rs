//! Configuration for fastprint-sync
//!
//! The endpoint and the reverse-engineered credential constants (clock
//! offset, prefixes, fallback suffix) are all plain config values, since
//! they describe an undocumented external service and may drift.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Tool configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Endpoint used for both the inspection GET and the login POSTs
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Hours the credential clock lags behind the `Date` header.
    /// Observed empirically; the service never documented it.
    #[serde(default = "default_gmt_offset_hours")]
    pub gmt_offset_hours: i64,

    /// Prefix of the raw password string before the date fields
    #[serde(default = "default_password_prefix")]
    pub password_prefix: String,

    /// Prefix of every candidate username before the date fields
    #[serde(default = "default_username_prefix")]
    pub username_prefix: String,

    /// Last-resort username suffix, tried after every derived guess
    #[serde(default = "default_fallback_suffix")]
    pub fallback_suffix: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Path to SQLite database file
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

fn default_endpoint() -> String {
    "https://recruitment.fastprint.co.id/tes/api_tes_programmer".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_gmt_offset_hours() -> i64 {
    1
}

fn default_password_prefix() -> String {
    "bisacoding".to_string()
}

fn default_username_prefix() -> String {
    "tesprogrammer".to_string()
}

fn default_fallback_suffix() -> String {
    "C22".to_string()
}

fn default_db_path() -> PathBuf {
    PathBuf::from("fastprint-sync.sqlite")
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            timeout_secs: default_timeout_secs(),
            gmt_offset_hours: default_gmt_offset_hours(),
            password_prefix: default_password_prefix(),
            username_prefix: default_username_prefix(),
            fallback_suffix: default_fallback_suffix(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            database: DatabaseConfig::default(),
        }
    }
}

impl Config {
    /// Default config path
    pub fn default_path() -> Result<PathBuf> {
        // Check environment variable first
        if let Ok(env_path) = std::env::var("FASTPRINT_SYNC_CONFIG") {
            return Ok(PathBuf::from(env_path));
        }

        // Check for config in current directory
        let local = PathBuf::from("config.toml");
        if local.exists() {
            return Ok(local);
        }

        // Then check XDG config
        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?
            .join("fastprint-sync");

        Ok(config_dir.join("config.toml"))
    }

    /// Load config from default path
    pub fn load() -> Result<Self> {
        let path = Self::default_path()?;
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load config from specific path
    pub fn load_from(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path).context("Failed to read config file")?;
        toml::from_str(&content).context("Failed to parse config file")
    }

    /// Save config to specific path
    pub fn save_to(&self, path: &PathBuf) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;

        let with_comments = format!(
            "# fastprint-sync configuration\n\
             # The [api] values mirror an undocumented external service and\n\
             # may need adjusting if its credential rules drift.\n\n\
             {}",
            content
        );

        std::fs::write(path, with_comments).context("Failed to write config file")?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_falls_back_to_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.api.gmt_offset_hours, 1);
        assert_eq!(config.api.fallback_suffix, "C22");
        assert_eq!(config.database.path, PathBuf::from("fastprint-sync.sqlite"));
    }

    #[test]
    fn partial_section_keeps_remaining_defaults() {
        let config: Config = toml::from_str(
            r#"
            [api]
            gmt_offset_hours = 0
            "#,
        )
        .unwrap();
        assert_eq!(config.api.gmt_offset_hours, 0);
        assert_eq!(config.api.username_prefix, "tesprogrammer");
        assert_eq!(config.api.timeout_secs, 10);
    }
}
