//! Configuration management for DocQA.
//!
//! Loads configuration from ${DOCQA_HOME}/config.toml with sensible defaults.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub mod paths {
    //! Path resolution for DocQA configuration and data directories.
    //!
    //! DOCQA_HOME resolution order:
    //! 1. DOCQA_HOME environment variable (if set)
    //! 2. ~/.config/docqa (default)

    use std::path::PathBuf;

    /// Returns the DocQA home directory.
    pub fn docqa_home() -> PathBuf {
        if let Ok(home) = std::env::var("DOCQA_HOME") {
            return PathBuf::from(home);
        }

        dirs::home_dir().map_or_else(
            || PathBuf::from(".docqa"),
            |h| h.join(".config").join("docqa"),
        )
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        docqa_home().join("config.toml")
    }

    /// Returns the directory holding persisted client snapshots.
    pub fn state_dir() -> PathBuf {
        docqa_home().join("state")
    }
}

/// Environment variable that overrides `api_base_url`.
pub const API_URL_ENV: &str = "DOCQA_API_URL";

/// Snapshot persistence configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistenceConfig {
    /// Whether the signed-in user, sessions and active file survive restarts.
    pub enabled: bool,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the document service
    pub api_base_url: String,

    /// Timeout for service requests in seconds (0 disables)
    pub request_timeout_secs: u64,

    /// Log filter used when DOCQA_LOG is unset
    pub log_level: String,

    /// Directory for rolling log files (stderr when unset)
    pub log_dir: Option<String>,

    #[serde(default)]
    pub persistence: PersistenceConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: Self::DEFAULT_API_BASE_URL.to_string(),
            request_timeout_secs: Self::DEFAULT_REQUEST_TIMEOUT_SECS,
            log_level: Self::DEFAULT_LOG_LEVEL.to_string(),
            log_dir: None,
            persistence: PersistenceConfig::default(),
        }
    }
}

/// Returns the default config template with comments.
fn default_config_template() -> &'static str {
    include_str!("../default_config.toml")
}

impl Config {
    const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";
    const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;
    const DEFAULT_LOG_LEVEL: &str = "warn";

    /// Loads configuration from the default config path.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if file doesn't exist.
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

    /// Resolves the service base URL with precedence: env > config > default.
    ///
    /// Trailing slashes are removed so endpoint paths can be appended directly.
    pub fn effective_api_base_url(&self) -> Result<String> {
        let from_env = std::env::var(API_URL_ENV).ok();
        let candidate = [from_env.as_deref(), Some(self.api_base_url.as_str())]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|s| !s.is_empty())
            .unwrap_or(Self::DEFAULT_API_BASE_URL);

        url::Url::parse(candidate)
            .with_context(|| format!("Invalid document service URL: {candidate}"))?;
        Ok(candidate.trim_end_matches('/').to_string())
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        if self.request_timeout_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(self.request_timeout_secs))
        }
    }

    /// Creates a default config file at the given path.
    /// Returns an error if the file already exists.
    pub fn init(path: &Path) -> Result<()> {
        if path.exists() {
            anyhow::bail!("Config file already exists at {}", path.display());
        }

        Self::write_config(path, default_config_template())
    }

    fn write_config(path: &Path, contents: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config dir {}", parent.display()))?;
        }
        fs::write(path, contents)
            .with_context(|| format!("Failed to write config to {}", path.display()))
    }
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
        assert_eq!(config.api_base_url, "http://localhost:8000");
        assert_eq!(config.request_timeout_secs, 60);
        assert!(config.persistence.enabled);
    }

    #[test]
    fn test_load_partial_config_merges_defaults() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.toml");

        fs::write(
            &config_path,
            "api_base_url = \"https://docs.example.com\"\n[persistence]\nenabled = false\n",
        )
        .unwrap();

        let config = Config::load_from(&config_path).unwrap();
        assert_eq!(config.api_base_url, "https://docs.example.com");
        assert_eq!(config.request_timeout_secs, 60);
        assert!(!config.persistence.enabled);
    }

    #[test]
    fn test_default_template_parses_to_defaults() {
        let config: Config = toml::from_str(default_config_template()).unwrap();
        let defaults = Config::default();
        assert_eq!(config.api_base_url, defaults.api_base_url);
        assert_eq!(config.request_timeout_secs, defaults.request_timeout_secs);
        assert_eq!(config.log_level, defaults.log_level);
        assert_eq!(config.log_dir, None);
    }

    #[test]
    fn test_init_creates_config_with_defaults() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("subdir").join("config.toml");

        Config::init(&config_path).unwrap();

        let contents = fs::read_to_string(&config_path).unwrap();
        assert!(contents.contains("api_base_url"));
        assert!(contents.contains("# log_dir ="));
    }

    #[test]
    fn test_init_fails_if_exists() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.toml");
        fs::write(&config_path, "").unwrap();

        assert!(Config::init(&config_path).is_err());
    }

    #[test]
    fn test_request_timeout_zero_disables() {
        let config = Config {
            request_timeout_secs: 0,
            ..Default::default()
        };
        assert_eq!(config.request_timeout(), None);
    }

    #[test]
    fn test_invalid_base_url_is_rejected() {
        let config = Config {
            api_base_url: "not a url".to_string(),
            ..Default::default()
        };
        // Only meaningful when the env override is absent.
        if std::env::var(API_URL_ENV).is_err() {
            assert!(config.effective_api_base_url().is_err());
        }
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let config = Config {
            api_base_url: "https://docs.example.com/".to_string(),
            ..Default::default()
        };
        if std::env::var(API_URL_ENV).is_err() {
            assert_eq!(
                config.effective_api_base_url().unwrap(),
                "https://docs.example.com"
            );
        }
    }
}
