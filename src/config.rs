use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::api::http::DEFAULT_API_URL;
use crate::session::FailedCheckPolicy;

pub const API_URL_ENV: &str = "BITEREAD_API_URL";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_auto_advance_ms")]
    pub auto_advance_ms: u64,
    #[serde(default)]
    pub failed_check_policy: FailedCheckPolicy,
    #[serde(default = "default_tick_rate_ms")]
    pub tick_rate_ms: u64,
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}
fn default_request_timeout_secs() -> u64 {
    10
}
fn default_auto_advance_ms() -> u64 {
    2000
}
fn default_tick_rate_ms() -> u64 {
    100
}
fn default_theme() -> String {
    "default".to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            request_timeout_secs: default_request_timeout_secs(),
            auto_advance_ms: default_auto_advance_ms(),
            failed_check_policy: FailedCheckPolicy::default(),
            tick_rate_ms: default_tick_rate_ms(),
            theme: default_theme(),
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Load from the user config dir, then apply the environment override.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::config_path())?;
        config.apply_env(std::env::var(API_URL_ENV).ok());
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("biteread")
            .join("config.toml")
    }

    fn apply_env(&mut self, api_url: Option<String>) {
        if let Some(url) = api_url.filter(|u| !u.trim().is_empty()) {
            self.api_url = url;
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    pub fn auto_advance(&self) -> Duration {
        Duration::from_millis(self.auto_advance_ms)
    }

    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.tick_rate_ms.clamp(10, 1000))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_serde_defaults_from_empty() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.api_url, "http://localhost:8000");
        assert_eq!(config.auto_advance_ms, 2000);
        assert_eq!(config.request_timeout_secs, 10);
        assert_eq!(config.failed_check_policy, FailedCheckPolicy::Discard);
    }

    #[test]
    fn test_config_partial_file() {
        let toml_str = r#"
api_url = "http://192.168.0.5:8000"
failed_check_policy = "record-incorrect"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.api_url, "http://192.168.0.5:8000");
        assert_eq!(config.failed_check_policy, FailedCheckPolicy::RecordIncorrect);
        assert_eq!(config.tick_rate_ms, 100);
    }

    #[test]
    fn test_config_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut config = Config::default();
        config.auto_advance_ms = 500;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.auto_advance(), Duration::from_millis(500));
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(loaded.theme, "default");
    }

    #[test]
    fn test_env_override() {
        let mut config = Config::default();
        config.apply_env(Some("http://example.test:9000".to_string()));
        assert_eq!(config.api_url, "http://example.test:9000");
        config.apply_env(Some("  ".to_string()));
        assert_eq!(config.api_url, "http://example.test:9000");
        config.apply_env(None);
        assert_eq!(config.api_url, "http://example.test:9000");
    }

    #[test]
    fn test_invalid_toml_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "auto_advance_ms = \"soon\"").unwrap();
        assert!(Config::load_from(&path).is_err());
    }
}
