//! Application configuration management.
//!
//! This module handles loading and saving the application configuration:
//! API location, where the session is stored, how the token is refreshed,
//! demo mode, and the last email used to sign in.
//!
//! Configuration is stored at `~/.config/taskdesk/config.json`.

use std::path::PathBuf;

use anyhow::{Context, Result};
use reqwest::Method;
use serde::{Deserialize, Serialize};

/// Application name used for config/cache directory paths
const APP_NAME: &str = "taskdesk";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// API used when neither the environment nor the config file names one.
pub const DEFAULT_API_URL: &str = "http://localhost:5000";

/// Environment variable overriding `api_url`.
pub const API_URL_ENV: &str = "TASKDESK_API_URL";

/// Where the session is persisted between runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    File,
    Keyring,
    Memory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RefreshMethod {
    #[default]
    Get,
    Post,
}

impl RefreshMethod {
    pub fn as_method(&self) -> Method {
        match self {
            RefreshMethod::Get => Method::GET,
            RefreshMethod::Post => Method::POST,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub api_url: Option<String>,
    pub storage: StorageBackend,
    pub refresh_method: RefreshMethod,
    pub demo_mode: bool,
    pub last_email: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Directory for the file session store.
    pub fn cache_dir() -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }

    /// API base URL: environment first, then config, then the default.
    pub fn api_url(&self) -> String {
        Self::resolve_api_url(std::env::var(API_URL_ENV).ok(), self.api_url.as_deref())
    }

    fn resolve_api_url(env: Option<String>, configured: Option<&str>) -> String {
        env.filter(|v| !v.trim().is_empty())
            .or_else(|| configured.map(str::to_string))
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.storage, StorageBackend::File);
        assert_eq!(config.refresh_method.as_method(), Method::GET);
        assert!(!config.demo_mode);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: Config = serde_json::from_str(r#"{"storage": "keyring", "refresh_method": "POST"}"#).unwrap();
        assert_eq!(config.storage, StorageBackend::Keyring);
        assert_eq!(config.refresh_method, RefreshMethod::Post);
        assert_eq!(config.api_url, None);
    }

    #[test]
    fn test_resolve_api_url() {
        assert_eq!(Config::resolve_api_url(None, None), DEFAULT_API_URL);
        assert_eq!(
            Config::resolve_api_url(None, Some("https://api.example.com")),
            "https://api.example.com"
        );
        assert_eq!(
            Config::resolve_api_url(Some("http://env:8080".to_string()), Some("https://api.example.com")),
            "http://env:8080"
        );
        assert_eq!(
            Config::resolve_api_url(Some("  ".to_string()), Some("https://api.example.com")),
            "https://api.example.com"
        );
    }

    #[test]
    fn test_cache_dir_is_app_scoped() {
        if let Ok(dir) = Config::cache_dir() {
            assert!(dir.ends_with(APP_NAME));
        }
    }

    #[test]
    fn test_load_missing_file_is_default() {
        let path = std::env::temp_dir().join("taskdesk-config-missing-does-not-exist.json");
        assert_eq!(Config::load_from(&path).unwrap(), Config::default());
    }
}
