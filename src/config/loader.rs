//! Configuration Loader
//!
//! Builds a `ClientConfig` from JSON files and environment variables.

use crate::api::AccountTier;
use crate::config::settings::{ClientConfig, DEFAULT_BASE_URL};
use crate::error::{BallchasingError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable holding the API key
pub const API_KEY_ENV: &str = "BALLCHASING_API_KEY";

/// Environment variable overriding the base URL
pub const BASE_URL_ENV: &str = "BALLCHASING_BASE_URL";

/// Environment variable pointing at an extra config file
pub const CONFIG_PATH_ENV: &str = "BALLCHASING_CONFIG_PATH";

/// On-disk configuration; every field is optional so files can be layered
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tier: Option<AccountTier>,

    /// Seconds to sleep after a 429
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sleep_time_on_rate_limit: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warn_on_rate_limit: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connect_timeout_secs: Option<u64>,
}

/// Configuration loader with support for multiple sources
pub struct ConfigLoader {
    config: ConfigFile,
}

impl ConfigLoader {
    /// Load from default paths, then the process environment
    pub fn new() -> Result<Self> {
        let mut loader = Self {
            config: ConfigFile::default(),
        };

        loader.load_from_default_paths()?;
        loader.apply_env(|name| std::env::var(name).ok());

        Ok(loader)
    }

    /// Load a specific file, then the process environment
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let mut loader = Self {
            config: ConfigFile::default(),
        };

        loader.load_from_file(path)?;
        loader.apply_env(|name| std::env::var(name).ok());

        Ok(loader)
    }

    /// Load configuration from default paths
    fn load_from_default_paths(&mut self) -> Result<()> {
        for path in Self::get_config_paths() {
            if path.exists() {
                self.load_from_file(&path)?;
            }
        }

        Ok(())
    }

    /// Config paths, lowest precedence first
    fn get_config_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        // 1. Home directory
        if let Some(home_dir) = dirs::home_dir() {
            paths.push(home_dir.join(".ballchasing").join("config.json"));
        }

        // 2. User config directory
        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("ballchasing").join("config.json"));
        }

        // 3. Current directory
        paths.push(PathBuf::from("ballchasing.json"));

        // 4. Environment variable
        if let Ok(custom_path) = std::env::var(CONFIG_PATH_ENV) {
            paths.push(PathBuf::from(custom_path));
        }

        paths
    }

    /// Load configuration from a specific file
    fn load_from_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            BallchasingError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let config: ConfigFile = serde_json::from_str(&content).map_err(|e| {
            BallchasingError::Config(format!("Failed to parse {}: {}", path.display(), e))
        })?;

        self.merge_config(config);
        Ok(())
    }

    /// Override key and base URL from environment lookups
    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(key) = lookup(API_KEY_ENV).filter(|k| !k.is_empty()) {
            self.config.api_key = Some(key);
        }
        if let Some(url) = lookup(BASE_URL_ENV).filter(|u| !u.is_empty()) {
            self.config.base_url = Some(url);
        }
    }

    /// Merge another config into this one (set fields override)
    fn merge_config(&mut self, other: ConfigFile) {
        let current = &mut self.config;
        if other.api_key.is_some() {
            current.api_key = other.api_key;
        }
        if other.base_url.is_some() {
            current.base_url = other.base_url;
        }
        if other.tier.is_some() {
            current.tier = other.tier;
        }
        if other.sleep_time_on_rate_limit.is_some() {
            current.sleep_time_on_rate_limit = other.sleep_time_on_rate_limit;
        }
        if other.warn_on_rate_limit.is_some() {
            current.warn_on_rate_limit = other.warn_on_rate_limit;
        }
        if other.timeout_secs.is_some() {
            current.timeout_secs = other.timeout_secs;
        }
        if other.connect_timeout_secs.is_some() {
            current.connect_timeout_secs = other.connect_timeout_secs;
        }
    }

    /// Get the merged file configuration
    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    /// Resolve into client settings
    pub fn into_config(self) -> Result<ClientConfig> {
        let file = self.config;
        let api_key = file.api_key.ok_or(BallchasingError::MissingApiKey)?;

        let mut config = ClientConfig::new(api_key)
            .with_base_url(file.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL))
            .with_tier(file.tier.unwrap_or_default())
            .with_warn_on_rate_limit(file.warn_on_rate_limit.unwrap_or(false));

        if let Some(secs) = file.sleep_time_on_rate_limit {
            let sleep = Duration::try_from_secs_f64(secs).map_err(|e| {
                BallchasingError::Config(format!("Invalid sleep_time_on_rate_limit {}: {}", secs, e))
            })?;
            config = config.with_sleep_on_rate_limit(sleep);
        }
        if let Some(secs) = file.timeout_secs {
            config = config.with_timeout(Duration::from_secs(secs));
        }
        if let Some(secs) = file.connect_timeout_secs {
            config = config.with_connect_timeout(Duration::from_secs(secs));
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn empty_loader() -> ConfigLoader {
        ConfigLoader {
            config: ConfigFile::default(),
        }
    }

    #[test]
    fn test_load_from_custom_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"{{
                "api_key": "file-key",
                "tier": "diamond",
                "sleep_time_on_rate_limit": 0.5,
                "timeout_secs": 5
            }}"#
        )
        .unwrap();

        let mut loader = empty_loader();
        loader.load_from_file(file.path()).unwrap();
        let config = loader.into_config().unwrap();

        assert_eq!(config.api_key, "file-key");
        assert_eq!(config.tier, AccountTier::Diamond);
        assert_eq!(config.sleep_on_rate_limit, Some(Duration::from_millis(500)));
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_invalid_file_is_config_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "not json").unwrap();

        let mut loader = empty_loader();
        let err = loader.load_from_file(file.path()).unwrap_err();
        assert!(matches!(err, BallchasingError::Config(_)));
    }

    #[test]
    fn test_env_overrides_file() {
        let mut loader = empty_loader();
        loader.merge_config(ConfigFile {
            api_key: Some("file-key".to_string()),
            base_url: Some("https://file.example".to_string()),
            ..ConfigFile::default()
        });
        loader.apply_env(|name| match name {
            API_KEY_ENV => Some("env-key".to_string()),
            _ => None,
        });

        let config = loader.into_config().unwrap();
        assert_eq!(config.api_key, "env-key");
        assert_eq!(config.base_url, "https://file.example");
    }

    #[test]
    fn test_merge_keeps_unset_fields() {
        let mut loader = empty_loader();
        loader.merge_config(ConfigFile {
            api_key: Some("a".to_string()),
            warn_on_rate_limit: Some(true),
            ..ConfigFile::default()
        });
        loader.merge_config(ConfigFile {
            tier: Some(AccountTier::Org),
            ..ConfigFile::default()
        });

        let config = loader.config();
        assert_eq!(config.api_key.as_deref(), Some("a"));
        assert_eq!(config.warn_on_rate_limit, Some(true));
        assert_eq!(config.tier, Some(AccountTier::Org));
    }

    #[test]
    fn test_missing_key() {
        let err = empty_loader().into_config().unwrap_err();
        assert!(matches!(err, BallchasingError::MissingApiKey));
    }
}
