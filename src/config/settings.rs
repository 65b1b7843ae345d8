//! Client Settings
//!
//! Runtime configuration of a `BallchasingClient`.

use crate::api::AccountTier;
use std::fmt;
use std::time::Duration;

/// Production API endpoint
pub const DEFAULT_BASE_URL: &str = "https://ballchasing.com/api";

/// Settings for one client instance
#[derive(Clone)]
pub struct ClientConfig {
    /// Key sent in the `Authorization` header
    pub api_key: String,

    /// API root, without trailing slash
    pub base_url: String,

    /// Assumed tier until a ping reports the real one
    pub tier: AccountTier,

    /// Fixed delay after a 429; `None` derives it from the tier
    pub sleep_on_rate_limit: Option<Duration>,

    /// Log a warning for every 429
    pub warn_on_rate_limit: bool,

    /// Whole-request timeout
    pub timeout: Duration,

    pub connect_timeout: Duration,
}

impl ClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            tier: AccountTier::default(),
            sleep_on_rate_limit: None,
            warn_on_rate_limit: false,
            timeout: Duration::from_secs(60),
            connect_timeout: Duration::from_secs(10),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_tier(mut self, tier: AccountTier) -> Self {
        self.tier = tier;
        self
    }

    /// Pin the 429 delay; zero disables throttling
    pub fn with_sleep_on_rate_limit(mut self, sleep: Duration) -> Self {
        self.sleep_on_rate_limit = Some(sleep);
        self
    }

    pub fn with_warn_on_rate_limit(mut self, warn: bool) -> Self {
        self.warn_on_rate_limit = warn;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("tier", &self.tier)
            .field("sleep_on_rate_limit", &self.sleep_on_rate_limit)
            .field("warn_on_rate_limit", &self.warn_on_rate_limit)
            .field("timeout", &self.timeout)
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::new("key");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.tier, AccountTier::Regular);
        assert!(config.sleep_on_rate_limit.is_none());
        assert_eq!(config.timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let config = ClientConfig::new("key").with_base_url("http://127.0.0.1:1234/");
        assert_eq!(config.base_url, "http://127.0.0.1:1234");
    }

    #[test]
    fn test_debug_redacts_key() {
        let printed = format!("{:?}", ClientConfig::new("super-secret"));
        assert!(!printed.contains("super-secret"));
    }
}
