use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;
use crate::view::fallback::FallbackMode;

const DEFAULT_API_URL: &str = "http://localhost:3000/api";
const DEFAULT_SESSION_DB: &str = "vantage-session.db";

/// Runtime configuration for the client, read from `VANTAGE_*` variables.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Base URL every service path is appended to. Never ends with `/`.
    pub api_url: String,
    /// SQLite file holding the persisted session.
    pub session_db: PathBuf,
    /// When market-data widgets fall back to bundled sample series.
    pub market_fallback: FallbackMode,
    /// `None` keeps the HTTP library's default.
    pub request_timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            session_db: PathBuf::from(DEFAULT_SESSION_DB),
            market_fallback: FallbackMode::OnError,
            request_timeout: None,
        }
    }
}

impl ClientConfig {
    /// Reads the process environment. Call `dotenvy::dotenv()` first if a
    /// `.env` file should be honoured.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup("VANTAGE_API_URL") {
            let trimmed = url.trim().trim_end_matches('/');
            if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
                return Err(ConfigError::Invalid {
                    key: "VANTAGE_API_URL",
                    value: url.clone(),
                    reason: "expected an http(s) URL".into(),
                });
            }
            config.api_url = trimmed.to_string();
        }

        if let Some(path) = lookup("VANTAGE_SESSION_DB") {
            config.session_db = PathBuf::from(path);
        }

        if let Some(mode) = lookup("VANTAGE_MARKET_FALLBACK") {
            config.market_fallback = mode.parse().map_err(|reason| ConfigError::Invalid {
                key: "VANTAGE_MARKET_FALLBACK",
                value: mode.clone(),
                reason,
            })?;
        }

        if let Some(secs) = lookup("VANTAGE_REQUEST_TIMEOUT_SECS") {
            let parsed: u64 = secs.trim().parse().map_err(|_| ConfigError::Invalid {
                key: "VANTAGE_REQUEST_TIMEOUT_SECS",
                value: secs.clone(),
                reason: "expected a whole number of seconds".into(),
            })?;
            config.request_timeout = Some(Duration::from_secs(parsed));
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = ClientConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ClientConfig::default());
    }

    #[test]
    fn trims_trailing_slash_and_parses_values() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("VANTAGE_API_URL", "https://api.vantage.test/v1/"),
            ("VANTAGE_MARKET_FALLBACK", "always"),
            ("VANTAGE_REQUEST_TIMEOUT_SECS", "30"),
        ]))
        .unwrap();
        assert_eq!(config.api_url, "https://api.vantage.test/v1");
        assert_eq!(config.market_fallback, FallbackMode::Always);
        assert_eq!(config.request_timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn rejects_bad_values() {
        assert!(ClientConfig::from_lookup(lookup(&[("VANTAGE_API_URL", "ftp://x")])).is_err());
        assert!(ClientConfig::from_lookup(lookup(&[("VANTAGE_MARKET_FALLBACK", "sometimes")])).is_err());
        assert!(ClientConfig::from_lookup(lookup(&[("VANTAGE_REQUEST_TIMEOUT_SECS", "soon")])).is_err());
    }
}
