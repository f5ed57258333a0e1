use bon::Builder;
use std::env;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";
pub const DEFAULT_USER_AGENT: &str = concat!("runboard/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, PartialEq, Builder)]
pub struct Config {
    #[builder(into, default = DEFAULT_BASE_URL.to_string())]
    pub base_url: String,
    /// Unset means requests may hang indefinitely.
    pub request_timeout: Option<Duration>,
    #[builder(into, default = DEFAULT_USER_AGENT.to_string())]
    pub user_agent: String,
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("RUNBOARD_TIMEOUT_SECS must be a positive integer, got `{0}`")]
    InvalidTimeout(String),
}

impl Config {
    /// Reads `RUNBOARD_API_URL` and `RUNBOARD_TIMEOUT_SECS`, loading a `.env`
    /// file first when one exists.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let request_timeout = match lookup("RUNBOARD_TIMEOUT_SECS") {
            None => None,
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Some(Duration::from_secs(secs)),
                _ => return Err(ConfigError::InvalidTimeout(raw)),
            },
        };
        Ok(Config::builder()
            .base_url(lookup("RUNBOARD_API_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()))
            .maybe_request_timeout(request_timeout)
            .build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_without_environment() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.request_timeout, None);
    }

    #[test]
    fn reads_url_and_timeout() {
        let config = Config::from_lookup(lookup(&[
            ("RUNBOARD_API_URL", "https://api.example.com"),
            ("RUNBOARD_TIMEOUT_SECS", "30"),
        ]))
        .unwrap();
        assert_eq!(config.base_url, "https://api.example.com");
        assert_eq!(config.request_timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn rejects_zero_timeout() {
        let result = Config::from_lookup(lookup(&[("RUNBOARD_TIMEOUT_SECS", "0")]));
        assert_eq!(result, Err(ConfigError::InvalidTimeout("0".to_string())));
    }
}
