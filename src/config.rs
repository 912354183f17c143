use std::env;
use std::fmt;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("No API key configured. Set API_KEY or GEMINI_API_KEY.")]
    MissingApiKey,
}

/// Settings the provider client is bound to. Built once per process.
#[derive(Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    api_key: String,
    base_url: String,
}

impl ServiceConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Read `API_KEY` (or `GEMINI_API_KEY`) and an optional `GEMINI_BASE_URL`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_key = ["API_KEY", "GEMINI_API_KEY"]
            .into_iter()
            .filter_map(&lookup)
            .map(|key| key.trim().to_string())
            .find(|key| !key.is_empty())
            .ok_or(ConfigError::MissingApiKey)?;

        let config = Self::new(api_key);
        Ok(match lookup("GEMINI_BASE_URL") {
            Some(url) if !url.trim().is_empty() => config.with_base_url(url.trim()),
            _ => config,
        })
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

// Keep the key out of logs.
impl fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn prefers_api_key_over_gemini_key() {
        let config =
            ServiceConfig::from_lookup(lookup(&[("API_KEY", "a"), ("GEMINI_API_KEY", "b")]))
                .unwrap();
        assert_eq!(config.api_key(), "a");
        assert_eq!(config.base_url(), DEFAULT_BASE_URL);
    }

    #[test]
    fn falls_back_to_gemini_key_when_blank() {
        let config =
            ServiceConfig::from_lookup(lookup(&[("API_KEY", "  "), ("GEMINI_API_KEY", "b")]))
                .unwrap();
        assert_eq!(config.api_key(), "b");
    }

    #[test]
    fn missing_key_is_an_error() {
        assert_eq!(
            ServiceConfig::from_lookup(lookup(&[])),
            Err(ConfigError::MissingApiKey)
        );
    }

    #[test]
    fn base_url_override() {
        let config = ServiceConfig::from_lookup(lookup(&[
            ("API_KEY", "a"),
            ("GEMINI_BASE_URL", "http://localhost:8080/v1beta"),
        ]))
        .unwrap();
        assert_eq!(config.base_url(), "http://localhost:8080/v1beta");
    }

    #[test]
    fn debug_redacts_key() {
        let rendered = format!("{:?}", ServiceConfig::new("secret-key"));
        assert!(!rendered.contains("secret-key"));
    }
}
