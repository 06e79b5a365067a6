//! Mapper configuration
//!
//! Only access code mapping reads this: whether the client is an internal
//! build and which web app base URL internal join links point to.

use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;
use url::Url;

/// Environment variable toggling internal join links
pub const INTERNAL_BUILD_ENV: &str = "GIGI_INTERNAL_BUILD";

/// Environment variable overriding the internal web app base URL
pub const WEBAPP_INTERNAL_URL_ENV: &str = "GIGI_WEBAPP_INTERNAL_URL";

/// Base URL used for internal join links when nothing else is configured
pub const DEFAULT_WEBAPP_INTERNAL_URL: &str = "https://app.gigi.example";

/// Errors raised while loading or validating [`MapperConfig`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value} ({reason})")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

/// Configuration for [`crate::ConversationMapper`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapperConfig {
    /// Internal builds hand out join links to the internal web app instead
    /// of the URI served by the backend
    pub internal_build: bool,
    /// Base URL of the internal web app
    pub webapp_internal_url: Url,
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            internal_build: false,
            webapp_internal_url: default_webapp_url(),
        }
    }
}

impl MapperConfig {
    /// Parse configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Parse configuration through an arbitrary key lookup
    pub fn from_lookup<F>(mut lookup: F) -> Result<Self, ConfigError>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = optional_trimmed(INTERNAL_BUILD_ENV, &mut lookup) {
            config.internal_build = parse_bool(INTERNAL_BUILD_ENV, &raw)?;
        }

        if let Some(raw) = optional_trimmed(WEBAPP_INTERNAL_URL_ENV, &mut lookup) {
            config.webapp_internal_url =
                Url::parse(&raw).map_err(|e| ConfigError::InvalidValue {
                    key: WEBAPP_INTERNAL_URL_ENV,
                    value: raw.clone(),
                    reason: e.to_string(),
                })?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Check that the web app URL can serve join links
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = &self.webapp_internal_url;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidUrl(format!(
                "{} (scheme must be http or https)",
                url
            )));
        }
        if url.host_str().is_none() {
            return Err(ConfigError::InvalidUrl(format!("{} (missing host)", url)));
        }
        Ok(())
    }
}

fn default_webapp_url() -> Url {
    Url::parse(DEFAULT_WEBAPP_INTERNAL_URL).expect("Default web app URL should be valid")
}

fn optional_trimmed<F>(key: &str, lookup: &mut F) -> Option<String>
where
    F: FnMut(&str) -> Option<String>,
{
    lookup(key)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_bool(key: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key,
            value: raw.to_string(),
            reason: "expected a boolean".to_string(),
        }),
    }
}
