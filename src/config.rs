//! Client configuration

use reqwest::Url;
use std::time::Duration;
use thiserror::Error;

/// Port the reference backend listens on
const DEFAULT_BASE_URL: &str = "http://127.0.0.1:4000";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid HELIX_BASE_URL {value:?}: {reason}")]
    InvalidBaseUrl { value: String, reason: String },
    #[error("Invalid HELIX_REQUEST_TIMEOUT_SECS {value:?}: {reason}")]
    InvalidTimeout { value: String, reason: String },
}

/// Configuration for talking to the remote service
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Origin every endpoint path is resolved against; always ends with `/`
    pub base_url: Url,
    /// Per-request timeout; `None` waits indefinitely
    pub request_timeout: Option<Duration>,
}

impl ClientConfig {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url: normalize_base(base_url),
            request_timeout: Some(Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS)),
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let raw_url = lookup("HELIX_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let base_url = raw_url
            .parse::<Url>()
            .map_err(|e| ConfigError::InvalidBaseUrl {
                value: raw_url.clone(),
                reason: e.to_string(),
            })?;
        if base_url.cannot_be_a_base() {
            return Err(ConfigError::InvalidBaseUrl {
                value: raw_url,
                reason: "not a base URL".to_string(),
            });
        }

        let timeout_secs = match lookup("HELIX_REQUEST_TIMEOUT_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map_err(|e| ConfigError::InvalidTimeout {
                    value: raw.clone(),
                    reason: e.to_string(),
                })?,
            None => DEFAULT_REQUEST_TIMEOUT_SECS,
        };

        Ok(Self {
            base_url: normalize_base(base_url),
            request_timeout: (timeout_secs > 0).then_some(Duration::from_secs(timeout_secs)),
        })
    }
}

fn normalize_base(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}
