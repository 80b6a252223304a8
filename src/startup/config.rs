//! Client configuration.
//!
//! Defaults target a local backend. [`ClientConfig::from_env`] reads the
//! `GENESIS_*` variables; anything unset keeps its default and anything
//! unparseable keeps its default with a warning.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

use crate::notifications::DEFAULT_DISPLAY_WINDOW;
use crate::sync::DEFAULT_SYNC_INTERVAL;
use crate::websocket::{ReconnectPolicy, DEFAULT_CONNECT_DELAY, DEFAULT_RECONNECT_DELAY};

pub const DEFAULT_API_URL: &str = "http://localhost:8000";

pub const ENV_API_URL: &str = "GENESIS_API_URL";
pub const ENV_WS_URL: &str = "GENESIS_WS_URL";
pub const ENV_SYNC_INTERVAL: &str = "GENESIS_SYNC_INTERVAL_SECS";
pub const ENV_RECONNECT_DELAY: &str = "GENESIS_RECONNECT_DELAY_SECS";
pub const ENV_CREDENTIALS_PATH: &str = "GENESIS_CREDENTIALS_PATH";

/// A configuration value that could not be used.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{var} must be an http(s) URL, got '{value}'")]
    InvalidUrl { var: &'static str, value: String },

    #[error("{var} must be a positive number of seconds, got '{value}'")]
    InvalidSeconds { var: &'static str, value: String },
}

/// Runtime configuration for [`GenesisClient`](crate::app::GenesisClient).
///
/// # Example
///
/// ```ignore
/// use genesis::startup::ClientConfig;
/// use std::time::Duration;
///
/// let config = ClientConfig::default()
///     .with_api_url("https://wallet.example.com")
///     .with_sync_interval(Duration::from_secs(5));
/// assert_eq!(config.ws_url(), "wss://wallet.example.com");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub api_url: String,
    /// Push base URL; derived from `api_url` when unset.
    pub ws_url: Option<String>,
    pub sync_interval: Duration,
    pub reconnect: ReconnectPolicy,
    /// Delay between authentication and the first push connect.
    pub connect_delay: Duration,
    pub notification_window: Duration,
    /// Credentials file; `~/.genesis/credentials.json` when unset.
    pub credentials_path: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            ws_url: None,
            sync_interval: DEFAULT_SYNC_INTERVAL,
            reconnect: ReconnectPolicy::fixed(DEFAULT_RECONNECT_DELAY),
            connect_delay: DEFAULT_CONNECT_DELAY,
            notification_window: DEFAULT_DISPLAY_WINDOW,
            credentials_path: None,
        }
    }
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_ws_url(mut self, url: impl Into<String>) -> Self {
        self.ws_url = Some(url.into().trim_end_matches('/').to_string());
        self
    }

    pub fn with_sync_interval(mut self, interval: Duration) -> Self {
        self.sync_interval = interval;
        self
    }

    pub fn with_reconnect(mut self, policy: ReconnectPolicy) -> Self {
        self.reconnect = policy;
        self
    }

    pub fn with_connect_delay(mut self, delay: Duration) -> Self {
        self.connect_delay = delay;
        self
    }

    pub fn with_notification_window(mut self, window: Duration) -> Self {
        self.notification_window = window;
        self
    }

    pub fn with_credentials_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.credentials_path = Some(path.into());
        self
    }

    /// Push base URL, either explicit or derived from the API URL.
    pub fn ws_url(&self) -> String {
        match &self.ws_url {
            Some(url) => url.clone(),
            None => derive_ws_url(&self.api_url),
        }
    }

    /// Build a config from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup(ENV_API_URL) {
            match parse_url(ENV_API_URL, &value) {
                Ok(url) => config = config.with_api_url(url),
                Err(e) => warn!("{}; using {}", e, DEFAULT_API_URL),
            }
        }
        if let Some(value) = lookup(ENV_WS_URL) {
            if value.trim().is_empty() {
                warn!("{} is empty; deriving from the API URL", ENV_WS_URL);
            } else {
                config = config.with_ws_url(value.trim());
            }
        }
        if let Some(value) = lookup(ENV_SYNC_INTERVAL) {
            match parse_seconds(ENV_SYNC_INTERVAL, &value) {
                Ok(interval) => config.sync_interval = interval,
                Err(e) => warn!("{}; using {}s", e, DEFAULT_SYNC_INTERVAL.as_secs()),
            }
        }
        if let Some(value) = lookup(ENV_RECONNECT_DELAY) {
            match parse_seconds(ENV_RECONNECT_DELAY, &value) {
                Ok(delay) => config.reconnect = ReconnectPolicy::fixed(delay),
                Err(e) => warn!("{}; using {}s", e, DEFAULT_RECONNECT_DELAY.as_secs()),
            }
        }
        if let Some(value) = lookup(ENV_CREDENTIALS_PATH) {
            if !value.trim().is_empty() {
                config.credentials_path = Some(PathBuf::from(value.trim()));
            }
        }

        config
    }
}

/// `http://` becomes `ws://` and `https://` becomes `wss://`.
pub fn derive_ws_url(api_url: &str) -> String {
    let api_url = api_url.trim_end_matches('/');
    if let Some(rest) = api_url.strip_prefix("https://") {
        format!("wss://{}", rest)
    } else if let Some(rest) = api_url.strip_prefix("http://") {
        format!("ws://{}", rest)
    } else {
        api_url.to_string()
    }
}

fn parse_url(var: &'static str, value: &str) -> Result<String, ConfigError> {
    let value = value.trim();
    let valid = ["http://", "https://"]
        .iter()
        .any(|scheme| value.len() > scheme.len() && value.starts_with(scheme));
    if valid {
        Ok(value.to_string())
    } else {
        Err(ConfigError::InvalidUrl {
            var,
            value: value.to_string(),
        })
    }
}

fn parse_seconds(var: &'static str, value: &str) -> Result<Duration, ConfigError> {
    match value.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ConfigError::InvalidSeconds {
            var,
            value: value.to_string(),
        }),
    }
}
