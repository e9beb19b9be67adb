//! Configuration loading and constants.
//!
//! Loads application configuration from an optional TOML file and defines
//! constants for polling cadence, HTTP cache headers, logging and default paths.
//! `AppConfig` is the root configuration struct containing all settings.
//!
//! The backend base URL is resolved exactly once at startup by
//! [`BackendConfig::resolve_api_url`]; the resolved value is injected into the
//! poller and the handlers and never re-read from the environment.

use const_format::formatcp;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

// =============================================================================
// Backend Endpoint
// =============================================================================

/// Base URL used when neither the CLI, the environment nor the file set one
pub const DEFAULT_API_URL: &str = "http://localhost:5000";

/// Path of the backend health endpoint, appended to the base URL
pub const DEFAULT_HEALTH_PATH: &str = "/api/health";

/// Environment variable holding the backend base URL
pub const API_URL_ENV: &str = "API_URL";

/// Environment variable name used by older frontend deployments
pub const LEGACY_API_URL_ENV: &str = "REACT_APP_API_URL";

// =============================================================================
// Polling Cadence
// =============================================================================

/// Seconds between two scheduled polls
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 10;

/// Per-request timeout, aligned with the poll interval
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// User-Agent sent with every health probe
pub const PROBE_USER_AGENT: &str = formatcp!("heartbeat/{}", env!("CARGO_PKG_VERSION"));

// =============================================================================
// HTTP Response Cache Control
// =============================================================================

/// Embedded stylesheet - changes only with a new release
pub const HTTP_CACHE_STATIC_MAX_AGE: u32 = 86400;

/// Status responses must always reflect the latest poll
pub const CACHE_CONTROL_STATUS: &str = "no-store";

pub const CACHE_CONTROL_STATIC: &str =
    formatcp!("public, max-age={}, immutable", HTTP_CACHE_STATIC_MAX_AGE);

// =============================================================================
// Default Paths and Strings
// =============================================================================

/// Default log filter when RUST_LOG is not set
pub const DEFAULT_LOG_FILTER: &str = "heartbeat=debug";

/// Default log format (text or json)
pub const DEFAULT_LOG_FORMAT: &str = "text";

/// Default page title
pub const DEFAULT_SITE_NAME: &str = "AI Development Platform";

/// Default page subtitle
pub const DEFAULT_SUBTITLE: &str = "Frontend Application";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// HTTP server configuration
    #[serde(default)]
    pub http: HttpServerConfig,
    /// Backend endpoint and polling settings
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub ui: UiConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpServerConfig {
    #[serde(default = "HttpServerConfig::default_host")]
    pub host: String,
    #[serde(default = "HttpServerConfig::default_port")]
    pub port: u16,
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            host: Self::default_host(),
            port: Self::default_port(),
        }
    }
}

impl HttpServerConfig {
    fn default_host() -> String {
        "127.0.0.1".to_string()
    }

    fn default_port() -> u16 {
        3000
    }
}

/// Backend endpoint and polling settings
#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    /// Base URL from the config file; lowest priority above the default
    pub api_url: Option<String>,
    /// Path of the health endpoint (default: /api/health)
    #[serde(default = "BackendConfig::default_health_path")]
    pub health_path: String,
    /// Seconds between polls (default: 10)
    #[serde(default = "BackendConfig::default_poll_interval")]
    pub poll_interval_seconds: u64,
    /// Request timeout in seconds (default: 10)
    #[serde(default = "BackendConfig::default_request_timeout")]
    pub request_timeout_seconds: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            api_url: None,
            health_path: Self::default_health_path(),
            poll_interval_seconds: Self::default_poll_interval(),
            request_timeout_seconds: Self::default_request_timeout(),
        }
    }
}

impl BackendConfig {
    fn default_health_path() -> String {
        DEFAULT_HEALTH_PATH.to_string()
    }

    fn default_poll_interval() -> u64 {
        DEFAULT_POLL_INTERVAL_SECS
    }

    fn default_request_timeout() -> u64 {
        DEFAULT_REQUEST_TIMEOUT_SECS
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_seconds)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    /// Resolve the backend base URL.
    ///
    /// Priority: CLI flag > `API_URL` > `REACT_APP_API_URL` > config file >
    /// [`DEFAULT_API_URL`]. Empty values are treated as unset and trailing
    /// slashes are stripped so the health path can be appended verbatim.
    ///
    /// The environment is passed in as a lookup function so callers decide
    /// where it comes from (`std::env::var` in `main`, a map in tests).
    pub fn resolve_api_url<F>(&self, cli: Option<&str>, env: F) -> String
    where
        F: Fn(&str) -> Option<String>,
    {
        let chosen = non_empty(cli.map(str::to_string))
            .or_else(|| non_empty(env(API_URL_ENV)))
            .or_else(|| non_empty(env(LEGACY_API_URL_ENV)))
            .or_else(|| non_empty(self.api_url.clone()))
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        chosen.trim_end_matches('/').to_string()
    }

    /// Full URL of the health endpoint for a resolved base URL
    pub fn health_url(&self, base_url: &str) -> String {
        if self.health_path.starts_with('/') {
            format!("{}{}", base_url, self.health_path)
        } else {
            format!("{}/{}", base_url, self.health_path)
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UiConfig {
    /// Title shown in the page header
    #[serde(default = "UiConfig::default_site_name")]
    pub site_name: String,
    #[serde(default = "UiConfig::default_subtitle")]
    pub subtitle: String,
    /// Seconds between automatic page reloads; 0 disables reloading
    #[serde(default = "UiConfig::default_refresh")]
    pub refresh_seconds: u64,
    /// Version string, populated at runtime
    #[serde(skip_deserializing, default = "UiConfig::default_version")]
    pub version: String,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            site_name: Self::default_site_name(),
            subtitle: Self::default_subtitle(),
            refresh_seconds: Self::default_refresh(),
            version: Self::default_version(),
        }
    }
}

impl UiConfig {
    fn default_site_name() -> String {
        DEFAULT_SITE_NAME.to_string()
    }

    fn default_subtitle() -> String {
        DEFAULT_SUBTITLE.to_string()
    }

    fn default_refresh() -> u64 {
        DEFAULT_POLL_INTERVAL_SECS
    }

    fn default_version() -> String {
        env!("CARGO_PKG_VERSION").to_string()
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log format: "text" (human-readable, default) or "json" (structured)
    #[serde(default = "LoggingConfig::default_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: DEFAULT_LOG_FORMAT.to_string(),
        }
    }
}

impl LoggingConfig {
    fn default_format() -> String {
        DEFAULT_LOG_FORMAT.to_string()
    }

    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }
}

impl AppConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` when given, otherwise fall back to built-in defaults
    pub fn load_or_default<P: AsRef<Path>>(path: Option<P>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.backend.poll_interval_seconds == 0 {
            return Err(ConfigError::Validation(
                "backend.poll_interval_seconds must be greater than zero".to_string(),
            ));
        }
        if self.backend.request_timeout_seconds == 0 {
            return Err(ConfigError::Validation(
                "backend.request_timeout_seconds must be greater than zero".to_string(),
            ));
        }
        match self.logging.format.to_ascii_lowercase().as_str() {
            "text" | "json" => Ok(()),
            other => Err(ConfigError::Validation(format!(
                "logging.format must be \"text\" or \"json\", got \"{}\"",
                other
            ))),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Configuration error: {0}")]
    Validation(String),
}
