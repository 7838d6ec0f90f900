//! Server configuration loading from file and environment variables.

use attar_client::BackendConfig;
use attar_dialog::CityMatch;
use attar_voice::LiveKitConfig;
use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr};
use thiserror::Error;

/// Top-level server configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Server network settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Flight search/booking backend.
    #[serde(default)]
    pub backend: BackendConfig,

    /// Conversation tuning.
    #[serde(default)]
    pub dialog: DialogSection,

    /// LiveKit voice transport. Voice tokens are refused unless url, key and
    /// secret are all set.
    #[serde(default)]
    pub livekit: LiveKitConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Network configuration for the HTTP server.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to.
    #[serde(default = "default_host")]
    pub host: IpAddr,

    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Origins allowed to call the API from a browser. Empty allows any.
    #[serde(default)]
    pub cors_origins: Vec<String>,

    /// Sessions unused for this long are ended. Zero keeps them until
    /// deleted.
    #[serde(default = "default_session_idle_timeout")]
    pub session_idle_timeout_seconds: u64,
}

/// `[dialog]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DialogSection {
    /// Year attached to spoken dates. Defaults to the current year.
    #[serde(default)]
    pub assumed_year: Option<i32>,

    /// How several cities in one utterance are ordered.
    #[serde(default)]
    pub city_match: CityMatch,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "attar_server=debug,info").
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to output logs in JSON format.
    #[serde(default)]
    pub json: bool,
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1))
}

fn default_port() -> u16 {
    3000
}

fn default_session_idle_timeout() -> u64 {
    1800
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: Vec::new(),
            session_idle_timeout_seconds: default_session_idle_timeout(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl Config {
    /// Dialog settings with the backend's default cabin applied.
    pub fn dialog_config(&self) -> attar_dialog::DialogConfig {
        let mut dialog = attar_dialog::DialogConfig {
            city_match: self.dialog.city_match,
            cabin_class: self.backend.cabin_class,
            ..attar_dialog::DialogConfig::default()
        };
        if let Some(year) = self.dialog.assumed_year {
            dialog.assumed_year = year;
        }
        dialog
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse the configuration file.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Loads configuration from a TOML file, falling back to defaults.
///
/// Environment variable overrides:
/// - `ATTAR_HOST` overrides `server.host`
/// - `ATTAR_PORT` overrides `server.port`
/// - `ATTAR_BACKEND_URL` overrides `backend.base_url`
/// - `ATTAR_LOG_LEVEL` overrides `logging.level`
/// - `ATTAR_SESSION_IDLE_TIMEOUT` overrides `server.session_idle_timeout_seconds`
/// - `ATTAR_LOG_JSON` overrides `logging.json` (set to "true" to enable)
/// - `ATTAR_LIVEKIT_URL`, `ATTAR_LIVEKIT_API_KEY`, `ATTAR_LIVEKIT_API_SECRET`
///   override the `livekit` credentials
///
/// # Errors
///
/// Returns `ConfigError` if the file exists but cannot be read or parsed.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let mut config = match path {
        Some(p) => match std::fs::read_to_string(p) {
            Ok(contents) => toml::from_str(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = p, "config file not found, using defaults");
                Config::default()
            }
            Err(e) => return Err(ConfigError::FileRead(e)),
        },
        None => Config::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    Ok(config)
}

/// Applies `ATTAR_*` overrides read through `var`. Unparseable values are
/// ignored with a warning.
pub fn apply_env_overrides(config: &mut Config, var: impl Fn(&str) -> Option<String>) {
    if let Some(host) = var("ATTAR_HOST") {
        match host.parse() {
            Ok(parsed) => config.server.host = parsed,
            Err(_) => tracing::warn!(value = %host, "ignoring invalid ATTAR_HOST"),
        }
    }
    if let Some(port) = var("ATTAR_PORT") {
        match port.parse() {
            Ok(parsed) => config.server.port = parsed,
            Err(_) => tracing::warn!(value = %port, "ignoring invalid ATTAR_PORT"),
        }
    }
    if let Some(timeout) = var("ATTAR_SESSION_IDLE_TIMEOUT") {
        match timeout.parse() {
            Ok(parsed) => config.server.session_idle_timeout_seconds = parsed,
            Err(_) => {
                tracing::warn!(value = %timeout, "ignoring invalid ATTAR_SESSION_IDLE_TIMEOUT")
            }
        }
    }
    if let Some(url) = var("ATTAR_BACKEND_URL") {
        config.backend.base_url = url;
    }
    if let Some(level) = var("ATTAR_LOG_LEVEL") {
        config.logging.level = level;
    }
    if let Some(json) = var("ATTAR_LOG_JSON") {
        config.logging.json = json == "true" || json == "1";
    }
    if let Some(url) = var("ATTAR_LIVEKIT_URL") {
        config.livekit.url = url;
    }
    if let Some(key) = var("ATTAR_LIVEKIT_API_KEY") {
        config.livekit.api_key = key;
    }
    if let Some(secret) = var("ATTAR_LIVEKIT_API_SECRET") {
        config.livekit.api_secret = secret;
    }
}
