//! Configuration management
//!
//! Configuration is loaded from `config.yml` and can be overridden with
//! `BARBEARIA_*` environment variables. Missing values fall back to defaults,
//! so the application starts with no configuration file at all.

use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Session cookie configuration
    #[serde(default)]
    pub session: SessionConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite database file path (or `:memory:`)
    #[serde(default = "default_database_url")]
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
        }
    }
}

fn default_database_url() -> String {
    "data/barbearia.db".to_string()
}

/// Session cookie configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Name of the cookie carrying the session token
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    /// Session lifetime in hours
    #[serde(default = "default_ttl_hours")]
    pub ttl_hours: i64,
    /// Add the `Secure` attribute to the session cookie (HTTPS deployments)
    #[serde(default)]
    pub secure_cookie: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: default_cookie_name(),
            ttl_hours: default_ttl_hours(),
            secure_cookie: false,
        }
    }
}

fn default_cookie_name() -> String {
    "session".to_string()
}

fn default_ttl_hours() -> i64 {
    24
}

/// Longest accepted session lifetime: ten years
pub const MAX_SESSION_TTL_HOURS: i64 = 24 * 365 * 10;

impl SessionConfig {
    /// Session lifetime as a duration, saturating at the representable range
    pub fn ttl(&self) -> Duration {
        Duration::try_hours(self.ttl_hours).unwrap_or(if self.ttl_hours < 0 {
            Duration::MIN
        } else {
            Duration::MAX
        })
    }

    /// Cookie max-age in seconds (never negative)
    pub fn max_age_seconds(&self) -> i64 {
        self.ttl().num_seconds().max(0)
    }
}

/// Error type for configuration parsing
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    FileRead {
        path: String,
        source: std::io::Error,
    },
    #[error("Failed to parse config file '{path}': {message}")]
    ParseError { path: String, message: String },
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: &'static str, message: String },
}

impl Config {
    /// Load configuration from file
    ///
    /// A missing or empty file yields the default configuration. A file that
    /// exists but is not valid YAML is an error carrying the parse location.
    pub fn load(path: &std::path::Path) -> anyhow::Result<Self> {
        let config = Self::read_file(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from file with environment variable overrides
    ///
    /// Recognized variables:
    /// - BARBEARIA_SERVER_HOST
    /// - BARBEARIA_SERVER_PORT
    /// - BARBEARIA_DATABASE_URL
    /// - BARBEARIA_SESSION_COOKIE_NAME
    /// - BARBEARIA_SESSION_TTL_HOURS
    /// - BARBEARIA_SESSION_SECURE_COOKIE
    ///
    /// Values that fail to parse are ignored; parsed values are validated
    /// together with the file.
    pub fn load_with_env(path: &std::path::Path) -> anyhow::Result<Self> {
        let mut config = Self::read_file(path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn read_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::FileRead {
                    path: path.display().to_string(),
                    source,
                })
            }
        };

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.display().to_string(),
            message: format_yaml_error(&e),
        })
    }

    /// Reject values the server cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ttl = self.session.ttl_hours;
        if !(1..=MAX_SESSION_TTL_HOURS).contains(&ttl) {
            return Err(ConfigError::InvalidValue {
                field: "session.ttl_hours",
                message: format!("{} is outside 1..={}", ttl, MAX_SESSION_TTL_HOURS),
            });
        }

        if self.session.cookie_name.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "session.cookie_name",
                message: "must not be empty".to_string(),
            });
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        if let Some(host) = env_value("BARBEARIA_SERVER_HOST") {
            self.server.host = host;
        }
        if let Some(port) = env_parsed("BARBEARIA_SERVER_PORT") {
            self.server.port = port;
        }
        if let Some(url) = env_value("BARBEARIA_DATABASE_URL") {
            self.database.url = url;
        }
        if let Some(name) = env_value("BARBEARIA_SESSION_COOKIE_NAME").filter(|n| !n.trim().is_empty()) {
            self.session.cookie_name = name;
        }
        if let Some(ttl) = env_parsed("BARBEARIA_SESSION_TTL_HOURS") {
            self.session.ttl_hours = ttl;
        }
        if let Some(secure) = env_value("BARBEARIA_SESSION_SECURE_COOKIE").and_then(|v| parse_flag(&v)) {
            self.session.secure_cookie = secure;
        }
    }
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

fn env_parsed<T: std::str::FromStr>(name: &str) -> Option<T> {
    env_value(name).and_then(|v| v.trim().parse().ok())
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn format_yaml_error(e: &serde_yaml::Error) -> String {
    match e.location() {
        Some(at) => format!("line {} column {}: {}", at.line(), at.column(), e),
        None => e.to_string(),
    }
}

#[cfg(test)]
static CONFIG_ENV_MUTEX: std::sync::Mutex<()> = std::sync::Mutex::new(());
