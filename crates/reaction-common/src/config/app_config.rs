//! Application configuration structs
//!
//! Loads configuration from environment variables (and a `.env` file if present).

use serde::Deserialize;
use std::env;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app: AppSettings,
    pub redis: RedisConfig,
    pub policy: PolicyConfig,
    pub fanout: FanoutConfig,
    pub display: DisplayConfig,
}

/// General application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default = "default_env")]
    pub env: Environment,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }

    fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "production" => Some(Self::Production),
            "staging" => Some(Self::Staging),
            "development" => Some(Self::Development),
            _ => None,
        }
    }
}

/// Redis configuration (event bus and post cache)
#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    pub url: String,
    #[serde(default = "default_redis_max_connections")]
    pub max_connections: u32,
}

/// Access policy inputs
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PolicyConfig {
    /// Deployment carries an active license
    #[serde(default)]
    pub licensed: bool,
    /// Default channel is read-only for non-administrators (licensed feature)
    #[serde(default)]
    pub town_square_read_only: bool,
}

/// Notification fan-out settings
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct FanoutConfig {
    /// Workers running event-bus and cache notifications
    #[serde(default = "default_fanout_workers")]
    pub workers: usize,
    /// Workers running extension hooks, separate from the notification workers
    #[serde(default = "default_hook_workers")]
    pub hook_workers: usize,
    /// Longest a single extension hook may run before it is abandoned
    #[serde(default = "default_hook_timeout_ms")]
    pub hook_timeout_ms: u64,
}

impl Default for FanoutConfig {
    fn default() -> Self {
        Self {
            workers: default_fanout_workers(),
            hook_workers: default_hook_workers(),
            hook_timeout_ms: default_hook_timeout_ms(),
        }
    }
}

/// Settings for display-ready post payloads
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DisplayConfig {
    /// Image proxy base URL; images in post messages are routed through it
    #[serde(default)]
    pub image_proxy_url: Option<String>,
}

// Default value functions
fn default_app_name() -> String {
    "reaction-service".to_string()
}

fn default_env() -> Environment {
    Environment::Development
}

fn default_redis_max_connections() -> u32 {
    10
}

fn default_fanout_workers() -> usize {
    4
}

fn default_hook_workers() -> usize {
    2
}

fn default_hook_timeout_ms() -> u64 {
    5_000
}

/// Parse a strictly positive number
fn positive<T>(key: &'static str, value: String) -> Result<T, ConfigError>
where
    T: std::str::FromStr + PartialOrd + Default,
{
    value
        .trim()
        .parse::<T>()
        .ok()
        .filter(|n| *n > T::default())
        .ok_or(ConfigError::InvalidValue(key, value))
}

/// Parse a boolean flag the way operators tend to write them
fn parse_bool(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::InvalidValue(key, value.to_string())),
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if required environment variables are missing
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    ///
    /// # Errors
    /// Returns an error if a required key is missing or a value does not parse
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let flag = |key: &'static str| -> Result<bool, ConfigError> {
            lookup(key).map_or(Ok(false), |v| parse_bool(key, &v))
        };

        let fanout = FanoutConfig {
            workers: lookup("FANOUT_WORKERS")
                .map_or(Ok(default_fanout_workers()), |v| positive("FANOUT_WORKERS", v))?,
            hook_workers: lookup("FANOUT_HOOK_WORKERS")
                .map_or(Ok(default_hook_workers()), |v| positive("FANOUT_HOOK_WORKERS", v))?,
            hook_timeout_ms: lookup("EXTENSION_HOOK_TIMEOUT_MS").map_or(
                Ok(default_hook_timeout_ms()),
                |v| positive("EXTENSION_HOOK_TIMEOUT_MS", v),
            )?,
        };

        Ok(Self {
            app: AppSettings {
                name: lookup("APP_NAME").unwrap_or_else(default_app_name),
                env: lookup("APP_ENV")
                    .as_deref()
                    .and_then(Environment::parse)
                    .unwrap_or_default(),
            },
            redis: RedisConfig {
                url: lookup("REDIS_URL").ok_or(ConfigError::MissingVar("REDIS_URL"))?,
                max_connections: lookup("REDIS_MAX_CONNECTIONS")
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(default_redis_max_connections),
            },
            policy: PolicyConfig {
                licensed: flag("LICENSE_ACTIVE")?,
                town_square_read_only: flag("TOWN_SQUARE_READ_ONLY")?,
            },
            fanout,
            display: DisplayConfig {
                image_proxy_url: lookup("IMAGE_PROXY_URL")
                    .map(|s| s.trim().trim_end_matches('/').to_string())
                    .filter(|s| !s.is_empty()),
            },
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
