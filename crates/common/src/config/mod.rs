//! Configuration management for Folio services
//!
//! Supports loading configuration from:
//! - Configuration files (config/default, config/{APP_ENV}, config/local)
//! - Environment variables (prefixed with APP__)
//! - The plain `DATABASE_*`, `METAGEN_URL` and `APP_PORT` variables
//! - Default values

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, warn};

/// Plain environment variables mapped onto configuration keys.
/// These win over every other source.
const ENV_OVERRIDES: &[(&str, &str)] = &[
    ("DATABASE_URL", "database.url"),
    ("DATABASE_HOST", "database.host"),
    ("DATABASE_PORT", "database.port"),
    ("DATABASE_USER", "database.username"),
    ("DATABASE_PASSWORD", "database.password"),
    ("DATABASE_DB", "database.database"),
    ("METAGEN_URL", "metagen.base_url"),
    ("APP_PORT", "server.port"),
];

/// Main application configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Metadata generation service configuration
    #[serde(default)]
    pub metagen: MetaGenConfig,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Shutdown timeout in seconds
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_secs: u64,
}

/// Connection parameters for Postgres.
///
/// Either `url` is set, or the individual parts are combined into one.
/// Missing parts are filled in by [`DatabaseConfig::resolve_defaults`].
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// Full connection URL, overrides the individual parts
    pub url: Option<String>,

    pub host: Option<String>,
    pub port: Option<u16>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub database: Option<String>,

    /// Maximum number of connections
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Minimum number of connections
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    /// Connection timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Idle timeout in seconds
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MetaGenConfig {
    /// Base URL of the metadata generation service; generation is disabled when unset
    pub base_url: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_metagen_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level (debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default = "default_json_logging")]
    pub json_logging: bool,

    /// Metrics port (0 to disable)
    #[serde(default = "default_metrics_port")]
    pub metrics_port: u16,
}

// Default value functions
fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8080 }
fn default_shutdown_timeout() -> u64 { 30 }
fn default_max_connections() -> u32 { 10 }
fn default_min_connections() -> u32 { 1 }
fn default_connect_timeout() -> u64 { 10 }
fn default_idle_timeout() -> u64 { 300 }
fn default_metagen_timeout() -> u64 { 30 }
fn default_log_level() -> String { "info".to_string() }
fn default_json_logging() -> bool { true }
fn default_metrics_port() -> u16 { 0 }

const DEFAULT_DB_HOST: &str = "localhost";
const DEFAULT_DB_PORT: u16 = 5432;
const DEFAULT_DB_USER: &str = "user";
const DEFAULT_DB_PASSWORD: &str = "password";
const DEFAULT_DB_NAME: &str = "postgres";

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            shutdown_timeout_secs: default_shutdown_timeout(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            host: None,
            port: None,
            username: None,
            password: None,
            database: None,
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connect_timeout_secs: default_connect_timeout(),
            idle_timeout_secs: default_idle_timeout(),
        }
    }
}

impl Default for MetaGenConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_secs: default_metagen_timeout(),
        }
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logging: default_json_logging(),
            metrics_port: default_metrics_port(),
        }
    }
}

impl MetaGenConfig {
    /// Per-request timeout of the metadata client
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl DatabaseConfig {
    /// Build a config that connects straight to `url`
    pub fn from_url(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Default::default()
        }
    }

    /// Fill unset connection parts with their defaults, logging each one.
    /// Does nothing when a full URL is configured.
    pub fn resolve_defaults(&mut self) {
        if self.url.is_some() {
            info!("Using configured database URL");
            return;
        }

        fn fill<T: Clone + std::fmt::Display>(
            slot: &mut Option<T>,
            default: T,
            key: &str,
            secret: bool,
        ) {
            match slot {
                Some(_) if secret => info!(key, "database setting provided"),
                Some(value) => info!(key, value = %value, "database setting provided"),
                None => {
                    if secret {
                        warn!(key, "database setting not set, using default");
                    } else {
                        warn!(key, default = %default, "database setting not set, using default");
                    }
                    *slot = Some(default);
                }
            }
        }

        fill(&mut self.host, DEFAULT_DB_HOST.to_string(), "host", false);
        fill(&mut self.port, DEFAULT_DB_PORT, "port", false);
        fill(&mut self.username, DEFAULT_DB_USER.to_string(), "username", false);
        fill(&mut self.password, DEFAULT_DB_PASSWORD.to_string(), "password", true);
        fill(&mut self.database, DEFAULT_DB_NAME.to_string(), "database", false);
    }

    /// The connection string: the URL override when present, otherwise
    /// assembled from the individual parts.
    pub fn connection_url(&self) -> String {
        if let Some(url) = &self.url {
            return url.clone();
        }

        format!(
            "postgres://{}:{}@{}:{}/{}?sslmode=disable",
            self.username.as_deref().unwrap_or(DEFAULT_DB_USER),
            self.password.as_deref().unwrap_or(DEFAULT_DB_PASSWORD),
            self.host.as_deref().unwrap_or(DEFAULT_DB_HOST),
            self.port.unwrap_or(DEFAULT_DB_PORT),
            self.database.as_deref().unwrap_or(DEFAULT_DB_NAME),
        )
    }
}

impl AppConfig {
    /// Load configuration from files and environment.
    ///
    /// Database defaults are not applied here; call
    /// [`DatabaseConfig::resolve_defaults`] once logging is up so the
    /// defaulted keys are reported.
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        let mut builder = Config::builder()
            // Load base config file
            .add_source(File::with_name("config/default").required(false))
            // Load environment-specific config
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            // Load local overrides
            .add_source(File::with_name("config/local").required(false))
            // e.g., APP__SERVER__PORT=8081
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            );

        for (var, key) in ENV_OVERRIDES {
            let value = std::env::var(var).ok().filter(|v| !v.is_empty());
            builder = builder.set_override_option(*key, value)?;
        }

        builder.build()?.try_deserialize()
    }

    /// Get shutdown timeout as Duration
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.server.shutdown_timeout_secs)
    }
}
