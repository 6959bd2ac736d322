use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use std::path::Path;
use thiserror::Error;
use tracing::{error, info};

const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_ENV: &str = "development";
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DATABASE_URL: &str = "sqlite://brewstock.db?mode=rwc";
const CONFIG_DIR: &str = "config";

/// Key accepted when no explicit keys are configured in development.
/// Production refuses to start without an explicit key set.
const DEV_DEFAULT_API_KEY: &str = "dev-123";

/// Application configuration. Built once at startup (or in the test
/// harness) and passed into the services; domain logic never reads
/// environment state on its own.
#[derive(Clone, Debug, Deserialize)]
pub struct AppConfig {
    /// Database connection URL (sqlite or postgres)
    pub database_url: String,

    /// Server bind host
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Application environment ("development", "production", ...)
    pub environment: String,

    /// Logging level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log in JSON format (structured logging)
    #[serde(default)]
    pub log_json: bool,

    /// Whether to run database migrations on startup
    #[serde(default)]
    pub auto_migrate: bool,

    /// Comma-separated API keys accepted in the `x-api-key` header
    #[serde(default)]
    pub api_keys: String,

    /// CORS: comma-separated list of allowed origins; permissive when unset
    #[serde(default)]
    pub cors_allowed_origins: Option<String>,

    /// Database pool sizing
    #[serde(default = "default_max_connections")]
    pub db_max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub db_min_connections: u32,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

impl AppConfig {
    /// Minimal constructor used by tests and tooling.
    pub fn new(
        database_url: impl Into<String>,
        host: impl Into<String>,
        port: u16,
        environment: impl Into<String>,
    ) -> Self {
        Self {
            database_url: database_url.into(),
            host: host.into(),
            port,
            environment: environment.into(),
            log_level: default_log_level(),
            log_json: false,
            auto_migrate: false,
            api_keys: String::new(),
            cors_allowed_origins: None,
            db_max_connections: default_max_connections(),
            db_min_connections: default_min_connections(),
        }
    }

    pub fn is_development(&self) -> bool {
        self.environment.eq_ignore_ascii_case("development")
            || self.environment.eq_ignore_ascii_case("test")
    }

    pub fn log_level(&self) -> &str {
        &self.log_level
    }

    /// Accepted API keys. Falls back to the well-known development key only
    /// outside production.
    pub fn api_keys(&self) -> Vec<String> {
        let keys: Vec<String> = self
            .api_keys
            .split(',')
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_string)
            .collect();
        if keys.is_empty() && self.is_development() {
            return vec![DEV_DEFAULT_API_KEY.to_string()];
        }
        keys
    }

    /// Cross-field checks that serde cannot express.
    pub fn validate(&self) -> Result<(), AppConfigError> {
        if self.db_min_connections > self.db_max_connections {
            return Err(AppConfigError::Invalid(
                "db_min_connections must not exceed db_max_connections".into(),
            ));
        }
        if !self.is_development() && self.api_keys().is_empty() {
            error!("No API keys configured. Set APP__API_KEYS with at least one key.");
            return Err(AppConfigError::Invalid(
                "api_keys is required outside development".into(),
            ));
        }
        if !self.is_development() && self.api_keys().iter().any(|k| k == DEV_DEFAULT_API_KEY) {
            return Err(AppConfigError::Invalid(
                "the development API key must not be used outside development".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum AppConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] ConfigError),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Load configuration from `config/` files and `APP__`-prefixed environment
/// variables, most specific source last.
pub fn load_config() -> Result<AppConfig, AppConfigError> {
    let run_env = env::var("RUN_ENV")
        .or_else(|_| env::var("APP_ENV"))
        .unwrap_or_else(|_| DEFAULT_ENV.to_string());
    info!("Loading configuration for environment: {}", run_env);

    if !Path::new(CONFIG_DIR).exists() {
        info!(
            "Config directory '{}' not found; relying on built-in defaults and environment variables",
            CONFIG_DIR
        );
    }

    let config = Config::builder()
        .set_default("database_url", DEFAULT_DATABASE_URL)?
        .set_default("host", DEFAULT_HOST)?
        .set_default("port", DEFAULT_PORT)?
        .set_default("environment", DEFAULT_ENV)?
        .set_default("log_level", DEFAULT_LOG_LEVEL)?
        .set_default("log_json", false)?
        .add_source(File::with_name(&format!("{}/default", CONFIG_DIR)).required(false))
        .add_source(File::with_name(&format!("{}/{}", CONFIG_DIR, run_env)).required(false))
        .add_source(Environment::with_prefix("APP").separator("__"))
        .build()?;

    let app_config: AppConfig = config.try_deserialize()?;
    app_config.validate()?;
    Ok(app_config)
}

/// Initialise the tracing subscriber. `RUST_LOG` wins over the configured
/// level when set.
pub fn init_tracing(level: &str, json: bool) {
    use tracing_subscriber::fmt;

    let default_directive = format!("brewstock_api={},tower_http=debug", level);
    let filter_directive = env::var("RUST_LOG")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(default_directive);

    if json {
        let _ = fmt().with_env_filter(filter_directive).json().try_init();
    } else {
        let _ = fmt().with_env_filter(filter_directive).try_init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn development_falls_back_to_dev_key() {
        let cfg = AppConfig::new("sqlite::memory:", "127.0.0.1", 0, "development");
        assert_eq!(cfg.api_keys(), vec![DEV_DEFAULT_API_KEY.to_string()]);
    }

    #[test]
    fn production_requires_explicit_keys() {
        let cfg = AppConfig::new("sqlite::memory:", "127.0.0.1", 0, "production");
        assert!(cfg.validate().is_err());

        let mut cfg = AppConfig::new("sqlite::memory:", "127.0.0.1", 0, "production");
        cfg.api_keys = "prod-key-1, prod-key-2".to_string();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.api_keys().len(), 2);
    }

    #[test]
    fn production_rejects_the_dev_key() {
        let mut cfg = AppConfig::new("sqlite::memory:", "127.0.0.1", 0, "production");
        cfg.api_keys = format!("{DEV_DEFAULT_API_KEY},other");
        assert!(cfg.validate().is_err());
    }
}
