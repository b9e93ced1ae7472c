use config::{Config, ConfigError, Environment, File};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::env;
use std::path::Path;
use tracing_subscriber::EnvFilter;
use validator::Validate;

const CONFIG_DIR: &str = "config";
const DEFAULT_RUN_ENV: &str = "development";

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_environment() -> String {
    DEFAULT_RUN_ENV.to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_db_max_connections() -> u32 {
    20
}

fn default_db_min_connections() -> u32 {
    2
}

fn default_db_connect_timeout_secs() -> u64 {
    10
}

fn default_db_idle_timeout_secs() -> u64 {
    300
}

fn default_shipping_flat_rate() -> Decimal {
    Decimal::new(5000, 2)
}

fn default_session_expiry_secs() -> i64 {
    60 * 60 * 24 * 14
}

/// Application configuration, layered from `config/default.toml`, an optional
/// per-environment file, and `APP__`-prefixed environment variables.
#[derive(Clone, Debug, Deserialize, Validate)]
pub struct AppConfig {
    #[validate(length(min = 1, message = "database_url must not be empty"))]
    pub database_url: String,

    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_environment")]
    pub environment: String,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Emit logs as JSON lines instead of the human-readable format.
    #[serde(default)]
    pub log_json: bool,

    /// Run embedded migrations on startup.
    #[serde(default)]
    pub auto_migrate: bool,

    /// Comma-separated list of allowed CORS origins.
    #[serde(default)]
    pub cors_allowed_origins: Option<String>,

    #[serde(default = "default_db_max_connections")]
    pub db_max_connections: u32,

    #[serde(default = "default_db_min_connections")]
    pub db_min_connections: u32,

    #[serde(default = "default_db_connect_timeout_secs")]
    pub db_connect_timeout_secs: u64,

    #[serde(default = "default_db_idle_timeout_secs")]
    pub db_idle_timeout_secs: u64,

    /// Flat shipping charge added to every order.
    #[serde(default = "default_shipping_flat_rate")]
    pub shipping_flat_rate: Decimal,

    /// Session cookie inactivity expiry.
    #[serde(default = "default_session_expiry_secs")]
    pub session_expiry_secs: i64,

    /// Mark the session cookie Secure (HTTPS-only deployments).
    #[serde(default)]
    pub session_secure: bool,
}

impl AppConfig {
    /// Minimal configuration for test harnesses.
    pub fn new(database_url: String, host: String, port: u16, environment: String) -> Self {
        Self {
            database_url,
            host,
            port,
            environment,
            log_level: default_log_level(),
            log_json: false,
            auto_migrate: false,
            cors_allowed_origins: None,
            db_max_connections: default_db_max_connections(),
            db_min_connections: default_db_min_connections(),
            db_connect_timeout_secs: default_db_connect_timeout_secs(),
            db_idle_timeout_secs: default_db_idle_timeout_secs(),
            shipping_flat_rate: default_shipping_flat_rate(),
            session_expiry_secs: default_session_expiry_secs(),
            session_secure: false,
        }
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    pub fn log_level(&self) -> &str {
        &self.log_level
    }
}

/// Load and validate configuration. The per-environment file is selected by
/// `RUN_ENV`; environment variables use `APP__` with `__` as the separator
/// (e.g. `APP__DATABASE_URL`).
pub fn load_config() -> Result<AppConfig, ConfigError> {
    let run_env = env::var("RUN_ENV").unwrap_or_else(|_| DEFAULT_RUN_ENV.to_string());

    let settings = Config::builder()
        .add_source(File::from(Path::new(CONFIG_DIR).join("default")).required(false))
        .add_source(File::from(Path::new(CONFIG_DIR).join(&run_env)).required(false))
        .add_source(Environment::with_prefix("APP").separator("__"))
        .build()?;

    let app_config: AppConfig = settings.try_deserialize()?;
    app_config
        .validate()
        .map_err(|e| ConfigError::Message(format!("invalid configuration: {e}")))?;
    Ok(app_config)
}

/// Install the global tracing subscriber. `RUST_LOG` overrides the configured
/// level. Safe to call more than once; later calls are no-ops.
pub fn init_tracing(level: &str, json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.to_string()));

    if json {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .with_current_span(false)
            .try_init();
    } else {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .try_init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_harness_config_has_sane_defaults() {
        let cfg = AppConfig::new(
            "sqlite::memory:".to_string(),
            "127.0.0.1".to_string(),
            0,
            "test".to_string(),
        );
        assert_eq!(cfg.shipping_flat_rate, dec!(50.00));
        assert!(!cfg.is_development());
        assert_eq!(cfg.log_level(), "info");
        assert!(cfg.db_max_connections >= cfg.db_min_connections);
    }

    #[test]
    fn empty_database_url_fails_validation() {
        let cfg = AppConfig::new(String::new(), "127.0.0.1".to_string(), 0, "test".to_string());
        assert!(cfg.validate().is_err());
    }
}
