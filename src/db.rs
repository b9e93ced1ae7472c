use crate::config::AppConfig;
use crate::errors::ServiceError;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use std::time::Duration;
use tracing::info;

/// Connection pool settings, derived from [`AppConfig`].
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout: Duration,
    pub idle_timeout: Duration,
    pub sqlx_logging: bool,
}

impl From<&AppConfig> for DbConfig {
    fn from(cfg: &AppConfig) -> Self {
        Self {
            url: cfg.database_url.clone(),
            max_connections: cfg.db_max_connections,
            min_connections: cfg.db_min_connections,
            connect_timeout: Duration::from_secs(cfg.db_connect_timeout_secs),
            idle_timeout: Duration::from_secs(cfg.db_idle_timeout_secs),
            sqlx_logging: cfg.is_development(),
        }
    }
}

pub async fn establish_connection(cfg: &DbConfig) -> Result<DatabaseConnection, ServiceError> {
    let mut options = ConnectOptions::new(cfg.url.clone());
    options
        .max_connections(cfg.max_connections)
        .min_connections(cfg.min_connections)
        .connect_timeout(cfg.connect_timeout)
        .idle_timeout(cfg.idle_timeout)
        .sqlx_logging(cfg.sqlx_logging);

    let conn = Database::connect(options).await?;
    info!(max_connections = cfg.max_connections, "database pool established");
    Ok(conn)
}

pub async fn establish_connection_from_app_config(
    cfg: &AppConfig,
) -> Result<DatabaseConnection, ServiceError> {
    establish_connection(&DbConfig::from(cfg)).await
}

/// Apply all pending embedded migrations.
pub async fn run_migrations(conn: &DatabaseConnection) -> Result<(), ServiceError> {
    crate::migrator::Migrator::up(conn, None).await?;
    info!("database migrations applied");
    Ok(())
}

/// Cheap liveness probe against the pool.
pub async fn check_connection(conn: &DatabaseConnection) -> Result<(), ServiceError> {
    conn.ping().await?;
    Ok(())
}
