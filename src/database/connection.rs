use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use tracing::info;

use super::DatabaseError;
use crate::config::DatabaseConfig;

/// Open the pool and make sure the server answers
pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, DatabaseError> {
    let url = config
        .url
        .as_deref()
        .ok_or(DatabaseError::ConfigMissing("DATABASE_URL or RDS_HOSTNAME"))?;

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.connection_timeout))
        .connect(url)
        .await?;

    sqlx::query("SELECT 1").execute(&pool).await?;

    info!("Connected to database (max {} connections)", config.max_connections);
    Ok(pool)
}

/// Connection parameters in the discrete form some hosts provide
#[derive(Debug, Clone, Default)]
pub struct ConnectionParts {
    pub host: String,
    pub port: Option<u16>,
    pub database: String,
    pub user: String,
    pub password: Option<String>,
}

/// Assemble a postgres URL, escaping credentials as needed
pub fn build_connection_string(parts: &ConnectionParts) -> Result<String, DatabaseError> {
    if parts.host.is_empty() {
        return Err(DatabaseError::ConfigMissing("RDS_HOSTNAME"));
    }

    let mut url = url::Url::parse("postgres://localhost").map_err(|_| DatabaseError::InvalidDatabaseUrl)?;

    url.set_host(Some(&parts.host))
        .map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
    url.set_port(parts.port)
        .map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
    url.set_username(&parts.user)
        .map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
    url.set_password(parts.password.as_deref())
        .map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
    url.set_path(&format!("/{}", parts.database));
    url.query_pairs_mut().append_pair("sslmode", "disable");

    Ok(url.into())
}
