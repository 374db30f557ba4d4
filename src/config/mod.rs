use serde::{Deserialize, Serialize};
use std::env;

use crate::auth::Secrets;
use crate::database::connection::{build_connection_string, ConnectionParts};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub backend: StoreBackend,
    #[serde(skip_serializing)]
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub enable_request_logging: bool,
    pub max_request_size_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub cors_origins: Vec<String>,
    #[serde(skip_serializing)]
    pub write_token: Option<String>,
    #[serde(skip_serializing)]
    pub show_archived: Option<String>,
}

impl SecurityConfig {
    pub fn secrets(&self) -> Secrets {
        Secrets {
            write_token: self.write_token.clone(),
            show_archived: self.show_archived.clone(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the config from any key lookup; `from_env` passes the process environment
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let environment = match lookup("APP_ENV").as_deref() {
            Some("production") | Some("prod") => Environment::Production,
            _ => Environment::Development,
        };

        match environment {
            Environment::Production => Self::production(),
            Environment::Development => Self::development(),
        }
        .with_overrides(&lookup)
    }

    fn with_overrides(mut self, lookup: &impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        // Server overrides
        if let Some(v) = non_empty("API_HOST") {
            self.server.host = v;
        }
        if let Some(port) = non_empty("API_PORT")
            .or_else(|| non_empty("PORT"))
            .and_then(|v| v.parse().ok())
        {
            self.server.port = port;
        }

        // Database overrides
        if let Some(v) = non_empty("DATABASE_BACKEND") {
            match v.to_ascii_lowercase().as_str() {
                "memory" => self.database.backend = StoreBackend::Memory,
                "postgres" => self.database.backend = StoreBackend::Postgres,
                other => tracing::warn!("Unknown DATABASE_BACKEND '{}', keeping {:?}", other, self.database.backend),
            }
        }
        self.database.url = non_empty("DATABASE_URL").or_else(|| rds_url(&non_empty));
        if let Some(v) = non_empty("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Some(v) = non_empty("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }

        // API overrides
        if let Some(v) = non_empty("API_ENABLE_REQUEST_LOGGING") {
            self.api.enable_request_logging = v.parse().unwrap_or(self.api.enable_request_logging);
        }
        if let Some(v) = non_empty("API_MAX_REQUEST_SIZE_BYTES") {
            self.api.max_request_size_bytes = v.parse().unwrap_or(self.api.max_request_size_bytes);
        }

        // Security overrides
        if let Some(v) = non_empty("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect();
        }
        if let Some(origin) = non_empty("ORIGIN") {
            if !self.security.cors_origins.contains(&origin) {
                self.security.cors_origins.push(origin);
            }
        }
        self.security.write_token = non_empty("SECURITY_WRITE_TOKEN");
        self.security.show_archived = non_empty("SECURITY_SHOW_ARCHIVED");

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 5000,
            },
            database: DatabaseConfig {
                backend: StoreBackend::Postgres,
                url: None,
                max_connections: 5,
                connection_timeout: 30,
            },
            api: ApiConfig {
                enable_request_logging: true,
                max_request_size_bytes: 1024 * 1024, // 1MB
            },
            security: SecurityConfig {
                cors_origins: vec!["http://localhost:3000".to_string()],
                write_token: None,
                show_archived: None,
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 5000,
            },
            database: DatabaseConfig {
                backend: StoreBackend::Postgres,
                url: None,
                max_connections: 20,
                connection_timeout: 5,
            },
            api: ApiConfig {
                enable_request_logging: false,
                max_request_size_bytes: 256 * 1024,
            },
            security: SecurityConfig {
                cors_origins: vec![
                    "https://lupus-yonderboy.github.io".to_string(),
                    "http://localhost:3000".to_string(),
                ],
                write_token: None,
                show_archived: None,
            },
        }
    }
}

/// Legacy discrete connection variables
fn rds_url(lookup: &impl Fn(&str) -> Option<String>) -> Option<String> {
    let host = lookup("RDS_HOSTNAME")?;
    let parts = ConnectionParts {
        host,
        port: lookup("RDS_PORT").and_then(|p| p.parse().ok()),
        database: lookup("RDS_DB_NAME").unwrap_or_default(),
        user: lookup("RDS_USERNAME").unwrap_or_default(),
        password: lookup("RDS_PASSWORD"),
    };

    match build_connection_string(&parts) {
        Ok(url) => Some(url),
        Err(e) => {
            tracing::warn!("Ignoring RDS_* connection settings: {}", e);
            None
        }
    }
}
