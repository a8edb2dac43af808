use serde::{Deserialize, Serialize};
use std::fs;
use std::time::Duration;

use crate::error::ConfigError;

pub const ENV_JWT_SECRET: &str = "BANKING_JWT_SECRET";
pub const ENV_POSTGRES_URL: &str = "BANKING_POSTGRES_URL";
pub const ENV_PORT: &str = "BANKING_PORT";

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub log_dir: String,
    pub log_file: String,
    pub use_json: bool,
    pub rotation: String,
    pub gateway: GatewayConfig,
    /// PostgreSQL ledger store. The in-memory store is used when absent.
    #[serde(default)]
    pub postgres: Option<PostgresConfig>,
    pub auth: AuthConfig,
    /// Upper bound for every service call made on behalf of a request
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PostgresConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_acquire_timeout_ms")]
    pub acquire_timeout_ms: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AuthConfig {
    #[serde(default)]
    pub jwt_secret: String,
    #[serde(default = "default_token_ttl_secs")]
    pub token_ttl_secs: u64,
}

fn default_request_timeout_ms() -> u64 {
    5_000
}

fn default_max_connections() -> u32 {
    10
}

fn default_acquire_timeout_ms() -> u64 {
    5_000
}

fn default_token_ttl_secs() -> u64 {
    15 * 60
}

impl AppConfig {
    /// Load `config/{env}.yaml`, apply env-var overrides and verify required values.
    pub fn load(env: &str) -> Result<Self, ConfigError> {
        let config_path = format!("config/{}.yaml", env);
        let content = fs::read_to_string(&config_path).map_err(|source| ConfigError::Read {
            path: config_path.clone(),
            source,
        })?;
        let mut config = Self::from_yaml(&config_path, &content)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.verify()?;
        Ok(config)
    }

    pub fn from_yaml(path: &str, content: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_string(),
            source,
        })
    }

    /// Secrets and deployment-specific values may come from the environment.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(secret) = lookup(ENV_JWT_SECRET).filter(|s| !s.is_empty()) {
            self.auth.jwt_secret = secret;
        }
        if let Some(url) = lookup(ENV_POSTGRES_URL).filter(|s| !s.is_empty()) {
            match self.postgres.as_mut() {
                Some(pg) => pg.url = url,
                None => {
                    self.postgres = Some(PostgresConfig {
                        url,
                        max_connections: default_max_connections(),
                        acquire_timeout_ms: default_acquire_timeout_ms(),
                    })
                }
            }
        }
        if let Some(port) = lookup(ENV_PORT).and_then(|p| p.parse().ok()) {
            self.gateway.port = port;
        }
    }

    /// Report every missing or invalid required value at once.
    pub fn verify(&self) -> Result<(), ConfigError> {
        let mut invalid = Vec::new();

        if self.auth.jwt_secret.is_empty() {
            invalid.push("auth.jwt_secret");
        }
        if self.auth.token_ttl_secs == 0 {
            invalid.push("auth.token_ttl_secs");
        }
        if self.gateway.port == 0 {
            invalid.push("gateway.port");
        }
        if self.request_timeout_ms == 0 {
            invalid.push("request_timeout_ms");
        }
        if let Some(pg) = &self.postgres {
            if pg.url.is_empty() {
                invalid.push("postgres.url");
            }
            if pg.max_connections == 0 {
                invalid.push("postgres.max_connections");
            }
        }

        if invalid.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(invalid.join(", ")))
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn token_ttl(&self) -> Duration {
        Duration::from_secs(self.auth.token_ttl_secs)
    }
}
