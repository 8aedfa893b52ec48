use std::env;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://inventory.db";
pub const IN_MEMORY_DATABASE_URL: &str = "sqlite::memory:";

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub schema_version: u32,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            schema_version: 1,
            max_connections: 5,
            acquire_timeout_secs: 3,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if it exists
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from any key lookup, falling back to defaults for unset keys.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        Ok(Self {
            database_url: lookup("DATABASE_URL").unwrap_or(defaults.database_url),
            schema_version: parse_var(&lookup, "SCHEMA_VERSION", defaults.schema_version)?,
            max_connections: parse_var(&lookup, "MAX_CONNECTIONS", defaults.max_connections)?,
            acquire_timeout_secs: parse_var(
                &lookup,
                "ACQUIRE_TIMEOUT_SECS",
                defaults.acquire_timeout_secs,
            )?,
            log_level: lookup("LOG_LEVEL").unwrap_or(defaults.log_level),
        })
    }

    /// Single-connection, in-memory database. Nothing survives the pool.
    pub fn in_memory() -> Self {
        Self {
            database_url: IN_MEMORY_DATABASE_URL.to_string(),
            max_connections: 1,
            ..Self::default()
        }
    }

    pub fn is_in_memory(&self) -> bool {
        self.database_url.contains(":memory:") || self.database_url.contains("mode=memory")
    }
}

fn parse_var<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidNumber { key, value }),
        None => Ok(default),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid number for {key}: {value}")]
    InvalidNumber { key: &'static str, value: String },
}
