use anyhow::{bail, Context, Result};
use std::env;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Memory,
    Postgres,
}

impl FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(StoreBackend::Memory),
            "postgres" => Ok(StoreBackend::Postgres),
            other => bail!("unknown ORDERS_STORE '{}' (expected memory or postgres)", other),
        }
    }
}

/// Basic-auth pair every order request must present.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub port: u16,
    pub credentials: Credentials,
    pub store: StoreBackend,
    pub database_url: Option<String>,
    pub db_max_connections: u32,
}

impl Config {
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let store = match lookup("ORDERS_STORE") {
            Some(raw) => raw.parse()?,
            None => StoreBackend::Memory,
        };

        let database_url = lookup("DATABASE_URL");
        if store == StoreBackend::Postgres && database_url.is_none() {
            bail!("DATABASE_URL not set (required when ORDERS_STORE=postgres)");
        }

        Ok(Config {
            bind_addr: lookup("ORDERS_BIND_ADDR").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or(&lookup, "ORDERS_PORT", 3000)?,
            credentials: Credentials {
                username: lookup("ORDERS_AUTH_USER").unwrap_or_else(|| "happy".to_string()),
                password: lookup("ORDERS_AUTH_PASSWORD").unwrap_or_else(|| "golucky".to_string()),
            },
            store,
            database_url,
            db_max_connections: parse_or(&lookup, "ORDERS_DB_MAX_CONNECTIONS", 10)?,
        })
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().with_context(|| format!("Invalid {}", key)),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.store, StoreBackend::Memory);
        assert_eq!(config.credentials.username, "happy");
        assert_eq!(config.credentials.password, "golucky");
        assert_eq!(config.db_max_connections, 10);
    }

    #[test]
    fn test_postgres_requires_database_url() {
        assert!(config_from(&[("ORDERS_STORE", "postgres")]).is_err());

        let config = config_from(&[
            ("ORDERS_STORE", "Postgres"),
            ("DATABASE_URL", "postgres://localhost/orders"),
        ])
        .unwrap();
        assert_eq!(config.store, StoreBackend::Postgres);
    }

    #[test]
    fn test_invalid_values_fail() {
        assert!(config_from(&[("ORDERS_PORT", "eighty")]).is_err());
        assert!(config_from(&[("ORDERS_STORE", "redis")]).is_err());
    }
}
