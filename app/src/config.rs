//! Service configuration, read from the process environment.

use std::env;
use std::net::SocketAddr;

use axum::http::HeaderName;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_AUTH_USER_HEADER: &str = "x-remote-user";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL URL. Without one, contacts live in memory.
    pub database_url: Option<String>,
    pub bind_addr: SocketAddr,
    pub max_connections: u32,
    /// Header a fronting proxy sets to the authenticated user name.
    pub auth_header: HeaderName,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let bind_addr: SocketAddr = match var("BIND_ADDR") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
                name: "BIND_ADDR",
                value: raw,
            })?,
            None => DEFAULT_BIND_ADDR
                .parse()
                .map_err(|_| ConfigError::Invalid {
                    name: "BIND_ADDR",
                    value: DEFAULT_BIND_ADDR.to_string(),
                })?,
        };

        let max_connections = match var("DB_MAX_CONNECTIONS") {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or(ConfigError::Invalid {
                    name: "DB_MAX_CONNECTIONS",
                    value: raw,
                })?,
            None => (num_cpus::get() * 2) as u32,
        };

        let header = var("AUTH_USER_HEADER").unwrap_or_else(|| DEFAULT_AUTH_USER_HEADER.to_string());
        let auth_header = HeaderName::from_bytes(header.trim().to_ascii_lowercase().as_bytes())
            .map_err(|_| ConfigError::Invalid {
                name: "AUTH_USER_HEADER",
                value: header.clone(),
            })?;

        Ok(Self {
            database_url: var("DATABASE_URL"),
            bind_addr,
            max_connections,
            auth_header,
        })
    }
}
