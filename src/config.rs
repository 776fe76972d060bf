//! Configuration module for environment variables and application settings
//!
//! Everything trust-sensitive (signing secret, database credentials) comes from
//! the environment. Startup aborts when a required value is missing.

use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

use anyhow::{Context, Result, anyhow, bail};
use chrono::Duration;

use crate::database::connection::DatabaseConfig;

/// Token lifetime used when `JWT_TTL` is not set.
const DEFAULT_TOKEN_TTL: &str = "1h";

#[derive(Debug, Clone)]
pub struct Config {
    /// Token signing configuration
    pub auth: AuthConfig,

    /// Which store backs users and products
    pub store: StoreBackend,

    /// Server configuration
    pub server: ServerConfig,
}

#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl: Duration,
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .field("token_ttl", &self.token_ttl)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub enum StoreBackend {
    /// Process-local maps, lost on restart
    Memory,
    Postgres(DatabaseConfig),
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from any key lookup. `from_env` passes the
    /// process environment; tests pass a map.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwt_secret = lookup("JWT_SECRET")
            .ok_or_else(|| anyhow!("JWT_SECRET environment variable is required"))?;
        if jwt_secret.trim().is_empty() {
            bail!("JWT_SECRET must not be empty");
        }

        let ttl_raw = lookup("JWT_TTL").unwrap_or_else(|| DEFAULT_TOKEN_TTL.to_string());
        let token_ttl = parse_ttl(&ttl_raw).with_context(|| format!("Invalid JWT_TTL {ttl_raw:?}"))?;

        let database_url = lookup("DATABASE_URL")
            .ok_or_else(|| anyhow!("DATABASE_URL environment variable is required"))?;
        let store = if database_url.trim().eq_ignore_ascii_case("memory") {
            StoreBackend::Memory
        } else {
            let mut database = DatabaseConfig::from_url(&database_url)?;
            if let Some(max) = lookup("DATABASE_MAX_CONNECTIONS") {
                database.max_size = max
                    .parse::<usize>()
                    .with_context(|| format!("Invalid DATABASE_MAX_CONNECTIONS {max:?}"))?;
            }
            if let Some(tls) = lookup("DATABASE_TLS") {
                database.tls = parse_bool(&tls)
                    .ok_or_else(|| anyhow!("Invalid DATABASE_TLS {tls:?}"))?;
            }
            StoreBackend::Postgres(database)
        };

        let host = lookup("SERVER_HOST")
            .unwrap_or_else(|| "0.0.0.0".to_string())
            .parse::<IpAddr>()
            .context("Invalid SERVER_HOST")?;
        let port = match lookup("PORT") {
            Some(port) => port.parse::<u16>().with_context(|| format!("Invalid PORT {port:?}"))?,
            None => 3000,
        };
        let cors_allowed_origins = lookup("CORS_ALLOWED_ORIGINS")
            .map(|origins| {
                origins
                    .split(',')
                    .map(str::trim)
                    .filter(|origin| !origin.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            auth: AuthConfig { jwt_secret, token_ttl },
            store,
            server: ServerConfig {
                host,
                port,
                cors_allowed_origins,
            },
        })
    }
}

/// Parse a token lifetime such as `45d`, `1h`, `30m`, `90s` or `90`.
/// A bare number is read as seconds.
pub fn parse_ttl(raw: &str) -> Result<Duration> {
    let raw = raw.trim();
    let split = raw
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(raw.len());
    let (digits, unit) = raw.split_at(split);

    let amount: i64 = digits
        .parse()
        .map_err(|_| anyhow!("expected a number followed by s, m, h or d"))?;
    if amount <= 0 {
        bail!("token lifetime must be positive");
    }

    let ttl = match unit.trim() {
        "" | "s" => Duration::try_seconds(amount),
        "m" => Duration::try_minutes(amount),
        "h" => Duration::try_hours(amount),
        "d" => Duration::try_days(amount),
        other => bail!("unknown unit {other:?}"),
    };
    ttl.ok_or_else(|| anyhow!("token lifetime is out of range"))
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
