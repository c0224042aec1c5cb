//! Database connection configuration
//!
//! All recognized settings are enumerated and defaulted here. The binary
//! resolves the environment exactly once at startup and the resulting
//! config stays immutable for the life of the process.

use std::env;
use std::time::Duration;

use sqlx::postgres::{PgConnectOptions, PgSslMode};

/// Execution profile the process was started under.
///
/// The serverless profile keeps the connection cap low because many frozen
/// execution contexts may hold pools against the same database at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    /// Long-running server process.
    Server,
    /// Per-request invocation on a serverless platform.
    Serverless,
}

impl Profile {
    /// Default pool cap for this profile.
    pub fn default_max_connections(self) -> u32 {
        match self {
            Profile::Server => 10,
            Profile::Serverless => 2,
        }
    }
}

/// Resolved database connection settings.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
    pub use_tls: bool,
    pub max_connections: u32,
    /// How long an unused connection may sit in the pool before the pool
    /// itself drops it.
    pub idle_timeout: Duration,
    /// How long to wait for a connection to be established or checked out.
    pub connect_timeout: Duration,
    pub profile: Profile,
}

impl ConnectionConfig {
    /// Resolve configuration from the environment with defaults.
    ///
    /// Unparsable numeric values fall back to their defaults rather than
    /// failing startup.
    pub fn from_env(profile: Profile) -> Self {
        Self {
            host: env::var("DB_HOST").unwrap_or_else(|_| "localhost".to_string()),
            port: parse_env("DB_PORT", 5432),
            user: env::var("DB_USER").unwrap_or_else(|_| "user".to_string()),
            password: env::var("DB_PASSWORD").unwrap_or_else(|_| "password".to_string()),
            database: env::var("DB_NAME").unwrap_or_else(|_| "mydatabase".to_string()),
            use_tls: parse_env("DB_USE_TLS", false),
            max_connections: parse_env("DB_MAX_CONNECTIONS", profile.default_max_connections()),
            idle_timeout: Duration::from_millis(parse_env("DB_IDLE_TIMEOUT_MS", 30_000)),
            connect_timeout: Duration::from_millis(parse_env("DB_CONNECTION_TIMEOUT_MS", 5_000)),
            profile,
        }
    }

    /// Connection options for the underlying driver.
    pub fn pg_options(&self) -> PgConnectOptions {
        let ssl_mode = if self.use_tls {
            // Encrypt without verifying the server certificate, matching
            // the managed-database endpoints this service targets.
            PgSslMode::Require
        } else {
            PgSslMode::Disable
        };

        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .database(&self.database)
            .ssl_mode(ssl_mode)
    }
}

fn parse_env<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}
