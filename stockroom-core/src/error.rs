//! Structured error types for the connection lifecycle core.
//!
//! Uses `thiserror` so library consumers get composable errors; the binary
//! crate can still wrap these in `anyhow` at its boundary.

use thiserror::Error;

/// Main error type for database operations.
#[derive(Error, Debug)]
pub enum DbError {
    /// Pool construction or connection checkout failed. Not fatal to the
    /// process; the caller should report service unavailability.
    #[error("database connection failed: {source}")]
    Connection {
        #[source]
        source: sqlx::Error,
    },

    /// A statement was issued through a lease that was already released.
    #[error("connection lease already released")]
    LeaseReleased,

    /// Schema creation failed. The initialized flag stays unset so a later
    /// call retries.
    #[error("schema initialization failed: {source}")]
    SchemaInit {
        #[source]
        source: sqlx::Error,
    },

    /// An individual statement failed. Surfaced with the statement text and
    /// never retried by the core.
    #[error("query failed ({statement}): {source}")]
    Query {
        statement: String,
        #[source]
        source: sqlx::Error,
    },
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, DbError>;

impl DbError {
    pub(crate) fn connection(source: sqlx::Error) -> Self {
        Self::Connection { source }
    }

    pub(crate) fn schema_init(source: sqlx::Error) -> Self {
        Self::SchemaInit { source }
    }

    pub(crate) fn query(statement: impl Into<String>, source: sqlx::Error) -> Self {
        Self::Query {
            statement: statement.into(),
            source,
        }
    }
}
