//! stockroom-core: serverless-aware database connection lifecycle
//!
//! Owns the bounded connection pool across cold and warm starts: lazy
//! single-flight construction, idempotent schema initialization, lease
//! diagnostics for checked-out connections, and idle reclamation between
//! invocations. The HTTP layer only ever talks to [`Database`].

pub mod config;
pub mod db;
pub mod error;
pub mod lease;
pub mod pool;
pub mod query;
pub mod reclaim;
pub mod schema;

pub use config::{ConnectionConfig, Profile};
pub use db::Database;
pub use error::{DbError, Result};
pub use lease::{LeasedClient, LEASE_DIAGNOSTIC_THRESHOLD};
pub use pool::PoolManager;
pub use query::{QueryOutput, SqlParam};
pub use reclaim::{reclaim_if_idle, DEFAULT_IDLE_RECLAIM_THRESHOLD};
pub use schema::SchemaInitializer;
