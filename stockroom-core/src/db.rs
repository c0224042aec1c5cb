//! Lifecycle-owning database context.
//!
//! Constructed once at process start and injected everywhere the store is
//! needed. This is the narrow interface the HTTP layer sees; nothing else
//! in the service touches the pool or the schema flag directly.

use tokio::time::Duration;

use crate::config::ConnectionConfig;
use crate::error::Result;
use crate::lease::LeasedClient;
use crate::pool::PoolManager;
use crate::query::{QueryOutput, SqlParam};
use crate::reclaim;
use crate::schema::SchemaInitializer;

pub struct Database {
    manager: PoolManager,
    schema: SchemaInitializer,
}

impl Database {
    pub fn new(config: ConnectionConfig) -> Self {
        Self {
            manager: PoolManager::new(config),
            schema: SchemaInitializer::new(),
        }
    }

    pub fn manager(&self) -> &PoolManager {
        &self.manager
    }

    /// See [`SchemaInitializer::ensure_schema`].
    pub async fn ensure_schema(&self) -> Result<()> {
        self.schema.ensure_schema(&self.manager).await
    }

    /// See [`PoolManager::run_query`].
    pub async fn run_query(&self, text: &str, params: &[SqlParam]) -> Result<QueryOutput> {
        self.manager.run_query(text, params).await
    }

    /// See [`PoolManager::lease_client`].
    pub async fn lease_client(&self) -> Result<LeasedClient> {
        self.manager.lease_client().await
    }

    /// See [`reclaim::reclaim_if_idle`].
    pub async fn reclaim_if_idle(&self, idle_threshold: Duration) {
        reclaim::reclaim_if_idle(&self.manager, idle_threshold).await
    }
}
