//! Connection pool lifecycle.
//!
//! The manager owns at most one live pool at a time, constructed lazily on
//! first acquisition and discarded by idle reclamation. Construction is
//! guarded so concurrent cold-start acquisitions cannot build two pools
//! and leak one of them un-closed.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex as StdMutex;

use sqlx::postgres::PgPoolOptions;
use sqlx::{Connection, PgPool};
use tokio::sync::Mutex;
use tokio::time::{Duration, Instant};

use crate::config::ConnectionConfig;
use crate::error::{DbError, Result};
use crate::lease::{LeasedClient, LEASE_DIAGNOSTIC_THRESHOLD};
use crate::query::{QueryOutput, SqlParam};

/// Last-acquisition timestamp, read by the idle reclamation check.
#[derive(Debug)]
struct ActivityClock {
    last_activity: StdMutex<Instant>,
}

impl ActivityClock {
    fn new() -> Self {
        Self {
            last_activity: StdMutex::new(Instant::now()),
        }
    }

    fn touch(&self) {
        *self.last_activity.lock().unwrap() = Instant::now();
    }

    fn idle_for(&self) -> Duration {
        self.last_activity.lock().unwrap().elapsed()
    }
}

/// Owns the process-wide connection pool and its activity clock.
///
/// Constructed once at startup and injected wherever the store is needed;
/// there is no module-level global.
pub struct PoolManager {
    config: ConnectionConfig,
    pool: Mutex<Option<PgPool>>,
    clock: ActivityClock,
    pools_built: AtomicUsize,
}

impl PoolManager {
    pub fn new(config: ConnectionConfig) -> Self {
        Self {
            config,
            pool: Mutex::new(None),
            clock: ActivityClock::new(),
            pools_built: AtomicUsize::new(0),
        }
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// Return the live pool, constructing it on first use.
    ///
    /// Holding the slot lock across the check-and-set makes construction
    /// single-flight: concurrent cold-start calls all receive the same
    /// pool. Construction itself is lazy, so no connection is opened until
    /// the first statement runs.
    pub async fn acquire_pool(&self) -> PgPool {
        self.clock.touch();

        let mut slot = self.pool.lock().await;
        if let Some(pool) = slot.as_ref() {
            return pool.clone();
        }

        let pool = self.build_pool();
        self.pools_built.fetch_add(1, Ordering::Relaxed);
        tracing::info!(
            max_connections = self.config.max_connections,
            "constructed connection pool"
        );
        *slot = Some(pool.clone());
        pool
    }

    fn build_pool(&self) -> PgPool {
        PgPoolOptions::new()
            .max_connections(self.config.max_connections)
            .idle_timeout(self.config.idle_timeout)
            .acquire_timeout(self.config.connect_timeout)
            .test_before_acquire(false)
            .before_acquire(|conn, _meta| {
                Box::pin(async move {
                    // A connection that broke while idle must not surface
                    // to the caller; discard it and open a fresh one.
                    if let Err(err) = conn.ping().await {
                        tracing::warn!(error = %err, "discarding broken idle connection");
                        return Ok(false);
                    }
                    Ok(true)
                })
            })
            .connect_lazy_with(self.config.pg_options())
    }

    /// One-shot query: acquire the pool, execute, log, return rows.
    pub async fn run_query(&self, text: &str, params: &[SqlParam]) -> Result<QueryOutput> {
        let pool = self.acquire_pool().await;

        let started = Instant::now();
        let mut query = sqlx::query(text);
        for param in params {
            query = param.bind_onto(query);
        }

        let rows = query
            .fetch_all(&pool)
            .await
            .map_err(|source| DbError::query(text, source))?;

        tracing::debug!(
            statement = text,
            duration_ms = started.elapsed().as_millis() as u64,
            rows = rows.len(),
            "executed query"
        );

        Ok(QueryOutput {
            row_count: rows.len() as u64,
            rows,
        })
    }

    /// Check one connection out of the pool for multi-statement use.
    ///
    /// The caller owns the lease and must release it; a diagnostic is
    /// logged if the lease is held past the threshold.
    pub async fn lease_client(&self) -> Result<LeasedClient> {
        let pool = self.acquire_pool().await;
        let conn = pool.acquire().await.map_err(DbError::connection)?;
        Ok(LeasedClient::wrap(conn, LEASE_DIAGNOSTIC_THRESHOLD))
    }

    /// Remove and return the current pool, if any.
    pub(crate) async fn take_pool(&self) -> Option<PgPool> {
        self.pool.lock().await.take()
    }

    /// Drop the current pool reference; the next acquisition constructs a
    /// fresh pool.
    pub async fn reset_pool(&self) {
        self.take_pool().await;
    }

    /// Whether a pool currently exists, without constructing one.
    pub async fn has_pool(&self) -> bool {
        self.pool.lock().await.is_some()
    }

    /// Elapsed time since the last acquisition.
    pub fn idle_for(&self) -> Duration {
        self.clock.idle_for()
    }

    /// Number of pools constructed over the life of this manager.
    pub fn pools_built(&self) -> usize {
        self.pools_built.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::Profile;

    fn test_config() -> ConnectionConfig {
        ConnectionConfig {
            host: "localhost".into(),
            port: 5432,
            user: "user".into(),
            password: "password".into(),
            database: "stockroom_test".into(),
            use_tls: false,
            max_connections: 2,
            idle_timeout: Duration::from_millis(30_000),
            connect_timeout: Duration::from_millis(5_000),
            profile: Profile::Serverless,
        }
    }

    #[tokio::test]
    async fn concurrent_first_acquisitions_build_one_pool() {
        let manager = Arc::new(PoolManager::new(test_config()));

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let manager = Arc::clone(&manager);
                tokio::spawn(async move { manager.acquire_pool().await })
            })
            .collect();

        for task in tasks {
            task.await.expect("acquire task panicked");
        }

        assert_eq!(manager.pools_built(), 1);
        assert!(manager.has_pool().await);
    }

    #[tokio::test]
    async fn repeated_acquisition_reuses_the_pool() {
        let manager = PoolManager::new(test_config());

        manager.acquire_pool().await;
        manager.acquire_pool().await;
        manager.acquire_pool().await;

        assert_eq!(manager.pools_built(), 1);
    }

    #[tokio::test]
    async fn reset_forces_a_fresh_pool() {
        let manager = PoolManager::new(test_config());

        manager.acquire_pool().await;
        manager.reset_pool().await;
        assert!(!manager.has_pool().await);

        manager.acquire_pool().await;
        assert_eq!(manager.pools_built(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn acquisition_touches_the_activity_clock() {
        let manager = PoolManager::new(test_config());

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert!(manager.idle_for() >= Duration::from_millis(500));

        manager.acquire_pool().await;
        assert!(manager.idle_for() < Duration::from_millis(10));
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn run_query_returns_rows_and_count() {
        let manager = PoolManager::new(ConnectionConfig::from_env(Profile::Server));

        let output = manager
            .run_query("SELECT 1 AS one", &[])
            .await
            .expect("query failed");

        assert_eq!(output.row_count, 1);
        assert_eq!(output.rows.len(), 1);
    }
}
