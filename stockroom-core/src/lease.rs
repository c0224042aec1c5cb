//! Lease diagnostics for checked-out connections.
//!
//! A leased connection is wrapped by composition; the underlying
//! connection's behavior is never patched in place, so a connection
//! returned to the pool re-enters it clean and can be leased again.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex as StdMutex};

use sqlx::pool::PoolConnection;
use sqlx::Postgres;
use tokio::task::JoinHandle;
use tokio::time::{Duration, Instant};

use crate::error::{DbError, Result};
use crate::query::{QueryOutput, SqlParam};

/// How long a lease may be held before a diagnostic is emitted.
pub const LEASE_DIAGNOSTIC_THRESHOLD: Duration = Duration::from_millis(5_000);

/// Observational deadline on a lease.
///
/// Records the last issued statement and warns once if the lease outlives
/// the threshold. It never touches the connection itself.
#[derive(Debug)]
struct LeaseWatch {
    last_statement: Arc<StdMutex<Option<String>>>,
    /// Claimed exactly once, by either the deadline or cancellation.
    resolved: Arc<AtomicBool>,
    fired: Arc<AtomicBool>,
    timer: Option<JoinHandle<()>>,
}

impl LeaseWatch {
    fn arm(threshold: Duration) -> Self {
        let last_statement = Arc::new(StdMutex::new(None));
        let resolved = Arc::new(AtomicBool::new(false));
        let fired = Arc::new(AtomicBool::new(false));
        let leased_at = Instant::now();

        let timer = tokio::spawn({
            let last_statement = Arc::clone(&last_statement);
            let resolved = Arc::clone(&resolved);
            let fired = Arc::clone(&fired);
            async move {
                tokio::time::sleep(threshold).await;
                if resolved
                    .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
                    .is_err()
                {
                    return;
                }
                fired.store(true, Ordering::SeqCst);
                let statement = last_statement.lock().unwrap().clone();
                tracing::warn!(
                    held_ms = leased_at.elapsed().as_millis() as u64,
                    last_statement = statement.as_deref().unwrap_or("<none>"),
                    "client checked out past the lease threshold without release"
                );
            }
        });

        Self {
            last_statement,
            resolved,
            fired,
            timer: Some(timer),
        }
    }

    fn record(&self, statement: &str) {
        *self.last_statement.lock().unwrap() = Some(statement.to_owned());
    }

    /// Cancel the deadline. Idempotent; the diagnostic can no longer fire
    /// once the cancellation has claimed the watch.
    fn cancel(&mut self) {
        self.resolved.store(true, Ordering::SeqCst);
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }

    fn diagnostic_fired(&self) -> bool {
        self.fired.load(Ordering::SeqCst)
    }
}

impl Drop for LeaseWatch {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// A connection checked out of the pool for multi-statement use.
///
/// The caller owns the lease exclusively until [`LeasedClient::release`];
/// dropping an unreleased client also returns the connection and cancels
/// the diagnostic.
pub struct LeasedClient {
    conn: Option<PoolConnection<Postgres>>,
    watch: LeaseWatch,
}

impl LeasedClient {
    pub(crate) fn wrap(conn: PoolConnection<Postgres>, threshold: Duration) -> Self {
        Self {
            conn: Some(conn),
            watch: LeaseWatch::arm(threshold),
        }
    }

    /// Issue a statement on the leased connection.
    pub async fn query(&mut self, text: &str, params: &[SqlParam]) -> Result<QueryOutput> {
        self.watch.record(text);

        let conn = self.conn.as_mut().ok_or(DbError::LeaseReleased)?;

        let started = Instant::now();
        let mut query = sqlx::query(text);
        for param in params {
            query = param.bind_onto(query);
        }

        let rows = query
            .fetch_all(&mut **conn)
            .await
            .map_err(|source| DbError::query(text, source))?;

        tracing::debug!(
            statement = text,
            duration_ms = started.elapsed().as_millis() as u64,
            rows = rows.len(),
            "executed leased query"
        );

        Ok(QueryOutput {
            row_count: rows.len() as u64,
            rows,
        })
    }

    /// Cancel the diagnostic and return the connection to the pool.
    ///
    /// A second call is a no-op; the pool's capacity is credited once.
    pub fn release(&mut self) {
        self.watch.cancel();
        if let Some(conn) = self.conn.take() {
            drop(conn);
        }
    }

    pub(crate) fn diagnostic_fired(&self) -> bool {
        self.watch.diagnostic_fired()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConnectionConfig, Profile};
    use crate::pool::PoolManager;

    #[tokio::test(start_paused = true)]
    async fn diagnostic_fires_past_threshold_with_last_statement() {
        let watch = LeaseWatch::arm(Duration::from_millis(50));
        watch.record("SELECT * FROM items");

        tokio::time::sleep(Duration::from_millis(80)).await;

        assert!(watch.diagnostic_fired());
        assert_eq!(
            watch.last_statement.lock().unwrap().as_deref(),
            Some("SELECT * FROM items")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn no_diagnostic_when_cancelled_before_threshold() {
        let mut watch = LeaseWatch::arm(Duration::from_millis(50));

        tokio::time::sleep(Duration::from_millis(20)).await;
        watch.cancel();
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert!(!watch.diagnostic_fired());
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_is_idempotent() {
        let mut watch = LeaseWatch::arm(Duration::from_millis(50));

        watch.cancel();
        watch.cancel();
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert!(!watch.diagnostic_fired());
    }

    #[tokio::test(start_paused = true)]
    async fn record_keeps_only_the_most_recent_statement() {
        let mut watch = LeaseWatch::arm(Duration::from_millis(50));
        watch.record("SELECT 1");
        watch.record("SELECT 2");

        assert_eq!(
            watch.last_statement.lock().unwrap().as_deref(),
            Some("SELECT 2")
        );
        watch.cancel();
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn double_release_credits_capacity_once() {
        let mut config = ConnectionConfig::from_env(Profile::Serverless);
        config.max_connections = 1;
        let manager = PoolManager::new(config);

        let mut lease = manager.lease_client().await.expect("lease failed");
        lease.query("SELECT 1", &[]).await.expect("query failed");
        lease.release();
        lease.release();

        // With a capacity of one, the connection must be available again
        // exactly once for each of these sequential leases.
        for _ in 0..2 {
            let mut next = manager.lease_client().await.expect("re-lease failed");
            next.query("SELECT 1", &[]).await.expect("query failed");
            next.release();
        }
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn query_after_release_fails_cleanly() {
        let manager = PoolManager::new(ConnectionConfig::from_env(Profile::Serverless));

        let mut lease = manager.lease_client().await.expect("lease failed");
        lease.release();

        let err = lease.query("SELECT 1", &[]).await.unwrap_err();
        assert!(matches!(err, DbError::LeaseReleased));
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn released_lease_never_fires_a_diagnostic() {
        let manager = PoolManager::new(ConnectionConfig::from_env(Profile::Serverless));

        let mut lease = manager.lease_client().await.expect("lease failed");
        lease.query("SELECT 1", &[]).await.expect("query failed");
        lease.release();

        tokio::time::sleep(LEASE_DIAGNOSTIC_THRESHOLD + Duration::from_millis(100)).await;
        assert!(!lease.diagnostic_fired());
    }
}
