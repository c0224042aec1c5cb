//! Idle pool reclamation.
//!
//! A serverless execution context can sit frozen for minutes between
//! invocations; holding open connections across that dormancy starves the
//! database. After each completed unit of work the caller consults this
//! policy, which tears the pool down once it has been idle long enough.

use tokio::time::Duration;

use crate::pool::PoolManager;

/// Pool-level idle threshold before reclamation kicks in.
pub const DEFAULT_IDLE_RECLAIM_THRESHOLD: Duration = Duration::from_millis(60_000);

/// Close and discard the pool if it has been idle past `idle_threshold`.
///
/// Never fails: the invocation that triggered the check must not be
/// affected by reclamation problems, so anything unexpected is logged and
/// swallowed. Closing waits for checked-out connections to come back, so
/// legitimately in-flight work drains rather than aborts.
///
/// Only call this between units of work. Its safety rests on the platform
/// running one invocation at a time per execution context; a platform that
/// overlaps invocations on one process would need an active-lease count
/// before the pool could be closed here.
pub async fn reclaim_if_idle(manager: &PoolManager, idle_threshold: Duration) {
    let idle_for = manager.idle_for();
    if idle_for < idle_threshold {
        return;
    }

    let Some(pool) = manager.take_pool().await else {
        return;
    };

    tracing::info!(
        idle_ms = idle_for.as_millis() as u64,
        "reclaiming idle connection pool"
    );
    pool.close().await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConnectionConfig, Profile};

    fn test_manager() -> PoolManager {
        PoolManager::new(ConnectionConfig::from_env(Profile::Serverless))
    }

    #[tokio::test(start_paused = true)]
    async fn reclaims_after_idle_threshold() {
        let manager = test_manager();
        manager.acquire_pool().await;

        tokio::time::sleep(Duration::from_millis(150)).await;
        reclaim_if_idle(&manager, Duration::from_millis(100)).await;
        assert!(!manager.has_pool().await);

        // The next acquisition builds a fresh, distinct pool.
        manager.acquire_pool().await;
        assert_eq!(manager.pools_built(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn leaves_a_recently_used_pool_alone() {
        let manager = test_manager();
        manager.acquire_pool().await;

        tokio::time::sleep(Duration::from_millis(50)).await;
        reclaim_if_idle(&manager, Duration::from_millis(100)).await;

        assert!(manager.has_pool().await);
        assert_eq!(manager.pools_built(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn without_a_pool_the_check_is_a_no_op() {
        let manager = test_manager();

        tokio::time::sleep(Duration::from_millis(150)).await;
        reclaim_if_idle(&manager, Duration::from_millis(100)).await;

        assert!(!manager.has_pool().await);
        assert_eq!(manager.pools_built(), 0);
    }
}
