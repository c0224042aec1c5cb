//! Application state shared across handlers

use std::sync::Arc;

use tokio::time::{Duration, Instant};

use stockroom_core::Database;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    db: Database,
    started: Instant,
    expose_docs: bool,
}

impl AppState {
    pub fn new(db: Database, expose_docs: bool) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                db,
                started: Instant::now(),
                expose_docs,
            }),
        }
    }

    pub fn db(&self) -> &Database {
        &self.inner.db
    }

    pub fn uptime(&self) -> Duration {
        self.inner.started.elapsed()
    }

    pub fn docs_exposed(&self) -> bool {
        self.inner.expose_docs
    }
}
