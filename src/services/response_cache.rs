use crate::error::Result;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{Mutex, OnceCell};
use tracing::debug;

/// Get-or-populate cache for idempotent, slow-changing lookups
///
/// Values are immutable once stored; there is no eviction and no TTL, so it
/// is only meant for small key spaces such as one string bundle per locale.
/// Concurrent misses on the same key share a single population; a failed
/// population leaves no entry behind and the next caller tries again.
pub struct ResponseCache<V> {
    cells: Mutex<HashMap<String, Arc<OnceCell<Arc<V>>>>>,
}

impl<V> Default for ResponseCache<V> {
    fn default() -> Self {
        Self {
            cells: Mutex::new(HashMap::new()),
        }
    }
}

impl<V: Send + Sync> ResponseCache<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached value for `key`, populating it with `populate` on a miss
    pub async fn get_or_populate<F, Fut>(&self, key: &str, populate: F) -> Result<Arc<V>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V>>,
    {
        let cell = {
            let mut cells = self.cells.lock().await;
            cells.entry(key.to_string()).or_default().clone()
        };

        if let Some(value) = cell.get() {
            debug!(key, "Cache hit");
            return Ok(value.clone());
        }

        let populated = cell
            .get_or_try_init(|| async move {
                debug!(key, "Cache miss, populating");
                populate().await.map(Arc::new)
            })
            .await
            .cloned();

        if populated.is_err() {
            self.discard_empty(key, &cell).await;
        }
        populated
    }

    /// Drop the entry for `key` if it is still the unpopulated `cell`
    async fn discard_empty(&self, key: &str, cell: &Arc<OnceCell<Arc<V>>>) {
        let mut cells = self.cells.lock().await;
        let stale = cells
            .get(key)
            .is_some_and(|current| Arc::ptr_eq(current, cell) && !current.initialized());
        if stale {
            cells.remove(key);
        }
    }

    /// Cached value without populating
    pub async fn get(&self, key: &str) -> Option<Arc<V>> {
        let cells = self.cells.lock().await;
        cells.get(key).and_then(|cell| cell.get().cloned())
    }

    /// Number of populated keys
    pub async fn len(&self) -> usize {
        let cells = self.cells.lock().await;
        cells.values().filter(|cell| cell.initialized()).count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
